//! Type-directed conversion of diagram properties into STIX fields.

use crate::error::{PropertyError, PublishError};
use crate::graph::{Property, PropertyKind};
use serde_json::{Map, Value};

/// Flattens a node's properties into plain fields.
///
/// Undefined properties are left out entirely. Enums emit their selected
/// option: `"True"`/`"False"` become booleans, any other text is lowercased.
pub fn extract_basic(properties: &dyn Property) -> Result<Map<String, Value>, PublishError> {
    let mut fields = Map::new();
    for (key, prop) in properties.entries() {
        match prop.kind() {
            PropertyKind::Dictionary => {
                return Err(PropertyError::NestedDictionaryNotAllowed {
                    key: key.to_string(),
                }
                .into());
            }
            PropertyKind::Enum => {
                if prop.is_defined() {
                    fields.insert(key.to_string(), enum_value(prop));
                }
            }
            PropertyKind::List => {
                if prop.is_defined() {
                    fields.insert(key.to_string(), extract_list(key, prop)?);
                }
            }
            PropertyKind::Scalar | PropertyKind::Collection => {
                if prop.is_defined() {
                    fields.insert(key.to_string(), prop.to_raw_value());
                }
            }
        }
    }
    Ok(fields)
}

/// Extraction for action nodes: `confidence` is replaced by the `value` of its selected option.
pub fn extract_action(properties: &dyn Property) -> Result<Map<String, Value>, PublishError> {
    let mut fields = Map::new();
    for (key, prop) in properties.entries() {
        let prop = if key == "confidence" {
            if prop.kind() != PropertyKind::Enum {
                return Err(malformed(key, "expected an enum"));
            }
            if !prop.is_defined() {
                continue;
            }
            let option = prop
                .to_reference_value()
                .filter(|p| p.kind() == PropertyKind::Dictionary)
                .ok_or_else(|| malformed(key, "selected option is not a dictionary"))?;
            subproperty(option, key, "value")?
        } else {
            prop
        };
        if prop.is_defined() {
            fields.insert(key.to_string(), prop.to_raw_value());
        }
    }
    Ok(fields)
}

/// Extraction for the flow object derived from the page. `author` is exported separately.
pub fn extract_flow(properties: &dyn Property) -> Result<Map<String, Value>, PublishError> {
    let mut fields = Map::new();
    for (key, prop) in properties.entries() {
        match key {
            "author" => {}
            "external_references" => {
                if prop.kind() != PropertyKind::List
                    || prop.element_kind() != Some(PropertyKind::Dictionary)
                {
                    return Err(malformed(key, "expected a list of dictionaries"));
                }
                let refs = prop.items().iter().map(|r| r.to_raw_value()).collect();
                fields.insert(key.to_string(), Value::Array(refs));
            }
            "scope" => {
                if prop.kind() != PropertyKind::Enum {
                    return Err(malformed(key, "expected an enum"));
                }
                if prop.is_defined() {
                    fields.insert(key.to_string(), Value::String(enum_text(prop)));
                }
            }
            _ => {
                if prop.is_defined() {
                    fields.insert(key.to_string(), prop.to_raw_value());
                }
            }
        }
    }
    Ok(fields)
}

/// Extraction for the identity that authored the flow.
pub fn extract_author(page: &dyn Property) -> Result<Map<String, Value>, PublishError> {
    let author = page
        .get("author")
        .ok_or_else(|| PublishError::InvalidAuthor("the page has no author".to_string()))?;
    if !matches!(
        author.kind(),
        PropertyKind::Dictionary | PropertyKind::Collection
    ) {
        return Err(PublishError::InvalidAuthor(format!(
            "expected a collection, found a {}",
            author.kind()
        )));
    }

    let mut fields = Map::new();
    for (key, prop) in author.entries() {
        if key == "identity_class" {
            if prop.kind() != PropertyKind::Enum {
                return Err(malformed(key, "expected an enum"));
            }
            if prop.is_defined() {
                fields.insert(key.to_string(), Value::String(enum_text(prop)));
            }
        } else if prop.is_defined() {
            fields.insert(key.to_string(), prop.to_raw_value());
        }
    }
    Ok(fields)
}

fn extract_list(key: &str, list: &dyn Property) -> Result<Value, PublishError> {
    let mut values = Vec::new();
    for item in list.items() {
        match item.kind() {
            kind @ (PropertyKind::Dictionary | PropertyKind::List | PropertyKind::Enum) => {
                return Err(PropertyError::UnsupportedNestedListElement {
                    key: key.to_string(),
                    kind: kind.to_string(),
                }
                .into());
            }
            PropertyKind::Scalar | PropertyKind::Collection => {
                if item.is_defined() {
                    values.push(item.to_raw_value());
                }
            }
        }
    }
    Ok(Value::Array(values))
}

/// The value an enum contributes to a basic object.
fn enum_value(prop: &dyn Property) -> Value {
    let selected = prop
        .to_reference_value()
        .map(|r| r.to_raw_value())
        .unwrap_or_else(|| prop.to_raw_value());
    match selected {
        Value::String(text) if text == "True" => Value::Bool(true),
        Value::String(text) if text == "False" => Value::Bool(false),
        Value::String(text) => Value::String(text.to_lowercase()),
        other => other,
    }
}

/// The lowercased text of an enum's selected option.
fn enum_text(prop: &dyn Property) -> String {
    let selected = prop
        .to_reference_value()
        .map(|r| r.to_raw_value())
        .unwrap_or_else(|| prop.to_raw_value());
    match selected {
        Value::String(text) => text.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

fn subproperty<'p>(
    property: &'p dyn Property,
    key: &str,
    name: &str,
) -> Result<&'p dyn Property, PublishError> {
    property
        .get(name)
        .ok_or_else(|| PublishError::MissingSubproperty {
            key: key.to_string(),
            subproperty: name.to_string(),
        })
}

fn malformed(key: &str, reason: &str) -> PublishError {
    PublishError::MalformedProperty {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
