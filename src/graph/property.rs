use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// The shape of a property, as seen by the exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Scalar,
    Enum,
    List,
    Dictionary,
    Collection,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Scalar => "scalar",
            PropertyKind::Enum => "enum",
            PropertyKind::List => "list",
            PropertyKind::Dictionary => "dictionary",
            PropertyKind::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// Read-only capability interface over a diagram property.
///
/// The exporters only ever consume properties through this trait, so any
/// editor-side property model can be published by implementing it.
pub trait Property: fmt::Debug + Send + Sync {
    fn kind(&self) -> PropertyKind;

    /// Whether the property carries a value worth exporting.
    fn is_defined(&self) -> bool;

    /// Converts the property into a JSON-compatible value.
    fn to_raw_value(&self) -> Value;

    /// For enums, the option property the current selection points at.
    fn to_reference_value(&self) -> Option<&dyn Property> {
        None
    }

    /// Ordered keyed children of a dictionary or collection.
    fn entries(&self) -> Vec<(&str, &dyn Property)> {
        Vec::new()
    }

    /// Elements of a list.
    fn items(&self) -> Vec<&dyn Property> {
        Vec::new()
    }

    /// The declared kind of a list's elements.
    fn element_kind(&self) -> Option<PropertyKind> {
        None
    }

    /// Looks up a keyed child by name.
    fn get(&self, key: &str) -> Option<&dyn Property> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, p)| p)
    }
}

/// An insertion-ordered map of named properties.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PropertyMap(Vec<(String, PropertyValue)>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the property stored under `key`, keeping its position.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for PropertyMap {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(key, value)| Ok((key, serde_json::from_value(value)?)))
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyMap)
    }
}

/// The reference property model used by the JSON diagram document and the tests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    /// A string, number, boolean or date. `null` means unset.
    Scalar(Value),
    Enum {
        selected: Option<String>,
        #[serde(default)]
        options: PropertyMap,
    },
    List {
        form: PropertyKind,
        #[serde(default)]
        items: Vec<PropertyValue>,
    },
    Dictionary(PropertyMap),
    Collection(PropertyMap),
}

impl PropertyValue {
    pub fn scalar(value: impl Into<Value>) -> Self {
        PropertyValue::Scalar(value.into())
    }

    pub fn unset() -> Self {
        PropertyValue::Scalar(Value::Null)
    }

    /// An enum whose options are plain text; `selected` must name one of `options`.
    pub fn choice(selected: Option<&str>, options: &[&str]) -> Self {
        let options = options.iter().fold(PropertyMap::new(), |map, option| {
            map.with(*option, PropertyValue::scalar(*option))
        });
        PropertyValue::Enum {
            selected: selected.map(str::to_string),
            options,
        }
    }

    pub fn list(form: PropertyKind, items: Vec<PropertyValue>) -> Self {
        PropertyValue::List { form, items }
    }
}

impl Property for PropertyValue {
    fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Scalar(_) => PropertyKind::Scalar,
            PropertyValue::Enum { .. } => PropertyKind::Enum,
            PropertyValue::List { .. } => PropertyKind::List,
            PropertyValue::Dictionary(_) => PropertyKind::Dictionary,
            PropertyValue::Collection(_) => PropertyKind::Collection,
        }
    }

    fn is_defined(&self) -> bool {
        match self {
            PropertyValue::Scalar(value) => !value.is_null(),
            PropertyValue::Enum { selected, .. } => selected.is_some(),
            PropertyValue::List { items, .. } => !items.is_empty(),
            PropertyValue::Dictionary(map) | PropertyValue::Collection(map) => {
                map.iter().any(|(_, p)| p.is_defined())
            }
        }
    }

    fn to_raw_value(&self) -> Value {
        match self {
            PropertyValue::Scalar(value) => value.clone(),
            PropertyValue::Enum { selected, .. } => {
                selected.clone().map(Value::String).unwrap_or(Value::Null)
            }
            PropertyValue::List { items, .. } => {
                Value::Array(items.iter().map(Property::to_raw_value).collect())
            }
            PropertyValue::Dictionary(map) | PropertyValue::Collection(map) => Value::Object(
                map.iter()
                    .filter(|(_, p)| p.is_defined())
                    .map(|(k, p)| (k.to_string(), p.to_raw_value()))
                    .collect(),
            ),
        }
    }

    fn to_reference_value(&self) -> Option<&dyn Property> {
        match self {
            PropertyValue::Enum {
                selected: Some(key),
                options,
            } => options.get(key).map(|p| p as &dyn Property),
            _ => None,
        }
    }

    fn entries(&self) -> Vec<(&str, &dyn Property)> {
        match self {
            PropertyValue::Dictionary(map) | PropertyValue::Collection(map) => map
                .iter()
                .map(|(k, p)| (k, p as &dyn Property))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn items(&self) -> Vec<&dyn Property> {
        match self {
            PropertyValue::List { items, .. } => items.iter().map(|p| p as &dyn Property).collect(),
            _ => Vec::new(),
        }
    }

    fn element_kind(&self) -> Option<PropertyKind> {
        match self {
            PropertyValue::List { form, .. } => Some(*form),
            _ => None,
        }
    }
}
