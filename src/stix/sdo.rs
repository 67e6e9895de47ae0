use crate::identity::ExportContext;
use ahash::AHashMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

pub const STIX_SPEC_VERSION: &str = "2.1";

pub const ATTACK_FLOW_EXTENSION_ID: &str = "fb9c968a-745b-4ade-9b25-c324172197f4";
pub const ATTACK_FLOW_SCHEMA_URL: &str = "https://center-for-threat-informed-defense.github.io/attack-flow/stix/attack-flow-schema-2.0.0.json";
pub const ATTACK_FLOW_SCHEMA_VERSION: &str = "2.0.0";
pub const ATTACK_FLOW_EXTENSION_DATE: &str = "2022-08-02T19:34:35.143Z";
pub const ATTACK_FLOW_EXTENSION_CREATOR: &str =
    "MITRE Engenuity Center for Threat-Informed Defense";

/// Object types that belong to the Attack Flow extension.
pub const ATTACK_FLOW_SDOS: [&str; 5] = [
    "attack-flow",
    "attack-action",
    "attack-asset",
    "attack-condition",
    "attack-operator",
];

const PROTECTED_FIELDS: [&str; 3] = ["type", "id", "spec_version"];

/// The STIX object kinds the exporter dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StixKind {
    Flow,
    Action,
    Asset,
    Condition,
    Operator,
    Note,
    Process,
    Other(String),
}

impl StixKind {
    pub fn from_type(stix_type: &str) -> Self {
        match stix_type {
            "attack-flow" => StixKind::Flow,
            "attack-action" => StixKind::Action,
            "attack-asset" => StixKind::Asset,
            "attack-condition" => StixKind::Condition,
            "attack-operator" => StixKind::Operator,
            "note" => StixKind::Note,
            "process" => StixKind::Process,
            other => StixKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StixKind::Flow => "attack-flow",
            StixKind::Action => "attack-action",
            StixKind::Asset => "attack-asset",
            StixKind::Condition => "attack-condition",
            StixKind::Operator => "attack-operator",
            StixKind::Note => "note",
            StixKind::Process => "process",
            StixKind::Other(other) => other,
        }
    }
}

/// Maps diagram template ids onto STIX object types.
#[derive(Debug, Clone)]
pub struct TypeMap(AHashMap<String, String>);

impl Default for TypeMap {
    fn default() -> Self {
        let entries = [
            ("flow", "attack-flow"),
            ("action", "attack-action"),
            ("asset", "attack-asset"),
            ("condition", "attack-condition"),
            ("or", "attack-operator"),
            ("and", "attack-operator"),
        ];
        Self(
            entries
                .iter()
                .map(|(t, s)| (t.to_string(), s.to_string()))
                .collect(),
        )
    }
}

impl TypeMap {
    pub fn insert(&mut self, template: &str, stix_type: &str) {
        self.0.insert(template.to_string(), stix_type.to_string());
    }

    /// Resolves a template id, falling back to the id itself with underscores as hyphens.
    pub fn resolve(&self, template: &str) -> String {
        self.0
            .get(template)
            .map(String::as_str)
            .unwrap_or(template)
            .replace('_', "-")
    }
}

/// A STIX Domain Object with an open set of type-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Sdo {
    kind: StixKind,
    id: String,
    fields: Map<String, Value>,
}

impl Sdo {
    pub fn kind(&self) -> &StixKind {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Sets a field. Returns `false` if the field is part of the object's identity.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        if PROTECTED_FIELDS.contains(&key) {
            tracing::warn!(object = %self.id, field = key, "Ignoring property that would overwrite an identity field");
            return false;
        }
        self.fields.insert(key.to_string(), value);
        true
    }

    pub fn merge(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.set(&key, value);
        }
    }

    /// Appends `id` to the reference array stored under `key`.
    pub(crate) fn push_ref(&mut self, key: &str, id: &str) {
        let slot = self
            .fields
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(refs) => refs.push(Value::String(id.to_string())),
            other => *other = json!([id]),
        }
    }

    /// Stores `id` under `key` unless that reference is already taken.
    pub(crate) fn set_ref_once(&mut self, key: &str, id: &str) -> bool {
        if self.fields.get(key).is_some_and(|v| !v.is_null()) {
            return false;
        }
        self.fields
            .insert(key.to_string(), Value::String(id.to_string()));
        true
    }
}

impl Serialize for Sdo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// A STIX Relationship Object linking two objects by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sro {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub spec_version: String,
    pub created: String,
    pub modified: String,
    pub relationship_type: String,
    pub source_ref: String,
    pub target_ref: String,
}

/// Anything that can appear in a bundle's `objects` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StixObject {
    Domain(Sdo),
    Relationship(Sro),
}

impl StixObject {
    pub fn id(&self) -> &str {
        match self {
            StixObject::Domain(sdo) => sdo.id(),
            StixObject::Relationship(sro) => &sro.id,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            StixObject::Domain(sdo) => sdo.kind().as_str(),
            StixObject::Relationship(sro) => &sro.kind,
        }
    }

    pub fn as_sdo(&self) -> Option<&Sdo> {
        match self {
            StixObject::Domain(sdo) => Some(sdo),
            StixObject::Relationship(_) => None,
        }
    }

    pub fn as_sro(&self) -> Option<&Sro> {
        match self {
            StixObject::Relationship(sro) => Some(sro),
            StixObject::Domain(_) => None,
        }
    }
}

/// The STIX bundle document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bundle {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub spec_version: String,
    pub created: String,
    pub modified: String,
    pub objects: Vec<StixObject>,
}

impl Bundle {
    pub fn find(&self, id: &str) -> Option<&StixObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Sro> {
        self.objects.iter().filter_map(StixObject::as_sro)
    }
}

/// Creates SDOs, SROs and the fixed extension objects.
pub struct SdoFactory<'a> {
    ctx: &'a ExportContext,
    types: &'a TypeMap,
}

impl<'a> SdoFactory<'a> {
    pub fn new(ctx: &'a ExportContext, types: &'a TypeMap) -> Self {
        Self { ctx, types }
    }

    pub fn resolve_type(&self, template: &str) -> String {
        self.types.resolve(template)
    }

    /// Creates an SDO for `template`. A given `uuid` is used verbatim, otherwise a fresh one is drawn.
    pub fn create_sdo(&self, template: &str, uuid: Option<&str>) -> Sdo {
        let now = self.ctx.now();
        let stix_type = self.types.resolve(template);
        let uuid = uuid.map_or_else(|| self.ctx.next_uuid(), str::to_string);
        let id = format!("{}--{}", stix_type, uuid);

        let mut fields = Map::new();
        fields.insert("type".into(), json!(stix_type));
        fields.insert("id".into(), json!(id));
        fields.insert("spec_version".into(), json!(STIX_SPEC_VERSION));
        fields.insert("created".into(), json!(now));
        fields.insert("modified".into(), json!(now));

        if ATTACK_FLOW_SDOS.contains(&stix_type.as_str()) {
            fields.insert(
                "extensions".into(),
                json!({
                    format!("extension-definition--{}", ATTACK_FLOW_EXTENSION_ID): {
                        "extension_type": "new-sdo"
                    }
                }),
            );
        }

        Sdo {
            kind: StixKind::from_type(&stix_type),
            id,
            fields,
        }
    }

    pub fn create_sro(&self, parent: &str, child: &str, relationship_type: &str) -> Sro {
        let now = self.ctx.now();
        Sro {
            kind: "relationship".to_string(),
            id: self.ctx.typed_id("relationship"),
            spec_version: STIX_SPEC_VERSION.to_string(),
            created: now.clone(),
            modified: now,
            relationship_type: relationship_type.to_string(),
            source_ref: parent.to_string(),
            target_ref: child.to_string(),
        }
    }

    pub fn create_bundle(&self, objects: Vec<StixObject>) -> Bundle {
        let now = self.ctx.now();
        Bundle {
            kind: "bundle".to_string(),
            id: self.ctx.typed_id("bundle"),
            spec_version: STIX_SPEC_VERSION.to_string(),
            created: now.clone(),
            modified: now,
            objects,
        }
    }

    /// The identity that authored the Attack Flow extension.
    pub fn extension_author(&self) -> Sdo {
        let mut author = self.create_sdo("identity", Some(ATTACK_FLOW_EXTENSION_ID));
        let id = author.id().to_string();
        author.merge(fixed_fields(json!({
            "created_by_ref": id,
            "name": ATTACK_FLOW_EXTENSION_CREATOR,
            "identity_class": "organization",
            "created": ATTACK_FLOW_EXTENSION_DATE,
            "modified": ATTACK_FLOW_EXTENSION_DATE,
        })));
        author
    }

    /// The extension-definition that declares the Attack Flow object types.
    pub fn extension(&self, creator_id: &str) -> Sdo {
        let mut extension = self.create_sdo("extension-definition", Some(ATTACK_FLOW_EXTENSION_ID));
        extension.merge(fixed_fields(json!({
            "name": "Attack Flow",
            "description": "Extends STIX 2.1 with features to create Attack Flows.",
            "created": ATTACK_FLOW_EXTENSION_DATE,
            "modified": ATTACK_FLOW_EXTENSION_DATE,
            "created_by_ref": creator_id,
            "schema": ATTACK_FLOW_SCHEMA_URL,
            "version": ATTACK_FLOW_SCHEMA_VERSION,
            "extension_types": ["new-sdo"],
            "external_references": [
                {
                    "source_name": "Documentation",
                    "description": "Documentation for Attack Flow",
                    "url": "https://center-for-threat-informed-defense.github.io/attack-flow"
                },
                {
                    "source_name": "GitHub",
                    "description": "Source code repository for Attack Flow",
                    "url": "https://github.com/center-for-threat-informed-defense/attack-flow"
                }
            ]
        })));
        extension
    }
}

fn fixed_fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
