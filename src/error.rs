use thiserror::Error;

/// Errors that can occur while publishing a diagram graph.
///
/// Every variant is fatal to the export call that raised it: no partial
/// bundle or playbook is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PublishError {
    #[error("Page node '{0}' is missing from the exported graph")]
    MissingPageNode(String),

    #[error("Edge '{edge_id}' references node '{node_id}', which is not part of the export")]
    DanglingEdge { edge_id: String, node_id: String },

    #[error("Node '{node_id}' has an unsupported template: '{template}'")]
    UnknownNodeTemplate { node_id: String, template: String },

    #[error("Start node '{node_id}' must have exactly one successor, but has {count}")]
    InvalidStartFanOut { node_id: String, count: usize },

    #[error("Node '{node_id}' ({step}) must have exactly one successor, but has {count}")]
    InvalidSingleSuccessorFanOut {
        node_id: String,
        step: String,
        count: usize,
    },

    #[error("Parallel node '{0}' must have at least one successor")]
    InvalidParallelFanOut(String),

    #[error("One-of node '{0}' must have at least one successor")]
    InvalidOneOfFanOut(String),

    #[error("Condition node '{node_id}' has an invalid branch: {message}")]
    InvalidConditionBranch { node_id: String, message: String },

    #[error("Only one start node is allowed, found another at '{0}'")]
    MultipleStartNodes(String),

    #[error("'author' is improperly defined: {0}")]
    InvalidAuthor(String),

    #[error("'{key}' is improperly defined: {reason}")]
    MalformedProperty { key: String, reason: String },

    #[error("Subproperty '{subproperty}' was not defined on '{key}'")]
    MissingSubproperty { key: String, subproperty: String },

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("Failed to serialize document: {0}")]
    Serialization(String),
}

/// Errors raised by the property extractor for shapes it cannot flatten.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    #[error("Basic dictionaries cannot contain dictionaries (found one at '{key}')")]
    NestedDictionaryNotAllowed { key: String },

    #[error("Basic lists cannot contain {kind} elements (found one in '{key}')")]
    UnsupportedNestedListElement { key: String, kind: String },
}

/// Errors that can occur when converting a custom diagram format into a `DiagramGraph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphConversionError {
    #[error("Failed to parse diagram JSON: {0}")]
    Json(String),

    #[error("Node id '{0}' is declared more than once")]
    DuplicateNode(String),

    #[error("Edge id '{0}' is declared more than once")]
    DuplicateEdge(String),

    #[error("Encountered an empty {0} id")]
    EmptyId(&'static str),
}
