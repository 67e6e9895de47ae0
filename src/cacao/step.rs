use serde::Serialize;
use serde_json::{Map, Value};

/// The kinds of workflow steps a diagram node can become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Start,
    End,
    Action,
    Parallel,
    OneOf,
    And,
    Or,
    Condition,
}

impl StepKind {
    /// Resolves a diagram template. There is no fallback: unknown templates yield `None`.
    pub fn from_template(template: &str) -> Option<Self> {
        match template {
            "start" => Some(StepKind::Start),
            "end" => Some(StepKind::End),
            "response_action" => Some(StepKind::Action),
            "parallel" => Some(StepKind::Parallel),
            "one-of" => Some(StepKind::OneOf),
            "and" => Some(StepKind::And),
            "or" => Some(StepKind::Or),
            "condition" => Some(StepKind::Condition),
            _ => None,
        }
    }

    /// Prefix of the step's `<prefix>--<uuid>` id.
    pub fn id_prefix(self) -> &'static str {
        match self {
            StepKind::OneOf => "one-of",
            other => other.type_name(),
        }
    }

    /// Value of the step's `type` field.
    pub fn type_name(self) -> &'static str {
        match self {
            StepKind::Start => "start",
            StepKind::End => "end",
            StepKind::Action => "action",
            StepKind::Parallel => "parallel",
            StepKind::OneOf => "one_of",
            StepKind::And => "and",
            StepKind::Or => "or",
            StepKind::Condition => "condition",
        }
    }
}

/// One step of a playbook workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowStep {
    Start {
        #[serde(skip_serializing_if = "Option::is_none")]
        on_completion: Option<String>,
    },
    End {},
    Action(ActionStep),
    Parallel {
        next_steps: Vec<String>,
    },
    OneOf {
        united_steps: Vec<String>,
    },
    And {
        #[serde(skip_serializing_if = "Option::is_none")]
        on_completion: Option<String>,
    },
    Or {
        #[serde(skip_serializing_if = "Option::is_none")]
        on_completion: Option<String>,
    },
    /// Unfilled branches are empty strings.
    Condition { on_true: String, on_false: String },
}

/// An Ermack response action: default descriptive fields overlaid with the node's properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionStep {
    #[serde(flatten)]
    pub body: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_completion: Option<String>,
}

impl WorkflowStep {
    /// An empty step of the given kind, with no links.
    pub fn empty(kind: StepKind) -> Self {
        match kind {
            StepKind::Start => WorkflowStep::Start {
                on_completion: None,
            },
            StepKind::End => WorkflowStep::End {},
            StepKind::Action => WorkflowStep::Action(ActionStep {
                body: Map::new(),
                on_completion: None,
            }),
            StepKind::Parallel => WorkflowStep::Parallel {
                next_steps: Vec::new(),
            },
            StepKind::OneOf => WorkflowStep::OneOf {
                united_steps: Vec::new(),
            },
            StepKind::And => WorkflowStep::And {
                on_completion: None,
            },
            StepKind::Or => WorkflowStep::Or {
                on_completion: None,
            },
            StepKind::Condition => WorkflowStep::Condition {
                on_true: String::new(),
                on_false: String::new(),
            },
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            WorkflowStep::Start { .. } => StepKind::Start,
            WorkflowStep::End {} => StepKind::End,
            WorkflowStep::Action(_) => StepKind::Action,
            WorkflowStep::Parallel { .. } => StepKind::Parallel,
            WorkflowStep::OneOf { .. } => StepKind::OneOf,
            WorkflowStep::And { .. } => StepKind::And,
            WorkflowStep::Or { .. } => StepKind::Or,
            WorkflowStep::Condition { .. } => StepKind::Condition,
        }
    }

    /// The single successor of a start, action, and or or step.
    pub fn on_completion(&self) -> Option<&str> {
        match self {
            WorkflowStep::Start { on_completion }
            | WorkflowStep::And { on_completion }
            | WorkflowStep::Or { on_completion } => on_completion.as_deref(),
            WorkflowStep::Action(action) => action.on_completion.as_deref(),
            _ => None,
        }
    }

    /// Every step id this step hands control to.
    pub fn successors(&self) -> Vec<&str> {
        match self {
            WorkflowStep::Parallel { next_steps: steps }
            | WorkflowStep::OneOf {
                united_steps: steps,
            } => steps.iter().map(String::as_str).collect(),
            WorkflowStep::Condition { on_true, on_false } => [on_true, on_false]
                .into_iter()
                .filter(|branch| !branch.is_empty())
                .map(String::as_str)
                .collect(),
            other => other.on_completion().into_iter().collect(),
        }
    }
}
