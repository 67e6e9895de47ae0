use super::step::{ActionStep, StepKind, WorkflowStep};
use crate::embed::Branch;
use crate::error::PublishError;
use crate::graph::{DiagramGraph, GraphNode};
use crate::identity::ExportContext;
use crate::publisher::adjacency::build_adjacency;
use crate::publisher::{DiagramPublisher, split_page, to_pretty_json};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

pub const ERMACK_SPEC_VERSION: &str = "ermack-1.0";

/// Action fields the node's properties may not overwrite.
const PROTECTED_ACTION_FIELDS: [&str; 2] = ["type", "on_completion"];

/// The root playbook document.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Playbook {
    #[serde(rename = "type")]
    pub kind: String,
    pub spec_version: String,
    pub id: String,
    pub created: String,
    pub modified: String,
    pub created_by: String,
    pub workflow_start: String,
    pub workflow: Workflow,
}

/// Workflow steps keyed by step id, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workflow(Vec<(String, WorkflowStep)>);

impl Workflow {
    pub fn get(&self, id: &str) -> Option<&WorkflowStep> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, step)| step)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WorkflowStep)> {
        self.0.iter().map(|(id, step)| (id.as_str(), step))
    }

    /// Ids of every step of the given kind.
    pub fn ids_of(&self, kind: StepKind) -> Vec<&str> {
        self.iter()
            .filter(|(_, step)| step.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Workflow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, step) in &self.0 {
            map.serialize_entry(id, step)?;
        }
        map.end()
    }
}

/// Publishes diagram graphs as CACAO/Ermack playbooks.
pub struct CacaoPublisher {
    ctx: ExportContext,
}

impl CacaoPublisher {
    pub fn new(ctx: ExportContext) -> Self {
        Self { ctx }
    }

    /// Builds the playbook for `graph`.
    pub fn publish_playbook(&self, graph: &DiagramGraph) -> Result<Playbook, PublishError> {
        let (page, nodes, index) = split_page(graph)?;
        tracing::info!(page = %page.id, nodes = nodes.len(), edges = graph.edges.len(), "Publishing CACAO playbook");

        let mut playbook = self.create_stub(page);
        if nodes.is_empty() {
            return Ok(playbook);
        }

        let mut steps = Vec::with_capacity(nodes.len());
        let mut has_start = false;
        for node in &nodes {
            let step = self.create_step(node)?;
            if step.kind() == StepKind::Start {
                if has_start {
                    return Err(PublishError::MultipleStartNodes(node.id.clone()));
                }
                has_start = true;
            }
            steps.push((self.ctx.typed_id(step.kind().id_prefix()), step));
        }

        let adjacency = build_adjacency(graph, &index, nodes.len())?;
        for (parent, links) in adjacency.iter().enumerate() {
            let children: Vec<(String, Option<&str>)> = links
                .iter()
                .map(|link| (steps[link.child].0.clone(), link.via.as_deref()))
                .collect();
            link_step(&nodes[parent].id, &mut steps[parent].1, &children)?;
        }

        if let Some((id, step)) = steps.iter().find(|(_, s)| s.kind() == StepKind::Start) {
            tracing::debug!(start = %id, first = ?step.on_completion(), "Workflow entry point resolved");
            playbook.workflow_start = id.clone();
        }
        playbook.workflow = Workflow(steps);

        tracing::info!(steps = playbook.workflow.len(), "CACAO playbook assembled");
        Ok(playbook)
    }

    fn create_stub(&self, page: &GraphNode) -> Playbook {
        let now = self.ctx.now();
        let created_by = page
            .properties
            .get("author")
            .and_then(|author| author.get("name"))
            .filter(|name| name.is_defined())
            .and_then(|name| name.to_raw_value().as_str().map(str::to_string))
            .unwrap_or_default();

        Playbook {
            kind: "playbook".to_string(),
            spec_version: ERMACK_SPEC_VERSION.to_string(),
            id: self.ctx.typed_id("response"),
            created: now.clone(),
            modified: now,
            created_by,
            workflow_start: String::new(),
            workflow: Workflow::default(),
        }
    }

    fn create_step(&self, node: &GraphNode) -> Result<WorkflowStep, PublishError> {
        let kind = StepKind::from_template(&node.template_id).ok_or_else(|| {
            PublishError::UnknownNodeTemplate {
                node_id: node.id.clone(),
                template: node.template_id.clone(),
            }
        })?;

        Ok(match kind {
            StepKind::Action => WorkflowStep::Action(ActionStep {
                body: self.action_body(node),
                on_completion: None,
            }),
            other => WorkflowStep::empty(other),
        })
    }

    fn action_body(&self, node: &GraphNode) -> Map<String, Value> {
        let now = self.ctx.now();
        let mut body = Map::new();
        body.insert("author".into(), Value::String(String::new()));
        body.insert("created".into(), Value::String(now.clone()));
        body.insert("modified".into(), Value::String(now));
        for key in ["description", "extended_description", "id", "stage", "title"] {
            body.insert(key.to_string(), Value::String(String::new()));
        }

        for (key, prop) in node.properties.entries() {
            if PROTECTED_ACTION_FIELDS.contains(&key) {
                tracing::warn!(node = %node.id, field = key, "Ignoring property that would overwrite a workflow field");
                continue;
            }
            if prop.is_defined() {
                body.insert(key.to_string(), prop.to_raw_value());
            }
        }
        body
    }
}

impl DiagramPublisher for CacaoPublisher {
    fn publish(&self, graph: &DiagramGraph) -> Result<String, PublishError> {
        to_pretty_json(&self.publish_playbook(graph)?)
    }
}

/// Wires a step to the ids of its children.
fn link_step(
    node_id: &str,
    step: &mut WorkflowStep,
    children: &[(String, Option<&str>)],
) -> Result<(), PublishError> {
    let kind = step.kind();
    match step {
        WorkflowStep::Start { on_completion } => {
            let [(child, _)] = children else {
                return Err(PublishError::InvalidStartFanOut {
                    node_id: node_id.to_string(),
                    count: children.len(),
                });
            };
            *on_completion = Some(child.clone());
        }
        WorkflowStep::Action(ActionStep { on_completion, .. })
        | WorkflowStep::And { on_completion }
        | WorkflowStep::Or { on_completion } => {
            let [(child, _)] = children else {
                return Err(PublishError::InvalidSingleSuccessorFanOut {
                    node_id: node_id.to_string(),
                    step: kind.type_name().to_string(),
                    count: children.len(),
                });
            };
            *on_completion = Some(child.clone());
        }
        WorkflowStep::Parallel { next_steps } => {
            if children.is_empty() {
                return Err(PublishError::InvalidParallelFanOut(node_id.to_string()));
            }
            next_steps.extend(children.iter().map(|(child, _)| child.clone()));
        }
        WorkflowStep::OneOf { united_steps } => {
            if children.is_empty() {
                return Err(PublishError::InvalidOneOfFanOut(node_id.to_string()));
            }
            united_steps.extend(children.iter().map(|(child, _)| child.clone()));
        }
        WorkflowStep::Condition { on_true, on_false } => {
            for (child, via) in children {
                let slot = match Branch::from_anchor(*via) {
                    Some(Branch::True) => &mut *on_true,
                    Some(Branch::False) => &mut *on_false,
                    None => {
                        return Err(PublishError::InvalidConditionBranch {
                            node_id: node_id.to_string(),
                            message: format!("link leaves from unknown anchor {:?}", via),
                        });
                    }
                };
                if !slot.is_empty() {
                    return Err(PublishError::InvalidConditionBranch {
                        node_id: node_id.to_string(),
                        message: format!("more than one successor on {:?}", via),
                    });
                }
                *slot = child.clone();
            }
        }
        WorkflowStep::End {} => {
            if !children.is_empty() {
                tracing::debug!(node = node_id, "Ignoring successors of end step");
            }
        }
    }
    Ok(())
}
