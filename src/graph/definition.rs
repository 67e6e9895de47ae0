use super::property::Property;
use itertools::Itertools;

/// The semantic graph of a diagram, ready for publishing.
/// This is the target structure for any custom diagram model conversion.
#[derive(Debug, Default)]
pub struct DiagramGraph {
    /// The node that represents the diagram page itself.
    pub page_id: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A single diagram object (action, condition, operator, marker, ...).
#[derive(Debug)]
pub struct GraphNode {
    pub id: String,
    pub template_id: String,
    /// The root dictionary of the object's properties.
    pub properties: Box<dyn Property>,
}

/// A directed link between diagram objects.
#[derive(Debug, Clone, Default)]
pub struct GraphEdge {
    pub id: String,
    pub prev: Vec<String>,
    pub next: Vec<String>,
    /// Anchors the edge leaves from, in the order they were used.
    pub anchors: Vec<String>,
}

impl GraphNode {
    pub fn new(
        id: impl Into<String>,
        template_id: impl Into<String>,
        properties: impl Property + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            template_id: template_id.into(),
            properties: Box::new(properties),
        }
    }
}

impl GraphEdge {
    pub fn new(id: impl Into<String>, prev: &str, next: &str, anchor: &str) -> Self {
        Self {
            id: id.into(),
            prev: vec![prev.to_string()],
            next: vec![next.to_string()],
            anchors: vec![anchor.to_string()],
        }
    }

    /// Returns `(prev, next)` when the edge connects exactly one node to exactly one node.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        let prev = self.prev.iter().exactly_one().ok()?;
        let next = self.next.iter().exactly_one().ok()?;
        Some((prev.as_str(), next.as_str()))
    }

    /// The anchor the edge was drawn from, if any.
    pub fn via(&self) -> Option<&str> {
        self.anchors.first().map(String::as_str)
    }
}

impl DiagramGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The ids of every node with an edge leading into `node_id`.
    pub fn predecessors<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.next.iter().any(|n| n == node_id))
            .flat_map(|e| e.prev.iter().map(String::as_str))
            .unique()
    }
}
