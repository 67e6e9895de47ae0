use super::conversion::IntoGraph;
use super::definition::{DiagramGraph, GraphEdge, GraphNode};
use super::property::{PropertyMap, PropertyValue};
use crate::error::GraphConversionError;
use ahash::AHashSet;
use serde::Deserialize;

/// Diagram object as it appears in a serialized diagram document
#[derive(Debug, Deserialize)]
pub struct DocumentNode {
    pub id: String,
    #[serde(alias = "templateId")]
    pub template: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

/// Diagram link as it appears in a serialized diagram document
#[derive(Debug, Deserialize)]
pub struct DocumentEdge {
    pub id: String,
    #[serde(alias = "prevNodeIds")]
    pub prev: Vec<String>,
    #[serde(alias = "nextNodeIds")]
    pub next: Vec<String>,
    #[serde(default, alias = "anchorsUsed")]
    pub anchors: Vec<String>,
}

/// Complete serialized diagram, as saved by the editor's semantic analyzer
#[derive(Debug, Deserialize)]
pub struct DiagramDocument {
    #[serde(alias = "pageId")]
    pub page: String,
    pub nodes: Vec<DocumentNode>,
    #[serde(default)]
    pub edges: Vec<DocumentEdge>,
}

impl DiagramDocument {
    pub fn from_json(json: &str) -> Result<Self, GraphConversionError> {
        serde_json::from_str(json).map_err(|e| GraphConversionError::Json(e.to_string()))
    }
}

impl IntoGraph for DiagramDocument {
    fn into_graph(self) -> Result<DiagramGraph, GraphConversionError> {
        if self.page.is_empty() {
            return Err(GraphConversionError::EmptyId("page"));
        }

        let mut seen = AHashSet::new();
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                if node.id.is_empty() {
                    return Err(GraphConversionError::EmptyId("node"));
                }
                if !seen.insert(node.id.clone()) {
                    return Err(GraphConversionError::DuplicateNode(node.id));
                }
                Ok(GraphNode::new(
                    node.id,
                    node.template,
                    PropertyValue::Dictionary(node.properties),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = AHashSet::new();
        let edges = self
            .edges
            .into_iter()
            .map(|edge| {
                if edge.id.is_empty() {
                    return Err(GraphConversionError::EmptyId("edge"));
                }
                if !seen.insert(edge.id.clone()) {
                    return Err(GraphConversionError::DuplicateEdge(edge.id));
                }
                Ok(GraphEdge {
                    id: edge.id,
                    prev: edge.prev,
                    next: edge.next,
                    anchors: edge.anchors,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DiagramGraph {
            page_id: self.page,
            nodes,
            edges,
        })
    }
}
