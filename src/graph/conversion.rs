use super::definition::DiagramGraph;
use crate::error::GraphConversionError;

/// A trait for custom diagram models that can be converted into a `DiagramGraph`.
///
/// This is the extension point that keeps the publishers independent of any
/// particular editor. Implement it on your own diagram structs to translate
/// them into the graph the exporters consume.
///
/// # Example
///
/// ```rust,no_run
/// use flowpub::error::GraphConversionError;
/// use flowpub::graph::*;
///
/// struct MyShape { id: String, kind: String }
/// struct MyDiagram { page: String, shapes: Vec<MyShape> }
///
/// impl IntoGraph for MyDiagram {
///     fn into_graph(self) -> Result<DiagramGraph, GraphConversionError> {
///         let nodes = self
///             .shapes
///             .into_iter()
///             .map(|s| GraphNode::new(s.id, s.kind, PropertyValue::Dictionary(PropertyMap::new())))
///             .collect();
///         Ok(DiagramGraph { page_id: self.page, nodes, edges: vec![] })
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a publishable graph.
    fn into_graph(self) -> Result<DiagramGraph, GraphConversionError>;
}
