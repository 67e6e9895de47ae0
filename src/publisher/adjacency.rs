use crate::error::PublishError;
use crate::graph::DiagramGraph;
use ahash::AHashMap;

/// A link from a parent to one of its children, by position in the node table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Link {
    pub child: usize,
    pub via: Option<String>,
}

/// Builds a parent -> children adjacency list from every edge that connects
/// exactly one node to exactly one node. Other edges are skipped.
pub(crate) fn build_adjacency(
    graph: &DiagramGraph,
    index: &AHashMap<&str, usize>,
    node_count: usize,
) -> Result<Vec<Vec<Link>>, PublishError> {
    let mut children: Vec<Vec<Link>> = vec![Vec::new(); node_count];

    for edge in &graph.edges {
        let Some((prev, next)) = edge.endpoints() else {
            tracing::debug!(
                edge = %edge.id,
                prev = edge.prev.len(),
                next = edge.next.len(),
                "Skipping edge that does not connect exactly two nodes"
            );
            continue;
        };

        let lookup = |node_id: &str| {
            index
                .get(node_id)
                .copied()
                .ok_or_else(|| PublishError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: node_id.to_string(),
                })
        };
        let parent = lookup(prev)?;
        let child = lookup(next)?;

        children[parent].push(Link {
            child,
            via: edge.via().map(str::to_string),
        });
    }

    Ok(children)
}
