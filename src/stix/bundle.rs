use super::extract::{extract_action, extract_author, extract_basic, extract_flow};
use super::resolve::{ChildRef, resolve};
use super::sdo::{Bundle, Sdo, SdoFactory, StixKind, StixObject, TypeMap};
use crate::error::PublishError;
use crate::graph::{DiagramGraph, GraphNode};
use crate::identity::ExportContext;
use crate::publisher::adjacency::build_adjacency;
use crate::publisher::{DiagramPublisher, split_page, to_pretty_json};
use ahash::{AHashMap, AHashSet};
use serde_json::Value;

/// Templates whose nodes can start an attack flow.
const FLOW_ROOT_TEMPLATES: [&str; 2] = ["action", "condition"];

/// Publishes diagram graphs as STIX 2.1 bundles.
pub struct StixPublisher {
    ctx: ExportContext,
    types: TypeMap,
    rejected: AHashSet<String>,
}

impl StixPublisher {
    pub fn new(ctx: ExportContext, types: TypeMap, rejected: AHashSet<String>) -> Self {
        Self {
            ctx,
            types,
            rejected,
        }
    }

    /// Builds the bundle for `graph`.
    ///
    /// Objects are ordered: extension, extension author, flow, flow author,
    /// one object per remaining node in graph order, then relationships.
    pub fn publish_bundle(&self, graph: &DiagramGraph) -> Result<Bundle, PublishError> {
        let factory = SdoFactory::new(&self.ctx, &self.types);
        let (page, nodes, index) = split_page(graph)?;
        tracing::info!(page = %page.id, nodes = nodes.len(), edges = graph.edges.len(), "Publishing STIX bundle");

        let extension_author = factory.extension_author();
        let extension = factory.extension(extension_author.id());

        let mut author = factory.create_sdo("identity", None);
        author.merge(extract_author(page.properties.as_ref())?);

        let mut flow = factory.create_sdo(&page.template_id, Some(page.id.as_str()));
        flow.set("created_by_ref", Value::String(author.id().to_string()));
        flow.set("start_refs", Value::Array(Vec::new()));
        flow.merge(extract_flow(page.properties.as_ref())?);

        let mut sdos = nodes
            .iter()
            .map(|node| self.to_stix_node(&factory, node))
            .collect::<Result<Vec<_>, _>>()?;

        let adjacency = build_adjacency(graph, &index, nodes.len())?;
        let mut relationships = Vec::new();
        for (parent, links) in adjacency.iter().enumerate() {
            let children: Vec<ChildRef> = links
                .iter()
                .map(|link| ChildRef::of(&sdos[link.child], link.via.as_deref()))
                .collect();
            relationships.extend(resolve(&mut sdos[parent], &children, &factory));
        }

        let start_refs = flow_roots(graph, &nodes, &index)
            .map(|i| Value::String(sdos[i].id().to_string()))
            .collect();
        flow.set("start_refs", Value::Array(start_refs));

        let mut objects = Vec::with_capacity(4 + sdos.len() + relationships.len());
        objects.extend(
            [extension, extension_author, flow, author]
                .into_iter()
                .map(StixObject::Domain),
        );
        objects.extend(sdos.into_iter().map(StixObject::Domain));
        objects.extend(relationships.into_iter().map(StixObject::Relationship));

        tracing::info!(objects = objects.len(), "STIX bundle assembled");
        Ok(factory.create_bundle(objects))
    }

    fn to_stix_node(&self, factory: &SdoFactory<'_>, node: &GraphNode) -> Result<Sdo, PublishError> {
        if self.rejected.contains(&node.template_id) {
            return Err(PublishError::UnknownNodeTemplate {
                node_id: node.id.clone(),
                template: node.template_id.clone(),
            });
        }

        let mut sdo = factory.create_sdo(&node.template_id, Some(node.id.as_str()));
        let fields = match sdo.kind() {
            StixKind::Action => extract_action(node.properties.as_ref())?,
            _ => extract_basic(node.properties.as_ref())?,
        };
        sdo.merge(fields);
        Ok(sdo)
    }
}

impl DiagramPublisher for StixPublisher {
    fn publish(&self, graph: &DiagramGraph) -> Result<String, PublishError> {
        to_pretty_json(&self.publish_bundle(graph)?)
    }
}

/// Positions of nodes that start the flow: actions and conditions that no
/// action or condition leads into.
fn flow_roots<'a>(
    graph: &'a DiagramGraph,
    nodes: &'a [&'a GraphNode],
    index: &'a AHashMap<&'a str, usize>,
) -> impl Iterator<Item = usize> + 'a {
    let is_root_template = |template: &str| FLOW_ROOT_TEMPLATES.contains(&template);

    nodes
        .iter()
        .enumerate()
        .filter(move |(_, node)| is_root_template(node.template_id.as_str()))
        .filter(move |(_, node)| {
            !graph
                .predecessors(node.id.as_str())
                .filter_map(|id| index.get(id))
                .any(|&i| is_root_template(nodes[i].template_id.as_str()))
        })
        .map(|(i, _)| i)
}
