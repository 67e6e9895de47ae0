use crate::cacao::CacaoPublisher;
use crate::error::PublishError;
use crate::graph::{DiagramGraph, GraphNode};
use crate::identity::{Clock, ExportContext, IdGenerator, RandomIds, SystemClock};
use crate::stix::{StixPublisher, TypeMap};
use ahash::{AHashMap, AHashSet};
use std::sync::Arc;

pub(crate) mod adjacency;

/// Templates the STIX exporter refuses by default: control-flow markers with no STIX counterpart.
pub const DEFAULT_STIX_REJECTED_TEMPLATES: [&str; 4] = ["start", "end", "parallel", "one-of"];

/// A publisher that turns a diagram graph into a serialized interchange document.
pub trait DiagramPublisher: Send + Sync {
    /// Publishes the graph as a pretty-printed JSON document.
    fn publish(&self, graph: &DiagramGraph) -> Result<String, PublishError>;
}

/// The available interchange formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishFormat {
    /// A STIX 2.1 bundle using the Attack Flow extension.
    Stix,
    /// A CACAO/Ermack playbook.
    Cacao,
}

/// Entry point for configuring publishers.
pub struct Publisher;

impl Publisher {
    pub fn builder(format: PublishFormat) -> PublisherBuilder {
        PublisherBuilder::new(format)
    }
}

pub struct PublisherBuilder {
    format: PublishFormat,
    types: TypeMap,
    rejected: AHashSet<String>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl PublisherBuilder {
    pub fn new(format: PublishFormat) -> Self {
        Self {
            format,
            types: TypeMap::default(),
            rejected: DEFAULT_STIX_REJECTED_TEMPLATES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            ids: Arc::new(RandomIds),
            clock: Arc::new(SystemClock),
        }
    }

    /// Maps a diagram template onto a STIX object type.
    pub fn with_template_mapping(mut self, template: &str, stix_type: &str) -> Self {
        self.types.insert(template, stix_type);
        self
    }

    /// Makes the STIX exporter fail on nodes built from `template`.
    pub fn with_rejected_template(mut self, template: &str) -> Self {
        self.rejected.insert(template.to_string());
        self
    }

    /// Lets the STIX exporter accept nodes built from `template` again.
    pub fn with_accepted_template(mut self, template: &str) -> Self {
        self.rejected.remove(template);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn context(&self) -> ExportContext {
        ExportContext::new(self.ids.clone(), self.clock.clone())
    }

    pub fn build_stix(self) -> StixPublisher {
        StixPublisher::new(self.context(), self.types, self.rejected)
    }

    pub fn build_cacao(self) -> CacaoPublisher {
        CacaoPublisher::new(self.context())
    }

    pub fn build(self) -> Box<dyn DiagramPublisher> {
        match self.format {
            PublishFormat::Stix => Box::new(self.build_stix()),
            PublishFormat::Cacao => Box::new(self.build_cacao()),
        }
    }
}

/// Splits the page node off the graph and indexes the remaining nodes by id.
pub(crate) fn split_page(
    graph: &DiagramGraph,
) -> Result<(&GraphNode, Vec<&GraphNode>, AHashMap<&str, usize>), PublishError> {
    let page = graph
        .node(&graph.page_id)
        .ok_or_else(|| PublishError::MissingPageNode(graph.page_id.clone()))?;

    let nodes: Vec<&GraphNode> = graph
        .nodes
        .iter()
        .filter(|n| n.id != graph.page_id)
        .collect();
    let index = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    Ok((page, nodes, index))
}

pub(crate) fn to_pretty_json<T: serde::Serialize>(document: &T) -> Result<String, PublishError> {
    serde_json::to_string_pretty(document).map_err(|e| PublishError::Serialization(e.to_string()))
}
