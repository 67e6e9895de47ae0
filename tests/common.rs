//! Common test utilities for building diagram graphs and deterministic publishers.
use chrono::{TimeZone, Utc};
use flowpub::prelude::*;

/// Id of the page node every fixture graph carries.
#[allow(dead_code)]
pub const PAGE_ID: &str = "00000000-0000-4000-8000-000000000000";

/// The instant `fixed_clock` is frozen at, as the exporters format it.
#[allow(dead_code)]
pub const NOW: &str = "2024-05-01T12:00:00.000Z";

/// A uuid-shaped node id, unique per `n`.
///
/// The `ffff` marker keeps fixture ids out of the range `SequentialIds` draws from.
#[allow(dead_code)]
pub fn node_id(n: u64) -> String {
    format!("00000000-0000-4000-8000-ffff{:08x}", n)
}

#[allow(dead_code)]
pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
}

/// A builder with sequential ids and a frozen clock, so every run is reproducible.
#[allow(dead_code)]
pub fn builder(format: PublishFormat) -> PublisherBuilder {
    Publisher::builder(format)
        .with_id_generator(SequentialIds::new())
        .with_clock(fixed_clock())
}

#[allow(dead_code)]
pub fn stix() -> StixPublisher {
    builder(PublishFormat::Stix).build_stix()
}

#[allow(dead_code)]
pub fn cacao() -> CacaoPublisher {
    builder(PublishFormat::Cacao).build_cacao()
}

/// The page's properties: a named flow with an author, a scope and one external reference.
#[allow(dead_code)]
pub fn page_properties() -> PropertyMap {
    let author = PropertyMap::new()
        .with("name", PropertyValue::scalar("Jane Analyst"))
        .with(
            "identity_class",
            PropertyValue::choice(Some("Individual"), &["Individual", "Organization"]),
        )
        .with("contact_information", PropertyValue::unset());

    let reference = PropertyMap::new()
        .with("source_name", PropertyValue::scalar("Report"))
        .with("url", PropertyValue::scalar("https://example.org/report"));

    PropertyMap::new()
        .with("name", PropertyValue::scalar("Test Flow"))
        .with("description", PropertyValue::scalar("A flow used in tests"))
        .with("author", PropertyValue::Collection(author))
        .with(
            "scope",
            PropertyValue::choice(Some("Incident"), &["Incident", "Campaign"]),
        )
        .with(
            "external_references",
            PropertyValue::list(
                PropertyKind::Dictionary,
                vec![PropertyValue::Dictionary(reference)],
            ),
        )
}

#[allow(dead_code)]
pub fn page_node() -> GraphNode {
    GraphNode::new(PAGE_ID, "flow", PropertyValue::Dictionary(page_properties()))
}

#[allow(dead_code)]
pub fn node(n: u64, template: &str, properties: PropertyMap) -> GraphNode {
    GraphNode::new(node_id(n), template, PropertyValue::Dictionary(properties))
}

/// A node without properties.
#[allow(dead_code)]
pub fn bare(n: u64, template: &str) -> GraphNode {
    node(n, template, PropertyMap::new())
}

/// A STIX attack-action node with a name.
#[allow(dead_code)]
pub fn action(n: u64, name: &str) -> GraphNode {
    node(
        n,
        "action",
        PropertyMap::new().with("name", PropertyValue::scalar(name)),
    )
}

/// A CACAO response action node with a title.
#[allow(dead_code)]
pub fn response_action(n: u64, title: &str) -> GraphNode {
    node(
        n,
        "response_action",
        PropertyMap::new().with("title", PropertyValue::scalar(title)),
    )
}

/// A 1:1 edge leaving `from` through a plain anchor.
#[allow(dead_code)]
pub fn edge(from: u64, to: u64) -> GraphEdge {
    anchored(from, to, "bottom_anchor")
}

/// A 1:1 edge leaving `from` through `anchor`.
#[allow(dead_code)]
pub fn anchored(from: u64, to: u64, anchor: &str) -> GraphEdge {
    GraphEdge::new(
        format!("edge-{}-{}", from, to),
        &node_id(from),
        &node_id(to),
        anchor,
    )
}

/// Assembles a graph from the fixture page plus `nodes` and `edges`.
#[allow(dead_code)]
pub fn graph(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> DiagramGraph {
    let mut all = vec![page_node()];
    all.extend(nodes);
    DiagramGraph {
        page_id: PAGE_ID.to_string(),
        nodes: all,
        edges,
    }
}

/// The full STIX id of fixture node `n` published as `stix_type`.
#[allow(dead_code)]
pub fn stix_id(stix_type: &str, n: u64) -> String {
    format!("{}--{}", stix_type, node_id(n))
}

/// Looks up the SDO published for fixture node `n`.
#[allow(dead_code)]
pub fn sdo<'a>(bundle: &'a Bundle, stix_type: &str, n: u64) -> &'a Sdo {
    bundle
        .find(&stix_id(stix_type, n))
        .and_then(StixObject::as_sdo)
        .unwrap_or_else(|| panic!("no {} object for node {}", stix_type, n))
}
