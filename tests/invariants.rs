//! Property-based tests over generated diagram chains.
mod common;
use common::*;
use flowpub::prelude::*;
use proptest::prelude::*;
use regex::Regex;
use serde_json::Value;

const STIX_TEMPLATES: [&str; 8] = [
    "action",
    "asset",
    "condition",
    "or",
    "and",
    "note",
    "process",
    "infrastructure",
];
const ANCHORS: [&str; 3] = ["true_anchor", "false_anchor", "bottom_anchor"];
const CACAO_TEMPLATES: [&str; 5] = ["response_action", "and", "or", "parallel", "one-of"];

fn id_pattern() -> Regex {
    Regex::new(r"^[a-z-]+--[0-9a-f-]{36}$").unwrap()
}

/// How many times `id` is referenced from the fields of `sdo`.
fn embedded_count(sdo: &Sdo, id: &str) -> usize {
    sdo.fields()
        .values()
        .map(|value| match value {
            Value::String(s) => usize::from(s == id),
            Value::Array(items) => items.iter().filter(|v| v.as_str() == Some(id)).count(),
            _ => 0,
        })
        .sum()
}

/// A chain `1 -> 2 -> ... -> n` over the given templates and anchors.
fn stix_chain(steps: &[(usize, usize)], with_fan: bool) -> DiagramGraph {
    let nodes = steps
        .iter()
        .enumerate()
        .map(|(i, (template, _))| bare(i as u64 + 1, STIX_TEMPLATES[*template]))
        .collect();
    let mut edges: Vec<GraphEdge> = steps
        .windows(2)
        .enumerate()
        .map(|(i, pair)| anchored(i as u64 + 1, i as u64 + 2, ANCHORS[pair[0].1]))
        .collect();
    if with_fan && steps.len() > 2 {
        edges.push(GraphEdge {
            id: "fan".to_string(),
            prev: vec![node_id(1)],
            next: vec![node_id(2), node_id(3)],
            anchors: vec!["bottom_anchor".to_string()],
        });
    }
    graph(nodes, edges)
}

proptest! {
    #[test]
    fn test_stix_chain_invariants(
        steps in prop::collection::vec((0..STIX_TEMPLATES.len(), 0..ANCHORS.len()), 0..12),
        with_fan in any::<bool>(),
    ) {
        let graph = stix_chain(&steps, with_fan);
        let bundle = stix().publish_bundle(&graph).unwrap();
        let pattern = id_pattern();

        // Coverage: one SDO per non-page node, after the four envelope objects.
        let sdos: Vec<&Sdo> = bundle.objects.iter().skip(4).filter_map(StixObject::as_sdo).collect();
        prop_assert_eq!(sdos.len(), steps.len());

        // Id format
        prop_assert!(pattern.is_match(&bundle.id));
        for object in &bundle.objects {
            prop_assert!(pattern.is_match(object.id()), "bad id {}", object.id());
        }

        // No duplication: each chain link is either embedded once or becomes one relationship.
        for pair in sdos.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            let relationships = bundle
                .relationships()
                .filter(|r| r.source_ref == parent.id() && r.target_ref == child.id())
                .count();
            prop_assert_eq!(embedded_count(parent, child.id()) + relationships, 1);
        }
        prop_assert!(bundle.relationships().count() < steps.len().max(1));
    }

    #[test]
    fn test_cacao_chain_invariants(
        middle in prop::collection::vec(0..CACAO_TEMPLATES.len(), 0..10),
    ) {
        let mut nodes = vec![bare(1, "start")];
        nodes.extend(
            middle
                .iter()
                .enumerate()
                .map(|(i, t)| bare(i as u64 + 2, CACAO_TEMPLATES[*t])),
        );
        let last = middle.len() as u64 + 2;
        nodes.push(bare(last, "end"));
        let edges = (1..last).map(|i| edge(i, i + 1)).collect();

        let playbook = cacao().publish_playbook(&graph(nodes, edges)).unwrap();
        let pattern = id_pattern();

        // Coverage
        prop_assert_eq!(playbook.workflow.len(), middle.len() + 2);

        // Id format
        prop_assert!(pattern.is_match(&playbook.id));
        let ids: Vec<&str> = playbook.workflow.iter().map(|(id, _)| id).collect();
        for id in &ids {
            prop_assert!(pattern.is_match(id), "bad id {}", id);
        }

        // Every link becomes exactly one control link.
        prop_assert_eq!(playbook.workflow_start.as_str(), ids[0]);
        for (i, (_, step)) in playbook.workflow.iter().enumerate() {
            let expected: Vec<&str> = ids.get(i + 1).copied().into_iter().collect();
            prop_assert_eq!(step.successors(), expected);
        }
    }
}
