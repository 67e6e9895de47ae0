//! Embedding policy shared by both exporters.
//!
//! A link from a parent object to a child object is either written inline as
//! a reference field on the parent or has to be materialized separately (a
//! relationship object in STIX). Which one applies depends only on the parent
//! kind, the child kind and, for conditions, the anchor the link leaves from.

use crate::stix::StixKind;

pub const TRUE_ANCHOR: &str = "true_anchor";
pub const FALSE_ANCHOR: &str = "false_anchor";

/// The outcome branch of a condition a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    True,
    False,
}

impl Branch {
    pub fn from_anchor(anchor: Option<&str>) -> Option<Self> {
        match anchor {
            Some(TRUE_ANCHOR) => Some(Branch::True),
            Some(FALSE_ANCHOR) => Some(Branch::False),
            _ => None,
        }
    }
}

/// Where a child reference ends up on its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedSlot {
    /// A single reference field. Once taken, further children become relationships.
    Single(&'static str),
    /// An unbounded reference array.
    List(&'static str),
    /// The reference cannot be embedded.
    Relationship,
}

/// Looks up the embedding slot for a `parent -> child` link.
pub fn slot_for(parent: &StixKind, child: &StixKind, via: Option<&str>) -> EmbedSlot {
    use StixKind::*;

    match (parent, child) {
        (Action, Process) => EmbedSlot::Single("command_ref"),
        (Action, Asset) => EmbedSlot::List("asset_refs"),
        (Action | Operator, Action | Operator | Condition) => EmbedSlot::List("effect_refs"),
        (Asset, _) => EmbedSlot::Single("object_ref"),
        (Condition, Action | Operator | Condition) => match Branch::from_anchor(via) {
            Some(Branch::True) => EmbedSlot::List("on_true_refs"),
            Some(Branch::False) => EmbedSlot::List("on_false_refs"),
            None => EmbedSlot::Relationship,
        },
        (Note, _) => EmbedSlot::List("object_refs"),
        _ => EmbedSlot::Relationship,
    }
}
