use super::sdo::{Sdo, SdoFactory, Sro, StixKind};
use crate::embed::{EmbedSlot, slot_for};

pub const DEFAULT_RELATIONSHIP: &str = "related-to";

/// A child reference awaiting embedding, captured from the adjacency list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRef {
    pub kind: StixKind,
    pub id: String,
    /// The anchor on the parent the link leaves from.
    pub via: Option<String>,
}

impl ChildRef {
    pub fn of(child: &Sdo, via: Option<&str>) -> Self {
        Self {
            kind: child.kind().clone(),
            id: child.id().to_string(),
            via: via.map(str::to_string),
        }
    }
}

/// Embeds a reference to each child in `parent`.
///
/// Every child either lands in a reference field of the parent or comes back
/// as a relationship object; nothing is dropped.
pub fn resolve(parent: &mut Sdo, children: &[ChildRef], factory: &SdoFactory<'_>) -> Vec<Sro> {
    let mut relationships = Vec::new();
    for child in children {
        let embedded = match slot_for(parent.kind(), &child.kind, child.via.as_deref()) {
            EmbedSlot::Single(field) => parent.set_ref_once(field, &child.id),
            EmbedSlot::List(field) => {
                parent.push_ref(field, &child.id);
                true
            }
            EmbedSlot::Relationship => false,
        };
        if !embedded {
            tracing::debug!(parent = parent.id(), child = %child.id, "Reference cannot be embedded, creating relationship");
            relationships.push(factory.create_sro(parent.id(), &child.id, DEFAULT_RELATIONSHIP));
        }
    }
    relationships
}
