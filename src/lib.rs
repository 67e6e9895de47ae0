//! # Flowpub - Attack Flow Diagram Publisher
//!
//! **Flowpub** exports the semantic graph of an attack-flow diagram into two
//! independent interchange formats: a STIX 2.1 bundle using the Attack Flow
//! extension, and a CACAO/Ermack response playbook.
//!
//! ## Core Workflow
//!
//! The publishers are editor-agnostic. They operate on a canonical model of a
//! diagram graph and read node properties only through the [`Property`]
//! capability trait. The primary workflow is:
//!
//! 1.  **Load Your Diagram**: Parse your diagram format into your own Rust structs,
//!     or use the bundled [`DiagramDocument`] JSON model.
//! 2.  **Convert to a Graph**: Implement [`IntoGraph`] to translate your structs into a [`DiagramGraph`].
//! 3.  **Configure**: Use `Publisher::builder` to pick a format and adjust template mappings,
//!     identifier generation or the clock.
//! 4.  **Publish**: Call `publish` to receive the pretty-printed JSON document, or use the
//!     typed `publish_bundle` / `publish_playbook` methods to inspect the result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowpub::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = std::fs::read_to_string("diagram.json")?;
//!     let graph = DiagramDocument::from_json(&json)?.into_graph()?;
//!
//!     let publisher = Publisher::builder(PublishFormat::Stix)
//!         .with_template_mapping("response_action", "course-of-action")
//!         .build();
//!
//!     println!("{}", publisher.publish(&graph)?);
//!     Ok(())
//! }
//! ```
//!
//! Every export is a pure function of its input graph, apart from the
//! identifiers and timestamps drawn from the configured [`IdGenerator`] and
//! [`Clock`]. Any failure aborts the export; no partial document is returned.
//!
//! [`Property`]: graph::Property
//! [`DiagramDocument`]: graph::DiagramDocument
//! [`IntoGraph`]: graph::IntoGraph
//! [`DiagramGraph`]: graph::DiagramGraph
//! [`IdGenerator`]: identity::IdGenerator
//! [`Clock`]: identity::Clock

pub mod cacao;
pub mod embed;
pub mod error;
pub mod graph;
pub mod identity;
pub mod prelude;
pub mod publisher;
pub mod stix;
