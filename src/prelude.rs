//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowpub crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowpub::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/diagram.json")?;
//! let graph = DiagramDocument::from_json(&json)?.into_graph()?;
//!
//! let playbook = Publisher::builder(PublishFormat::Cacao)
//!     .build_cacao()
//!     .publish_playbook(&graph)?;
//! println!("Workflow has {} steps", playbook.workflow.len());
//! # Ok(())
//! # }
//! ```

// Publishing
pub use crate::publisher::{DiagramPublisher, PublishFormat, Publisher, PublisherBuilder};

// Output models
pub use crate::cacao::{CacaoPublisher, Playbook, StepKind, Workflow, WorkflowStep};
pub use crate::stix::{Bundle, Sdo, Sro, StixKind, StixObject, StixPublisher};

// Input models
pub use crate::graph::{
    DiagramDocument, DiagramGraph, GraphEdge, GraphNode, IntoGraph, Property, PropertyKind,
    PropertyMap, PropertyValue,
};

// Identifiers and time
pub use crate::identity::{Clock, FixedClock, IdGenerator, RandomIds, SequentialIds, SystemClock};

// Error types
pub use crate::error::{GraphConversionError, PropertyError, PublishError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
