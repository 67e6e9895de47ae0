//! STIX 2.1 export using the Attack Flow extension.

pub mod bundle;
pub mod extract;
pub mod resolve;
pub mod sdo;

pub use bundle::StixPublisher;
pub use resolve::{ChildRef, DEFAULT_RELATIONSHIP, resolve};
pub use sdo::*;
