//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without persistence concerns.
//!
//! # Entity Types
//!
//! - [`Link`] - A short-code-to-URL mapping with a visit counter
//! - [`VisitRecord`] - One immutable observation of a redirect
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewLink`, `NewVisit` - For creating new records
//! - `LinkPatch` - For partial updates

pub mod link;
pub mod visit;

pub use link::{Link, LinkPatch, NewLink};
pub use visit::{NewVisit, RecordedVisit, VisitRecord, VisitSample};
