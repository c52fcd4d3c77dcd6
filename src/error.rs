//! Error types for the table view engine.
//!
//! Lookups that find nothing are not errors; they return `None`. The types here
//! cover the two failure classes that must reach the caller: a template that
//! was never registered for a descriptor type, and a mutation the current
//! display mode cannot accept.

use thiserror::Error;

/// Failure to resolve a visual template.
///
/// This is a configuration error: the host declared a descriptor type whose
/// template was never made available to the loader. It is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// No blueprint exists for the requested template/origin pair.
    #[error("template not found: {template} (origin: {})", origin.as_deref().unwrap_or("default"))]
    NotFound {
        /// Template (reuse) key that was requested.
        template: String,
        /// Origin namespace the template was looked up in.
        origin: Option<String>,
    },
}

/// Errors returned by [`ListController`](crate::tableview::ListController) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Incremental mutations are only defined for the flat display mode.
    #[error("incremental mutations require flat mode")]
    NotFlat,

    /// An insert position past the end of the row list.
    #[error("insert position {position} out of range for {len} rows")]
    PositionOutOfRange {
        /// Requested insert position.
        position: usize,
        /// Row count at the time of the request.
        len: usize,
    },

    /// A template could not be resolved while rendering.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
