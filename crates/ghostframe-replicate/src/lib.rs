//! Replicate upstream client and output normalization for ghostframe.
//!
//! The service itself is a thin relay; the only logic with real edge-case
//! reasoning lives here:
//!
//! - [`RunOutput`] — a closed tagged union over every shape the hosted
//!   background-removal model has been observed to return, built by explicit
//!   shape inspection at the boundary where the untyped JSON enters.
//! - [`normalize`] — collapses a [`RunOutput`] into the single canonical
//!   result URL, or fails with the raw shape preserved for diagnosis.
//! - [`ReplicateError::classify`] — maps an upstream failure onto the small
//!   taxonomy the HTTP boundary exposes to clients.

pub mod client;
pub mod error;
pub mod output;

pub use client::{BackgroundRemover, REMBG_VERSION, ReplicateClient};
pub use error::{FailureKind, ReplicateError};
pub use output::{RunOutput, UrlSource, normalize};
