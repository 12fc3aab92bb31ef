//! Marker persistence.
//!
//! The engine applies edits to its in-memory list immediately and hands the
//! resulting snapshot to a [`WriteQueue`], which writes it through a
//! [`MarkerStore`] on a background thread.
//!
//! ## Ordering
//!
//! Writes for one image never overlap. While a write is in flight, newer
//! snapshots for that image wait; if several pile up only the latest is
//! written, since every snapshot is a complete list.
//!
//! ## Failures
//!
//! Failed writes are retried with exponential backoff. A write that still
//! fails is reported from [`WriteQueue::process_results`] and the image stays
//! dirty until a later write succeeds. The in-memory list is never rolled
//! back.

mod json_store;
mod queue;
mod store;

pub use json_store::*;
pub use queue::*;
pub use store::*;
