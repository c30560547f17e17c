//! Headless testing helpers: [`Harness`] and snapshot rendering.
//!
//! Use a [`Harness`] to mount components into a scratch document and fire
//! events at them. Use [`render_to_string`] to capture a tree as HTML for
//! snapshot-style assertions.

pub mod harness;
pub mod snapshot;

pub use harness::Harness;
pub use snapshot::render_to_string;
