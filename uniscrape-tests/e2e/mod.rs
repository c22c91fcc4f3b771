//! End-to-end tests for Uniscrape
//!
//! These tests drive the full router against a fake metadata and stream
//! provider served on an ephemeral local port, covering caching, error
//! classification and response envelopes.

mod catalog_workflow;
mod fake_upstream;
