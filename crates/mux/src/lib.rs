//! Video provider integration.
//!
//! Provides the REST client for the hosting provider, the
//! [`provider::VideoProvider`] seam the rest of the service depends on,
//! typed webhook event parsing, and the processor that reconciles provider
//! events onto lesson rows.

pub mod api;
pub mod messages;
pub mod processor;
pub mod provider;
