//! stepdeck - a copy-paste step catalog for workflow automation
//!
//! stepdeck serves a catalog of self-contained workflow steps: small
//! async functions wrapping one third-party API call each, meant to be
//! copied into a project rather than imported as a framework. The
//! catalog itself is a static `registry.json` manifest; an HTTP API
//! exposes step listings, per-step detail (source, usage example,
//! required configuration), and a package-installer payload with file
//! contents inlined.
//!
//! ## Key Ideas
//!
//! - **Copy, don't depend**: steps are distributed as source files
//! - **Derived classification**: category and integration tags are pure
//!   functions of the step name, recomputed on every read
//! - **Binary error taxonomy**: every step failure is either
//!   unrecoverable (bad input, missing configuration, 4xx rejection) or
//!   retryable (5xx, timeouts, network faults); the external workflow
//!   runtime owns the retry schedule

pub mod api;
pub mod config;
pub mod error;
pub mod registry;
pub mod steps;

pub use error::{Error, Result};
pub use registry::Registry;
