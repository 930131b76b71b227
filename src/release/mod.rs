//! Release data layer
//!
//! This module fetches, caches, normalizes and merges the release history of
//! a package from a PyPI-compatible index.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Sources   │────▶│  Normalize  │────▶│    Merge    │
//! │ (JSON, web) │     │  (ordering) │     │ (secondary) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ HTTP + Cache│                         │   Fetcher   │
//! │  (sqlite)   │                         │(per package)│
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: SQLite-based response cache with TTL
//! - [`error`]: Error types for cache and source operations
//! - [`fetcher`]: Per-package lookup combining all steps
//! - [`http`]: HTTP client consulting the cache
//! - [`merge`]: Adds simple-index-only versions to a history
//! - [`normalize`]: Turns the JSON API payload into an ordered history
//! - [`source`]: Source traits
//! - [`sources`]: JSON API and simple index implementations
//! - [`types`]: Release data types

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod merge;
pub mod normalize;
pub mod source;
pub mod sources;
pub mod types;
