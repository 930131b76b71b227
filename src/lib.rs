//! Detect and report outdated Python distributions.
//!
//! ```text
//! distributions ──▶ resolve ──▶ release::fetcher ──▶ package ──▶ report
//!                                 │
//!                                 ├─ sources (JSON API, simple index)
//!                                 ├─ normalize
//!                                 └─ merge
//! ```

pub mod cli;
pub mod config;
pub mod distributions;
pub mod logging;
pub mod package;
pub mod release;
pub mod report;
pub mod resolve;
