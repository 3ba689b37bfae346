//! Core library for asana-export
//!
//! This crate implements the **Functional Core** of the asana-export
//! application, following the Functional Core - Imperative Shell
//! architectural pattern.
//!
//! # Architecture Overview
//!
//! The asana-export project uses a two-crate architecture to enforce
//! separation of concerns:
//!
//! - **`asana_export_core`** (this crate): pure types and functions with
//!   zero network I/O
//! - **`asana-export`**: HTTP, filesystem, and CLI orchestration (the
//!   Imperative Shell)
//!
//! Everything the shell fetches flows through the types and functions
//! defined here: the wire envelopes returned by the remote API, the nested
//! export document assembled per project, the filesystem-safe path
//! derivation for downloaded artifacts, and the zip bundle that packages a
//! batch of export documents.
//!
//! # Module Organization
//!
//! - [`model`]: wire envelopes and the export document model
//! - [`paths`]: filesystem-safe, length-bounded name and path derivation
//! - [`archive`]: in-memory zip packaging of export documents
//!
//! All of it is testable with simple fixture data, no mocking required.

pub mod archive;
pub mod model;
pub mod paths;
