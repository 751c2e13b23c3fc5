//! StudentBnB Core - Shared types and the listing draft model.
//!
//! This crate provides the types used across all StudentBnB client components:
//! - `client` - HTTP adapter, session store, submission orchestrator, read views
//! - `cli` - Command-line front end (`sbnb`)
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no persistent state. A [`ListingDraft`] is mutated in memory by
//! a view and validated here before anything touches the network.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, money, enumerations and vocabulary tokens
//! - [`draft`] - The listing draft, pending photos, preference selection and validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod draft;
pub mod types;

pub use draft::*;
pub use types::*;
