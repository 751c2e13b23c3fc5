//! Core types for StudentBnB.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod kinds;
pub mod listing;
pub mod money;
pub mod vocabulary;

pub use email::{Email, EmailError};
pub use id::*;
pub use kinds::*;
pub use listing::*;
pub use money::{CurrencyCode, Money, MoneyError};
pub use vocabulary::{VocabularyError, VocabularyToken};
