//! Foundation types for dialup.
//!
//! This crate contains the types shared by every dialup crate: the
//! persisted [`settings::Settings`] record, the injectable clock,
//! browser tab identifiers, and the error type.

pub mod clock;
pub mod error;
pub mod settings;
pub mod tab;
