//! Core types for Foodgram.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod color;
pub mod id;
pub mod slug;

pub use color::{HexColor, HexColorError};
pub use id::*;
pub use slug::{Slug, SlugError};
