//! # FormAI Core
//!
//! Core types, traits, and error handling for FormAI.
//!
//! This crate provides the foundational building blocks used throughout
//! the form builder, including:
//!
//! - **Types**: the element type enumeration and canvas geometry (Position, Size, Rect)
//! - **Identity**: collision-checked element id generation
//! - **Traits**: common behaviors like `Validatable` and `Persistable`
//! - **Errors**: unified error handling with `FormError` and `FormResult`
//!

pub mod error;
pub mod id;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ErrorKind, FormError, FormResult, ResultExt};
pub use id::{Clock, ElementId, ElementIdGenerator, FixedClock, SystemClock};
pub use traits::{Identifiable, Persistable, Validatable};
pub use types::{ElementType, Position, Rect, Size};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Title shown for a form whose title is empty
pub const DEFAULT_FORM_TITLE: &str = "Untitled Form";
