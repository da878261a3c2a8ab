//! # FormAI API
//!
//! Framework-independent form endpoints.
//!
//! Handlers take the caller's identity as `Option<&CurrentUser>` and the
//! forms store as an injected [`FormsRepository`]; there is no ambient
//! session or global database. Every handler returns an [`ApiResponse`]
//! whose status follows the error kind:
//!
//! | kind | status |
//! |------|--------|
//! | validation, invalid order | 400 |
//! | unauthorized | 401 |
//! | not found | 404 |
//! | generation in progress | 409 |
//! | malformed model output, upstream, internal | 500 |
//!

pub mod handlers;
pub mod memory;
pub mod repository;
pub mod response;
pub mod user;

// Re-export commonly used items at crate root
pub use handlers::FormsApi;
pub use memory::InMemoryFormsRepository;
pub use repository::{
    AiGenerationRecord, FormStatus, FormUpdate, FormsRepository, NewAiGeneration, NewForm,
    StoredForm,
};
pub use response::ApiResponse;
pub use user::{CurrentUser, UserRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
