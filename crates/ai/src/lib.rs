//! # FormAI AI
//!
//! AI-assisted form generation.
//!
//! The pipeline for a generation request is:
//!
//! 1. validate the request and render the prompt ([`prompt`])
//! 2. make a single call to a [`GenerativeModel`] ([`model`])
//! 3. locate the JSON object in the reply ([`extract`])
//! 4. repair common escaping mistakes ([`repair`])
//! 5. parse strictly against the form schema and assign missing ids
//!    ([`response`])
//!
//! [`FormGenerator`] ties the steps together and serializes calls.
//!

pub mod config;
pub mod extract;
pub mod generator;
pub mod model;
pub mod prompt;
pub mod repair;
pub mod response;

// Re-export commonly used items at crate root
pub use config::{AiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use extract::extract_json_span;
pub use generator::FormGenerator;
pub use model::{GeminiModel, GenerativeModel, ModelReply};
pub use prompt::{GenerationRequest, MIN_DESCRIPTION_CHARS, improvement_prompt};
pub use repair::{REPAIRS, Repair, repair_json};
pub use response::{GeneratedForm, assign_missing_ids, parse_elements_reply, parse_form_reply};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
