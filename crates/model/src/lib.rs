//! # FormAI Model
//!
//! The client-side editing model of the form builder.
//!
//! ## Core Concepts
//!
//! - **FormElement**: one field definition (type, label, options, validation)
//! - **EditableFormDocument**: the ordered element sequence plus selection,
//!   mutated only through its operation set and observable via subscriptions
//! - **DragReorderController**: turns drag gestures into add/insert/reorder
//!   operations using the closest-center rule
//! - **PropertiesEditor**: edits the selected element through element patches
//! - **FormRecord**: the persistable snapshot written to form files and the
//!   forms store
//!

// Module declarations
pub mod document;
pub mod drag;
pub mod element;
pub mod form;
pub mod properties;
pub mod schema;
pub mod serialization;

// Re-export commonly used types at crate root
pub use document::{DocumentEvent, EditableFormDocument, SharedDocument, SubscriptionId};
pub use drag::{CanvasLayout, DragPayload, DragReorderController, DropOutcome, DropTarget};
pub use element::{DEFAULT_OPTIONS, ElementPatch, FormElement, ValidationRules, default_options};
pub use form::{DEFAULT_SUBMIT_MESSAGE, FormRecord, FormSettings};
pub use properties::PropertiesEditor;
pub use schema::{IdPolicy, duplicate_id_issues, parse_element, parse_elements};
pub use serialization::{
    FORM_FILE_EXTENSION, FormFile, SCHEMA_VERSION, load_form, load_form_from_string, read_form,
    save_form, save_form_to_string,
};

// Re-export core types that are commonly used with the model
pub use formai_core::{
    ElementId, ElementIdGenerator, ElementType, FormError, FormResult, Position, Rect, Size,
    Validatable,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        // Document
        DocumentEvent,
        DragReorderController,
        DropOutcome,
        DropTarget,
        EditableFormDocument,
        ElementPatch,
        // Re-exported from core
        ElementId,
        ElementType,
        FormElement,
        FormError,
        FormRecord,
        FormResult,
        FormSettings,
        PropertiesEditor,
        Validatable,
        ValidationRules,
        // Persistence
        load_form,
        save_form,
    };
}

// ============================================================================
// Tests
// ============================================================================
