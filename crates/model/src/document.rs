//! Editable form document
//!
//! The in-memory state of one form being edited: title, description,
//! settings, the ordered element sequence and the current selection. All
//! mutation goes through the operations below; each either commits fully or
//! leaves the document untouched and returns an error.
//!
//! Readers that need to react to changes register an observer with
//! [`EditableFormDocument::subscribe`]. Events are delivered synchronously
//! after a mutation commits.

use crate::element::{ElementPatch, FormElement};
use crate::form::{FormRecord, FormSettings};
use crate::schema::duplicate_id_issues;
use formai_core::{
    DEFAULT_FORM_TITLE, ElementId, ElementIdGenerator, ElementType, FormError, FormResult,
    Identifiable, Validatable,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// ============================================================================
// Events
// ============================================================================

/// Change notification delivered to document observers
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// An element was added or duplicated at `index`
    ElementAdded { id: ElementId, index: usize },
    /// An element's fields changed
    ElementUpdated { id: ElementId },
    /// An element was deleted
    ElementRemoved { id: ElementId },
    /// The element order changed
    ElementsReordered,
    /// The whole element sequence was substituted
    DocumentReplaced { element_count: usize },
    /// The selection changed
    SelectionChanged { selected: Option<ElementId> },
    /// Title, description or settings changed
    MetadataChanged,
}

/// Handle returned by [`EditableFormDocument::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&DocumentEvent) + Send + Sync>;

// ============================================================================
// EditableFormDocument
// ============================================================================

/// Ordered collection of form elements plus selection state
pub struct EditableFormDocument {
    title: String,
    description: Option<String>,
    settings: FormSettings,
    elements: Vec<FormElement>,
    selected_id: Option<ElementId>,
    ids: ElementIdGenerator,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl EditableFormDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::with_id_generator(ElementIdGenerator::new())
    }

    /// Create an empty document that issues ids from `ids`
    pub fn with_id_generator(ids: ElementIdGenerator) -> Self {
        Self {
            title: String::new(),
            description: None,
            settings: FormSettings::default(),
            elements: Vec::new(),
            selected_id: None,
            ids,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Open a stored form for editing
    pub fn from_record(record: FormRecord) -> FormResult<Self> {
        let mut document = Self::new();
        document.load_record(record)?;
        Ok(document)
    }

    /// Replace the whole document (elements, title, description, settings)
    /// with a stored record. Validated like [`replace_all`](Self::replace_all).
    pub fn load_record(&mut self, record: FormRecord) -> FormResult<()> {
        Self::check_elements(&record.elements)?;
        self.settings = record.settings;
        self.commit_replace(record.elements, record.title, record.description);
        Ok(())
    }

    /// Snapshot the document for persistence
    pub fn to_record(&self) -> FormRecord {
        FormRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            elements: self.elements.clone(),
            settings: self.settings.clone(),
        }
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title to display, falling back to the placeholder when empty
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_FORM_TITLE
        } else {
            &self.title
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.emit(DocumentEvent::MetadataChanged);
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.emit(DocumentEvent::MetadataChanged);
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: FormSettings) {
        self.settings = settings;
        self.emit(DocumentEvent::MetadataChanged);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Elements in display order
    pub fn elements(&self) -> &[FormElement] {
        &self.elements
    }

    /// Look up an element by id
    pub fn element(&self, id: &str) -> Option<&FormElement> {
        self.elements.iter().find(|e| e.matches_id(id))
    }

    /// Position of an element in the sequence
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.matches_id(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Ids in display order
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // ========================================================================
    // Element operations
    // ========================================================================

    /// Append a new element of `element_type` with builder defaults
    pub fn add_element(&mut self, element_type: ElementType) -> ElementId {
        self.insert_element(element_type, self.elements.len())
    }

    /// Insert a new element of `element_type` at `index` (clamped to the end)
    pub fn insert_element(&mut self, element_type: ElementType, index: usize) -> ElementId {
        let id = self.fresh_id(element_type);
        let index = index.min(self.elements.len());
        self.elements
            .insert(index, FormElement::new(id.clone(), element_type));

        debug!("Added {} element '{}' at {}", element_type, id, index);
        self.emit(DocumentEvent::ElementAdded {
            id: id.clone(),
            index,
        });
        id
    }

    /// Merge `patch` into the element with `id`.
    ///
    /// The merged element must still satisfy the element shape (for example,
    /// an option-bearing element keeps at least one option); otherwise the
    /// update is rejected and nothing changes. Labels may be empty while
    /// editing.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> FormResult<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| FormError::element_not_found(id))?;

        let updated = self.elements[index].patched(patch);
        updated.validate()?;

        self.elements[index] = updated;
        debug!("Updated element '{}'", id);
        self.emit(DocumentEvent::ElementUpdated {
            id: ElementId::new(id),
        });
        Ok(())
    }

    /// Remove the element with `id`, clearing the selection if it pointed at
    /// it. Returns the removed element, or `None` if no such element exists.
    pub fn delete_element(&mut self, id: &str) -> Option<FormElement> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);

        debug!("Deleted element '{}'", id);
        self.emit(DocumentEvent::ElementRemoved {
            id: removed.id.clone(),
        });

        if self.selected_id.as_ref() == Some(&removed.id) {
            self.selected_id = None;
            self.emit(DocumentEvent::SelectionChanged { selected: None });
        }

        Some(removed)
    }

    /// Clone the element with `id` under a fresh id and append the copy
    pub fn duplicate_element(&mut self, id: &str) -> FormResult<ElementId> {
        let source = self
            .element(id)
            .ok_or_else(|| FormError::element_not_found(id))?;

        let mut copy = source.clone();
        copy.id = self.fresh_id(copy.element_type);
        let new_id = copy.id.clone();
        self.elements.push(copy);

        debug!("Duplicated element '{}' as '{}'", id, new_id);
        self.emit(DocumentEvent::ElementAdded {
            id: new_id.clone(),
            index: self.elements.len() - 1,
        });
        Ok(new_id)
    }

    /// Reorder the sequence to match `ordered_ids`, which must be a
    /// permutation of the current ids.
    pub fn reorder_elements<S: AsRef<str>>(&mut self, ordered_ids: &[S]) -> FormResult<()> {
        if ordered_ids.len() != self.elements.len() {
            return Err(FormError::invalid_order(format!(
                "expected {} ids, got {}",
                self.elements.len(),
                ordered_ids.len()
            )));
        }

        let mut seen = HashSet::with_capacity(ordered_ids.len());
        let mut reordered = Vec::with_capacity(ordered_ids.len());
        for id in ordered_ids {
            let id = id.as_ref();
            if !seen.insert(id) {
                return Err(FormError::invalid_order(format!("id '{}' appears twice", id)));
            }
            let element = self
                .element(id)
                .ok_or_else(|| FormError::invalid_order(format!("unknown id '{}'", id)))?;
            reordered.push(element.clone());
        }

        self.elements = reordered;
        debug!("Reordered {} elements", self.elements.len());
        self.emit(DocumentEvent::ElementsReordered);
        Ok(())
    }

    /// Move the element with `id` to `to_index`, shifting the others
    pub fn move_element(&mut self, id: &str, to_index: usize) -> FormResult<()> {
        let from = self
            .index_of(id)
            .ok_or_else(|| FormError::element_not_found(id))?;
        if to_index >= self.elements.len() {
            return Err(FormError::invalid_order(format!(
                "index {} is out of range for {} elements",
                to_index,
                self.elements.len()
            )));
        }
        if from == to_index {
            return Ok(());
        }

        let mut order = self.element_ids();
        let moved = order.remove(from);
        order.insert(to_index, moved);
        self.reorder_elements(&order)
    }

    /// Substitute the entire element sequence together with the title and
    /// description. Every element is checked first; on failure nothing
    /// changes. The selection is always cleared.
    pub fn replace_all(
        &mut self,
        elements: Vec<FormElement>,
        title: impl Into<String>,
        description: Option<String>,
    ) -> FormResult<()> {
        Self::check_elements(&elements)?;
        self.commit_replace(elements, title.into(), description);
        Ok(())
    }

    fn check_elements(elements: &[FormElement]) -> FormResult<()> {
        for element in elements {
            element.check_well_formed()?;
        }
        let duplicates = duplicate_id_issues(elements, "elements");
        if !duplicates.is_empty() {
            return Err(FormError::validation(duplicates.join("; ")));
        }
        Ok(())
    }

    fn commit_replace(
        &mut self,
        elements: Vec<FormElement>,
        title: String,
        description: Option<String>,
    ) {
        self.elements = elements;
        self.title = title;
        self.description = description;
        let had_selection = self.selected_id.take().is_some();

        info!(
            "Replaced document '{}' with {} elements",
            self.display_title(),
            self.elements.len()
        );
        self.emit(DocumentEvent::DocumentReplaced {
            element_count: self.elements.len(),
        });
        if had_selection {
            self.emit(DocumentEvent::SelectionChanged { selected: None });
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select the element with `id`; an unknown id leaves the selection as is
    pub fn select(&mut self, id: &str) -> FormResult<()> {
        let element = self
            .element(id)
            .ok_or_else(|| FormError::element_not_found(id))?;
        let id = element.id.clone();

        if self.selected_id.as_ref() != Some(&id) {
            self.selected_id = Some(id.clone());
            self.emit(DocumentEvent::SelectionChanged { selected: Some(id) });
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selected_id.take().is_some() {
            self.emit(DocumentEvent::SelectionChanged { selected: None });
        }
    }

    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected_id.as_ref()
    }

    /// The selected element, read from the current sequence
    pub fn selected(&self) -> Option<&FormElement> {
        self.selected_id
            .as_ref()
            .and_then(|id| self.element(id.as_str()))
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register an observer called after every committed change
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&DocumentEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn emit(&self, event: DocumentEvent) {
        for (_, observer) in &self.observers {
            observer(&event);
        }
    }

    fn fresh_id(&mut self, element_type: ElementType) -> ElementId {
        let elements = &self.elements;
        self.ids.next(element_type.as_str(), |candidate| {
            elements.iter().any(|e| e.matches_id(candidate))
        })
    }
}

impl Default for EditableFormDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditableFormDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableFormDocument")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("elements", &self.elements)
            .field("selected_id", &self.selected_id)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ============================================================================
// SharedDocument
// ============================================================================

/// Thread-safe handle funnelling every mutation through one lock
#[derive(Clone, Default)]
pub struct SharedDocument {
    inner: Arc<Mutex<EditableFormDocument>>,
}

impl SharedDocument {
    pub fn new(document: EditableFormDocument) -> Self {
        Self {
            inner: Arc::new(Mutex::new(document)),
        }
    }

    /// Run `f` with exclusive access to the document
    pub fn with<R>(&self, f: impl FnOnce(&mut EditableFormDocument) -> R) -> FormResult<R> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| FormError::internal("document lock poisoned"))?;
        Ok(f(&mut guard))
    }

    /// Persistence snapshot of the current state
    pub fn snapshot(&self) -> FormResult<FormRecord> {
        self.with(|document| document.to_record())
    }
}

impl std::fmt::Debug for SharedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDocument").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
