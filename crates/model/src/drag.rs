//! Drag and drop on the builder canvas
//!
//! The palette is a drag source only; the canvas is both a source (existing
//! elements) and a target. A gesture records its payload on start and is
//! resolved against the document on drop:
//!
//! | payload            | dropped on container | dropped on element Y        |
//! |--------------------|----------------------|-----------------------------|
//! | new element of T   | append T             | insert T at Y's position    |
//! | existing element X | no-op                | move X to Y's position      |
//!
//! A drop with no target cancels the gesture. The active payload is cleared
//! on every drop, whatever the outcome.

use crate::document::EditableFormDocument;
use formai_core::{ElementId, ElementType, FormError, FormResult, Position, Rect};
use tracing::{debug, warn};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// A palette entry: a new element of this type
    NewElement(ElementType),
    /// An element already on the canvas
    Existing(ElementId),
}

/// Where a drag was released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The canvas itself, not over any element
    Container,
    /// A specific element on the canvas
    Element(ElementId),
}

/// Result of resolving a drop against the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// A new element was appended
    Added(ElementId),
    /// A new element was inserted before the element it was dropped on
    Inserted { id: ElementId, index: usize },
    /// An existing element was moved
    Reordered { id: ElementId, to_index: usize },
    /// The drop was valid but changed nothing
    NoOp,
    /// No target (or no active drag); nothing changed
    Cancelled,
}

// ============================================================================
// Canvas layout
// ============================================================================

/// Rendered bounds of the canvas and its elements, in display order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasLayout {
    pub container: Rect,
    pub elements: Vec<(ElementId, Rect)>,
}

impl CanvasLayout {
    pub fn new(container: Rect) -> Self {
        Self {
            container,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, id: impl Into<ElementId>, bounds: Rect) -> Self {
        self.elements.push((id.into(), bounds));
        self
    }

    /// Lay out `ids` as a vertical stack of equal rows inside `container`
    pub fn stacked<I>(container: Rect, ids: I, row_height: f32, gap: f32) -> Self
    where
        I: IntoIterator<Item = ElementId>,
    {
        let elements = ids
            .into_iter()
            .enumerate()
            .map(|(row, id)| {
                let y = container.position.y + row as f32 * (row_height + gap);
                (
                    id,
                    Rect::from_xywh(container.position.x, y, container.size.width, row_height),
                )
            })
            .collect();
        Self {
            container,
            elements,
        }
    }

    /// Resolve the drop target under `pointer` using the closest-center rule.
    ///
    /// Outside the container there is no target. Over an empty canvas, or
    /// below the last element, the target is the container itself.
    /// Otherwise it is the element whose center is nearest the pointer.
    pub fn closest_center(&self, pointer: Position) -> Option<DropTarget> {
        if !self.container.contains(pointer) {
            return None;
        }

        let lowest_edge = self
            .elements
            .iter()
            .map(|(_, bounds)| bounds.bottom())
            .max_by(|a, b| a.total_cmp(b));
        match lowest_edge {
            None => return Some(DropTarget::Container),
            Some(bottom) if pointer.y > bottom => return Some(DropTarget::Container),
            Some(_) => {}
        }

        self.elements
            .iter()
            .min_by(|(_, a), (_, b)| {
                pointer
                    .distance_to(&a.center())
                    .total_cmp(&pointer.distance_to(&b.center()))
            })
            .map(|(id, _)| DropTarget::Element(id.clone()))
    }
}

// ============================================================================
// DragReorderController
// ============================================================================

/// Tracks the active drag gesture and applies drops to a document
#[derive(Debug, Clone, Default)]
pub struct DragReorderController {
    active: Option<DragPayload>,
}

impl DragReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging a palette entry
    pub fn start_palette_drag(&mut self, element_type: ElementType) {
        debug!("Drag start: palette {}", element_type);
        self.active = Some(DragPayload::NewElement(element_type));
    }

    /// Begin dragging an element on the canvas
    pub fn start_canvas_drag(
        &mut self,
        document: &EditableFormDocument,
        id: &str,
    ) -> FormResult<()> {
        let element = document
            .element(id)
            .ok_or_else(|| FormError::element_not_found(id))?;
        debug!("Drag start: element '{}'", id);
        self.active = Some(DragPayload::Existing(element.id.clone()));
        Ok(())
    }

    /// The payload of the gesture in progress
    pub fn active(&self) -> Option<&DragPayload> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Abandon the gesture without touching the document
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Resolve the pointer position against `layout` and drop there
    pub fn drop_at(
        &mut self,
        document: &mut EditableFormDocument,
        layout: &CanvasLayout,
        pointer: Position,
    ) -> FormResult<DropOutcome> {
        let target = layout.closest_center(pointer);
        self.drop(document, target)
    }

    /// Finish the gesture over `target` (`None` when released over nothing)
    pub fn drop(
        &mut self,
        document: &mut EditableFormDocument,
        target: Option<DropTarget>,
    ) -> FormResult<DropOutcome> {
        let Some(payload) = self.active.take() else {
            return Ok(DropOutcome::Cancelled);
        };
        let Some(target) = target else {
            debug!("Drop cancelled: no target");
            return Ok(DropOutcome::Cancelled);
        };

        match (payload, target) {
            (DragPayload::NewElement(element_type), DropTarget::Container) => {
                Ok(DropOutcome::Added(document.add_element(element_type)))
            }
            (DragPayload::Existing(_), DropTarget::Container) => Ok(DropOutcome::NoOp),
            (DragPayload::NewElement(element_type), DropTarget::Element(over)) => {
                let index = Self::target_index(document, &over)?;
                let id = document.insert_element(element_type, index);
                Ok(DropOutcome::Inserted { id, index })
            }
            (DragPayload::Existing(dragged), DropTarget::Element(over)) => {
                if dragged == over {
                    return Ok(DropOutcome::NoOp);
                }
                let to_index = Self::target_index(document, &over)?;
                document.move_element(dragged.as_str(), to_index)?;
                Ok(DropOutcome::Reordered {
                    id: dragged,
                    to_index,
                })
            }
        }
    }

    fn target_index(document: &EditableFormDocument, over: &ElementId) -> FormResult<usize> {
        document.index_of(over.as_str()).ok_or_else(|| {
            warn!("Drop target '{}' is not in the document", over);
            FormError::element_not_found(over.as_str())
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use formai_core::{ElementIdGenerator, FixedClock};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn document_with(types: &[ElementType]) -> (EditableFormDocument, Vec<ElementId>) {
        let mut doc = EditableFormDocument::with_id_generator(ElementIdGenerator::with_clock(
            Arc::new(FixedClock::new(5)),
        ));
        let ids = types.iter().map(|t| doc.add_element(*t)).collect();
        (doc, ids)
    }

    fn layout_for(doc: &EditableFormDocument) -> CanvasLayout {
        CanvasLayout::stacked(
            Rect::from_xywh(0.0, 0.0, 400.0, 600.0),
            doc.element_ids(),
            50.0,
            10.0,
        )
    }

    #[test]
    fn test_closest_center_picks_nearest_element() {
        let (doc, ids) = document_with(&[ElementType::Text, ElementType::Email, ElementType::Date]);
        let layout = layout_for(&doc);

        // Rows are centered at y = 25, 85, 145
        assert_eq!(
            layout.closest_center(Position::new(200.0, 80.0)),
            Some(DropTarget::Element(ids[1].clone()))
        );
        assert_eq!(
            layout.closest_center(Position::new(10.0, 0.0)),
            Some(DropTarget::Element(ids[0].clone()))
        );
    }

    #[test]
    fn test_closest_center_container_and_outside() {
        let (doc, _) = document_with(&[ElementType::Text]);
        let layout = layout_for(&doc);

        assert_eq!(
            layout.closest_center(Position::new(200.0, 300.0)),
            Some(DropTarget::Container)
        );
        assert_eq!(layout.closest_center(Position::new(500.0, 10.0)), None);

        let empty = CanvasLayout::new(Rect::from_xywh(0.0, 0.0, 100.0, 100.0));
        assert_eq!(
            empty.closest_center(Position::new(50.0, 50.0)),
            Some(DropTarget::Container)
        );
    }

    #[test]
    fn test_palette_drop_on_container_appends() {
        let (mut doc, _) = document_with(&[ElementType::Text]);
        let mut drag = DragReorderController::new();

        drag.start_palette_drag(ElementType::Select);
        let outcome = drag.drop(&mut doc, Some(DropTarget::Container)).unwrap();

        let DropOutcome::Added(id) = outcome else {
            panic!("expected Added, got {:?}", outcome);
        };
        assert_eq!(doc.elements()[1].id, id);
        assert_eq!(doc.elements()[1].element_type, ElementType::Select);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_palette_drop_on_element_inserts_at_its_position() {
        let (mut doc, ids) = document_with(&[ElementType::Text, ElementType::Email]);
        let mut drag = DragReorderController::new();

        drag.start_palette_drag(ElementType::Rating);
        let outcome = drag
            .drop(&mut doc, Some(DropTarget::Element(ids[1].clone())))
            .unwrap();

        let DropOutcome::Inserted { id, index } = outcome else {
            panic!("expected Inserted, got {:?}", outcome);
        };
        assert_eq!(index, 1);
        assert_eq!(doc.element_ids(), vec![ids[0].clone(), id, ids[1].clone()]);
    }

    #[test]
    fn test_existing_drop_on_container_is_noop() {
        let (mut doc, ids) = document_with(&[ElementType::Text, ElementType::Email]);
        let mut drag = DragReorderController::new();

        drag.start_canvas_drag(&doc, ids[0].as_str()).unwrap();
        let outcome = drag.drop(&mut doc, Some(DropTarget::Container)).unwrap();

        assert_eq!(outcome, DropOutcome::NoOp);
        assert_eq!(doc.element_ids(), ids);
    }

    #[test]
    fn test_existing_drop_on_other_element_reorders() {
        let (mut doc, ids) =
            document_with(&[ElementType::Text, ElementType::Email, ElementType::Phone]);
        let layout = layout_for(&doc);
        let mut drag = DragReorderController::new();

        drag.start_canvas_drag(&doc, ids[0].as_str()).unwrap();
        let outcome = drag
            .drop_at(&mut doc, &layout, Position::new(200.0, 140.0))
            .unwrap();

        assert_eq!(
            outcome,
            DropOutcome::Reordered {
                id: ids[0].clone(),
                to_index: 2
            }
        );
        assert_eq!(
            doc.element_ids(),
            vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]
        );
    }

    #[test]
    fn test_drop_on_self_is_noop() {
        let (mut doc, ids) = document_with(&[ElementType::Text, ElementType::Email]);
        let mut drag = DragReorderController::new();

        drag.start_canvas_drag(&doc, ids[1].as_str()).unwrap();
        let outcome = drag
            .drop(&mut doc, Some(DropTarget::Element(ids[1].clone())))
            .unwrap();
        assert_eq!(outcome, DropOutcome::NoOp);
        assert_eq!(doc.element_ids(), ids);
    }

    #[test]
    fn test_drop_without_target_cancels() {
        let (mut doc, ids) = document_with(&[ElementType::Text]);
        let layout = layout_for(&doc);
        let mut drag = DragReorderController::new();

        drag.start_palette_drag(ElementType::Text);
        let outcome = drag
            .drop_at(&mut doc, &layout, Position::new(-10.0, -10.0))
            .unwrap();

        assert_eq!(outcome, DropOutcome::Cancelled);
        assert_eq!(doc.element_ids(), ids);
        assert!(drag.active().is_none());
    }

    #[test]
    fn test_stale_target_clears_gesture() {
        let (mut doc, _) = document_with(&[ElementType::Text]);
        let mut drag = DragReorderController::new();

        drag.start_palette_drag(ElementType::Email);
        let err = drag
            .drop(&mut doc, Some(DropTarget::Element(ElementId::new("gone"))))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!drag.is_dragging());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_canvas_drag_requires_existing_element() {
        let (doc, _) = document_with(&[]);
        let mut drag = DragReorderController::new();
        assert!(drag.start_canvas_drag(&doc, "missing").is_err());
        assert!(!drag.is_dragging());
    }
}
