//! Core types used throughout FormAI
//!
//! This module contains the form element type enumeration shared by the
//! document model and the AI client, and the geometric primitives used to
//! resolve drop targets on the builder canvas.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FormError;

// ============================================================================
// Element Types
// ============================================================================

/// The fixed set of form element types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Text,
    Email,
    Number,
    Phone,
    Date,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Url,
    Rating,
}

impl ElementType {
    /// All element types, in palette order
    pub fn all() -> &'static [ElementType] {
        &[
            ElementType::Text,
            ElementType::Email,
            ElementType::Number,
            ElementType::Phone,
            ElementType::Date,
            ElementType::Textarea,
            ElementType::Select,
            ElementType::Radio,
            ElementType::Checkbox,
            ElementType::Url,
            ElementType::Rating,
        ]
    }

    /// Wire name of the type (`"text"`, `"select"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::Email => "email",
            ElementType::Number => "number",
            ElementType::Phone => "phone",
            ElementType::Date => "date",
            ElementType::Textarea => "textarea",
            ElementType::Select => "select",
            ElementType::Radio => "radio",
            ElementType::Checkbox => "checkbox",
            ElementType::Url => "url",
            ElementType::Rating => "rating",
        }
    }

    /// Human-readable name shown in the palette
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementType::Text => "Text Input",
            ElementType::Email => "Email",
            ElementType::Number => "Number",
            ElementType::Phone => "Phone",
            ElementType::Date => "Date",
            ElementType::Textarea => "Text Area",
            ElementType::Select => "Dropdown",
            ElementType::Radio => "Radio Group",
            ElementType::Checkbox => "Checkboxes",
            ElementType::Url => "URL",
            ElementType::Rating => "Rating",
        }
    }

    /// Whether elements of this type carry an `options` list
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            ElementType::Select | ElementType::Radio | ElementType::Checkbox
        )
    }

    /// Whether `minLength`, `maxLength` and `pattern` apply to this type
    pub fn supports_length_rules(&self) -> bool {
        matches!(
            self,
            ElementType::Text
                | ElementType::Email
                | ElementType::Phone
                | ElementType::Textarea
                | ElementType::Url
        )
    }

    /// Whether `min` and `max` apply to this type
    pub fn supports_range_rules(&self) -> bool {
        matches!(self, ElementType::Number | ElementType::Rating)
    }

    /// Pipe-separated list of wire names, as used in the generation prompt
    pub fn wire_names() -> String {
        Self::all()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                FormError::validation(format!(
                    "unknown element type '{}' (expected one of {})",
                    s,
                    Self::wire_names()
                ))
            })
    }
}

// ============================================================================
// Geometry Types
// ============================================================================

/// Pointer or element position on the builder canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate the Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Size of a rendered region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Bounding rectangle of a rendered region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Position,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(position: Position, size: Size) -> Self {
        Self { position, size }
    }

    /// Create a rectangle from coordinates and dimensions
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Check if a point is contained within this rectangle
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.size.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.size.height
    }

    /// Get the center point of the rectangle
    pub fn center(&self) -> Position {
        Position {
            x: self.position.x + self.size.width / 2.0,
            y: self.position.y + self.size.height / 2.0,
        }
    }

    /// Y coordinate of the bottom edge
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }
}

// ============================================================================
// Tests
// ============================================================================
