//! Element identity
//!
//! Form element ids are opaque strings. Elements created in the builder get
//! `<type>-<unix-millis>`; elements returned by the model without an id get
//! `element-<unix-millis>-<index>`. The generator checks every candidate
//! against the ids already in use, so two elements created within the same
//! millisecond still receive distinct ids.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

// ============================================================================
// ElementId
// ============================================================================

/// Opaque, stable identifier of a form element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for the element at `index` of a model-generated batch
    pub fn for_batch(millis: i64, index: usize) -> Self {
        Self(format!("element-{}-{}", millis, index))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (never valid inside a document)
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for ElementId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ElementId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Source of the time component embedded in generated ids
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock, for deterministic ids in tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

// ============================================================================
// ElementIdGenerator
// ============================================================================

/// Issues fresh element ids of the form `<prefix>-<millis>[-<n>]`
#[derive(Debug, Clone)]
pub struct ElementIdGenerator {
    clock: Arc<dyn Clock>,
    last_millis: i64,
    sequence: u32,
}

impl ElementIdGenerator {
    /// Generator backed by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Generator backed by a custom clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_millis: i64::MIN,
            sequence: 0,
        }
    }

    /// Current time according to the generator's clock
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Issue the next id for `prefix`, skipping any id for which `is_taken`
    /// returns true.
    pub fn next(&mut self, prefix: &str, is_taken: impl Fn(&str) -> bool) -> ElementId {
        let millis = self.clock.now_millis();
        if millis == self.last_millis {
            self.sequence += 1;
        } else {
            self.last_millis = millis;
            self.sequence = 0;
        }

        let base = format!("{}-{}", prefix, millis);
        let mut candidate = if self.sequence == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, self.sequence)
        };
        while is_taken(&candidate) {
            self.sequence += 1;
            candidate = format!("{}-{}", base, self.sequence);
        }
        ElementId(candidate)
    }
}

impl Default for ElementIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
