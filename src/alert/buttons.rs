use crate::error::{AlertError, Result};

/// A registered button. Indices follow registration order and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEntry {
    pub index: usize,
    pub label: String,
    pub is_cancel: bool,
}

/// Ordered, append-only list of buttons with at most one cancel button, which
/// always sits at index 0.
#[derive(Debug, Clone, Default)]
pub struct ButtonRegistry {
    entries: Vec<ButtonEntry>,
}

impl ButtonRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a button and return its index.
    pub fn add(&mut self, label: impl Into<String>) -> Result<usize> {
        self.push(label.into(), false)
    }

    /// Register the cancel button. Only valid while the registry is empty.
    pub fn add_cancel(&mut self, label: impl Into<String>) -> Result<usize> {
        if !self.entries.is_empty() {
            return Err(AlertError::Configuration(
                "the cancel button must be registered before any other button".to_string(),
            ));
        }
        self.push(label.into(), true)
    }

    fn push(&mut self, label: String, is_cancel: bool) -> Result<usize> {
        if label.trim().is_empty() {
            return Err(AlertError::Configuration(
                "button labels must not be empty".to_string(),
            ));
        }
        let index = self.entries.len();
        self.entries.push(ButtonEntry {
            index,
            label,
            is_cancel,
        });
        Ok(index)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ButtonEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cancel_index(&self) -> Option<usize> {
        self.entries.first().filter(|e| e.is_cancel).map(|e| e.index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ButtonEntry> {
        self.entries.iter()
    }

    /// Fails with [`AlertError::ButtonOutOfRange`] for unknown indices.
    pub fn check(&self, index: usize) -> Result<&ButtonEntry> {
        self.get(index).ok_or(AlertError::ButtonOutOfRange {
            index,
            count: self.len(),
        })
    }
}
