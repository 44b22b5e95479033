use crossterm::event::KeyEvent;

use crate::error::{AlertError, Result};
use crate::ui::{Component, TextInput};

/// What an alert asks of a text input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub placeholder: String,
    pub secure: bool,
}

/// Opaque reference to a control created by a [`TextInputHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHandle(usize);

impl FieldHandle {
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

/// Text-input capability of the host.
///
/// An alert registers one control per field when it is first shown and reads
/// the entered text back through the returned handle.
pub trait TextInputHost {
    fn register(&mut self, descriptor: &FieldDescriptor) -> FieldHandle;

    fn read_text(&self, handle: FieldHandle) -> String;

    /// Route a key press to the control. Returns whether it was consumed.
    fn handle_key(&mut self, handle: FieldHandle, key: KeyEvent) -> bool {
        _ = (handle, key);
        false
    }

    /// Cursor position (char index) of the control, if it draws one.
    fn cursor(&self, handle: FieldHandle) -> Option<usize> {
        _ = handle;
        None
    }
}

/// [`TextInputHost`] backed by terminal [`TextInput`] controls.
#[derive(Debug, Default)]
pub struct TerminalInputs {
    inputs: Vec<TextInput>,
}

impl TerminalInputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, handle: FieldHandle) -> Option<&TextInput> {
        self.inputs.get(handle.0)
    }
}

impl TextInputHost for TerminalInputs {
    fn register(&mut self, descriptor: &FieldDescriptor) -> FieldHandle {
        self.inputs.push(
            TextInput::new()
                .with_placeholder(descriptor.placeholder.clone())
                .masked(descriptor.secure),
        );
        FieldHandle(self.inputs.len() - 1)
    }

    fn read_text(&self, handle: FieldHandle) -> String {
        self.get(handle)
            .map(|input| input.value().to_string())
            .unwrap_or_default()
    }

    fn handle_key(&mut self, handle: FieldHandle, key: KeyEvent) -> bool {
        self.inputs
            .get_mut(handle.0)
            .and_then(|input| input.handle_key(key).ok())
            .is_some_and(|result| result.is_consumed())
    }

    fn cursor(&self, handle: FieldHandle) -> Option<usize> {
        self.get(handle).map(TextInput::cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub index: usize,
    pub descriptor: FieldDescriptor,
    handle: Option<FieldHandle>,
}

impl FieldEntry {
    /// Control backing this field, once the alert has been shown.
    #[must_use]
    pub const fn handle(&self) -> Option<FieldHandle> {
        self.handle
    }
}

/// Ordered, append-only list of text fields.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    entries: Vec<FieldEntry>,
}

impl FieldRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, placeholder: impl Into<String>, secure: bool) {
        let index = self.entries.len();
        self.entries.push(FieldEntry {
            index,
            descriptor: FieldDescriptor {
                placeholder: placeholder.into(),
                secure,
            },
            handle: None,
        });
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FieldEntry> {
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

    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter()
    }

    /// Create a control for every field that does not have one yet.
    pub fn attach(&mut self, host: &mut dyn TextInputHost) {
        for entry in self.entries.iter_mut().filter(|e| e.handle.is_none()) {
            entry.handle = Some(host.register(&entry.descriptor));
        }
    }

    /// Text of field `index`; empty until the field has a control.
    pub fn text_at(&self, index: usize, host: &dyn TextInputHost) -> Result<String> {
        let entry = self.get(index).ok_or(AlertError::FieldOutOfRange {
            index,
            count: self.len(),
        })?;
        Ok(entry
            .handle
            .map(|handle| host.read_text(handle))
            .unwrap_or_default())
    }
}
