use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

const MASK: char = '•';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
}

/// Styles for drawing a single-line input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldStyles {
    pub text: Style,
    pub placeholder: Style,
    pub cursor: Style,
}

impl FieldStyles {
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            text: Style::default().fg(theme.text()),
            placeholder: Style::default().fg(theme.overlay0()),
            cursor: Style::default()
                .fg(theme.base())
                .bg(theme.text())
                .add_modifier(Modifier::BOLD),
        }
    }
}

/// Build the line for an input showing `value`, with the cursor drawn at char
/// index `cursor` when focused.
#[must_use]
pub fn field_line(
    value: &str,
    cursor: Option<usize>,
    placeholder: &str,
    masked: bool,
    styles: &FieldStyles,
) -> Line<'static> {
    if value.is_empty() {
        let mut spans = Vec::with_capacity(2);
        if cursor.is_some() {
            spans.push(Span::styled(" ", styles.cursor));
        }
        spans.push(Span::styled(placeholder.to_string(), styles.placeholder));
        return Line::from(spans);
    }

    let shown: String = if masked {
        value.chars().map(|_| MASK).collect()
    } else {
        value.to_string()
    };
    let Some(cursor) = cursor else {
        return Line::from(Span::styled(shown, styles.text));
    };

    let before: String = shown.chars().take(cursor).collect();
    let at = shown.chars().nth(cursor).unwrap_or(' ');
    let after: String = shown.chars().skip(cursor + 1).collect();
    Line::from(vec![
        Span::styled(before, styles.text),
        Span::styled(at.to_string(), styles.cursor),
        Span::styled(after, styles.text),
    ])
}

/// Single-line editable text. The cursor is a char index into the value.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
    placeholder: String,
    masked: bool,
}

impl TextInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.len();
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    #[must_use]
    pub const fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.masked
    }

    #[must_use]
    pub fn line(&self, focused: bool, styles: &FieldStyles) -> Line<'static> {
        field_line(
            &self.value,
            focused.then_some(self.cursor),
            &self.placeholder,
            self.masked,
            styles,
        )
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(index, _)| index)
    }

    fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor);
        self.value.insert(index, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let index = self.byte_index(self.cursor);
            self.value.remove(index);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.len() {
            let index = self.byte_index(self.cursor);
            self.value.remove(index);
        }
    }

    const fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            // Focus movement belongs to whoever hosts the input.
            (KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down, _) => {
                EventResult::Ignored
            }

            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                self.delete_word_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                EventResult::Consumed
            }

            (KeyCode::Left, _) => {
                self.move_cursor_left();
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.move_cursor_right();
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                EventResult::Consumed
            }

            _ => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let line = self.line(true, &FieldStyles::from_theme(theme));
        frame.render_widget(Paragraph::new(line), area);
    }
}
