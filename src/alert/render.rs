//! Drawing an alert onto a terminal buffer.
//!
//! The alert is laid out at its resting size, drawn into an offscreen buffer
//! and then copied onto the frame through the current [`Pose`]: scaled
//! around its centre, offset, clipped to the frame and dimmed while mostly
//! transparent.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap};

use crate::Theme;
use crate::alert::{AlertView, Focus};
use crate::animation::{Phase, Pose};
use crate::appearance::{Appearance, attr};
use crate::ui::text_input::{FieldStyles, field_line};

const MIN_WIDTH: u16 = 36;
const MAX_WIDTH: u16 = 64;
const BUTTON_GAP: u16 = 2;

pub(super) fn render(alert: &mut AlertView, area: Rect, buf: &mut Buffer, theme: &Theme) {
    if !alert.state().is_on_screen() || area.is_empty() {
        return;
    }

    let width = surface_width(alert, area);
    let inner_width = width.saturating_sub(4);
    let metrics = Metrics::measure(alert, inner_width, theme);
    let height = metrics.total().saturating_add(2).min(area.height);
    let rest = area.centered(Constraint::Length(width), Constraint::Length(height));

    let animated = alert.presentation.timeline().map(|timeline| {
        let presence = match timeline.phase() {
            Phase::Entry => timeline.progress(),
            Phase::Exit => 1.0 - timeline.progress(),
        };
        (timeline.pose(rest.as_size()), presence)
    });
    let (pose, presence) = match animated {
        None => (Pose::IDENTITY, 1.0),
        Some((Some(pose), presence)) => (pose, presence),
        Some((None, _)) => {
            alert.force_animation_complete();
            if !alert.state().is_on_screen() {
                return;
            }
            (Pose::IDENTITY, 1.0)
        }
    };

    // The backdrop recorded when the alert took the overlay.
    let backdrop = alert.overlay().backdrop().unwrap_or_default();
    backdrop.render(
        buf,
        area,
        alert.appearance.color(attr::BACKDROP_COLOR, theme),
        presence,
    );

    let Some((size, (x, y))) = pose.placement(rest) else {
        return;
    };
    let mut surface = Buffer::empty(Rect::new(0, 0, size.width, size.height));
    draw_surface(alert, &metrics, surface.area, &mut surface, theme);
    blit(&surface, (x, y), area, buf, pose.opacity < 0.5);
}

/// Copy `surface` onto `buf` with its top-left corner at `origin`.
fn blit(surface: &Buffer, origin: (i32, i32), clip: Rect, buf: &mut Buffer, dim: bool) {
    for (sy, row) in (0..surface.area.height).zip(origin.1..) {
        for (sx, column) in (0..surface.area.width).zip(origin.0..) {
            let (Ok(x), Ok(y)) = (u16::try_from(column), u16::try_from(row)) else {
                continue;
            };
            if x < clip.left() || x >= clip.right() || y < clip.top() || y >= clip.bottom() {
                continue;
            }
            let mut cell = surface[(sx, sy)].clone();
            if dim {
                cell.modifier |= Modifier::DIM;
            }
            if let Some(target) = buf.cell_mut((x, y)) {
                *target = cell;
            }
        }
    }
}

fn surface_width(alert: &AlertView, area: Rect) -> u16 {
    let buttons = alert
        .buttons
        .iter()
        .map(|b| button_width(&b.label))
        .fold(0u16, |acc, w| acc.saturating_add(w).saturating_add(BUTTON_GAP));
    let preferred = (area.width / 5 * 3).clamp(MIN_WIDTH, MAX_WIDTH);
    preferred.max(buttons.saturating_add(4)).min(area.width)
}

fn button_width(label: &str) -> u16 {
    u16::try_from(Span::raw(label).width())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
}

/// Row heights of every section at the resting width.
struct Metrics {
    title: u16,
    message: u16,
    content: u16,
    fields: u16,
    buttons: u16,
}

impl Metrics {
    fn measure(alert: &AlertView, width: u16, theme: &Theme) -> Self {
        let lines = |text: &str| -> u16 {
            if text.is_empty() || width == 0 {
                return 0;
            }
            let count = Paragraph::new(text).wrap(Wrap { trim: true }).line_count(width);
            u16::try_from(count).unwrap_or(u16::MAX)
        };
        let buttons = if alert.buttons.is_empty() {
            0
        } else if alert.appearance.number(attr::BUTTON_STROKE_WIDTH, theme) > 0.0 {
            3
        } else {
            1
        };
        Self {
            title: lines(&alert.title),
            message: lines(&alert.message),
            content: alert.content.as_ref().map_or(0, |c| c.height(width)),
            fields: u16::try_from(alert.fields.len()).unwrap_or(u16::MAX),
            buttons,
        }
    }

    fn sections(&self) -> [u16; 5] {
        [self.title, self.message, self.content, self.fields, self.buttons]
    }

    /// Height including one blank row between sections and one of padding
    /// above and below.
    fn total(&self) -> u16 {
        let present = self.sections().iter().filter(|&&h| h > 0).count();
        let gaps = u16::try_from(present.saturating_sub(1)).unwrap_or(0);
        self.sections()
            .iter()
            .fold(gaps.saturating_add(2), |acc, h| acc.saturating_add(*h))
    }
}

fn draw_surface(alert: &mut AlertView, metrics: &Metrics, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let appearance = &alert.appearance;
    let background = appearance.color(attr::BACKGROUND_COLOR, theme);
    buf.set_style(area, Style::default().bg(background));

    let block = Block::default()
        .borders(if appearance.number(attr::STROKE_WIDTH, theme) > 0.0 {
            Borders::ALL
        } else {
            Borders::NONE
        })
        .border_type(border_type(appearance, attr::STROKE_WIDTH, attr::CORNER_RADIUS, theme))
        .border_style(Style::default().fg(appearance.color(attr::STROKE_COLOR, theme)));
    let inner = block.inner(area);

    let gradation = appearance
        .number(attr::BACKGROUND_GRADATION, theme)
        .clamp(0.0, 1.0);
    if gradation > 0.0 {
        let band = Rect {
            y: inner.y + inner.height / 2,
            height: inner.height - inner.height / 2,
            ..inner
        };
        buf.set_style(band, Style::default().bg(shade(background, gradation)));
    }
    block.render(area, buf);

    let body = inner.inner(Margin::new(1, 1));
    let [title_area, message_area, content_area, fields_area, buttons_area] =
        section_areas(body, metrics);

    draw_text(
        &alert.title,
        title_area,
        buf,
        text_style(appearance, attr::TITLE_COLOR, attr::TITLE_FONT, theme),
        shadow(appearance, attr::TITLE_SHADOW_COLOR, attr::TITLE_SHADOW_OFFSET, theme),
        body,
    );
    draw_text(
        &alert.message,
        message_area,
        buf,
        text_style(appearance, attr::MESSAGE_COLOR, attr::MESSAGE_FONT, theme),
        shadow(appearance, attr::MESSAGE_SHADOW_COLOR, attr::MESSAGE_SHADOW_OFFSET, theme),
        body,
    );
    draw_fields(alert, fields_area, buf, theme);
    draw_buttons(alert, buttons_area, buf, theme);
    if let Some(content) = alert.content.as_mut() {
        content.render(content_area, buf, theme);
    }
}

/// Stack the non-empty sections inside `body` with one blank row between
/// each pair, clipped to `body`.
fn section_areas(body: Rect, metrics: &Metrics) -> [Rect; 5] {
    let mut areas = [Rect::default(); 5];
    let mut y = body.y;
    let mut first = true;
    for (slot, height) in areas.iter_mut().zip(metrics.sections()) {
        if height == 0 {
            *slot = Rect { y, height: 0, ..body };
            continue;
        }
        if !first {
            y = y.saturating_add(1);
        }
        first = false;
        *slot = Rect { y, height, ..body }.intersection(body);
        y = y.saturating_add(height);
    }
    areas
}

fn border_type(appearance: &Appearance, width: &str, radius: &str, theme: &Theme) -> BorderType {
    if appearance.number(width, theme) >= 2.0 {
        BorderType::Thick
    } else if appearance.number(radius, theme) > 0.0 {
        BorderType::Rounded
    } else {
        BorderType::Plain
    }
}

fn text_style(appearance: &Appearance, color: &str, font: &str, theme: &Theme) -> Style {
    Style::default()
        .fg(appearance.color(color, theme))
        .add_modifier(appearance.modifier(font, theme))
}

fn shadow(
    appearance: &Appearance,
    color: &str,
    offset: &str,
    theme: &Theme,
) -> Option<(Color, (i16, i16))> {
    let offset = appearance.offset(offset, theme);
    (offset != (0, 0)).then(|| (appearance.color(color, theme), offset))
}

/// Centered, wrapped text with an optional drop shadow clipped to `bounds`.
fn draw_text(
    text: &str,
    area: Rect,
    buf: &mut Buffer,
    style: Style,
    shadow: Option<(Color, (i16, i16))>,
    bounds: Rect,
) {
    if text.is_empty() || area.is_empty() {
        return;
    }
    let paragraph = |style: Style| {
        Paragraph::new(text)
            .style(style)
            .alignment(ratatui::layout::Alignment::Center)
            .wrap(Wrap { trim: true })
    };
    if let Some((color, (dx, dy))) = shadow {
        let shadow_area = shifted(area, dx, dy).intersection(bounds);
        if !shadow_area.is_empty() {
            paragraph(Style::default().fg(color)).render(shadow_area, buf);
        }
    }
    paragraph(style).render(area, buf);
}

fn shifted(area: Rect, dx: i16, dy: i16) -> Rect {
    let x = u16::try_from(i32::from(area.x) + i32::from(dx)).unwrap_or(0);
    let y = u16::try_from(i32::from(area.y) + i32::from(dy)).unwrap_or(0);
    Rect { x, y, ..area }
}

fn draw_fields(alert: &AlertView, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let appearance = &alert.appearance;
    let text = text_style(appearance, attr::TEXT_FIELD_TEXT_COLOR, attr::TEXT_FIELD_FONT, theme);
    let styles = FieldStyles {
        text,
        ..FieldStyles::from_theme(theme)
    };
    let field_bg = Style::default().bg(appearance.color(attr::BUTTON_BACKGROUND_COLOR, theme));

    for (entry, row) in alert.fields.iter().zip(area.rows()) {
        let focused = alert.focus == Focus::Field(entry.index);
        let handle = entry.handle();
        let value = handle.map(|h| alert.inputs.read_text(h)).unwrap_or_default();
        let cursor = handle
            .filter(|_| focused)
            .map(|h| alert.inputs.cursor(h).unwrap_or_else(|| value.chars().count()));
        let line = field_line(
            &value,
            cursor,
            &entry.descriptor.placeholder,
            entry.descriptor.secure,
            &styles,
        );
        buf.set_style(row, field_bg);
        let marker = if focused { "› " } else { "  " };
        let mut spans = vec![Span::styled(marker, Style::default().fg(styles.text.fg.unwrap_or(theme.text())))];
        spans.extend(line.spans);
        Line::from(spans).render(row, buf);
    }
}

fn draw_buttons(alert: &AlertView, area: Rect, buf: &mut Buffer, theme: &Theme) {
    if alert.buttons.is_empty() || area.is_empty() {
        return;
    }
    let appearance = &alert.appearance;
    let stroke = appearance.number(attr::BUTTON_STROKE_WIDTH, theme);
    let slots = Layout::horizontal(alert.buttons.iter().map(|_| Constraint::Fill(1)))
        .spacing(BUTTON_GAP)
        .split(area);

    for (button, slot) in alert.buttons.iter().zip(slots.iter()) {
        let highlighted = alert.focus == Focus::Button(button.index);
        let (background, font, color) = match (button.is_cancel, highlighted) {
            (true, false) => (
                attr::CANCEL_BUTTON_BACKGROUND_COLOR,
                attr::CANCEL_BUTTON_FONT,
                attr::CANCEL_BUTTON_TEXT_COLOR,
            ),
            (true, true) => (
                attr::CANCEL_BUTTON_BACKGROUND_COLOR,
                attr::CANCEL_BUTTON_FONT,
                attr::CANCEL_BUTTON_HIGHLIGHTED_TEXT_COLOR,
            ),
            (false, false) => (
                attr::BUTTON_BACKGROUND_COLOR,
                attr::BUTTON_FONT,
                attr::BUTTON_TEXT_COLOR,
            ),
            (false, true) => (
                attr::BUTTON_BACKGROUND_COLOR,
                attr::BUTTON_FONT,
                attr::BUTTON_HIGHLIGHTED_TEXT_COLOR,
            ),
        };

        let mut label_style = text_style(appearance, color, font, theme);
        if highlighted {
            label_style = label_style.add_modifier(Modifier::BOLD);
        }
        let mut block = Block::default().style(Style::default().bg(appearance.color(background, theme)));
        if stroke > 0.0 {
            let border_color = if highlighted {
                appearance.color(color, theme)
            } else {
                appearance.color(attr::BUTTON_STROKE_COLOR, theme)
            };
            block = block
                .borders(Borders::ALL)
                .border_type(if stroke >= 2.0 {
                    BorderType::Thick
                } else {
                    BorderType::Rounded
                })
                .border_style(Style::default().fg(border_color));
        }

        Paragraph::new(Line::styled(button.label.clone(), label_style))
            .alignment(ratatui::layout::Alignment::Center)
            .block(block)
            .render(*slot, buf);
    }
}

/// Darken an RGB colour by up to half. Other colours are returned unchanged.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shade(color: Color, amount: f64) -> Color {
    let Color::Rgb(r, g, b) = color else {
        return color;
    };
    let factor = 1.0 - 0.5 * amount.clamp(0.0, 1.0);
    let scale = |c: u8| (f64::from(c) * factor).round() as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::alert::ContentView;
    use crate::animation::AnimationKind;
    use crate::appearance::AppearanceStore;
    use crate::overlay::Overlay;
    use crate::ui::Component;

    fn area() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    fn delete_alert(overlay: &Overlay) -> AlertView {
        let mut alert =
            AlertView::in_host("Delete?", "This cannot be undone.", overlay, &AppearanceStore::new());
        alert.add_cancel_button("Cancel").unwrap();
        alert.add_button("Delete").unwrap();
        alert
    }

    fn visible(alert: &mut AlertView) {
        alert.show().unwrap();
        alert.advance(Duration::from_secs(5));
    }

    fn draw(alert: &mut AlertView) -> Buffer {
        let mut buf = Buffer::empty(area());
        render(alert, area(), &mut buf, &Theme::default());
        buf
    }

    /// Top-left cell of the first occurrence of `needle`, one char per cell.
    fn find(buf: &Buffer, needle: &str) -> Option<(u16, u16)> {
        let chars: Vec<String> = needle.chars().map(String::from).collect();
        let area = buf.area;
        (area.top()..area.bottom())
            .flat_map(|y| (area.left()..area.right()).map(move |x| (x, y)))
            .find(|&(x, y)| {
                chars
                    .iter()
                    .zip(x..area.right())
                    .filter(|(c, cx)| buf[(*cx, y)].symbol() == c.as_str())
                    .count()
                    == chars.len()
            })
    }

    #[test]
    fn test_unpresented_alert_draws_nothing() {
        let overlay = Overlay::new();
        let mut alert = delete_alert(&overlay);
        assert_eq!(draw(&mut alert), Buffer::empty(area()));
    }

    #[test]
    fn test_visible_alert_is_centered() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let mut alert = delete_alert(&overlay);
        visible(&mut alert);
        let buf = draw(&mut alert);

        let (title_x, title_y) = find(&buf, "Delete?").unwrap();
        // 48 wide surface at x = 16, body starts two cells in.
        assert_eq!(title_x, 18 + (44 - 7) / 2);
        assert_eq!(find(&buf, "╭"), Some((16, title_y - 2)));
        assert!(find(&buf, "This cannot be undone.").is_some());
        assert!(find(&buf, "Cancel").is_some());
    }

    #[test]
    fn test_zero_stroke_width_drops_borders() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let mut alert = delete_alert(&overlay);
        alert.set_appearance_override(attr::STROKE_WIDTH, 0.0);
        alert.set_appearance_override(attr::BUTTON_STROKE_WIDTH, 0.0);
        visible(&mut alert);
        let buf = draw(&mut alert);

        assert!(find(&buf, "╭").is_none());
        assert!(find(&buf, "│").is_none());
        assert!(find(&buf, "Delete?").is_some());
    }

    #[test]
    fn test_title_shadow_is_offset() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let mut alert = delete_alert(&overlay);
        alert.set_appearance_override(attr::TITLE_SHADOW_OFFSET, (1_i16, 1_i16));
        alert.set_appearance_override(attr::TITLE_SHADOW_COLOR, Color::Yellow);
        visible(&mut alert);
        let buf = draw(&mut alert);

        let (x, y) = find(&buf, "Delete?").unwrap();
        let shadow = &buf[(x + 1, y + 1)];
        assert_eq!(shadow.symbol(), "D");
        assert_eq!(shadow.fg, Color::Yellow);
    }

    #[test]
    fn test_darkened_backdrop_covers_frame() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let theme = Theme::default();

        let mut plain = delete_alert(&overlay);
        visible(&mut plain);
        assert_eq!(draw(&mut plain)[(0, 0)].bg, Color::Reset);
        plain.hide().unwrap();
        plain.advance(Duration::ZERO);

        let mut dark = delete_alert(&overlay);
        dark.set_darken_background(true);
        visible(&mut dark);
        assert_eq!(draw(&mut dark)[(0, 0)].bg, theme.crust());
    }

    #[test]
    fn test_backdrop_is_fixed_when_shown() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let theme = Theme::default();
        let mut alert = delete_alert(&overlay);
        alert.set_darken_background(true);
        visible(&mut alert);
        alert.set_darken_background(false);

        assert_eq!(draw(&mut alert)[(0, 0)].bg, theme.crust());
    }

    #[test]
    fn test_fade_entry_starts_invisible() {
        let overlay = Overlay::new();
        let mut alert = delete_alert(&overlay);
        alert.set_darken_background(true);
        alert.show_with_animation(AnimationKind::Fade).unwrap();
        assert_eq!(draw(&mut alert), Buffer::empty(area()));
    }

    #[test]
    fn test_slide_entry_starts_offset_by_its_width() {
        let overlay = Overlay::new();
        let mut alert = delete_alert(&overlay);
        alert.show_with_animation(AnimationKind::SlideLeft).unwrap();
        let buf = draw(&mut alert);

        let (x, _) = find(&buf, "╭").unwrap();
        assert_eq!(x, 16 + 48);
        assert!(find(&buf, "Delete?").is_none());
    }

    struct Badge;

    impl ContentView for Badge {
        fn height(&self, _width: u16) -> u16 {
            1
        }

        fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
            buf.set_string(area.x, area.y, "[badge]", Style::default().fg(theme.yellow()));
        }
    }

    #[test]
    fn test_content_view_gets_its_own_row() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let mut alert = delete_alert(&overlay);
        alert.set_content_view(Box::new(Badge));
        visible(&mut alert);
        let buf = draw(&mut alert);

        let (_, message_y) = find(&buf, "This cannot be undone.").unwrap();
        let (_, badge_y) = find(&buf, "[badge]").unwrap();
        assert_eq!(badge_y, message_y + 2);
    }

    #[test]
    fn test_focused_field_through_terminal() {
        let overlay = Overlay::new().with_reduced_motion(true);
        let mut alert = AlertView::in_host("Sign in", "", &overlay, &AppearanceStore::new());
        alert.add_field("Username", false).unwrap();
        alert.add_field("Password", true).unwrap();
        alert.add_button("OK").unwrap();
        visible(&mut alert);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                alert.render(frame, area, &Theme::default());
            })
            .unwrap();
        let buf = terminal.backend().buffer();

        let (_, username_y) = find(buf, "Username").unwrap();
        let (_, password_y) = find(buf, "Password").unwrap();
        assert_eq!(password_y, username_y + 1);
        assert_eq!(find(buf, "›").map(|(_, y)| y), Some(username_y));
    }
}
