use std::fmt;
use std::sync::Arc;

use alertkit::config::{AlertAction, AlertConfig, GlobalAction, KeyResolver};
use alertkit::ui::{Component, EventResultExt};
use alertkit::{AlertEvent, AlertView, AnimationKind, ContentView, Overlay, PresentationState, Theme};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::cli::Args;
use crate::tui::{Event, Tui};

const BACKGROUND: &str = "Alerts draw on top of whatever the application renders. \
    Pick a scenario below; the alert takes over the keyboard until it is dismissed. \
    Tab and the arrow keys move between fields and buttons, Enter presses the focused \
    button and Esc activates the cancel button.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    Animation(AnimationKind),
    SignIn,
    Delete,
    Progress,
}

const SCENARIOS: [(char, Scenario); 10] = [
    ('1', Scenario::Animation(AnimationKind::Default)),
    ('2', Scenario::Animation(AnimationKind::Fade)),
    ('3', Scenario::Animation(AnimationKind::FlipHorizontal)),
    ('4', Scenario::Animation(AnimationKind::FlipVertical)),
    ('5', Scenario::Animation(AnimationKind::Tumble)),
    ('6', Scenario::Animation(AnimationKind::SlideLeft)),
    ('7', Scenario::Animation(AnimationKind::SlideRight)),
    ('8', Scenario::SignIn),
    ('9', Scenario::Delete),
    ('0', Scenario::Progress),
];

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animation(kind) => write!(f, "{kind} animation"),
            Self::SignIn => f.write_str("sign-in form"),
            Self::Delete => f.write_str("delete confirmation"),
            Self::Progress => f.write_str("progress notice"),
        }
    }
}

impl Scenario {
    fn build(self, command_tx: &UnboundedSender<Command>) -> alertkit::Result<AlertView> {
        let mut alert = match self {
            Self::Animation(kind) => AlertView::with_buttons(
                kind.to_string(),
                "Alerts can enter and leave in several ways. Press Enter to close this one.",
                None,
                ["OK"],
            )?,
            Self::SignIn => {
                let mut alert = AlertView::with_buttons(
                    "Sign in",
                    "Enter your credentials to continue.",
                    Some("Cancel"),
                    ["Sign in"],
                )?;
                alert.add_field("Username", false)?;
                alert.add_field("Password", true)?;
                alert
            }
            Self::Delete => AlertView::with_buttons(
                "Delete 3 files?",
                "They will be removed permanently. This cannot be undone.",
                Some("Keep"),
                ["Delete"],
            )?,
            Self::Progress => {
                let mut alert =
                    AlertView::new("Syncing", "Uploading changes. Press Enter to hide this notice.");
                alert.set_content_view(Box::new(ProgressMeter { ratio: 0.62 }));
                alert
            }
        };

        let command_tx = command_tx.clone();
        alert.set_handler(move |index, alert| {
            let label = alert
                .buttons()
                .get(index)
                .map(|button| button.label.clone())
                .unwrap_or_default();
            let fields = (0..alert.fields().len())
                .filter_map(|i| alert.text_at(i).ok())
                .collect();
            let _ = command_tx.send(Command::Answered {
                scenario: self,
                label,
                fields,
            });
        });
        Ok(alert)
    }
}

struct ProgressMeter {
    ratio: f64,
}

impl ContentView for ProgressMeter {
    fn height(&self, _width: u16) -> u16 {
        1
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        Gauge::default()
            .ratio(self.ratio)
            .gauge_style(Style::default().fg(theme.blue()).bg(theme.surface0()))
            .render(area, buf);
    }
}

#[derive(Debug)]
enum Command {
    Quit,
    Suspend,
    Tick,
    Render,
    Resize(u16, u16),
    Open(Scenario),
    Presented(Scenario),
    Answered {
        scenario: Scenario,
        label: String,
        fields: Vec<String>,
    },
    ToggleReducedMotion,
}

pub struct App {
    alert: Option<AlertView>,
    status: String,
    animation: Option<AnimationKind>,
    darken: bool,
    blur: bool,
    overlay: Overlay,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    should_quit: bool,
    should_suspend: bool,
    command_tx: UnboundedSender<Command>,
    command_rx: UnboundedReceiver<Command>,
}

impl App {
    pub fn new(resolver: Arc<KeyResolver>, theme: Theme, config: &AlertConfig, args: &Args) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            alert: None,
            status: "Pick a scenario".to_string(),
            animation: args.animation,
            darken: args.darken || config.darken_background,
            blur: args.blur || config.blur_background,
            overlay: Overlay::global(),
            resolver,
            theme,
            should_quit: false,
            should_suspend: false,
            command_tx,
            command_rx,
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(60.0, 60.0)?;
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_commands(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Quit => self.command_tx.send(Command::Quit)?,
            Event::Suspend => self.command_tx.send(Command::Suspend)?,
            Event::Tick => self.command_tx.send(Command::Tick)?,
            Event::Render => self.command_tx.send(Command::Render)?,
            Event::Resize(width, height) => self.command_tx.send(Command::Resize(width, height))?,
            Event::Key(key) => self.handle_key(key)?,
            Event::Error(error) => warn!("Terminal event error: {error}"),
            Event::Init => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> color_eyre::Result<()> {
        if let Some(alert) = self.alert.as_mut() {
            let (consumed, event) = alert.handle_key(key).process();
            if event == Some(AlertEvent::Dismissed) {
                self.status = "Notice dismissed".to_string();
            }
            if consumed {
                return Ok(());
            }
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.command_tx.send(Command::Quit)?;
        } else if self
            .resolver
            .matches_global(&key, GlobalAction::ToggleReducedMotion)
        {
            self.command_tx.send(Command::ToggleReducedMotion)?;
        } else if let KeyCode::Char(c) = key.code
            && let Some((_, scenario)) = SCENARIOS.iter().find(|(k, _)| *k == c)
        {
            self.command_tx.send(Command::Open(*scenario))?;
        }
        Ok(())
    }

    fn handle_commands(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        while let Ok(command) = self.command_rx.try_recv() {
            if !matches!(command, Command::Tick | Command::Render) {
                debug!(?command, "Handling command");
            }

            match command {
                Command::Quit => self.should_quit = true,
                Command::Suspend => self.should_suspend = true,
                Command::Tick => self.tick(),
                Command::Render => self.render(tui)?,
                Command::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                Command::Open(scenario) => self.open(scenario),
                Command::Presented(scenario) => self.status = format!("Showing the {scenario}"),
                Command::Answered {
                    scenario,
                    label,
                    fields,
                } => self.status = answer(scenario, &label, &fields),
                Command::ToggleReducedMotion => {
                    let reduced = !self.overlay.reduced_motion();
                    self.overlay.set_reduced_motion(reduced);
                    self.status = format!("Reduced motion {}", if reduced { "on" } else { "off" });
                    info!(reduced, "Toggled reduced motion");
                }
            }
        }
        Ok(())
    }

    fn tick(&mut self) {
        if let Some(alert) = self.alert.as_mut() {
            alert.handle_tick();
            if alert.state() == PresentationState::Dismissed {
                self.alert = None;
            }
        }
    }

    fn open(&mut self, scenario: Scenario) {
        if self.alert.is_some() {
            return;
        }
        let animation = match scenario {
            Scenario::Animation(kind) => kind,
            _ => self.animation.unwrap_or_default(),
        };
        let command_tx = self.command_tx.clone();
        let shown = scenario.build(&self.command_tx).and_then(|alert| {
            let mut alert = alert.with_key_resolver(Arc::clone(&self.resolver));
            alert.set_darken_background(self.darken);
            alert.set_blur_background(self.blur);
            alert.show_with_animation_and_completion(animation, move || {
                let _ = command_tx.send(Command::Presented(scenario));
            })?;
            Ok(alert)
        });
        match shown {
            Ok(alert) => self.alert = Some(alert),
            Err(e) => {
                warn!("Failed to open the {scenario}: {e}");
                self.status = format!("Could not open the {scenario}: {e}");
            }
        }
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let theme = self.theme;
        frame.buffer_mut().set_style(area, Style::default().bg(theme.base()));

        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Line::styled(
                " alertkit showcase",
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            ),
            header,
        );

        let mut lines = vec![
            Line::styled(BACKGROUND, Style::default().fg(theme.subtext0())),
            Line::default(),
        ];
        lines.extend(SCENARIOS.iter().map(|(key, scenario)| {
            Line::from(vec![
                Span::styled(format!(" {key} "), Style::default().fg(theme.yellow())),
                Span::styled(scenario.to_string(), Style::default().fg(theme.text())),
            ])
        }));
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.surface1()))
                    .title(" Scenarios "),
            ),
            body,
        );

        let hints = format!(
            "{} quit · {} reduced motion · {}/{} move · {} press · {} cancel",
            self.resolver.display_global(GlobalAction::Quit),
            self.resolver.display_global(GlobalAction::ToggleReducedMotion),
            self.resolver.display_alert(AlertAction::Next),
            self.resolver.display_alert(AlertAction::Right),
            self.resolver.display_alert(AlertAction::Activate),
            self.resolver.display_alert(AlertAction::Cancel),
        );
        let [status, help] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(footer);
        frame.render_widget(
            Line::styled(format!(" {}", self.status), Style::default().fg(theme.green())),
            status,
        );
        frame.render_widget(
            Line::styled(hints, Style::default().fg(theme.overlay0())).right_aligned(),
            help,
        );

        if let Some(alert) = self.alert.as_mut() {
            alert.render(frame, area, &theme);
        }
    }
}

fn answer(scenario: Scenario, label: &str, fields: &[String]) -> String {
    match (scenario, fields.first()) {
        (Scenario::SignIn, Some(user)) if label == "Sign in" => {
            if user.is_empty() {
                "Signed in anonymously".to_string()
            } else {
                format!("Signed in as {user}")
            }
        }
        _ => format!("{label} ({scenario})"),
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    #[test]
    fn test_sign_in_reports_username() {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let overlay = Overlay::global();
        overlay.set_reduced_motion(true);

        let mut alert = Scenario::SignIn.build(&command_tx).unwrap();
        alert.show().unwrap();
        alert.advance(std::time::Duration::ZERO);
        for c in "ada".chars() {
            alert
                .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
        alert.activate_button(1).unwrap();
        alert.advance(std::time::Duration::ZERO);

        let Ok(Command::Answered {
            scenario,
            label,
            fields,
        }) = command_rx.try_recv()
        else {
            panic!("expected an answer");
        };
        assert_eq!(answer(scenario, &label, &fields), "Signed in as ada");
    }

    #[test]
    fn test_answer_names_the_button() {
        assert_eq!(
            answer(Scenario::Delete, "Keep", &[]),
            "Keep (delete confirmation)"
        );
    }
}
