//! Application core: event loop, key routing and action dispatch.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use traefiktop_core::{DataHook, IgnorePatterns, SortMode};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screens::routers::RoutersScreen;
use crate::theme;
use crate::tui::Tui;

/// How the list view starts out.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub ignore: IgnorePatterns,
    pub sort: SortMode,
    /// Shown in the frame title, usually the admin API URL.
    pub title: String,
}

/// Top-level application state and event loop.
pub struct App {
    hook: Arc<dyn DataHook>,
    screen: Box<dyn Component>,
    title: String,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(hook: Arc<dyn DataHook>, options: ViewOptions) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            hook,
            screen: Box::new(RoutersScreen::new(options.ignore, options.sort)),
            title: options.title,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
        }
    }

    /// Run until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        tokio::spawn(spawn_data_bridge(
            Arc::clone(&self.hook),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::new(Duration::from_millis(33));

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize | Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.data_cancel.cancel();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key to an action. The help overlay and an active search
    /// field take keys before the global shortcuts do.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if self.screen.capturing_input() {
            return self.screen.handle_key_event(key);
        }

        match key.code {
            KeyCode::Char('q') => Ok(Some(Action::Quit)),
            KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
            _ => self.screen.handle_key_event(key),
        }
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Refresh => {
                debug!("manual refresh requested");
                self.hook.refresh();
            }
            Action::Render => {}
            Action::SnapshotUpdated(_) => {
                if let Some(follow_up) = self.screen.update(action)? {
                    self.action_tx.send(follow_up)?;
                }
            }
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let title = if self.title.is_empty() {
            " traefiktop ".to_owned()
        } else {
            format!(" traefiktop · {} ", self.title)
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.screen.render(frame, inner);

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(
        area,
        52.min(area.width.saturating_sub(4)),
        19.min(area.height.saturating_sub(2)),
    );
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Navigation", theme::title_style())),
        entry("j/k ↑/↓", "Move up / down"),
        entry("Ctrl+d/u", "Page down / up"),
        entry("gg / G", "Top / bottom"),
        entry("Home/End", "Top / bottom"),
        Line::from(""),
        Line::from(Span::styled("  Actions", theme::title_style())),
        entry("/", "Search name, rule, service"),
        entry("Esc", "Clear search"),
        entry("s / S", "Toggle sort (dead / name)"),
        entry("r", "Refresh now"),
        entry("?", "This help"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("          Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
