//! Routers screen: searchable router table with live status and a detail
//! panel for the selected router.
//!
//! Two input modes. In Browse, keys are commands. In Search, printable keys
//! edit the query; `Esc`/`Enter` return to Browse with the query kept, and
//! `Esc` in Browse clears it.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use traefiktop_core::{
    IgnorePatterns, Router, RouterHealth, ServerHealth, ServiceStatus, Snapshot, SortMode,
    derive_rows, router_health,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

/// Rows moved by PageUp/PageDown and Ctrl+u/Ctrl+d.
const PAGE: isize = 10;
const DETAIL_HEIGHT: u16 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Browse,
    Search,
}

struct RouterRow {
    router: Arc<Router>,
    health: RouterHealth,
}

pub struct RoutersScreen {
    snapshot: Snapshot,
    rows: Vec<RouterRow>,
    ignore: IgnorePatterns,
    sort: SortMode,
    mode: InputMode,
    query: String,
    table_state: TableState,
    /// First `g` of a `gg` chord was pressed.
    pending_g: bool,
}

impl RoutersScreen {
    pub fn new(ignore: IgnorePatterns, sort: SortMode) -> Self {
        Self {
            snapshot: Snapshot::default(),
            rows: Vec::new(),
            ignore,
            sort,
            mode: InputMode::Browse,
            query: String::new(),
            table_state: TableState::default(),
            pending_g: false,
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_row(&self) -> Option<&RouterRow> {
        self.rows.get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        if self.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(self.rows.len() - 1)));
        }
    }

    fn select_last(&mut self) {
        self.select(self.rows.len().saturating_sub(1));
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        self.select(self.selected_index().saturating_add_signed(delta));
    }

    /// Re-derive rows from the snapshot. Query and sort edits move the
    /// selection to the top; data refreshes only clamp it.
    fn recompute(&mut self, reset_selection: bool) {
        let services = &self.snapshot.services;
        self.rows = derive_rows(
            &self.snapshot.routers,
            services,
            &self.ignore,
            &self.query,
            self.sort,
        )
        .into_iter()
        .map(|router| {
            let health = router_health(&router, services);
            RouterRow { router, health }
        })
        .collect();

        let target = if reset_selection { 0 } else { self.selected_index() };
        self.select(target);
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.mode = InputMode::Browse;
                self.select(0);
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    self.recompute(true);
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.push(c);
                self.recompute(true);
            }
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Action> {
        let chord = std::mem::take(&mut self.pending_g);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('d') if ctrl => self.move_selection(PAGE),
            KeyCode::Char('u') if ctrl => self.move_selection(-PAGE),
            KeyCode::Char('r' | 'R') => return Some(Action::Refresh),
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(PAGE),
            KeyCode::PageUp => self.move_selection(-PAGE),
            KeyCode::Char('g') if chord => self.select(0),
            KeyCode::Char('g') => self.pending_g = true,
            KeyCode::Home => self.select(0),
            KeyCode::Char('G') | KeyCode::End => self.select_last(),
            KeyCode::Char('s' | 'S') => {
                self.sort = self.sort.toggle();
                self.recompute(true);
            }
            KeyCode::Esc if !self.query.is_empty() => {
                self.query.clear();
                self.recompute(true);
            }
            _ => {}
        }
        None
    }

    // ── Rendering ───────────────────────────────────────────────

    fn render_search_line(&self, frame: &mut Frame, area: Rect) {
        let line = match self.mode {
            InputMode::Search => Line::from(vec![
                Span::styled("🔍 /", theme::search_active()),
                Span::styled(self.query.clone(), theme::search_active()),
                Span::styled("▎", theme::search_active()),
                Span::styled("   Enter/Esc done", theme::key_hint()),
            ]),
            InputMode::Browse if !self.query.is_empty() => Line::from(vec![
                Span::styled("🔍 filter: ", theme::label()),
                Span::styled(self.query.clone(), theme::search_active()),
                Span::styled("   / edit  Esc clear", theme::key_hint()),
            ]),
            InputMode::Browse => Line::from(Span::styled("🔍 Press / to search", theme::key_hint())),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_count_line(&self, frame: &mut Frame, area: Rect) {
        let down = self
            .rows
            .iter()
            .filter(|r| r.health.status == ServiceStatus::Down)
            .count();
        let mut spans = vec![Span::styled(
            format!("{} routers", self.rows.len()),
            theme::title_style(),
        )];
        if down > 0 {
            spans.push(Span::styled(
                format!("  {down} down"),
                theme::status_style(ServiceStatus::Down),
            ));
        }
        spans.push(Span::styled(format!("  sort: {}", self.sort), theme::key_hint()));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec![
            Cell::from("Status").style(theme::table_header()),
            Cell::from("Name").style(theme::table_header()),
            Cell::from("Rule").style(theme::table_header()),
            Cell::from("Service").style(theme::table_header()),
            Cell::from("Entrypoints").style(theme::table_header()),
        ]);

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                let status = row.health.status;
                let service = row
                    .health
                    .active
                    .as_ref()
                    .map_or_else(|| row.router.service.clone(), |s| s.name.clone());
                Row::new(vec![
                    Cell::from(format!("{} {status}", theme::status_icon(status)))
                        .style(theme::status_style(status)),
                    Cell::from(row.router.name.clone()),
                    Cell::from(row.router.rule.clone()),
                    Cell::from(service),
                    Cell::from(row.router.entry_points.join(", ")),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Percentage(25),
            Constraint::Min(20),
            Constraint::Percentage(20),
            Constraint::Length(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸");

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let router = &row.router;

        let block = Block::default()
            .title(format!(" {} ", router.name))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let dash = || "—".to_owned();
        let join_or_dash = |items: &[String]| {
            if items.is_empty() { dash() } else { items.join(", ") }
        };
        let field = |name: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("{name:<13}"), theme::label()),
                Span::styled(value, theme::value()),
            ])
        };

        let active = row.health.active.as_deref();
        let service_line = Line::from(vec![
            Span::styled(format!("{:<13}", "Service"), theme::label()),
            Span::styled(router.service.clone(), theme::value()),
            Span::styled(" → ", theme::label()),
            Span::styled(
                active.map_or_else(dash, |s| s.name.clone()),
                theme::status_style(row.health.status),
            ),
            Span::styled(format!("  ({} up)", row.health.alive), theme::label()),
        ]);

        let servers: Vec<Span> = active
            .map(|svc| {
                svc.servers
                    .iter()
                    .map(|url| {
                        let style = match svc.server_health(url) {
                            Some(ServerHealth::Up) => theme::status_style(ServiceStatus::Up),
                            Some(ServerHealth::Down) => theme::status_style(ServiceStatus::Down),
                            None => theme::value(),
                        };
                        Span::styled(format!("{url}  "), style)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let mut servers_line = vec![Span::styled(format!("{:<13}", "Servers"), theme::label())];
        if servers.is_empty() {
            servers_line.push(Span::styled(dash(), theme::value()));
        } else {
            servers_line.extend(servers);
        }

        let lines = vec![
            field("Rule", router.rule.clone()),
            service_line,
            field(
                "Config",
                format!(
                    "{} · provider {} · priority {}",
                    router.status,
                    if router.provider.is_empty() { "—" } else { router.provider.as_str() },
                    router.priority
                ),
            ),
            field("Entrypoints", join_or_dash(&router.entry_points)),
            field("Middlewares", join_or_dash(&router.middlewares)),
            field("TLS", router.tls.clone().unwrap_or_else(dash)),
            Line::from(servers_line),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let [hints_area, age_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(28)]).areas(area);

        let hints = Line::from(vec![
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled("/ ", theme::key_hint_key()),
            Span::styled("search  ", theme::key_hint()),
            Span::styled("s ", theme::key_hint_key()),
            Span::styled("sort  ", theme::key_hint()),
            Span::styled("j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("? ", theme::key_hint_key()),
            Span::styled("help  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);

        let mut age = self
            .snapshot
            .data_age()
            .map(|age| {
                let secs = age.to_std().unwrap_or_default().as_secs();
                format!("updated {} ago", humantime::format_duration(Duration::from_secs(secs)))
            })
            .unwrap_or_default();
        if self.snapshot.loading {
            age.insert_str(0, "⟳ ");
        }
        frame.render_widget(
            Paragraph::new(Span::styled(age, theme::key_hint())).alignment(Alignment::Right),
            age_area,
        );
    }
}

impl Component for RoutersScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.mode {
            InputMode::Search => {
                self.handle_search_key(key);
                None
            }
            InputMode::Browse => self.handle_browse_key(key),
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnapshotUpdated(snapshot) = action {
            self.snapshot = snapshot.clone();
            self.recompute(false);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.snapshot.has_data() {
            if let Some(ref err) = self.snapshot.error {
                frame.render_widget(
                    Paragraph::new(Span::styled(format!("Error: {err}"), theme::error_text())),
                    area,
                );
                return;
            }
            if self.snapshot.loading {
                frame.render_widget(
                    Paragraph::new(Span::styled("Loading...", theme::key_hint())),
                    area,
                );
                return;
            }
        }

        let banner_height = u16::from(self.snapshot.error.is_some());
        let detail_height = if self.rows.is_empty() { 0 } else { DETAIL_HEIGHT };
        let [search_area, count_area, banner_area, table_area, detail_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(banner_height),
                Constraint::Min(3),
                Constraint::Length(detail_height),
                Constraint::Length(1),
            ])
            .areas(area);

        self.render_search_line(frame, search_area);
        self.render_count_line(frame, count_area);

        if let Some(ref err) = self.snapshot.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" Error: {err} · showing last successful data "),
                    theme::error_banner(),
                )),
                banner_area,
            );
        }

        self.render_table(frame, table_area);
        self.render_detail(frame, detail_area);
        self.render_footer(frame, footer_area);
    }

    fn capturing_input(&self) -> bool {
        self.mode == InputMode::Search
    }
}
