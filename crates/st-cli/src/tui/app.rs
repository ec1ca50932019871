//! Timeline app state and the terminal event loop.

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::*};

use st_core::{Action, DayContent, MetadataLookup, TimelineSession, UsageSource, ViewState};

use crate::commands::util;

/// Pixels of timeline represented by one terminal row.
pub const ROW_PX: f64 = 20.0;

/// Rows moved by one mouse wheel notch.
const WHEEL_ROWS: f64 = 3.0;

/// Converts a pixel offset to whole terminal rows.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "offsets are clamped non-negative and far below usize::MAX"
)]
pub fn px_to_rows(px: f64) -> usize {
    (px.max(0.0) / ROW_PX).floor() as usize
}

/// Top of a terminal row, in timeline pixels.
#[expect(clippy::cast_precision_loss, reason = "row counts are tiny")]
pub fn rows_to_px(rows: usize) -> f64 {
    rows as f64 * ROW_PX
}

pub struct App<'r, S, L> {
    session: TimelineSession<'r, S, L>,
    /// Scroll offset of the grid, in timeline pixels.
    scroll_px: f64,
    /// Rows available to the grid at the last draw.
    viewport_rows: u16,
    /// Grid row under the mouse pointer, relative to the viewport.
    hover_row: Option<u16>,
    today: NaiveDate,
    running: bool,
}

impl<'r, S: UsageSource, L: MetadataLookup> App<'r, S, L> {
    pub const fn new(session: TimelineSession<'r, S, L>, today: NaiveDate) -> Self {
        Self {
            session,
            scroll_px: 0.0,
            viewport_rows: 0,
            hover_row: None,
            today,
            running: true,
        }
    }

    pub const fn state(&self) -> &ViewState {
        self.session.state()
    }

    pub const fn content(&self) -> &DayContent {
        self.session.content()
    }

    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn scroll_px(&self) -> f64 {
        self.scroll_px
    }

    /// First grid row in view.
    pub fn scroll_row(&self) -> usize {
        px_to_rows(self.scroll_px)
    }

    /// Grid row under the pointer, counted from the top of the grid content.
    pub fn hovered_row(&self) -> Option<usize> {
        self.hover_row.map(|row| self.scroll_row() + usize::from(row))
    }

    /// Records the pointer position relative to the top of the grid.
    pub const fn set_hover(&mut self, row: Option<u16>) {
        self.hover_row = row;
    }

    /// Records the grid height the UI had room for.
    pub fn set_viewport_rows(&mut self, rows: u16) {
        self.viewport_rows = rows;
        self.clamp_scroll();
    }

    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let mut needs_redraw = true;
        while self.running {
            if needs_redraw {
                terminal.draw(|frame| super::ui::render(frame, self))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            self.today = util::today();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    self.handle_key(key.code, key.modifiers);
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    let ctrl = mouse.modifiers.contains(KeyModifiers::CONTROL);
                    match mouse.kind {
                        MouseEventKind::ScrollUp => self.handle_wheel(true, ctrl),
                        MouseEventKind::ScrollDown => self.handle_wheel(false, ctrl),
                        MouseEventKind::Moved => {
                            let area = terminal.get_frame().area();
                            self.set_hover(super::ui::grid_row(area, mouse.row));
                        }
                        _ => continue,
                    }
                    needs_redraw = true;
                }
                Event::Resize(..) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match key {
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('h') | KeyCode::Left => self.navigate(Action::PreviousDay),
            KeyCode::Char('l') | KeyCode::Right => self.navigate(Action::NextDay),
            KeyCode::Char('t') => self.navigate(Action::Today { today: self.today }),
            KeyCode::Char('+' | '=') => self.zoom(Action::ZoomIn),
            KeyCode::Char('-') => self.zoom(Action::ZoomOut),
            KeyCode::Char('0') => self.zoom(Action::ResetZoom),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(ROW_PX),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-ROW_PX),
            KeyCode::PageDown => self.scroll_by(self.client_px()),
            KeyCode::PageUp => self.scroll_by(-self.client_px()),
            KeyCode::Char('r') => {
                self.session.dispatch(Action::Refresh);
                self.clamp_scroll();
            }
            _ => {}
        }
    }

    /// Wheel up zooms in with Ctrl held and scrolls up otherwise.
    pub fn handle_wheel(&mut self, up: bool, ctrl: bool) {
        match (ctrl, up) {
            (true, true) => self.zoom(Action::ZoomIn),
            (true, false) => self.zoom(Action::ZoomOut),
            (false, true) => self.scroll_by(-WHEEL_ROWS * ROW_PX),
            (false, false) => self.scroll_by(WHEEL_ROWS * ROW_PX),
        }
    }

    fn navigate(&mut self, action: Action) {
        self.session.dispatch(action);
        self.scroll_px = 0.0;
    }

    fn zoom(&mut self, action: Action) {
        // The grid has one extra row below the last hour for the 24:00 label.
        self.scroll_px =
            self.session
                .zoom_anchored(action, self.scroll_px, self.client_px(), ROW_PX);
        self.clamp_scroll();
    }

    fn scroll_by(&mut self, delta_px: f64) {
        self.scroll_px += delta_px;
        self.clamp_scroll();
    }

    fn client_px(&self) -> f64 {
        f64::from(self.viewport_rows) * ROW_PX
    }

    /// Scrollable height of the grid, zero when no grid is shown.
    fn content_px(&self) -> f64 {
        match self.session.content() {
            DayContent::Loaded(day) => day.height_px + ROW_PX,
            DayContent::Empty | DayContent::Failed(_) => 0.0,
        }
    }

    fn clamp_scroll(&mut self) {
        let max_scroll = (self.content_px() - self.client_px()).max(0.0);
        self.scroll_px = self.scroll_px.clamp(0.0, max_scroll);
    }
}
