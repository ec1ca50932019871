//! Timeline rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use st_core::timeline::date_label;
use st_core::{
    DayContent, DayTimeline, Hsl, MetadataLookup, TimelineBlock, UsageSource, format_minutes,
};

use super::app::{App, ROW_PX, px_to_rows, rows_to_px};

const GUTTER_WIDTH: u16 = 6;

fn key_style() -> Style {
    Style::default().bg(Color::DarkGray)
}

fn rgb(color: Hsl) -> Color {
    let (r, g, b) = color.to_rgb();
    Color::Rgb(r, g, b)
}

/// Header, summary bar, grid, footer.
fn areas(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(2), // Summary bar
            Constraint::Min(1),    // Grid
            Constraint::Length(1), // Footer
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

/// Maps a terminal row to a row of the visible grid.
pub fn grid_row(area: Rect, y: u16) -> Option<u16> {
    let grid = areas(area)[2];
    (y >= grid.y && y < grid.y + grid.height).then(|| y - grid.y)
}

pub fn render<S: UsageSource, L: MetadataLookup>(frame: &mut Frame, app: &mut App<'_, S, L>) {
    let [header, summary, grid, footer] = areas(frame.area());
    app.set_viewport_rows(grid.height);

    render_header(frame, app, header);
    match app.content() {
        DayContent::Loaded(day) => {
            render_summary(frame, day, summary);
            render_grid(frame, day, app.scroll_row(), grid);
        }
        DayContent::Empty => {
            let text = Paragraph::new("No Screen Time data for this day.")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(text, grid);
        }
        DayContent::Failed(message) => {
            let text = Paragraph::new(format!("Error: {message}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: false });
            frame.render_widget(text, grid);
        }
    }
    render_footer(frame, app, footer);
}

fn render_header<S: UsageSource, L: MetadataLookup>(
    frame: &mut Frame,
    app: &App<'_, S, L>,
    area: Rect,
) {
    let state = app.state();
    let mut spans = vec![
        Span::styled(" ◀ ", key_style()),
        Span::styled(
            format!(" {} ", date_label(state.current_date)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▶ ", key_style()),
    ];
    if !state.is_today(app.today()) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(" Today ", key_style()));
    }
    spans.push(Span::raw("   "));
    spans.push(Span::styled(" − ", key_style()));
    spans.push(Span::raw(format!(" {} ", state.zoom_label())));
    spans.push(Span::styled(" + ", key_style()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_summary(frame: &mut Frame, day: &DayTimeline, area: Rect) {
    let total = Line::from(Span::styled(
        format!("Total: {}", format_minutes(day.total_minutes)),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let mut apps = Vec::new();
    for app in &day.summary {
        let dot = Style::default().fg(rgb(st_core::app_color(&app.name)));
        apps.push(Span::styled("● ", dot));
        apps.push(Span::raw(format!("{} {}  ", app.name, format_minutes(app.minutes))));
    }

    let text = Paragraph::new(vec![total, Line::from(apps)]).wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

/// The block drawn in a grid row: the one covering most of the row.
fn block_at(day: &DayTimeline, row: usize) -> Option<&TimelineBlock> {
    let row_top = rows_to_px(row);
    let row_bottom = row_top + ROW_PX;
    day.blocks
        .iter()
        .map(|block| {
            let bottom = (block.top_px + block.height_px).min(row_bottom);
            let overlap = bottom - block.top_px.max(row_top);
            (block, overlap)
        })
        .filter(|(_, overlap)| *overlap > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(block, _)| block)
}

fn grid_lines(
    day: &DayTimeline,
    first_row: usize,
    rows: usize,
    width: usize,
) -> Vec<Line<'static>> {
    let block_width = width.saturating_sub(usize::from(GUTTER_WIDTH));
    let last_row = px_to_rows(day.height_px);

    (first_row..=last_row)
        .take(rows)
        .map(|row| {
            let mark = day.hour_marks.iter().find(|mark| px_to_rows(mark.top_px) == row);
            let gutter = mark.map_or_else(
                || " ".repeat(usize::from(GUTTER_WIDTH)),
                |mark| format!("{:<6}", mark.label),
            );
            let gutter = Span::styled(gutter, Style::default().fg(Color::DarkGray));

            let body = match block_at(day, row) {
                Some(block) => {
                    let starts_here = px_to_rows(block.top_px) == row;
                    let label = if starts_here && block.show_label {
                        block.name.as_str()
                    } else {
                        ""
                    };
                    let text: String = format!(" {label:<block_width$}")
                        .chars()
                        .take(block_width)
                        .collect();
                    Span::styled(text, Style::default().bg(rgb(block.color)).fg(Color::Black))
                }
                None if mark.is_some() => {
                    Span::styled("┄".repeat(block_width), Style::default().fg(Color::DarkGray))
                }
                None => Span::raw(""),
            };
            Line::from(vec![gutter, body])
        })
        .collect()
}

fn render_grid(frame: &mut Frame, day: &DayTimeline, scroll_row: usize, area: Rect) {
    let lines = grid_lines(day, scroll_row, usize::from(area.height), usize::from(area.width));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_footer<S: UsageSource, L: MetadataLookup>(
    frame: &mut Frame,
    app: &App<'_, S, L>,
    area: Rect,
) {
    let hovered = match app.content() {
        DayContent::Loaded(day) => app.hovered_row().and_then(|row| block_at(day, row)),
        DayContent::Empty | DayContent::Failed(_) => None,
    };
    if let Some(block) = hovered {
        let text = block.tooltip.replace('\n', "  ·  ");
        let style = Style::default().fg(rgb(block.color));
        frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
        return;
    }

    let mut spans = vec![
        Span::styled(" q ", key_style()),
        Span::raw(" quit "),
        Span::styled(" h/l ", key_style()),
        Span::raw(" day "),
    ];
    if !app.state().is_today(app.today()) {
        spans.push(Span::styled(" t ", key_style()));
        spans.push(Span::raw(" today "));
    }
    spans.extend([
        Span::styled(" +/- ", key_style()),
        Span::raw(" zoom "),
        Span::styled(" 0 ", key_style()),
        Span::raw(" reset "),
        Span::styled(" j/k ", key_style()),
        Span::raw(" scroll "),
        Span::styled(" r ", key_style()),
        Span::raw(" refresh "),
    ]);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
