//! Populated view rendering.
//!
//! Displays the four enabled/disabled gauges above the Kafka Settings,
//! Alarm Filters, and Message Stats tables. The stats table gains Rate and
//! Trend columns derived from the poll history.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::data::{Indicator, ItemTable, StatusTables};

/// Width of the trend sparkline, in samples.
const TREND_WIDTH: usize = 8;

/// Render the gauges and tables.
pub fn render(frame: &mut Frame, app: &App, tables: &StatusTables, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Gauges
        Constraint::Fill(1),   // Kafka Settings
        Constraint::Fill(1),   // Alarm Filters
        Constraint::Fill(2),   // Message Stats
    ])
    .split(area);

    render_indicators(frame, app, &tables.indicators, chunks[0]);
    render_table(frame, app, &tables.connections, Focus::Connections, chunks[1]);
    render_table(frame, app, &tables.alarm_filters, Focus::AlarmFilters, chunks[2]);
    render_table(frame, app, &tables.stats, Focus::Stats, chunks[3]);
}

fn render_indicators(frame: &mut Frame, app: &App, indicators: &[Indicator; 4], area: Rect) {
    let cells = Layout::horizontal([Constraint::Fill(1); 4]).split(area);

    for (indicator, cell) in indicators.iter().zip(cells.iter()) {
        let gauge = Paragraph::new(indicator.value())
            .style(app.theme.indicator_style(indicator.enabled))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(format!(" {} ", indicator.label))
                    .borders(Borders::ALL)
                    .border_type(app.theme.border_type)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        frame.render_widget(gauge, *cell);
    }
}

fn render_table(frame: &mut Frame, app: &App, table: &ItemTable, focus: Focus, area: Rect) {
    let focused = app.focus == focus;
    let with_trend = focus == Focus::Stats;

    let mut header_cells: Vec<Cell> =
        table.headers.iter().map(|header| Cell::from(header.label)).collect();
    let mut widths: Vec<Constraint> =
        table.headers.iter().map(|header| Constraint::Fill(header.weight)).collect();
    if with_trend {
        header_cells.push(Cell::from("Rate"));
        header_cells.push(Cell::from("Trend"));
        widths.push(Constraint::Min(8));
        widths.push(Constraint::Min(TREND_WIDTH as u16));
    }
    let header = Row::new(header_cells).height(1).style(app.theme.header);

    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(|cell| Cell::from(cell.as_str())).collect();
            if with_trend {
                // First column of the stats table is the source name
                let source = row.first().map(String::as_str).unwrap_or_default();
                let rate = app
                    .history
                    .message_rate(source)
                    .map(|r| format!("{:.1}/s", r))
                    .unwrap_or_else(|| "-".to_string());
                cells.push(Cell::from(rate));
                cells.push(Cell::from(app.history.sparkline(source, TREND_WIDTH)));
            }
            Row::new(cells)
        })
        .collect();

    let position_info = if focused && !table.is_empty() {
        format!(" [{}/{}]", app.selected[focus.index()] + 1, table.len())
    } else {
        String::new()
    };
    let title = format!(" {}{} ", table.title, position_info);

    let mut block = Block::default()
        .title(Line::styled(
            title,
            if focused { app.theme.title_focused } else { app.theme.title },
        ))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(if focused {
            Style::default().fg(app.theme.highlight)
        } else {
            Style::default().fg(app.theme.border)
        });

    if let Some(error) = &table.error {
        block = block.title_bottom(Line::styled(format!(" {} ", error), app.theme.error_style()));
    } else if table.is_empty() {
        block = block.title_bottom(Line::styled(
            " No rows ",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    let widget = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(if focused { app.theme.selected } else { Style::default() })
        .highlight_symbol(if focused { "▶ " } else { "  " });

    let mut state = TableState::default();
    if focused && !table.is_empty() {
        state.select(Some(app.selected[focus.index()]));
    }

    frame.render_stateful_widget(widget, area, &mut state);
}
