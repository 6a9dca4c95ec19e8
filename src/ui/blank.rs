//! Placeholder views for the loading and no-sinks states.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::BlankState;

/// Render the loading indicator shown before the first status arrives.
pub fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new("Loading...")
        .style(Style::default().fg(app.theme.highlight).add_modifier(Modifier::DIM))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, center_vertically(area, 1));
}

/// Render the blank state with its heading, body, and link.
pub fn render_blank(frame: &mut Frame, app: &App, blank: &BlankState, area: Rect) {
    let lines = vec![
        Line::styled(blank.heading, Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from(blank.body),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("{}: ", blank.link.label)),
            Span::styled(
                blank.link.url,
                Style::default().fg(app.theme.highlight).add_modifier(Modifier::UNDERLINED),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(block);
    frame.render_widget(paragraph, center_vertically(area, 7));
}

fn center_vertically(area: Rect, height: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .areas(area);
    middle
}
