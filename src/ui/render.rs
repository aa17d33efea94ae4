//! Ratatui frame layout: labyrinth field above, status line below.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw_frame(f: &mut Frame, grid_lines: Vec<String>, hud_info: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Field
            Constraint::Length(1), // HUD
        ])
        .split(f.area());

    let text: Vec<Line> = grid_lines
        .into_iter()
        .map(|s| Line::from(Span::raw(s)))
        .collect();
    let field = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("labyrinth"))
        .style(Style::default().fg(Color::White).bg(Color::Black));
    f.render_widget(field, chunks[0]);

    let hud = Paragraph::new(Span::styled(
        hud_info,
        Style::default().add_modifier(Modifier::REVERSED),
    ));
    f.render_widget(hud, chunks[1]);
}
