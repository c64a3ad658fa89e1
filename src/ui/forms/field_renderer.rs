//! Field rendering utilities for forms

use crate::app::App;
use ageless_forms::state::account_forms::FieldSpec;
use ageless_forms::state::FieldState;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows a field takes: bordered input plus one line for its error
pub const FIELD_HEIGHT: u16 = 4;

/// Draw a form field with its validation feedback below the input box
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    spec: &FieldSpec,
    field: &FieldState,
    is_active: bool,
) {
    let input_area = Rect {
        height: area.height.min(3),
        ..area
    };

    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };

    let border_style = match (&field.error, is_active) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Cyan),
        (None, false) => Style::default().fg(Color::DarkGray),
    };

    let display_value = App::display_value(&field.value, spec.masked);
    let display_str = if display_value.is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        display_value
    };

    let cursor = if is_active { "▌" } else { "" };
    let mut spans = vec![
        Span::styled(display_str, style),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ];
    if field.validating {
        spans.push(Span::styled(" …", Style::default().fg(Color::Yellow)));
    }

    let block = Block::default()
        .title(format!(" {} ", spec.label))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), input_area);

    if area.height > 3 {
        if let Some(error) = &field.error {
            let error_area = Rect {
                y: area.y + 3,
                height: 1,
                ..area
            };
            let line = Paragraph::new(format!(" {error}")).style(Style::default().fg(Color::Red));
            frame.render_widget(line, error_area);
        }
    }
}
