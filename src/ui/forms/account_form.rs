//! Register and login form views

use super::field_renderer::{draw_field, FIELD_HEIGHT};
use crate::app::App;
use ageless_forms::state::account_forms::FieldSpec;
use ageless_forms::state::FormState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw_account_form(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.state.current_view;
    let Some(form) = app.current_form() else {
        return;
    };

    let block = Block::default()
        .title(format!(" {} ", view.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let specs: &[FieldSpec] = view.fields();
    let mut constraints: Vec<Constraint> = specs
        .iter()
        .map(|_| Constraint::Length(FIELD_HEIGHT))
        .collect();
    constraints.push(Constraint::Length(1)); // Form state line
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (idx, spec) in specs.iter().enumerate() {
        // Field names come from the same table the form was built from
        let Ok(field) = form.field(spec.name) else {
            continue;
        };
        let is_active = idx == app.state.active_form_field;
        draw_field(frame, chunks[idx], spec, &field, is_active);
    }

    let line = form_state_line(&form.form_state(), app);
    frame.render_widget(line, chunks[specs.len()]);
}

fn form_state_line<'a>(state: &FormState, app: &App) -> Paragraph<'a> {
    if state.submitting {
        let frame_idx = (app.started.elapsed().as_millis() / 80) as usize % SPINNER.len();
        return Paragraph::new(format!(" {} 处理中...", SPINNER[frame_idx]))
            .style(Style::default().fg(Color::Yellow));
    }
    if let Some(error) = &state.error {
        return Paragraph::new(format!(" ✗ {error}"))
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
    }
    if state.submitted {
        return Paragraph::new(" ✓ 已提交").style(Style::default().fg(Color::Green));
    }
    Paragraph::new(" Enter 提交").style(Style::default().fg(Color::DarkGray))
}
