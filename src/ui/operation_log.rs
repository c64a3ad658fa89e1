//! Operation log view

use crate::app::App;
use ageless_forms::services::OperationKind;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

fn kind_label(kind: OperationKind) -> (&'static str, Color) {
    match kind {
        OperationKind::Login => ("登录", Color::Green),
        OperationKind::Logout => ("登出", Color::Yellow),
        OperationKind::Register => ("注册", Color::Cyan),
        OperationKind::ClearHistory | OperationKind::DeleteHistory => ("清理", Color::Red),
        _ => ("其他", Color::Gray),
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let entries = app.services.operations.entries();
    let block = Block::default()
        .title(format!(" 操作日志 ({}) ", entries.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if entries.is_empty() {
        let content = Paragraph::new("暂无记录")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(content, area);
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let (label, color) = kind_label(entry.kind);
            let time = entry
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%m-%d %H:%M:%S")
                .to_string();
            ListItem::new(Line::from(vec![
                Span::styled(time, Style::default().fg(Color::DarkGray)),
                Span::raw("  "),
                Span::styled(format!("[{label}]"), Style::default().fg(color)),
                Span::raw(" "),
                Span::raw(entry.description.clone()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▸ ");

    let mut state = ListState::default().with_selected(Some(app.state.log_scroll));
    frame.render_stateful_widget(list, area, &mut state);
}
