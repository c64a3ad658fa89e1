//! UI module for rendering the TUI

mod forms;
mod layout;
mod operation_log;

use crate::app::App;
use ageless_forms::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (header_area, main_area) = layout::create_layout(frame.area());

    layout::draw_header(frame, header_area, app);

    match app.state.current_view {
        View::Register | View::Login => forms::draw_account_form(frame, main_area, app),
        View::OperationLog => operation_log::draw(frame, main_area, app),
    }

    layout::draw_status_bar(frame, app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ageless_forms::config::AppConfig;
    use ageless_forms::services::{AccountDirectory, OperationKind, OperationLog};
    use ageless_forms::state::account_forms::AccountServices;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_app() -> App {
        let services = AccountServices::new(
            Arc::new(AccountDirectory::new(Duration::ZERO)),
            Arc::new(OperationLog::new(10)),
        );
        App::with_services(&AppConfig::default(), services).unwrap()
    }

    /// Screen text with blanks removed; wide glyphs leave padding cells
    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .filter(|symbol| !symbol.trim().is_empty())
            .collect()
    }

    #[tokio::test]
    async fn test_register_view_shows_field_error() {
        let app = test_app();
        app.register.handle_blur("name").await.unwrap();

        let screen = render(&app);
        assert!(screen.contains("昵称"));
        assert!(screen.contains("请输入昵称"));
    }

    #[test]
    fn test_log_view_lists_entries() {
        let mut app = test_app();
        app.services
            .operations
            .record(OperationKind::Login, "signed in", None);
        app.state.navigate(View::OperationLog);

        let screen = render(&app);
        assert!(screen.contains("signedin"));
    }
}
