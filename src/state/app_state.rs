//! Application state definitions

use super::account_forms::{FieldSpec, LOGIN_FIELDS, REGISTER_FIELDS};

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Register,
    Login,
    OperationLog,
}

impl View {
    pub fn next(&self) -> Self {
        match self {
            Self::Register => Self::Login,
            Self::Login => Self::OperationLog,
            Self::OperationLog => Self::Register,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Register => "注册",
            Self::Login => "登录",
            Self::OperationLog => "操作日志",
        }
    }

    /// Field layout of the form shown in this view, if any
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::Register => REGISTER_FIELDS,
            Self::Login => LOGIN_FIELDS,
            Self::OperationLog => &[],
        }
    }
}

/// Main application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,

    // Form focus
    pub active_form_field: usize,

    // Operation log view
    pub log_scroll: usize,

    // Feedback line in the status bar
    pub status_message: Option<String>,
}

impl AppState {
    /// Switch view, resetting focus
    pub fn navigate(&mut self, view: View) {
        self.current_view = view;
        self.active_form_field = 0;
        self.log_scroll = 0;
    }

    /// Spec of the focused field in the current view
    pub fn active_field(&self) -> Option<&'static FieldSpec> {
        self.current_view.fields().get(self.active_form_field)
    }

    /// Move to next form field (wraps around)
    pub fn next_form_field(&mut self) {
        let count = self.current_view.fields().len();
        if count > 0 {
            self.active_form_field = (self.active_form_field + 1) % count;
        }
    }

    /// Move to previous form field (wraps around)
    pub fn prev_form_field(&mut self) {
        let count = self.current_view.fields().len();
        if count == 0 {
            return;
        }
        if self.active_form_field == 0 {
            self.active_form_field = count - 1;
        } else {
            self.active_form_field -= 1;
        }
    }

    pub fn scroll_log_down(&mut self, entries: usize) {
        if self.log_scroll + 1 < entries {
            self.log_scroll += 1;
        }
    }

    pub fn scroll_log_up(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }
}
