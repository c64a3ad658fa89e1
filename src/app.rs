//! Application state and core logic

use ageless_forms::config::AppConfig;
use ageless_forms::services::{AccountDirectory, OperationLog};
use ageless_forms::state::account_forms::{login_form, register_form, AccountServices};
use ageless_forms::state::{AppState, FieldValue, Form, FormEvent, View};
use ageless_forms::validation::messages;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A submission running in the background
struct PendingSubmit {
    view: View,
    handle: JoinHandle<bool>,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    pub services: AccountServices,
    pub register: Arc<Form>,
    pub login: Arc<Form>,
    /// Time the app started, drives the spinner
    pub started: Instant,
    pending_submit: Option<PendingSubmit>,
    form_events: mpsc::UnboundedReceiver<FormEvent>,
    redraw: bool,
    quit: bool,
}

impl App {
    /// Create a new App instance with services built from the config
    pub fn new(config: AppConfig) -> Result<Self> {
        let capacity = config.operation_log_capacity;
        let operations = match AppConfig::data_dir() {
            Some(dir) if config.persist_operation_log => {
                OperationLog::persistent(capacity, dir.join("operation_logs.json"))
            }
            _ => OperationLog::new(capacity),
        };
        let accounts = AccountDirectory::new(Duration::from_millis(config.mock_latency_ms));
        let services = AccountServices::new(Arc::new(accounts), Arc::new(operations));
        Self::with_services(&config, services)
    }

    pub fn with_services(config: &AppConfig, services: AccountServices) -> Result<Self> {
        let register = Arc::new(register_form(&services, config.limits)?);
        let login = Arc::new(login_form(&services)?);

        let (tx, form_events) = mpsc::unbounded_channel();
        for form in [&register, &login] {
            let tx = tx.clone();
            form.subscribe(move |event| {
                let _ = tx.send(event.clone());
            });
        }

        Ok(Self {
            state: AppState::default(),
            services,
            register,
            login,
            started: Instant::now(),
            pending_submit: None,
            form_events,
            redraw: true,
            quit: false,
        })
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Returns whether a redraw was requested since the last call
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submit.is_some()
    }

    /// Form shown in a view
    pub fn form_for(&self, view: View) -> Option<&Arc<Form>> {
        match view {
            View::Register => Some(&self.register),
            View::Login => Some(&self.login),
            View::OperationLog => None,
        }
    }

    pub fn current_form(&self) -> Option<&Arc<Form>> {
        self.form_for(self.state.current_view)
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        self.redraw = true;

        match key.code {
            KeyCode::F(2) => {
                self.state.navigate(self.state.current_view.next());
                return Ok(());
            }
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
                return Ok(());
            }
            _ => {}
        }

        match self.state.current_view {
            View::Register | View::Login => self.handle_form_key(key).await,
            View::OperationLog => {
                self.handle_log_key(key);
                Ok(())
            }
        }
    }

    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.current_form().cloned() else {
            return Ok(());
        };
        let Some(field) = self.state.active_field() else {
            return Ok(());
        };

        match key.code {
            KeyCode::Tab => {
                form.handle_blur(field.name).await?;
                self.state.next_form_field();
            }
            KeyCode::BackTab => {
                form.handle_blur(field.name).await?;
                self.state.prev_form_field();
            }
            KeyCode::Enter => {
                form.handle_blur(field.name).await?;
                self.start_submit();
            }
            KeyCode::Esc => {
                form.reset();
                self.state.active_form_field = 0;
                self.state.status_message = None;
            }
            KeyCode::Backspace => {
                let mut value = form.field(field.name)?.value;
                value.pop_char();
                form.handle_change(field.name, value).await?;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut value = form.field(field.name)?.value;
                value.push_char(c);
                form.handle_change(field.name, value).await?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_log_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                let entries = self.services.operations.len();
                self.state.scroll_log_down(entries);
            }
            KeyCode::Up | KeyCode::Char('k') => self.state.scroll_log_up(),
            KeyCode::Char('c') => {
                self.services.operations.clear();
                self.state.log_scroll = 0;
                self.state.status_message = Some("日志已清空".to_string());
            }
            _ => {}
        }
    }

    /// Submit the current form on a background task
    fn start_submit(&mut self) {
        if self.pending_submit.is_some() {
            self.state.status_message = Some(messages::PROCESSING.to_string());
            return;
        }
        let view = self.state.current_view;
        let Some(form) = self.form_for(view).cloned() else {
            return;
        };

        tracing::info!(view = view.label(), "submitting form");
        self.state.status_message = Some(messages::PROCESSING.to_string());
        let handle = tokio::spawn(async move { form.submit().await });
        self.pending_submit = Some(PendingSubmit { view, handle });
    }

    /// Drain form notifications and collect a finished submission
    pub async fn poll_background(&mut self) {
        while let Ok(event) = self.form_events.try_recv() {
            tracing::trace!(?event, "form event");
            self.redraw = true;
        }

        let finished = self
            .pending_submit
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished());
        if !finished {
            return;
        }
        let Some(PendingSubmit { view, handle }) = self.pending_submit.take() else {
            return;
        };
        self.redraw = true;

        match handle.await {
            Ok(true) => {
                let name = self
                    .services
                    .current_account()
                    .map(|a| a.name)
                    .unwrap_or_default();
                let text = match view {
                    View::Login => messages::LOGIN_SUCCESS,
                    _ => messages::REGISTER_SUCCESS,
                };
                self.state.status_message = Some(format!("{text} {name}"));
                if let Some(form) = self.form_for(view) {
                    form.reset();
                }
                if self.state.current_view == view {
                    self.state.active_form_field = 0;
                }
            }
            Ok(false) => {
                let error = self
                    .form_for(view)
                    .and_then(|form| form.form_state().error);
                self.state.status_message = error;
            }
            Err(err) => {
                tracing::warn!("submit task failed: {err}");
                self.state.status_message = Some(messages::SUBMIT_FAILED.to_string());
            }
        }
    }

    /// Display value for a field, masking secrets
    pub fn display_value(value: &FieldValue, masked: bool) -> String {
        let text = value.display_value();
        if masked {
            "•".repeat(text.chars().count())
        } else {
            text
        }
    }
}
