//! The form engine: per-field state, validation and the submit lifecycle
//!
//! A [`Form`] owns one [`FieldState`] per configured field plus a single
//! [`FormState`]. All operations take `&self`; state sits behind short-lived
//! locks that are never held across an `.await`, so a form can be shared as
//! `Arc<Form>` between a UI loop and a background submit task.
//!
//! Validator faults and submit-handler failures are never returned to the
//! caller. They are folded into `FieldState::error` / `FormState::error` for
//! display, and the operation reports `false`.

use super::events::{FormEvent, ListenerId, Listeners};
use super::field::{FieldConfig, FieldState, FieldValue, Trigger};
use super::form_state::{FormState, FormValues};
use super::validator::{FormValidator, SubmitHandler};
use crate::error::FormError;
use crate::validation::messages;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Collects field configuration before a [`Form`] is built
#[derive(Default)]
pub struct FormBuilder {
    fields: Vec<(String, FieldConfig)>,
    form_validator: Option<Arc<dyn FormValidator>>,
    submit_handler: Option<Arc<dyn SubmitHandler>>,
}

impl FormBuilder {
    /// Add a field. Fields keep the order in which they are added.
    pub fn field(mut self, name: impl Into<String>, config: FieldConfig) -> Self {
        self.fields.push((name.into(), config));
        self
    }

    /// Cross-field check, run only after every field passes
    pub fn validate_with(mut self, validator: impl FormValidator + 'static) -> Self {
        self.form_validator = Some(Arc::new(validator));
        self
    }

    pub fn on_submit(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.submit_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Form, FormError> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, (name, _)) in self.fields.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(FormError::DuplicateField(name.clone()));
            }
        }

        let states = self
            .fields
            .iter()
            .map(|(_, config)| FieldState::pristine(config.initial_value.clone()))
            .collect();

        Ok(Form {
            configs: self.fields,
            index,
            form_validator: self.form_validator,
            submit_handler: self.submit_handler,
            fields: Mutex::new(states),
            state: Mutex::new(FormState::default()),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            listeners: Listeners::default(),
        })
    }
}

/// A configured form and its live state
pub struct Form {
    configs: Vec<(String, FieldConfig)>,
    index: HashMap<String, usize>,
    form_validator: Option<Arc<dyn FormValidator>>,
    submit_handler: Option<Arc<dyn SubmitHandler>>,
    fields: Mutex<Vec<FieldState>>,
    state: Mutex<FormState>,
    in_flight: AtomicBool,
    /// Bumped by `reset`; a submission started before a reset discards its result
    generation: AtomicU64,
    listeners: Listeners,
}

/// Outcome of running a field's rules
enum RuleOutcome {
    Passed,
    Failed(String),
    Faulted,
}

impl Form {
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    // ---------------------------------------------------------------------
    // Reading
    // ---------------------------------------------------------------------

    /// Field names in configuration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.configs.iter().map(|(name, _)| name.as_str())
    }

    /// Snapshot of one field
    pub fn field(&self, name: &str) -> Result<FieldState, FormError> {
        let idx = self.index_of(name)?;
        Ok(self.fields.lock()[idx].clone())
    }

    /// Snapshot of every field, in configuration order
    pub fn fields(&self) -> Vec<(String, FieldState)> {
        let states = self.fields.lock();
        self.configs
            .iter()
            .zip(states.iter())
            .map(|((name, _), state)| (name.clone(), state.clone()))
            .collect()
    }

    pub fn form_state(&self) -> FormState {
        self.state.lock().clone()
    }

    /// Every field is valid
    pub fn is_valid(&self) -> bool {
        self.fields.lock().iter().all(|f| f.valid)
    }

    /// Some field has been interacted with since the last reset
    pub fn is_dirty(&self) -> bool {
        self.fields.lock().iter().any(|f| f.touched)
    }

    pub fn values(&self) -> FormValues {
        let states = self.fields.lock();
        self.configs
            .iter()
            .zip(states.iter())
            .map(|((name, _), state)| (name.clone(), state.value.clone()))
            .collect()
    }

    /// Register a change listener. Listeners run synchronously on the task
    /// that performed the mutation.
    pub fn subscribe(&self, listener: impl Fn(&FormEvent) + Send + Sync + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ---------------------------------------------------------------------
    // Field mutation
    // ---------------------------------------------------------------------

    /// Set a value and mark the field touched, optionally validating right away
    pub async fn set_field_value(
        &self,
        name: &str,
        value: FieldValue,
        validate_now: bool,
    ) -> Result<(), FormError> {
        let idx = self.index_of(name)?;
        {
            let mut states = self.fields.lock();
            states[idx].value = value;
            states[idx].touched = true;
        }
        self.emit_field_changed(idx);

        if validate_now {
            self.run_rules(idx).await;
        }
        Ok(())
    }

    /// Override a field's error without running its rules (e.g. an error
    /// reported by a server). A blank message clears the error.
    pub fn set_field_error(&self, name: &str, error: Option<String>) -> Result<(), FormError> {
        let idx = self.index_of(name)?;
        let error = error.filter(|message| !message.trim().is_empty());
        {
            let mut states = self.fields.lock();
            states[idx].valid = error.is_none();
            states[idx].error = error;
        }
        self.emit_field_changed(idx);
        Ok(())
    }

    pub fn touch_field(&self, name: &str) -> Result<(), FormError> {
        let idx = self.index_of(name)?;
        self.mark_touched(idx);
        Ok(())
    }

    /// Focus left the field: touch it and run rules if any fire on blur
    pub async fn handle_blur(&self, name: &str) -> Result<(), FormError> {
        let idx = self.index_of(name)?;
        self.mark_touched(idx);
        if self.configs[idx].1.has_trigger(Trigger::Blur) {
            self.run_rules(idx).await;
        }
        Ok(())
    }

    /// The user edited the field: store the value and run rules if any fire on change
    pub async fn handle_change(&self, name: &str, value: FieldValue) -> Result<(), FormError> {
        self.set_field_value(name, value, false).await?;
        let idx = self.index_of(name)?;
        if self.configs[idx].1.has_trigger(Trigger::Change) {
            self.run_rules(idx).await;
        }
        Ok(())
    }

    /// Restore initial values and clear all field and form flags.
    ///
    /// A submission already in flight keeps `submitting` set until it
    /// settles, since a new submit is still rejected until then. Its outcome
    /// is not written back into the reset form.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        {
            let mut states = self.fields.lock();
            for ((_, config), state) in self.configs.iter().zip(states.iter_mut()) {
                *state = FieldState::pristine(config.initial_value.clone());
            }
        }
        {
            let mut state = self.state.lock();
            *state = FormState {
                submitting: state.submitting,
                ..FormState::default()
            };
        }
        tracing::debug!("form reset");
        self.listeners.emit(FormEvent::Reset);
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Run a field's rules in order; the first failure wins
    pub async fn validate_field(&self, name: &str) -> Result<bool, FormError> {
        let idx = self.index_of(name)?;
        Ok(self.run_rules(idx).await)
    }

    /// Validate every field concurrently, then the form-level check if all pass
    pub async fn validate_all(&self) -> bool {
        let results = join_all((0..self.configs.len()).map(|idx| self.run_rules(idx))).await;
        let all_valid = results.into_iter().all(|valid| valid);

        if all_valid {
            if let Some(validator) = &self.form_validator {
                let values = self.values();
                let failure = match validator.validate(&values).await {
                    Ok(result) if result.valid => None,
                    Ok(result) => Some(
                        result
                            .message
                            .unwrap_or_else(|| messages::FORM_VALIDATION_FAILED.to_string()),
                    ),
                    Err(err) => {
                        tracing::debug!("form validator faulted: {err:#}");
                        Some(messages::FORM_VALIDATION_ERRORED.to_string())
                    }
                };
                if let Some(message) = failure {
                    tracing::debug!("form-level validation failed: {message}");
                    self.set_form_error(Some(message));
                    return false;
                }
            }
        }

        self.set_form_error(None);
        all_valid
    }

    // ---------------------------------------------------------------------
    // Submission
    // ---------------------------------------------------------------------

    /// Touch every field, validate, then hand the values to the submit handler.
    ///
    /// Returns `false` when validation fails, the handler fails, or another
    /// submission is still running.
    pub async fn submit(&self) -> bool {
        match self.try_submit().await {
            Ok(submitted) => submitted,
            Err(err) => {
                tracing::warn!("submit rejected: {err}");
                false
            }
        }
    }

    /// Like [`Form::submit`], but reports a concurrent submission as an error
    /// instead of `false`.
    pub async fn try_submit(&self) -> Result<bool, FormError> {
        let _guard = SubmitGuard::acquire(self)?;
        let generation = self.generation.load(Ordering::Acquire);

        for idx in 0..self.configs.len() {
            self.mark_touched(idx);
        }

        if !self.validate_all().await {
            tracing::debug!("submit blocked by validation");
            return Ok(false);
        }
        if self.generation.load(Ordering::Acquire) != generation {
            tracing::debug!("form reset during submit validation");
            return Ok(false);
        }

        let Some(handler) = &self.submit_handler else {
            return Ok(true);
        };

        {
            let mut state = self.state.lock();
            state.submitting = true;
            state.error = None;
        }
        self.listeners.emit(FormEvent::FormStateChanged);

        let values = self.values();
        let result = handler.submit(&values).await;
        let handler_ok = result.is_ok();

        // Checked under the state lock so a concurrent reset cannot interleave
        let outcome = {
            let mut state = self.state.lock();
            if self.generation.load(Ordering::Acquire) != generation {
                None
            } else {
                state.submitting = false;
                Some(match result {
                    Ok(()) => {
                        state.submitted = true;
                        true
                    }
                    Err(err) => {
                        tracing::debug!("submit handler failed: {err:#}");
                        let message = err.to_string();
                        state.error = Some(if message.trim().is_empty() {
                            messages::SUBMIT_FAILED.to_string()
                        } else {
                            message
                        });
                        false
                    }
                })
            }
        };
        let Some(submitted) = outcome else {
            tracing::debug!("form reset while submitting, outcome dropped");
            return Ok(handler_ok);
        };
        self.listeners.emit(FormEvent::FormStateChanged);
        Ok(submitted)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn index_of(&self, name: &str) -> Result<usize, FormError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    fn name_at(&self, idx: usize) -> String {
        self.configs[idx].0.clone()
    }

    fn emit_field_changed(&self, idx: usize) {
        self.listeners.emit(FormEvent::FieldChanged {
            name: self.name_at(idx),
        });
    }

    fn mark_touched(&self, idx: usize) {
        let changed = {
            let mut states = self.fields.lock();
            !std::mem::replace(&mut states[idx].touched, true)
        };
        if changed {
            self.emit_field_changed(idx);
        }
    }

    fn set_form_error(&self, error: Option<String>) {
        let changed = {
            let mut state = self.state.lock();
            let changed = state.error != error;
            state.error = error;
            changed
        };
        if changed {
            self.listeners.emit(FormEvent::FormStateChanged);
        }
    }

    async fn run_rules(&self, idx: usize) -> bool {
        let rules = &self.configs[idx].1.rules;

        if rules.is_empty() {
            {
                let mut states = self.fields.lock();
                states[idx].valid = true;
                states[idx].error = None;
            }
            self.emit_field_changed(idx);
            return true;
        }

        {
            let mut states = self.fields.lock();
            states[idx].validating = true;
            states[idx].error = None;
        }
        self.listeners.emit(FormEvent::ValidationStarted {
            name: self.name_at(idx),
        });

        let mut outcome = RuleOutcome::Passed;
        for rule in rules {
            // Re-read per rule so a value written mid-validation is what later rules see
            let value = self.fields.lock()[idx].value.clone();
            match rule.validator.validate(&value).await {
                Ok(result) if result.valid => {}
                Ok(result) => {
                    outcome = RuleOutcome::Failed(
                        result
                            .message
                            .unwrap_or_else(|| messages::VALIDATION_FAILED.to_string()),
                    );
                    break;
                }
                Err(err) => {
                    tracing::debug!(field = %self.configs[idx].0, "validator faulted: {err:#}");
                    outcome = RuleOutcome::Faulted;
                    break;
                }
            }
        }

        let valid = {
            let mut states = self.fields.lock();
            let state = &mut states[idx];
            state.validating = false;
            match outcome {
                RuleOutcome::Passed => {
                    state.valid = true;
                    state.error = None;
                }
                RuleOutcome::Failed(message) => {
                    state.valid = false;
                    state.error = Some(message);
                }
                RuleOutcome::Faulted => {
                    state.valid = false;
                    state.error = Some(messages::VALIDATION_ERRORED.to_string());
                }
            }
            state.valid
        };

        tracing::debug!(field = %self.configs[idx].0, valid, "field validated");
        self.listeners.emit(FormEvent::ValidationFinished {
            name: self.name_at(idx),
            valid,
        });
        valid
    }
}

/// Marks a submission as in flight. Dropping it (including when the submit
/// future is cancelled) releases the slot and clears `submitting`.
struct SubmitGuard<'a> {
    form: &'a Form,
}

impl<'a> SubmitGuard<'a> {
    fn acquire(form: &'a Form) -> Result<Self, FormError> {
        form.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FormError::SubmitInProgress)?;
        Ok(Self { form })
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        let was_submitting = std::mem::replace(&mut self.form.state.lock().submitting, false);
        self.form.in_flight.store(false, Ordering::Release);
        if was_submitting {
            self.form.listeners.emit(FormEvent::FormStateChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::field::Rule;
    use crate::state::forms::validator::{
        form_validator_fn, submit_fn, validator_async, validator_fn, MockFormValidator,
        MockSubmitHandler, MockValidator, ValidationResult,
    };
    use crate::validation::rules;
    use anyhow::anyhow;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn pass() -> Rule {
        Rule::on_blur(validator_fn(|_| ValidationResult::ok()))
    }

    fn non_empty(trigger: Option<Trigger>) -> Rule {
        Rule::new(
            validator_fn(|v| {
                if v.is_empty() {
                    ValidationResult::fail("required")
                } else {
                    ValidationResult::ok()
                }
            }),
            trigger,
        )
    }

    fn counting_validator(result: ValidationResult, calls: usize) -> MockValidator {
        let mut mock = MockValidator::new();
        mock.expect_validate()
            .times(calls)
            .returning(move |_| Ok(result.clone()));
        mock
    }

    fn email_form() -> Form {
        Form::builder()
            .field(
                "email",
                FieldConfig::text("").rule(Rule::on_blur(rules::email())),
            )
            .build()
            .unwrap()
    }

    mod construction {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_fields_start_pristine() {
            let form = Form::builder()
                .field("name", FieldConfig::text("Ada"))
                .field("age", FieldConfig::with_value(FieldValue::Number(30.0)))
                .build()
                .unwrap();

            let name = form.field("name").unwrap();
            assert_eq!(name, FieldState::pristine(FieldValue::from("Ada")));
            assert_eq!(form.form_state(), FormState::default());
            assert!(form.is_valid());
            assert!(!form.is_dirty());
        }

        #[test]
        fn test_field_order_is_preserved() {
            let form = Form::builder()
                .field("z", FieldConfig::default())
                .field("a", FieldConfig::default())
                .build()
                .unwrap();
            assert_eq!(form.field_names().collect::<Vec<_>>(), vec!["z", "a"]);
            let names: Vec<String> = form.fields().into_iter().map(|(n, _)| n).collect();
            assert_eq!(names, vec!["z".to_string(), "a".to_string()]);
            let values = form.values();
            let keys: Vec<&str> = values.iter().map(|(name, _)| name).collect();
            assert_eq!(keys, vec!["z", "a"]);
        }

        #[test]
        fn test_duplicate_field_rejected() {
            let result = Form::builder()
                .field("email", FieldConfig::default())
                .field("email", FieldConfig::default())
                .build();
            assert_eq!(result.err(), Some(FormError::DuplicateField("email".into())));
        }

        #[tokio::test]
        async fn test_unknown_field_touches_nothing() {
            let form = email_form();
            assert_eq!(
                form.touch_field("nope"),
                Err(FormError::UnknownField("nope".into()))
            );
            assert_eq!(
                form.validate_field("nope").await,
                Err(FormError::UnknownField("nope".into()))
            );
            assert!(form.handle_change("nope", "x".into()).await.is_err());
            assert!(!form.is_dirty());
        }
    }

    mod validate_field {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_no_rules_is_always_valid() {
            let form = Form::builder()
                .field("notes", FieldConfig::text(""))
                .build()
                .unwrap();
            form.set_field_error("notes", Some("stale".into())).unwrap();

            assert_eq!(form.validate_field("notes").await, Ok(true));
            let state = form.field("notes").unwrap();
            assert!(state.valid);
            assert!(state.error.is_none());
        }

        #[tokio::test]
        async fn test_first_failure_short_circuits() {
            let form = Form::builder()
                .field(
                    "code",
                    FieldConfig::text("x")
                        .rule(Rule::on_blur(counting_validator(ValidationResult::ok(), 1)))
                        .rule(Rule::on_blur(counting_validator(
                            ValidationResult::fail("second"),
                            1,
                        )))
                        .rule(Rule::on_blur(counting_validator(ValidationResult::ok(), 0))),
                )
                .build()
                .unwrap();

            assert_eq!(form.validate_field("code").await, Ok(false));
            let state = form.field("code").unwrap();
            assert!(!state.valid);
            assert_eq!(state.error.as_deref(), Some("second"));
            assert!(!state.validating);
        }

        #[tokio::test]
        async fn test_failure_without_message_uses_default() {
            let form = Form::builder()
                .field(
                    "code",
                    FieldConfig::text("")
                        .rule(Rule::on_blur(validator_fn(|_| ValidationResult::fail_silent()))),
                )
                .build()
                .unwrap();
            form.validate_field("code").await.unwrap();
            assert_eq!(
                form.field("code").unwrap().error.as_deref(),
                Some(messages::VALIDATION_FAILED)
            );
        }

        #[tokio::test]
        async fn test_fault_is_downgraded() {
            let mut faulty = MockValidator::new();
            faulty
                .expect_validate()
                .returning(|_| Err(anyhow!("db unreachable")));
            let form = Form::builder()
                .field("email", FieldConfig::text("a@b.com").rule(Rule::on_blur(faulty)))
                .build()
                .unwrap();

            assert_eq!(form.validate_field("email").await, Ok(false));
            let state = form.field("email").unwrap();
            assert!(!state.valid);
            assert_eq!(state.error.as_deref(), Some(messages::VALIDATION_ERRORED));
        }

        #[tokio::test]
        async fn test_advisory_message_does_not_fail_field() {
            let form = Form::builder()
                .field(
                    "password",
                    FieldConfig::text("abcdefg").rule(Rule::on_blur(rules::password(
                        Default::default(),
                    ))),
                )
                .build()
                .unwrap();
            assert_eq!(form.validate_field("password").await, Ok(true));
            assert!(form.field("password").unwrap().error.is_none());
        }

        #[tokio::test]
        async fn test_validating_flag_is_visible_while_waiting() {
            let gate = Arc::new(Notify::new());
            let rule_gate = Arc::clone(&gate);
            let form = Arc::new(
                Form::builder()
                    .field(
                        "email",
                        FieldConfig::text("a@b.com").rule(Rule::on_blur(validator_async(
                            move |_| {
                                let gate = Arc::clone(&rule_gate);
                                async move {
                                    gate.notified().await;
                                    Ok(ValidationResult::ok())
                                }
                            },
                        ))),
                    )
                    .build()
                    .unwrap(),
            );

            let task = {
                let form = Arc::clone(&form);
                tokio::spawn(async move { form.validate_field("email").await })
            };
            while !form.field("email").unwrap().validating {
                tokio::task::yield_now().await;
            }
            gate.notify_one();

            assert_eq!(task.await.unwrap(), Ok(true));
            assert!(!form.field("email").unwrap().validating);
        }

        #[tokio::test]
        async fn test_email_blur_scenario() {
            let form = email_form();

            form.handle_change("email", "not-an-email".into()).await.unwrap();
            form.handle_blur("email").await.unwrap();
            let state = form.field("email").unwrap();
            assert!(!state.valid);
            assert_eq!(state.error.as_deref(), Some(messages::EMAIL_INVALID));

            form.handle_change("email", "a@b.com".into()).await.unwrap();
            form.handle_blur("email").await.unwrap();
            let state = form.field("email").unwrap();
            assert!(state.valid);
            assert!(state.error.is_none());
        }
    }

    mod triggers {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_change_runs_only_change_rules() {
            let form = Form::builder()
                .field(
                    "blur_only",
                    FieldConfig::text("").rule(non_empty(Some(Trigger::Blur))),
                )
                .field(
                    "on_change",
                    FieldConfig::text("x").rule(non_empty(Some(Trigger::Change))),
                )
                .build()
                .unwrap();

            form.handle_change("blur_only", "".into()).await.unwrap();
            assert!(form.field("blur_only").unwrap().valid);

            form.handle_change("on_change", "".into()).await.unwrap();
            let state = form.field("on_change").unwrap();
            assert!(state.touched);
            assert!(!state.valid);
        }

        #[tokio::test]
        async fn test_submit_and_untriggered_rules_skip_blur() {
            let form = Form::builder()
                .field(
                    "a",
                    FieldConfig::text("")
                        .rule(non_empty(Some(Trigger::Submit)))
                        .rule(non_empty(None)),
                )
                .build()
                .unwrap();

            form.handle_blur("a").await.unwrap();
            let state = form.field("a").unwrap();
            assert!(state.touched);
            assert!(state.valid);

            assert!(!form.validate_all().await);
            assert!(!form.field("a").unwrap().valid);
        }

        #[tokio::test]
        async fn test_set_field_value_validate_now() {
            let form = Form::builder()
                .field("a", FieldConfig::text("x").rule(non_empty(None)))
                .build()
                .unwrap();

            form.set_field_value("a", "".into(), false).await.unwrap();
            assert!(form.field("a").unwrap().valid);

            form.set_field_value("a", "".into(), true).await.unwrap();
            let state = form.field("a").unwrap();
            assert!(!state.valid);
            assert_eq!(state.value, FieldValue::from(""));
        }
    }

    mod aggregate {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_is_valid_tracks_every_field() {
            let form = Form::builder()
                .field("a", FieldConfig::text("ok").rule(non_empty(None)))
                .field("b", FieldConfig::text("").rule(non_empty(None)))
                .build()
                .unwrap();

            assert!(form.is_valid());
            assert!(!form.validate_all().await);
            assert!(!form.is_valid());
            assert!(form.field("a").unwrap().valid);

            form.set_field_value("b", "now".into(), true).await.unwrap();
            assert!(form.is_valid());

            form.set_field_error("a", Some("taken".into())).unwrap();
            assert!(!form.is_valid());
        }

        #[tokio::test]
        async fn test_blank_field_error_clears() {
            let form = Form::builder()
                .field("a", FieldConfig::text(""))
                .build()
                .unwrap();

            form.set_field_error("a", Some("taken".into())).unwrap();
            assert!(!form.field("a").unwrap().valid);

            form.set_field_error("a", Some("  ".into())).unwrap();
            let field = form.field("a").unwrap();
            assert!(field.valid);
            assert_eq!(field.error, None);
        }

        #[tokio::test]
        async fn test_validate_all_runs_fields_concurrently() {
            let gate_a = Arc::new(Notify::new());
            let gate_b = Arc::new(Notify::new());
            let gated = |gate: &Arc<Notify>| {
                let gate = Arc::clone(gate);
                Rule::on_submit(validator_async(move |_| {
                    let gate = Arc::clone(&gate);
                    async move {
                        gate.notified().await;
                        Ok(ValidationResult::ok())
                    }
                }))
            };
            let form = Arc::new(
                Form::builder()
                    .field("a", FieldConfig::text("x").rule(gated(&gate_a)))
                    .field("b", FieldConfig::text("y").rule(gated(&gate_b)))
                    .build()
                    .unwrap(),
            );

            let task = {
                let form = Arc::clone(&form);
                tokio::spawn(async move { form.validate_all().await })
            };
            // Both fields start before either gate opens
            while !(form.field("a").unwrap().validating && form.field("b").unwrap().validating) {
                tokio::task::yield_now().await;
            }

            gate_b.notify_one();
            while form.field("b").unwrap().validating {
                tokio::task::yield_now().await;
            }
            assert!(form.field("a").unwrap().validating);
            assert!(!task.is_finished());

            gate_a.notify_one();
            assert!(task.await.unwrap());
            assert!(!form.field("a").unwrap().validating);
        }

        #[tokio::test]
        async fn test_is_dirty_lifecycle() {
            let form = Form::builder()
                .field("a", FieldConfig::text("x").rule(pass()))
                .build()
                .unwrap();

            assert!(!form.is_dirty());
            form.touch_field("a").unwrap();
            assert!(form.is_dirty());
            form.validate_all().await;
            form.submit().await;
            assert!(form.is_dirty());
            form.reset();
            assert!(!form.is_dirty());

            form.handle_blur("a").await.unwrap();
            assert!(form.is_dirty());
        }

        #[tokio::test]
        async fn test_form_validator_failure_keeps_field_errors() {
            let form = Form::builder()
                .field("password", FieldConfig::text("secret1"))
                .field("confirm", FieldConfig::text("secret2"))
                .validate_with(rules::passwords_match("password", "confirm"))
                .build()
                .unwrap();

            assert!(!form.validate_all().await);
            assert_eq!(
                form.form_state().error.as_deref(),
                Some(messages::PASSWORD_MISMATCH)
            );
            assert!(form.field("confirm").unwrap().error.is_none());

            form.set_field_value("confirm", "secret1".into(), false)
                .await
                .unwrap();
            assert!(form.validate_all().await);
            assert!(form.form_state().error.is_none());
        }

        #[tokio::test]
        async fn test_form_validator_skipped_when_field_fails() {
            let mut form_check = MockFormValidator::new();
            form_check.expect_validate().never();
            let form = Form::builder()
                .field("a", FieldConfig::text("").rule(non_empty(None)))
                .validate_with(form_check)
                .build()
                .unwrap();
            assert!(!form.validate_all().await);
        }

        #[tokio::test]
        async fn test_form_validator_defaults() {
            let silent = Form::builder()
                .field("a", FieldConfig::text("x"))
                .validate_with(form_validator_fn(|_| ValidationResult::fail_silent()))
                .build()
                .unwrap();
            assert!(!silent.validate_all().await);
            assert_eq!(
                silent.form_state().error.as_deref(),
                Some(messages::FORM_VALIDATION_FAILED)
            );

            let mut faulty = MockFormValidator::new();
            faulty.expect_validate().returning(|_| Err(anyhow!("oops")));
            let faulted = Form::builder()
                .field("a", FieldConfig::text("x"))
                .validate_with(faulty)
                .build()
                .unwrap();
            assert!(!faulted.validate_all().await);
            assert_eq!(
                faulted.form_state().error.as_deref(),
                Some(messages::FORM_VALIDATION_ERRORED)
            );
        }

        #[tokio::test]
        async fn test_reset_restores_initial_values() {
            let form = Form::builder()
                .field("name", FieldConfig::text("Ada").rule(non_empty(None)))
                .field("age", FieldConfig::with_value(FieldValue::Number(30.0)))
                .build()
                .unwrap();

            form.handle_change("name", "Grace".into()).await.unwrap();
            form.handle_change("name", "".into()).await.unwrap();
            form.set_field_value("age", FieldValue::Number(41.0), false)
                .await
                .unwrap();
            form.validate_all().await;
            form.reset();

            let values = form.values();
            assert_eq!(values.text("name"), "Ada");
            assert_eq!(values.get("age"), Some(&FieldValue::Number(30.0)));
            for (_, state) in form.fields() {
                assert!(state.valid && !state.touched && !state.validating);
                assert!(state.error.is_none());
            }
            assert_eq!(form.form_state(), FormState::default());
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_invalid_form_never_calls_handler() {
            let mut handler = MockSubmitHandler::new();
            handler.expect_submit().times(0);
            let form = Form::builder()
                .field("a", FieldConfig::text("").rule(non_empty(Some(Trigger::Submit))))
                .on_submit(handler)
                .build()
                .unwrap();

            assert!(!form.submit().await);
            let state = form.field("a").unwrap();
            assert!(state.touched);
            assert_eq!(state.error.as_deref(), Some("required"));
            assert!(!form.form_state().submitted);
        }

        #[tokio::test]
        async fn test_form_level_failure_blocks_handler() {
            let mut handler = MockSubmitHandler::new();
            handler.expect_submit().never();
            let form = Form::builder()
                .field("a", FieldConfig::text("x").rule(pass()))
                .validate_with(form_validator_fn(|_| ValidationResult::fail("mismatch")))
                .on_submit(handler)
                .build()
                .unwrap();

            assert!(!form.submit().await);
            assert_eq!(form.form_state().error.as_deref(), Some("mismatch"));
        }

        #[tokio::test]
        async fn test_successful_submit_passes_values() {
            let mut handler = MockSubmitHandler::new();
            handler
                .expect_submit()
                .withf(|values| values.text("email") == "a@b.com")
                .times(1)
                .returning(|_| Ok(()));
            let form = Form::builder()
                .field(
                    "email",
                    FieldConfig::text("a@b.com").rule(Rule::on_blur(rules::email())),
                )
                .on_submit(handler)
                .build()
                .unwrap();

            assert!(form.submit().await);
            let state = form.form_state();
            assert!(state.submitted);
            assert!(!state.submitting);
            assert!(state.error.is_none());
        }

        #[tokio::test]
        async fn test_handler_failure_is_recorded() {
            let form = Form::builder()
                .field("a", FieldConfig::text("x").rule(pass()))
                .on_submit(submit_fn(|_| async { Err(anyhow!("boom")) }))
                .build()
                .unwrap();

            assert!(!form.submit().await);
            assert_eq!(
                form.form_state(),
                FormState {
                    submitting: false,
                    submitted: false,
                    error: Some("boom".to_string()),
                }
            );
        }

        #[tokio::test]
        async fn test_handler_failure_without_message_uses_default() {
            let form = Form::builder()
                .field("a", FieldConfig::text("x"))
                .on_submit(submit_fn(|_| async { Err(anyhow!("")) }))
                .build()
                .unwrap();
            assert!(!form.submit().await);
            assert_eq!(
                form.form_state().error.as_deref(),
                Some(messages::SUBMIT_FAILED)
            );
        }

        #[tokio::test]
        async fn test_valid_form_without_handler_succeeds() {
            let form = Form::builder()
                .field("a", FieldConfig::text("x").rule(pass()))
                .build()
                .unwrap();
            assert!(form.submit().await);
            assert!(!form.form_state().submitted);
        }

        #[tokio::test]
        async fn test_concurrent_submit_is_rejected() {
            let calls = Arc::new(AtomicUsize::new(0));
            let gate = Arc::new(Notify::new());
            let handler = {
                let calls = Arc::clone(&calls);
                let gate = Arc::clone(&gate);
                submit_fn(move |_| {
                    let calls = Arc::clone(&calls);
                    let gate = Arc::clone(&gate);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        gate.notified().await;
                        Ok(())
                    }
                })
            };
            let form = Arc::new(
                Form::builder()
                    .field("a", FieldConfig::text("x"))
                    .on_submit(handler)
                    .build()
                    .unwrap(),
            );

            let first = {
                let form = Arc::clone(&form);
                tokio::spawn(async move { form.submit().await })
            };
            while !form.form_state().submitting {
                tokio::task::yield_now().await;
            }

            assert_eq!(form.try_submit().await, Err(FormError::SubmitInProgress));
            assert!(!form.submit().await);
            assert!(form.form_state().submitting);

            gate.notify_one();
            assert!(first.await.unwrap());
            assert_eq!(calls.load(Ordering::SeqCst), 1);

            // The slot is free again once the first submission settles
            gate.notify_one();
            assert!(form.submit().await);
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }

        #[tokio::test]
        async fn test_reset_during_submit_drops_outcome() {
            let gate = Arc::new(Notify::new());
            let handler_gate = Arc::clone(&gate);
            let form = Arc::new(
                Form::builder()
                    .field("a", FieldConfig::text("x"))
                    .on_submit(submit_fn(move |_| {
                        let gate = Arc::clone(&handler_gate);
                        async move {
                            gate.notified().await;
                            Err(anyhow!("boom"))
                        }
                    }))
                    .build()
                    .unwrap(),
            );

            let task = {
                let form = Arc::clone(&form);
                tokio::spawn(async move { form.submit().await })
            };
            while !form.form_state().submitting {
                tokio::task::yield_now().await;
            }

            form.reset();
            assert!(!form.is_dirty());
            assert!(form.form_state().submitting);
            assert_eq!(form.try_submit().await, Err(FormError::SubmitInProgress));

            gate.notify_one();
            assert!(!task.await.unwrap());
            assert_eq!(form.form_state(), FormState::default());
            assert!(!form.is_dirty());
            assert!(!form.in_flight.load(Ordering::SeqCst));
        }

        #[tokio::test]
        async fn test_cancelled_submit_releases_flags() {
            let form = Arc::new(
                Form::builder()
                    .field("a", FieldConfig::text("x"))
                    .on_submit(submit_fn(|_| std::future::pending::<anyhow::Result<()>>()))
                    .build()
                    .unwrap(),
            );

            let task = {
                let form = Arc::clone(&form);
                tokio::spawn(async move { form.submit().await })
            };
            while !form.form_state().submitting {
                tokio::task::yield_now().await;
            }
            task.abort();
            assert!(task.await.unwrap_err().is_cancelled());

            assert!(!form.form_state().submitting);
            assert!(!form.in_flight.load(Ordering::SeqCst));
        }
    }

    mod events {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_validation_emits_start_and_finish() {
            let form = email_form();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            let id = form.subscribe(move |e| sink.lock().push(e.clone()));

            form.validate_field("email").await.unwrap();
            assert_eq!(
                *seen.lock(),
                vec![
                    FormEvent::ValidationStarted {
                        name: "email".into()
                    },
                    FormEvent::ValidationFinished {
                        name: "email".into(),
                        valid: false
                    },
                ]
            );

            assert!(form.unsubscribe(id));
            form.reset();
            assert_eq!(seen.lock().len(), 2);
        }

        #[tokio::test]
        async fn test_touch_emits_once() {
            let form = email_form();
            let count = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&count);
            form.subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

            form.touch_field("email").unwrap();
            form.touch_field("email").unwrap();
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
    }
}
