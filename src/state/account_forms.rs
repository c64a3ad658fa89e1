//! Register and login forms wired to the account services

use super::forms::{submit_fn, FieldConfig, Form, FormValues, Rule};
use crate::config::ValidationLimits;
use crate::error::FormError;
use crate::services::{Account, AccountDirectory, OperationKind, OperationLog};
use crate::validation::rules;
use parking_lot::Mutex;
use std::sync::Arc;

/// How a field is presented on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// Render the value as bullets
    pub masked: bool,
}

pub const REGISTER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "昵称",
        masked: false,
    },
    FieldSpec {
        name: "email",
        label: "邮箱",
        masked: false,
    },
    FieldSpec {
        name: "password",
        label: "密码",
        masked: true,
    },
    FieldSpec {
        name: "confirm",
        label: "确认密码",
        masked: true,
    },
];

pub const LOGIN_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "email",
        label: "邮箱",
        masked: false,
    },
    FieldSpec {
        name: "password",
        label: "密码",
        masked: true,
    },
];

/// Services the account forms submit to
#[derive(Clone)]
pub struct AccountServices {
    pub accounts: Arc<AccountDirectory>,
    pub operations: Arc<OperationLog>,
    /// Signed-in account, set by a successful login or registration
    pub session: Arc<Mutex<Option<Account>>>,
}

impl AccountServices {
    pub fn new(accounts: Arc<AccountDirectory>, operations: Arc<OperationLog>) -> Self {
        Self {
            accounts,
            operations,
            session: Arc::new(Mutex::new(None)),
        }
    }

    pub fn current_account(&self) -> Option<Account> {
        self.session.lock().clone()
    }
}

pub fn register_form(services: &AccountServices, limits: ValidationLimits) -> Result<Form, FormError> {
    let services = services.clone();
    Form::builder()
        .field(
            "name",
            FieldConfig::text("").rule(Rule::on_blur(rules::name(limits))),
        )
        .field(
            "email",
            FieldConfig::text("").rule(Rule::on_blur(rules::email())),
        )
        .field(
            "password",
            FieldConfig::text("").rule(Rule::on_blur(rules::password(limits))),
        )
        .field(
            "confirm",
            FieldConfig::text("").rule(Rule::on_submit(rules::required(Some("确认密码")))),
        )
        .validate_with(rules::passwords_match("password", "confirm"))
        .on_submit(submit_fn(move |values: FormValues| {
            let services = services.clone();
            async move {
                let account = services
                    .accounts
                    .register(
                        values.text("email"),
                        values.text("password"),
                        values.text("name"),
                    )
                    .await?;
                services.operations.record(
                    OperationKind::Register,
                    format!("注册账号 {}", account.email),
                    Some(serde_json::json!({ "account_id": account.id })),
                );
                *services.session.lock() = Some(account);
                Ok(())
            }
        }))
        .build()
}

pub fn login_form(services: &AccountServices) -> Result<Form, FormError> {
    let services = services.clone();
    Form::builder()
        .field(
            "email",
            FieldConfig::text("").rule(Rule::on_blur(rules::email())),
        )
        .field(
            "password",
            FieldConfig::text("").rule(Rule::on_submit(rules::required(Some("密码")))),
        )
        .on_submit(submit_fn(move |values: FormValues| {
            let services = services.clone();
            async move {
                let account = services
                    .accounts
                    .login(values.text("email"), values.text("password"))
                    .await?;
                services.operations.record(
                    OperationKind::Login,
                    format!("登录账号 {}", account.email),
                    None,
                );
                *services.session.lock() = Some(account);
                Ok(())
            }
        }))
        .build()
}
