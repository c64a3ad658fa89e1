//! Mock account directory with simulated network latency

use crate::validation::messages;
use anyhow::{bail, Result};
use parking_lot::Mutex;
use std::time::Duration;

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password: String,
}

/// In-memory account store standing in for an auth backend
pub struct AccountDirectory {
    accounts: Mutex<Vec<StoredAccount>>,
    latency: Duration,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AccountDirectory {
    pub fn new(latency: Duration) -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            latency,
        }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<Account> {
        tokio::time::sleep(self.latency).await;
        let email = normalize_email(email);
        let name = name.trim().to_string();

        let mut accounts = self.accounts.lock();
        if accounts.iter().any(|a| a.account.email == email) {
            bail!(messages::EMAIL_EXISTS);
        }
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
        };
        accounts.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
        });
        tracing::info!(email = %account.email, "account registered");
        Ok(account)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Account> {
        tokio::time::sleep(self.latency).await;
        let email = normalize_email(email);

        let accounts = self.accounts.lock();
        match accounts.iter().find(|a| a.account.email == email) {
            Some(stored) if stored.password == password => Ok(stored.account.clone()),
            _ => bail!(messages::LOGIN_FAILED),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.lock().is_empty()
    }
}
