//! Admin authentication service
//!
//! Email + password accounts stored in the `admins` collection, hashed with
//! Argon2id. The signed-in identity is published on a watch channel so the
//! admin gate (and anything else) can follow sign-in and sign-out events.
//! Any signed-in account is a full administrator.

use crate::config::{AdminSeed, ADMIN_ROLE};
use crate::database::{AdminAccount, Record};
use crate::error::{AppError, Result};
use crate::services::EntityAccess;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

const SALT_SIZE: usize = 16; // 128 bits

/// The signed-in administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminIdentity {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&AdminAccount> for AdminIdentity {
    fn from(account: &AdminAccount) -> Self {
        Self {
            uid: account.uid.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role.clone(),
        }
    }
}

/// Outcome of seeding the bootstrap account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultAdmin {
    Created(AdminIdentity),
    AlreadyExists,
}

/// Service for admin accounts and the signed-in state
#[derive(Clone)]
pub struct AuthService {
    admins: EntityAccess<AdminAccount>,
    current: Arc<watch::Sender<Option<AdminIdentity>>>,
}

impl AuthService {
    pub fn new(admins: EntityAccess<AdminAccount>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            admins,
            current: Arc::new(current),
        }
    }

    /// Register a new admin account
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AdminIdentity> {
        let email = normalize_email(email);

        if self.find_account(&email).await?.is_some() {
            return Err(AppError::AccountExists(email));
        }

        let account = AdminAccount {
            uid: Uuid::new_v4().to_string(),
            email,
            name: name.to_string(),
            role: ADMIN_ROLE.to_string(),
            password_hash: hash_password(password)?,
        };

        let id = self.admins.create(&account).await?;

        tracing::info!("Admin account created: {} ({})", account.email, id);
        Ok(AdminIdentity::from(&account))
    }

    /// Create the bootstrap admin account unless its email is already registered
    pub async fn create_default_admin(&self, seed: &AdminSeed) -> Result<DefaultAdmin> {
        match self
            .create_account(&seed.email, &seed.password, &seed.name)
            .await
        {
            Ok(identity) => Ok(DefaultAdmin::Created(identity)),
            Err(AppError::AccountExists(email)) => {
                tracing::info!("Default admin already exists: {}", email);
                Ok(DefaultAdmin::AlreadyExists)
            }
            Err(e) => {
                tracing::error!("Error creating default admin: {}", e);
                Err(e)
            }
        }
    }

    /// Verify credentials and publish the signed-in identity
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AdminIdentity> {
        let email = normalize_email(email);

        let account = match self.find_account(&email).await? {
            Some(record) if verify_password(password, &record.fields.password_hash) => record,
            _ => {
                tracing::warn!("Failed sign-in attempt for {}", email);
                return Err(AppError::InvalidCredentials);
            }
        };

        let identity = AdminIdentity::from(&account.fields);
        self.current.send_replace(Some(identity.clone()));

        tracing::info!("Admin signed in: {}", identity.email);
        Ok(identity)
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.current.send_replace(None) {
            tracing::info!("Admin signed out: {}", previous.email);
        }
    }

    pub fn current_user(&self) -> Option<AdminIdentity> {
        self.current.borrow().clone()
    }

    /// Follow auth state changes; the current value is available immediately
    pub fn subscribe(&self) -> watch::Receiver<Option<AdminIdentity>> {
        self.current.subscribe()
    }

    /// Look up an admin profile by uid
    pub async fn get_admin_profile(&self, uid: &str) -> Result<Option<AdminIdentity>> {
        let accounts = self.admins.get_all().await?;

        Ok(accounts
            .iter()
            .find(|record| record.fields.uid == uid)
            .map(|record| AdminIdentity::from(&record.fields)))
    }

    async fn find_account(&self, email: &str) -> Result<Option<Record<AdminAccount>>> {
        let accounts = self.admins.get_all().await?;
        Ok(accounts.into_iter().find(|record| record.fields.email == email))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password into an Argon2id PHC string
fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let salt_string = SaltString::encode_b64(&salt)
        .map_err(|e| AppError::Generic(format!("Salt encoding failed: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt_string)
        .map_err(|e| AppError::Generic(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unreadable password hash: {}", e);
            false
        }
    }
}
