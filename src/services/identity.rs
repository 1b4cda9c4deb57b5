//! Account registration, login, and password management.
//!
//! The loan ledger never sees credentials; it only consumes the
//! verified (patron_id, patron_type) pair carried in the token.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::patron::{Claims, Patron, PatronType, Role},
    repository::Repository,
};

#[derive(Clone)]
pub struct IdentityService {
    repository: Repository,
    config: AuthConfig,
}

impl IdentityService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account. Student-only fields are dropped for
    /// other roles.
    pub async fn register(
        &self,
        role: Role,
        full_name: &str,
        id_number: &str,
        password: &str,
        strand: Option<&str>,
        grade_level: Option<&str>,
    ) -> AppResult<i64> {
        let hash = self.hash_password(password)?;

        let account_id = match role.patron_type() {
            Some(pt) => {
                let (strand, grade_level) = match pt {
                    PatronType::Student => (strand, grade_level),
                    PatronType::Instructor => (None, None),
                };
                let patron = self
                    .repository
                    .patrons
                    .create_patron(pt, full_name, id_number, &hash, strand, grade_level)
                    .await?;
                patron.id
            }
            None => {
                self.repository
                    .patrons
                    .create_admin(full_name, id_number, &hash)
                    .await?
            }
        };

        tracing::info!(account_id, %role, "account registered");

        Ok(account_id)
    }

    /// Verify a credential and issue a JWT carrying the account id and role
    pub async fn login(&self, role: Role, id_number: &str, password: &str) -> AppResult<(String, Claims)> {
        let credential = self
            .repository
            .patrons
            .find_credential(role, id_number)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid ID number or password".to_string()))?;

        if !self.verify_password(&credential.password_hash, password)? {
            return Err(AppError::Authentication(
                "Invalid ID number or password".to_string(),
            ));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: id_number.to_string(),
            account_id: credential.id,
            role,
            full_name: credential.full_name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, claims))
    }

    /// Change a password after verifying the current one
    pub async fn change_password(
        &self,
        role: Role,
        id_number: &str,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let credential = self
            .repository
            .patrons
            .find_credential(role, id_number)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid ID number or password".to_string()))?;

        if !self.verify_password(&credential.password_hash, old_password)? {
            return Err(AppError::Authentication(
                "Invalid ID number or password".to_string(),
            ));
        }

        let hash = self.hash_password(new_password)?;
        self.repository
            .patrons
            .update_password(role, credential.id, &hash)
            .await
    }

    /// Patron profile lookup
    pub async fn get_patron(&self, id: i64) -> AppResult<Patron> {
        self.repository.patrons.get_by_id(id).await
    }

    /// List patrons, optionally by role
    pub async fn list_patrons(&self, patron_type: Option<PatronType>) -> AppResult<Vec<Patron>> {
        self.repository.patrons.list(patron_type).await
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    fn verify_password(&self, hash: &str, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
