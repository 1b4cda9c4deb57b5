//! Patron and admin models, roles, and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Borrowing patron role. Admins are staff, not patrons, and never
/// appear in the loan ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum PatronType {
    Student,
    Instructor,
}

impl std::fmt::Display for PatronType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatronType::Student => write!(f, "Student"),
            PatronType::Instructor => write!(f, "Instructor"),
        }
    }
}

impl std::str::FromStr for PatronType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" => Ok(PatronType::Student),
            "Instructor" => Ok(PatronType::Instructor),
            _ => Err(format!("Invalid patron type: {}", s)),
        }
    }
}

/// Account role carried in JWT claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    /// Patron roles carry a `PatronType`; `Admin` does not borrow.
    pub fn patron_type(self) -> Option<PatronType> {
        match self {
            Role::Student => Some(PatronType::Student),
            Role::Instructor => Some(PatronType::Instructor),
            Role::Admin => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "Student"),
            Role::Instructor => write!(f, "Instructor"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

/// Patron record. `strand` and `grade_level` are student-only, NULL
/// for instructors.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patron {
    pub id: i64,
    pub patron_type: PatronType,
    pub full_name: String,
    pub id_number: String,
    pub strand: Option<String>,
    pub grade_level: Option<String>,
}

/// Stored credential for any account table
#[derive(Debug, Clone, FromRow)]
pub struct Credential {
    pub id: i64,
    pub full_name: String,
    pub password_hash: String,
}

/// JWT claims for authenticated accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub account_id: i64,
    pub role: Role,
    pub full_name: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Admin access required".to_string(),
            ))
        }
    }

    /// The authenticated patron identity, rejecting admin tokens.
    pub fn patron(&self) -> Result<(i64, PatronType), AppError> {
        self.role
            .patron_type()
            .map(|pt| (self.account_id, pt))
            .ok_or_else(|| {
                AppError::Authorization("A patron account is required to borrow".to_string())
            })
    }

    /// Admins may act on any patron; patrons only on themselves.
    pub fn require_self_or_admin(&self, patron_id: i64) -> Result<(), AppError> {
        if self.role == Role::Admin || self.account_id == patron_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Cannot access another patron's records".to_string(),
            ))
        }
    }
}
