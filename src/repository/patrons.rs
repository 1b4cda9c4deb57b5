//! Patrons and admins repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::patron::{Credential, Patron, PatronType, Role},
};

#[derive(Clone)]
pub struct PatronsRepository {
    pool: Pool<Postgres>,
}

impl PatronsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get patron by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>(
            "SELECT id, patron_type, full_name, id_number, strand, grade_level
             FROM patrons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Patron with id {} not found", id)))
    }

    /// List patrons, optionally restricted to one role
    pub async fn list(&self, patron_type: Option<PatronType>) -> AppResult<Vec<Patron>> {
        let patrons = match patron_type {
            Some(pt) => {
                sqlx::query_as::<_, Patron>(
                    "SELECT id, patron_type, full_name, id_number, strand, grade_level
                     FROM patrons WHERE patron_type = $1 ORDER BY id",
                )
                .bind(pt)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Patron>(
                    "SELECT id, patron_type, full_name, id_number, strand, grade_level
                     FROM patrons ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(patrons)
    }

    /// Insert a new patron account
    pub async fn create_patron(
        &self,
        patron_type: PatronType,
        full_name: &str,
        id_number: &str,
        password_hash: &str,
        strand: Option<&str>,
        grade_level: Option<&str>,
    ) -> AppResult<Patron> {
        let created = sqlx::query_as::<_, Patron>(
            r#"
            INSERT INTO patrons (patron_type, full_name, id_number, password_hash, strand, grade_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, patron_type, full_name, id_number, strand, grade_level
            "#,
        )
        .bind(patron_type)
        .bind(full_name)
        .bind(id_number)
        .bind(password_hash)
        .bind(strand)
        .bind(grade_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("ID number {} is already registered", id_number))
            }
            _ => AppError::Database(e),
        })?;

        Ok(created)
    }

    /// Insert a new admin account
    pub async fn create_admin(
        &self,
        full_name: &str,
        id_number: &str,
        password_hash: &str,
    ) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO admins (full_name, id_number, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(full_name)
        .bind(id_number)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("ID number {} is already registered", id_number))
            }
            _ => AppError::Database(e),
        })?;

        Ok(id)
    }

    /// Look up a stored credential by role and login id number
    pub async fn find_credential(
        &self,
        role: Role,
        id_number: &str,
    ) -> AppResult<Option<Credential>> {
        let credential = match role.patron_type() {
            Some(pt) => {
                sqlx::query_as::<_, Credential>(
                    "SELECT id, full_name, password_hash FROM patrons
                     WHERE id_number = $1 AND patron_type = $2",
                )
                .bind(id_number)
                .bind(pt)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Credential>(
                    "SELECT id, full_name, password_hash FROM admins WHERE id_number = $1",
                )
                .bind(id_number)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(credential)
    }

    /// Replace a stored password hash
    pub async fn update_password(
        &self,
        role: Role,
        account_id: i64,
        password_hash: &str,
    ) -> AppResult<()> {
        let result = match role.patron_type() {
            Some(pt) => {
                sqlx::query("UPDATE patrons SET password_hash = $1 WHERE id = $2 AND patron_type = $3")
                    .bind(password_hash)
                    .bind(account_id)
                    .bind(pt)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("UPDATE admins SET password_hash = $1 WHERE id = $2")
                    .bind(password_hash)
                    .bind(account_id)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} account {} not found",
                role, account_id
            )));
        }

        Ok(())
    }

    /// Total patrons by role
    pub async fn count_by_type(&self, patron_type: PatronType) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM patrons WHERE patron_type = $1")
                .bind(patron_type)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
