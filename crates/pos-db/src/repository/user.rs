//! User accounts. Password hashes are produced and verified by the
//! server app; this repository only stores and returns them.

use std::sync::Arc;

use pos_core::{Role, User};

use crate::error::{DbError, DbResult};
use crate::gateway::{query_one, Gateway, Row, Statement};

/// A user row including its password hash, for login verification only.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

pub struct UserRepository {
    gateway: Arc<dyn Gateway>,
}

impl UserRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        UserRepository { gateway }
    }

    pub async fn list(&self) -> DbResult<Vec<User>> {
        let rows = self
            .gateway
            .query(Statement::new(
                "SELECT id, username, role, full_name FROM users ORDER BY username",
            ))
            .await?;
        rows.iter().map(map_user).collect()
    }

    pub async fn get(&self, id: i64) -> DbResult<User> {
        let row = query_one(
            self.gateway.as_ref(),
            Statement::new("SELECT id, username, role, full_name FROM users WHERE id = ?").bind(id),
        )
        .await?
        .ok_or_else(|| DbError::not_found("User", id))?;
        map_user(&row)
    }

    /// Looks up credentials by username for the login flow.
    pub async fn get_credentials(&self, username: &str) -> DbResult<Option<UserCredentials>> {
        let row = query_one(
            self.gateway.as_ref(),
            Statement::new(
                "SELECT id, username, password, role, full_name FROM users WHERE username = ?",
            )
            .bind(username),
        )
        .await?;

        row.map(|row| {
            Ok(UserCredentials {
                user: map_user(&row)?,
                password_hash: row.text("password")?,
            })
        })
        .transpose()
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        full_name: &str,
    ) -> DbResult<User> {
        let now = crate::now_timestamp();
        let result = self
            .gateway
            .execute(
                Statement::new(
                    "INSERT INTO users (username, password, role, full_name, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(username)
                .bind(password_hash)
                .bind(role.as_str())
                .bind(full_name)
                .bind(now.clone())
                .bind(now),
            )
            .await?;
        self.get(result.last_insert_id).await
    }

    pub async fn update(&self, id: i64, full_name: &str, role: Role) -> DbResult<User> {
        let result = self
            .gateway
            .execute(
                Statement::new(
                    "UPDATE users SET full_name = ?, role = ?, updated_at = ? WHERE id = ?",
                )
                .bind(full_name)
                .bind(role.as_str())
                .bind(crate::now_timestamp())
                .bind(id),
            )
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("User", id));
        }
        self.get(id).await
    }

    /// Replaces a user's password hash. Hashing happens in the caller.
    pub async fn set_password(&self, id: i64, password_hash: &str) -> DbResult<()> {
        let result = self
            .gateway
            .execute(
                Statement::new("UPDATE users SET password = ?, updated_at = ? WHERE id = ?")
                    .bind(password_hash)
                    .bind(crate::now_timestamp())
                    .bind(id),
            )
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }

    /// Deletes a user unless sales history references them as cashier.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let referenced = query_one(
            self.gateway.as_ref(),
            Statement::new("SELECT COUNT(*) AS n FROM sales WHERE cashier_id = ?").bind(id),
        )
        .await?
        .map(|r| r.integer("n"))
        .transpose()?
        .unwrap_or(0);

        if referenced > 0 {
            return Err(DbError::Referenced { entity: "User", id });
        }

        let result = self
            .gateway
            .execute(Statement::new("DELETE FROM users WHERE id = ?").bind(id))
            .await?;
        if result.rows_affected == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let row = query_one(
            self.gateway.as_ref(),
            Statement::new("SELECT COUNT(*) AS n FROM users"),
        )
        .await?;
        row.map(|r| r.integer("n")).transpose().map(|n| n.unwrap_or(0))
    }
}

fn map_user(row: &Row) -> DbResult<User> {
    let role_text = row.text("role")?;
    let role = Role::parse(&role_text)
        .ok_or_else(|| DbError::RowDecode(format!("unknown role '{role_text}'")))?;
    Ok(User {
        id: row.integer("id")?,
        username: row.text("username")?,
        role,
        full_name: row.opt_text("full_name")?,
    })
}
