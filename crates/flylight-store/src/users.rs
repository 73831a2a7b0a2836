//! User accounts.

use crate::error::{StoreError, StoreResult};
use crate::Store;
use chrono::{DateTime, Utc};
use flylight_core::{Role, User};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).map_err(|e| StoreError::corrupt("users", e.to_string()))?;
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

impl Store {
    /// Insert a user; a taken email yields [`StoreError::Duplicate`]
    pub async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::on_unique("Email already exists"))?;
        Ok(())
    }

    pub async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = Store::in_memory().await.unwrap();
        let user = User::new("admin@flylight.com", "$argon2id$hash", Role::Admin);
        store.insert_user(&user).await.unwrap();

        let found = store.find_user_by_email("admin@flylight.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(found.is_admin());
        assert!(store.find_user("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = Store::in_memory().await.unwrap();
        store
            .insert_user(&User::new("a@b.com", "h1", Role::User))
            .await
            .unwrap();

        let err = store
            .insert_user(&User::new("a@b.com", "h2", Role::User))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }
}
