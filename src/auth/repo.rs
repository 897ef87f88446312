use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_username(
        db: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, is_admin, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with an already-hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, is_admin, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }
}

// Comments that disappear with a user: their own, any on their stories, and
// replies under their comments (nesting is single-level, so no deeper chase).
const DOOMED_COMMENTS: &str = r#"
    SELECT id FROM comments
    WHERE user_id = $1
       OR story_id IN (SELECT id FROM stories WHERE user_id = $1)
       OR parent_id IN (SELECT id FROM comments WHERE user_id = $1)
"#;

/// Removes a user and everything hanging off them, in dependency order:
/// likes on doomed comments, notifications they own or that reference their
/// stories/comments, likes on their stories, the comments (replies first),
/// their stories, then the user row. Runs inside the caller's transaction.
pub async fn delete_user_cascade_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "DELETE FROM comment_likes WHERE user_id = $1 OR comment_id IN ({DOOMED_COMMENTS})"
    );
    sqlx::query(&sql).bind(user_id).execute(&mut **tx).await?;

    let sql = format!(
        r#"
        DELETE FROM notifications
        WHERE user_id = $1
           OR story_id IN (SELECT id FROM stories WHERE user_id = $1)
           OR comment_id IN ({DOOMED_COMMENTS})
        "#
    );
    sqlx::query(&sql).bind(user_id).execute(&mut **tx).await?;

    sqlx::query(
        r#"
        DELETE FROM story_likes
        WHERE user_id = $1
           OR story_id IN (SELECT id FROM stories WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    let sql =
        format!("DELETE FROM comments WHERE parent_id IS NOT NULL AND id IN ({DOOMED_COMMENTS})");
    sqlx::query(&sql).bind(user_id).execute(&mut **tx).await?;

    let sql = format!("DELETE FROM comments WHERE id IN ({DOOMED_COMMENTS})");
    sqlx::query(&sql).bind(user_id).execute(&mut **tx).await?;

    sqlx::query("DELETE FROM stories WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            is_admin: false,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }
}
