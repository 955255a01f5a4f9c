//! # Postgres store
//!
//! sqlx-backed implementation of the store ports. Composite writes run in
//! transactions, and the reactions table carries a
//! `UNIQUE (account_id, response_id)` constraint as the final guard against
//! duplicate votes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use domains::{
    Account, AccountStore, Capability, CatalogStore, Forum, ForumError, ModerationProfile,
    Reaction, ReactionStore, Response, ResponseStore, Result, Section, Thread, ThreadStore,
};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and applies the embedded migrations.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(url)
            .await
            .map_err(infra)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ForumError::Internal(e.to_string()))?;
        info!("postgres store ready");
        Ok(Self { pool })
    }
}

fn infra(err: sqlx::Error) -> ForumError {
    ForumError::Internal(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn account_from_row(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        name: row.get("name"),
        capabilities: row.get::<Json<Vec<Capability>>, _>("capabilities").0,
        created_at: row.get("created_at"),
    }
}

fn thread_from_row(row: &PgRow) -> Thread {
    Thread {
        id: row.get("id"),
        forum_id: row.get("forum_id"),
        title: row.get("title"),
        pinned: row.get("pinned"),
        created_at: row.get("created_at"),
    }
}

fn response_from_row(row: &PgRow) -> Response {
    Response {
        id: row.get("id"),
        thread_id: row.get("thread_id"),
        responder_id: row.get("responder_id"),
        message: row.get("message"),
        order_in_thread: row.get::<i32, _>("order_in_thread") as u32,
        edited: row.get("edited"),
        created_at: row.get("created_at"),
    }
}

fn reaction_from_row(row: &PgRow) -> Reaction {
    Reaction {
        id: row.get("id"),
        response_id: row.get("response_id"),
        account_id: row.get("account_id"),
        like: row.get("liked"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn insert(&self, account: Account, profile: ModerationProfile) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let inserted = sqlx::query(
            "INSERT INTO accounts (id, name, capabilities, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(Json(&account.capabilities))
        .bind(account.created_at)
        .execute(&mut *tx)
        .await;
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(ForumError::Duplicate(format!(
                    "display name '{}' is already taken",
                    account.name
                )));
            }
            return Err(infra(err));
        }
        sqlx::query("INSERT INTO moderation_profiles (account_id, banned_until) VALUES ($1, $2)")
            .bind(profile.account_id)
            .bind(profile.banned_until)
            .execute(&mut *tx)
            .await
            .map_err(infra)?;
        tx.commit().await.map_err(infra)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, name, capabilities, created_at FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn profile(&self, account_id: Uuid) -> Result<Option<ModerationProfile>> {
        let row = sqlx::query(
            "SELECT account_id, banned_until FROM moderation_profiles WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;
        Ok(row.map(|r| ModerationProfile {
            account_id: r.get("account_id"),
            banned_until: r.get("banned_until"),
        }))
    }

    async fn set_banned_until(&self, account_id: Uuid, until: DateTime<Utc>) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE id = $1)")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await
                .map_err(infra)?;
        if !exists {
            return Err(ForumError::NotFound("account", account_id.to_string()));
        }
        sqlx::query(
            "INSERT INTO moderation_profiles (account_id, banned_until) VALUES ($1, $2) \
             ON CONFLICT (account_id) DO UPDATE SET banned_until = EXCLUDED.banned_until",
        )
        .bind(account_id)
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_section(&self, section: Section) -> Result<()> {
        sqlx::query("INSERT INTO sections (id, name) VALUES ($1, $2)")
            .bind(section.id)
            .bind(&section.name)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }

    async fn insert_forum(&self, forum: Forum) -> Result<()> {
        sqlx::query("INSERT INTO forums (id, section_id, name, description) VALUES ($1, $2, $3, $4)")
            .bind(forum.id)
            .bind(forum.section_id)
            .bind(&forum.name)
            .bind(&forum.description)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }

    async fn list_sections(&self) -> Result<Vec<Section>> {
        let rows = sqlx::query("SELECT id, name FROM sections ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        Ok(rows
            .into_iter()
            .map(|r| Section {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn list_forums_by_section(&self, section_id: Uuid) -> Result<Vec<Forum>> {
        let rows = sqlx::query(
            "SELECT id, section_id, name, description FROM forums \
             WHERE section_id = $1 ORDER BY name",
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        Ok(rows
            .into_iter()
            .map(|r| Forum {
                id: r.get("id"),
                section_id: r.get("section_id"),
                name: r.get("name"),
                description: r.get("description"),
            })
            .collect())
    }

    async fn get_forum(&self, id: Uuid) -> Result<Option<Forum>> {
        let row = sqlx::query("SELECT id, section_id, name, description FROM forums WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        Ok(row.map(|r| Forum {
            id: r.get("id"),
            section_id: r.get("section_id"),
            name: r.get("name"),
            description: r.get("description"),
        }))
    }
}

#[async_trait]
impl ThreadStore for PgStore {
    async fn create_with_root(&self, thread: Thread, root: Response) -> Result<()> {
        // One transaction so a thread never persists without its root.
        let mut tx = self.pool.begin().await.map_err(infra)?;
        sqlx::query(
            "INSERT INTO threads (id, forum_id, title, pinned, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(thread.id)
        .bind(thread.forum_id)
        .bind(&thread.title)
        .bind(thread.pinned)
        .bind(thread.created_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        sqlx::query(
            "INSERT INTO responses \
             (id, thread_id, responder_id, message, order_in_thread, edited, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(root.id)
        .bind(root.thread_id)
        .bind(root.responder_id)
        .bind(&root.message)
        .bind(root.order_in_thread as i32)
        .bind(root.edited)
        .bind(root.created_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        tx.commit().await.map_err(infra)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Thread>> {
        let row = sqlx::query("SELECT id, forum_id, title, pinned, created_at FROM threads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        Ok(row.as_ref().map(thread_from_row))
    }

    async fn list_by_forum(&self, forum_id: Uuid) -> Result<Vec<Thread>> {
        let rows = sqlx::query(
            "SELECT id, forum_id, title, pinned, created_at FROM threads \
             WHERE forum_id = $1 ORDER BY id",
        )
        .bind(forum_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        Ok(rows.iter().map(thread_from_row).collect())
    }

    async fn set_pinned(&self, id: Uuid, pinned: bool) -> Result<()> {
        let result = sqlx::query("UPDATE threads SET pinned = $2 WHERE id = $1")
            .bind(id)
            .bind(pinned)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(ForumError::NotFound("thread", id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Responses and reactions go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM threads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(ForumError::NotFound("thread", id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseStore for PgStore {
    async fn insert(&self, response: Response) -> Result<()> {
        sqlx::query(
            "INSERT INTO responses \
             (id, thread_id, responder_id, message, order_in_thread, edited, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(response.id)
        .bind(response.thread_id)
        .bind(response.responder_id)
        .bind(&response.message)
        .bind(response.order_in_thread as i32)
        .bind(response.edited)
        .bind(response.created_at)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Response>> {
        let row = sqlx::query(
            "SELECT id, thread_id, responder_id, message, order_in_thread, edited, created_at \
             FROM responses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;
        Ok(row.as_ref().map(response_from_row))
    }

    async fn list_by_thread(&self, thread_id: Uuid) -> Result<Vec<Response>> {
        let rows = sqlx::query(
            "SELECT id, thread_id, responder_id, message, order_in_thread, edited, created_at \
             FROM responses WHERE thread_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        Ok(rows.iter().map(response_from_row).collect())
    }

    async fn count_by_thread(&self, thread_id: Uuid) -> Result<u32> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE thread_id = $1")
            .bind(thread_id)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        Ok(count as u32)
    }

    async fn last_activity(&self, thread_id: Uuid) -> Result<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(created_at) FROM responses WHERE thread_id = $1")
                .bind(thread_id)
                .fetch_one(&self.pool)
                .await
                .map_err(infra)?;
        Ok(latest)
    }

    async fn update_message(&self, id: Uuid, message: &str) -> Result<()> {
        let result = sqlx::query("UPDATE responses SET message = $2, edited = TRUE WHERE id = $1")
            .bind(id)
            .bind(message)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(ForumError::NotFound("response", id.to_string()));
        }
        Ok(())
    }

    async fn set_ordinals(&self, assignments: &[(Uuid, u32)]) -> Result<()> {
        // One transaction so a half-renumbered thread is never visible.
        let mut tx = self.pool.begin().await.map_err(infra)?;
        for (id, ordinal) in assignments {
            sqlx::query("UPDATE responses SET order_in_thread = $2 WHERE id = $1")
                .bind(id)
                .bind(*ordinal as i32)
                .execute(&mut *tx)
                .await
                .map_err(infra)?;
        }
        tx.commit().await.map_err(infra)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM responses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(ForumError::NotFound("response", id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReactionStore for PgStore {
    async fn get(&self, account_id: Uuid, response_id: Uuid) -> Result<Option<Reaction>> {
        let row = sqlx::query(
            "SELECT id, response_id, account_id, liked, created_at FROM reactions \
             WHERE account_id = $1 AND response_id = $2",
        )
        .bind(account_id)
        .bind(response_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;
        Ok(row.as_ref().map(reaction_from_row))
    }

    async fn insert(&self, reaction: Reaction) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO reactions (id, response_id, account_id, liked, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(reaction.id)
        .bind(reaction.response_id)
        .bind(reaction.account_id)
        .bind(reaction.like)
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(ForumError::Duplicate(
                "a reaction already exists for this account and response".to_string(),
            )),
            Err(err) => Err(infra(err)),
        }
    }

    async fn set_like(&self, account_id: Uuid, response_id: Uuid, like: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE reactions SET liked = $3 WHERE account_id = $1 AND response_id = $2",
        )
        .bind(account_id)
        .bind(response_id)
        .bind(like)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(ForumError::NotFound(
                "reaction",
                format!("{account_id}/{response_id}"),
            ));
        }
        Ok(())
    }

    async fn delete(&self, account_id: Uuid, response_id: Uuid) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM reactions WHERE account_id = $1 AND response_id = $2")
                .bind(account_id)
                .bind(response_id)
                .execute(&self.pool)
                .await
                .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(ForumError::NotFound(
                "reaction",
                format!("{account_id}/{response_id}"),
            ));
        }
        Ok(())
    }
}
