//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `users`.
//! - Own the user → complaints → comments/images cascade delete.
//!
//! # Invariants
//! - `email` uniqueness is enforced by the store (`COLLATE NOCASE` index).
//! - `created_at` is written once on insert and never updated.
//! - `delete_user` removes the whole owned graph, plus comments and images
//!   the user wrote on other complaints, in one transaction or nothing at
//!   all.

use crate::model::actor::ActorRef;
use crate::model::user::{User, UserId};
use crate::repo::complaint_repo::delete_complaint_graph;
use crate::repo::{
    bool_to_int, count_to_u64, delete_authored_rows, ensure_connection_ready, parse_bool,
    CascadeSummary, DeleteScope, RepoError, RepoResult,
};
use log::{error, info};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    password_hash,
    phone,
    created_at,
    active
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts an unsaved user and returns it with `id` populated.
    fn create_user(&self, user: &User) -> RepoResult<User>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Case-insensitive email lookup.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Deletes the user and every complaint it owns, with their comments and
    /// images. Comments and images the user wrote on other complaints are
    /// deleted too and counted in the summary.
    ///
    /// Runs in a savepoint when the connection is already inside a
    /// transaction.
    fn delete_user(&self, id: UserId) -> RepoResult<CascadeSummary>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<User> {
        if user.id.is_some() {
            return Err(RepoError::InvalidData(
                "create_user expects an unsaved user (id = None)".to_string(),
            ));
        }
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                name,
                email,
                password_hash,
                phone,
                created_at,
                active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                user.name.as_str(),
                user.email.trim(),
                user.password_hash.as_str(),
                user.phone.as_deref(),
                user.created_at,
                bool_to_int(user.active),
            ],
        )?;

        let mut created = user.clone();
        created.id = Some(self.conn.last_insert_rowid());
        created.email = user.email.trim().to_string();
        Ok(created)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        let id = user.id.ok_or_else(|| {
            RepoError::InvalidData("update_user requires a persisted user".to_string())
        })?;
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                name = ?1,
                email = ?2,
                password_hash = ?3,
                phone = ?4,
                active = ?5
             WHERE id = ?6;",
            params![
                user.name.as_str(),
                user.email.trim(),
                user.password_hash.as_str(),
                user.phone.as_deref(),
                bool_to_int(user.active),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"
        ))?;
        let mut rows = stmt.query([email.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<CascadeSummary> {
        let tx = DeleteScope::begin(self.conn)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        let outcome = delete_complaint_graph(&tx, "user_id = ?1", id).and_then(|mut summary| {
            let (comments, images) = delete_authored_rows(&tx, ActorRef::User(id))?;
            summary.comments += comments;
            summary.images += images;
            tx.execute("DELETE FROM users WHERE id = ?1;", [id])?;
            Ok(summary)
        });

        match outcome {
            Ok(summary) => {
                tx.commit()?;
                info!(
                    "event=user_delete module=repo status=ok user_id={} complaints={} comments={} images={}",
                    id, summary.complaints, summary.comments, summary.images
                );
                Ok(summary)
            }
            Err(err) => {
                // Dropping `tx` rolls back every partial delete.
                error!(
                    "event=user_delete module=repo status=error user_id={} error={}",
                    id, err
                );
                Err(RepoError::CascadeFailure {
                    entity: "user",
                    id,
                    reason: err.to_string(),
                })
            }
        }
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count_to_u64(count))
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        phone: row.get("phone")?,
        created_at: row.get("created_at")?,
        active: parse_bool(row.get("active")?, "users.active")?,
    };
    user.validate()?;
    Ok(user)
}
