//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Isolate SQLite query details from service orchestration.
//! - Own multi-row delete semantics (cascade, detach) as explicit
//!   transactional logic.
//!
//! # Invariants
//! - Write paths call `validate()` on entities that define it before SQL
//!   mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Store constraint failures surface as `RepoError::ConstraintViolation`.
//! - Deleting a user or employee also deletes the comments and images it
//!   authored, so every stored `ActorRef` resolves.

pub mod comment_repo;
pub mod complaint_repo;
pub mod employee_repo;
pub mod image_repo;
pub mod user_repo;

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::actor::ActorRef;
use crate::model::validation::ModelValidationError;
use log::warn;
use rusqlite::{params, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for every repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed `validate()` before write or after read.
    Validation(ModelValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No row with this id.
    NotFound { entity: &'static str, id: i64 },
    /// Uniqueness or required-reference violation.
    ConstraintViolation(String),
    /// A multi-row delete failed part way and was rolled back.
    CascadeFailure {
        entity: &'static str,
        id: i64,
        reason: String,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted into a valid entity, or the call
    /// was made with an entity in the wrong persistence state.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::CascadeFailure { entity, id, reason } => write!(
                f,
                "cascade delete of {entity} {id} failed and was rolled back: {reason}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation {
                return Self::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rows removed by one cascade delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub complaints: usize,
    pub comments: usize,
    pub images: usize,
}

/// Rejects connections that were not opened through `db::open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn actor_kind_to_db(actor: ActorRef) -> &'static str {
    match actor {
        ActorRef::User(_) => "USER",
        ActorRef::Employee(_) => "EMPLOYEE",
    }
}

pub(crate) fn parse_actor(kind: &str, id: i64, column: &str) -> RepoResult<ActorRef> {
    match kind {
        "USER" => Ok(ActorRef::User(id)),
        "EMPLOYEE" => Ok(ActorRef::Employee(id)),
        other => Err(RepoError::InvalidData(format!(
            "invalid actor kind `{other}` in {column}"
        ))),
    }
}

/// Fails with `ConstraintViolation` unless `actor` names an existing row.
pub(crate) fn ensure_actor_exists(conn: &Connection, actor: ActorRef) -> RepoResult<()> {
    let sql = match actor {
        ActorRef::User(_) => "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
        ActorRef::Employee(_) => "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1);",
    };
    let exists: i64 = conn.query_row(sql, [actor.id()], |row| row.get(0))?;
    if exists != 1 {
        return Err(RepoError::ConstraintViolation(format!(
            "{} {} does not exist",
            actor_kind_to_db(actor).to_ascii_lowercase(),
            actor.id()
        )));
    }
    Ok(())
}

/// Fails with `ConstraintViolation` unless the complaint exists.
pub(crate) fn ensure_complaint_exists(conn: &Connection, complaint_id: i64) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM complaints WHERE id = ?1);",
        [complaint_id],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::ConstraintViolation(format!(
            "complaint {complaint_id} does not exist"
        )));
    }
    Ok(())
}

const NESTED_SCOPE_NAME: &str = "complaint_store_delete";

/// Atomic unit for multi-row deletes.
///
/// Opens `BEGIN IMMEDIATE` on an idle connection, or a savepoint inside the
/// caller's open transaction. Dropping without `commit` rolls back only the
/// work done in this scope.
pub(crate) struct DeleteScope<'conn> {
    conn: &'conn Connection,
    nested: bool,
    finished: bool,
}

impl<'conn> DeleteScope<'conn> {
    pub(crate) fn begin(conn: &'conn Connection) -> rusqlite::Result<Self> {
        let nested = !conn.is_autocommit();
        if nested {
            conn.execute_batch(&format!("SAVEPOINT {NESTED_SCOPE_NAME};"))?;
        } else {
            conn.execute_batch("BEGIN IMMEDIATE;")?;
        }
        Ok(Self {
            conn,
            nested,
            finished: false,
        })
    }

    pub(crate) fn commit(mut self) -> rusqlite::Result<()> {
        if self.nested {
            self.conn
                .execute_batch(&format!("RELEASE {NESTED_SCOPE_NAME};"))?;
        } else {
            self.conn.execute_batch("COMMIT;")?;
        }
        self.finished = true;
        Ok(())
    }
}

impl Deref for DeleteScope<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
    }
}

impl Drop for DeleteScope<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let sql = if self.nested {
            format!("ROLLBACK TO {NESTED_SCOPE_NAME}; RELEASE {NESTED_SCOPE_NAME};")
        } else {
            "ROLLBACK;".to_string()
        };
        if let Err(err) = self.conn.execute_batch(&sql) {
            warn!(
                "event=delete_rollback module=repo status=error nested={} error={}",
                self.nested, err
            );
        }
    }
}

/// Deletes comments and images authored by `actor` on any complaint.
///
/// Run before the actor row itself is removed so no polymorphic reference
/// is left pointing at a missing row. Returns `(comments, images)`.
pub(crate) fn delete_authored_rows(
    conn: &Connection,
    actor: ActorRef,
) -> rusqlite::Result<(usize, usize)> {
    let kind = actor_kind_to_db(actor);
    let comments = conn.execute(
        "DELETE FROM complaint_comments WHERE author_type = ?1 AND author_id = ?2;",
        params![kind, actor.id()],
    )?;
    let images = conn.execute(
        "DELETE FROM complaint_images WHERE uploader_type = ?1 AND uploader_id = ?2;",
        params![kind, actor.id()],
    )?;
    Ok((comments, images))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn count_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
