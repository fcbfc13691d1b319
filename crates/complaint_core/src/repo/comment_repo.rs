//! Complaint comment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the generic keyed persistence set over `complaint_comments`:
//!   save, find by id, find all, delete by id, existence check, count.
//!
//! # Invariants
//! - `save` inserts when `id` is `None` and updates otherwise.
//! - A comment is only written when its complaint exists and its author
//!   resolves to a row of the table its `ActorRef` variant selects.

use crate::model::actor::ActorRef;
use crate::model::comment::{CommentId, ComplaintComment};
use crate::model::complaint::ComplaintId;
use crate::repo::{
    actor_kind_to_db, count_to_u64, ensure_actor_exists, ensure_complaint_exists,
    ensure_connection_ready, parse_actor, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    complaint_id,
    author_type,
    author_id,
    comment_text,
    created_at
FROM complaint_comments";

/// Repository interface for complaint comments.
pub trait ComplaintCommentRepository {
    /// Creates or updates one comment and returns the persisted value.
    fn save(&self, comment: &ComplaintComment) -> RepoResult<ComplaintComment>;
    /// Loads one comment; `NotFound` when absent.
    fn find_by_id(&self, id: CommentId) -> RepoResult<ComplaintComment>;
    /// All comments ordered by id.
    fn find_all(&self) -> RepoResult<Vec<ComplaintComment>>;
    /// Deletes one comment; `NotFound` when absent.
    fn delete_by_id(&self, id: CommentId) -> RepoResult<()>;
    fn exists_by_id(&self, id: CommentId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;
    /// Comments of one complaint in posting order.
    fn list_for_complaint(&self, complaint_id: ComplaintId)
        -> RepoResult<Vec<ComplaintComment>>;
}

/// SQLite-backed complaint comment repository.
pub struct SqliteComplaintCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteComplaintCommentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ComplaintCommentRepository for SqliteComplaintCommentRepository<'_> {
    fn save(&self, comment: &ComplaintComment) -> RepoResult<ComplaintComment> {
        ensure_complaint_exists(self.conn, comment.complaint_id)?;
        ensure_actor_exists(self.conn, comment.author)?;

        match comment.id {
            None => {
                self.conn.execute(
                    "INSERT INTO complaint_comments (
                        complaint_id,
                        author_type,
                        author_id,
                        comment_text,
                        created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        comment.complaint_id,
                        actor_kind_to_db(comment.author),
                        comment.author.id(),
                        comment.comment_text.as_str(),
                        comment.created_at,
                    ],
                )?;
                let mut saved = comment.clone();
                saved.id = Some(self.conn.last_insert_rowid());
                Ok(saved)
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE complaint_comments
                     SET
                        complaint_id = ?1,
                        author_type = ?2,
                        author_id = ?3,
                        comment_text = ?4,
                        created_at = ?5
                     WHERE id = ?6;",
                    params![
                        comment.complaint_id,
                        actor_kind_to_db(comment.author),
                        comment.author.id(),
                        comment.comment_text.as_str(),
                        comment.created_at,
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "complaint_comment",
                        id,
                    });
                }
                Ok(comment.clone())
            }
        }
    }

    fn find_by_id(&self, id: CommentId) -> RepoResult<ComplaintComment> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return parse_comment_row(row);
        }
        Err(RepoError::NotFound {
            entity: "complaint_comment",
            id,
        })
    }

    fn find_all(&self) -> RepoResult<Vec<ComplaintComment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn delete_by_id(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM complaint_comments WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "complaint_comment",
                id,
            });
        }
        Ok(())
    }

    fn exists_by_id(&self, id: CommentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM complaint_comments WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM complaint_comments;", [], |row| {
                    row.get(0)
                })?;
        Ok(count_to_u64(count))
    }

    fn list_for_complaint(
        &self,
        complaint_id: ComplaintId,
    ) -> RepoResult<Vec<ComplaintComment>> {
        load_comments_for_complaint(self.conn, complaint_id)
    }
}

pub(crate) fn load_comments_for_complaint(
    conn: &Connection,
    complaint_id: ComplaintId,
) -> RepoResult<Vec<ComplaintComment>> {
    let mut stmt = conn.prepare(&format!(
        "{COMMENT_SELECT_SQL}
         WHERE complaint_id = ?1
         ORDER BY created_at ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([complaint_id])?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        comments.push(parse_comment_row(row)?);
    }
    Ok(comments)
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<ComplaintComment> {
    let author_type: String = row.get("author_type")?;
    let author: ActorRef = parse_actor(
        &author_type,
        row.get("author_id")?,
        "complaint_comments.author_type",
    )?;

    Ok(ComplaintComment {
        id: Some(row.get("id")?),
        complaint_id: row.get("complaint_id")?,
        author,
        comment_text: row.get("comment_text")?,
        created_at: row.get("created_at")?,
    })
}
