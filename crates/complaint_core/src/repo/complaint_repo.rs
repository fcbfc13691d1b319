//! Complaint repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered listing over `complaints`.
//! - Load a complaint together with its owned comments and images.
//! - Own the complaint → comments/images cascade delete.
//!
//! # Invariants
//! - `update_complaint` stamps `updated_at` in the same statement that
//!   writes the row.
//! - List order is deterministic: `updated_at DESC, id ASC`.

use crate::model::comment::ComplaintComment;
use crate::model::complaint::{Complaint, ComplaintId, ComplaintStatus};
use crate::model::employee::EmployeeId;
use crate::model::image::ComplaintImage;
use crate::model::user::UserId;
use crate::repo::comment_repo::load_comments_for_complaint;
use crate::repo::image_repo::load_images_for_complaint;
use crate::repo::{ensure_connection_ready, CascadeSummary, DeleteScope, RepoError, RepoResult};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const COMPLAINT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    product_type,
    product_model,
    purchased_from,
    purchase_date,
    issue_description,
    status,
    assigned_to,
    assigned_by,
    reject_reason,
    created_at,
    updated_at
FROM complaints";

/// Query options for listing complaints.
#[derive(Debug, Clone, Default)]
pub struct ComplaintListQuery {
    pub user_id: Option<UserId>,
    pub status: Option<ComplaintStatus>,
    pub assigned_to: Option<EmployeeId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// A complaint with its owned collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintDetails {
    pub complaint: Complaint,
    /// Ordered by `created_at ASC, id ASC`.
    pub comments: Vec<ComplaintComment>,
    /// Ordered by `created_at ASC, id ASC`.
    pub images: Vec<ComplaintImage>,
}

/// Repository interface for complaints.
pub trait ComplaintRepository {
    /// Inserts an unsaved complaint and returns it with `id` populated.
    fn create_complaint(&self, complaint: &Complaint) -> RepoResult<Complaint>;
    /// Writes every mutable field and refreshes `updated_at`.
    ///
    /// On success `complaint.updated_at` holds the persisted stamp; on error
    /// the value is left untouched.
    fn update_complaint(&self, complaint: &mut Complaint) -> RepoResult<()>;
    fn get_complaint(&self, id: ComplaintId) -> RepoResult<Option<Complaint>>;
    fn list_complaints(&self, query: &ComplaintListQuery) -> RepoResult<Vec<Complaint>>;
    fn load_details(&self, id: ComplaintId) -> RepoResult<Option<ComplaintDetails>>;
    /// Deletes the complaint with its comments and images.
    fn delete_complaint(&self, id: ComplaintId) -> RepoResult<CascadeSummary>;
}

/// SQLite-backed complaint repository.
pub struct SqliteComplaintRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteComplaintRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ComplaintRepository for SqliteComplaintRepository<'_> {
    fn create_complaint(&self, complaint: &Complaint) -> RepoResult<Complaint> {
        if complaint.id.is_some() {
            return Err(RepoError::InvalidData(
                "create_complaint expects an unsaved complaint (id = None)".to_string(),
            ));
        }
        complaint.validate()?;

        self.conn.execute(
            "INSERT INTO complaints (
                user_id,
                product_type,
                product_model,
                purchased_from,
                purchase_date,
                issue_description,
                status,
                assigned_to,
                assigned_by,
                reject_reason,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                complaint.user_id,
                complaint.product_type.as_str(),
                complaint.product_model.as_str(),
                complaint.purchased_from.as_str(),
                complaint.purchase_date,
                complaint.issue_description.as_str(),
                complaint.status.as_str(),
                complaint.assigned_to,
                complaint.assigned_by,
                complaint.reject_reason.as_deref(),
                complaint.created_at,
                complaint.updated_at,
            ],
        )?;

        let mut created = complaint.clone();
        created.id = Some(self.conn.last_insert_rowid());
        Ok(created)
    }

    fn update_complaint(&self, complaint: &mut Complaint) -> RepoResult<()> {
        let id = complaint.id.ok_or_else(|| {
            RepoError::InvalidData("update_complaint requires a persisted complaint".to_string())
        })?;
        let mut stamped = complaint.clone();
        stamped.touch();
        stamped.validate()?;

        let changed = self.conn.execute(
            "UPDATE complaints
             SET
                user_id = ?1,
                product_type = ?2,
                product_model = ?3,
                purchased_from = ?4,
                purchase_date = ?5,
                issue_description = ?6,
                status = ?7,
                assigned_to = ?8,
                assigned_by = ?9,
                reject_reason = ?10,
                updated_at = ?11
             WHERE id = ?12;",
            params![
                stamped.user_id,
                stamped.product_type.as_str(),
                stamped.product_model.as_str(),
                stamped.purchased_from.as_str(),
                stamped.purchase_date,
                stamped.issue_description.as_str(),
                stamped.status.as_str(),
                stamped.assigned_to,
                stamped.assigned_by,
                stamped.reject_reason.as_deref(),
                stamped.updated_at,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "complaint",
                id,
            });
        }

        *complaint = stamped;
        Ok(())
    }

    fn get_complaint(&self, id: ComplaintId) -> RepoResult<Option<Complaint>> {
        get_complaint_row(self.conn, id)
    }

    fn list_complaints(&self, query: &ComplaintListQuery) -> RepoResult<Vec<Complaint>> {
        let mut sql = format!("{COMPLAINT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = query.user_id {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Integer(user_id));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(assigned_to) = query.assigned_to {
            sql.push_str(" AND assigned_to = ?");
            bind_values.push(Value::Integer(assigned_to));
        }

        sql.push_str(" ORDER BY updated_at DESC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut complaints = Vec::new();
        while let Some(row) = rows.next()? {
            complaints.push(parse_complaint_row(row)?);
        }
        Ok(complaints)
    }

    fn load_details(&self, id: ComplaintId) -> RepoResult<Option<ComplaintDetails>> {
        let Some(complaint) = get_complaint_row(self.conn, id)? else {
            return Ok(None);
        };
        let comments = load_comments_for_complaint(self.conn, id)?;
        let images = load_images_for_complaint(self.conn, id)?;
        Ok(Some(ComplaintDetails {
            complaint,
            comments,
            images,
        }))
    }

    fn delete_complaint(&self, id: ComplaintId) -> RepoResult<CascadeSummary> {
        let tx = DeleteScope::begin(self.conn)?;
        if get_complaint_row(&tx, id)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "complaint",
                id,
            });
        }

        match delete_complaint_graph(&tx, "id = ?1", id) {
            Ok(summary) => {
                tx.commit()?;
                info!(
                    "event=complaint_delete module=repo status=ok complaint_id={} comments={} images={}",
                    id, summary.comments, summary.images
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    "event=complaint_delete module=repo status=error complaint_id={} error={}",
                    id, err
                );
                Err(RepoError::CascadeFailure {
                    entity: "complaint",
                    id,
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Deletes images, comments and complaints matching `predicate`, children
/// first. `predicate` is a fixed SQL fragment over `complaints` with one `?1`
/// placeholder bound to `key`.
///
/// Must run inside the caller's transaction.
pub(crate) fn delete_complaint_graph(
    conn: &Connection,
    predicate: &str,
    key: i64,
) -> RepoResult<CascadeSummary> {
    let images = conn.execute(
        &format!(
            "DELETE FROM complaint_images
             WHERE complaint_id IN (SELECT id FROM complaints WHERE {predicate});"
        ),
        [key],
    )?;
    let comments = conn.execute(
        &format!(
            "DELETE FROM complaint_comments
             WHERE complaint_id IN (SELECT id FROM complaints WHERE {predicate});"
        ),
        [key],
    )?;
    let complaints = conn.execute(&format!("DELETE FROM complaints WHERE {predicate};"), [key])?;

    Ok(CascadeSummary {
        complaints,
        comments,
        images,
    })
}

fn get_complaint_row(conn: &Connection, id: ComplaintId) -> RepoResult<Option<Complaint>> {
    let mut stmt = conn.prepare(&format!("{COMPLAINT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_complaint_row(row)?));
    }
    Ok(None)
}

fn parse_complaint_row(row: &Row<'_>) -> RepoResult<Complaint> {
    let status_text: String = row.get("status")?;
    let status = ComplaintStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid complaint status `{status_text}` in complaints.status"
        ))
    })?;

    let complaint = Complaint {
        id: Some(row.get("id")?),
        user_id: row.get("user_id")?,
        product_type: row.get("product_type")?,
        product_model: row.get("product_model")?,
        purchased_from: row.get("purchased_from")?,
        purchase_date: row.get("purchase_date")?,
        issue_description: row.get("issue_description")?,
        status,
        assigned_to: row.get("assigned_to")?,
        assigned_by: row.get("assigned_by")?,
        reject_reason: row.get("reject_reason")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    complaint.validate()?;
    Ok(complaint)
}
