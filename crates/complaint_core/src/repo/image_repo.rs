//! Complaint image repository contracts and SQLite implementation.
//!
//! Stores file references only. Same write rules as comments: the
//! complaint must exist and the uploader must resolve.

use crate::model::complaint::ComplaintId;
use crate::model::image::{ComplaintImage, ImageId};
use crate::repo::{
    actor_kind_to_db, count_to_u64, ensure_actor_exists, ensure_complaint_exists,
    ensure_connection_ready, parse_actor, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const IMAGE_SELECT_SQL: &str = "SELECT
    id,
    complaint_id,
    uploader_type,
    uploader_id,
    file_url,
    description,
    created_at
FROM complaint_images";

/// Repository interface for complaint images.
pub trait ComplaintImageRepository {
    /// Creates or updates one image reference; `file_url` is stored trimmed.
    fn save(&self, image: &ComplaintImage) -> RepoResult<ComplaintImage>;
    fn find_by_id(&self, id: ImageId) -> RepoResult<ComplaintImage>;
    /// All images ordered by id.
    fn find_all(&self) -> RepoResult<Vec<ComplaintImage>>;
    fn list_for_complaint(&self, complaint_id: ComplaintId) -> RepoResult<Vec<ComplaintImage>>;
    fn delete_by_id(&self, id: ImageId) -> RepoResult<()>;
    fn exists_by_id(&self, id: ImageId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed complaint image repository.
pub struct SqliteComplaintImageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteComplaintImageRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ComplaintImageRepository for SqliteComplaintImageRepository<'_> {
    fn save(&self, image: &ComplaintImage) -> RepoResult<ComplaintImage> {
        ensure_complaint_exists(self.conn, image.complaint_id)?;
        ensure_actor_exists(self.conn, image.uploaded_by)?;

        let Some(id) = image.id else {
            self.conn.execute(
                "INSERT INTO complaint_images (
                    complaint_id,
                    uploader_type,
                    uploader_id,
                    file_url,
                    description,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    image.complaint_id,
                    actor_kind_to_db(image.uploaded_by),
                    image.uploaded_by.id(),
                    image.file_url.trim(),
                    image.description.as_deref(),
                    image.created_at,
                ],
            )?;
            let mut saved = image.clone();
            saved.id = Some(self.conn.last_insert_rowid());
            saved.file_url = image.file_url.trim().to_string();
            return Ok(saved);
        };

        let changed = self.conn.execute(
            "UPDATE complaint_images
             SET
                complaint_id = ?1,
                uploader_type = ?2,
                uploader_id = ?3,
                file_url = ?4,
                description = ?5,
                created_at = ?6
             WHERE id = ?7;",
            params![
                image.complaint_id,
                actor_kind_to_db(image.uploaded_by),
                image.uploaded_by.id(),
                image.file_url.trim(),
                image.description.as_deref(),
                image.created_at,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "complaint_image",
                id,
            });
        }

        let mut saved = image.clone();
        saved.file_url = image.file_url.trim().to_string();
        Ok(saved)
    }

    fn find_by_id(&self, id: ImageId) -> RepoResult<ComplaintImage> {
        let mut stmt = self
            .conn
            .prepare(&format!("{IMAGE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return parse_image_row(row);
        }
        Err(RepoError::NotFound {
            entity: "complaint_image",
            id,
        })
    }

    fn find_all(&self) -> RepoResult<Vec<ComplaintImage>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{IMAGE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut images = Vec::new();
        while let Some(row) = rows.next()? {
            images.push(parse_image_row(row)?);
        }
        Ok(images)
    }

    fn list_for_complaint(&self, complaint_id: ComplaintId) -> RepoResult<Vec<ComplaintImage>> {
        load_images_for_complaint(self.conn, complaint_id)
    }

    fn delete_by_id(&self, id: ImageId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM complaint_images WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "complaint_image",
                id,
            });
        }
        Ok(())
    }

    fn exists_by_id(&self, id: ImageId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM complaint_images WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM complaint_images;", [], |row| {
                row.get(0)
            })?;
        Ok(count_to_u64(count))
    }
}

pub(crate) fn load_images_for_complaint(
    conn: &Connection,
    complaint_id: ComplaintId,
) -> RepoResult<Vec<ComplaintImage>> {
    let mut stmt = conn.prepare(&format!(
        "{IMAGE_SELECT_SQL}
         WHERE complaint_id = ?1
         ORDER BY created_at ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([complaint_id])?;
    let mut images = Vec::new();
    while let Some(row) = rows.next()? {
        images.push(parse_image_row(row)?);
    }
    Ok(images)
}

fn parse_image_row(row: &Row<'_>) -> RepoResult<ComplaintImage> {
    let uploader_type: String = row.get("uploader_type")?;
    Ok(ComplaintImage {
        id: Some(row.get("id")?),
        complaint_id: row.get("complaint_id")?,
        uploaded_by: parse_actor(
            &uploader_type,
            row.get("uploader_id")?,
            "complaint_images.uploader_type",
        )?,
        file_url: row.get("file_url")?,
        created_at: row.get("created_at")?,
        description: row.get("description")?,
    })
}
