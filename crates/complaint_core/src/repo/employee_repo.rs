//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `employees` and supervisor hierarchy lookups.
//!
//! # Invariants
//! - Deleting an employee never deletes subordinates or complaints: their
//!   references to the employee are cleared in the same transaction.
//! - Comments and images the employee wrote are deleted with it.
//! - `supervisor_id` must reference an existing employee (store FK).

use crate::model::actor::ActorRef;
use crate::model::employee::{Employee, EmployeeId, EmployeeRole};
use crate::repo::{
    bool_to_int, delete_authored_rows, ensure_connection_ready, parse_bool, DeleteScope,
    RepoError, RepoResult,
};
use log::{error, info};
use rusqlite::{params, Connection, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    password_hash,
    role,
    supervisor_id,
    created_at,
    active
FROM employees";

/// Rows touched when an employee is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeDetachSummary {
    /// Subordinates whose `supervisor_id` was cleared.
    pub subordinates: usize,
    /// Complaints whose `assigned_to` or `assigned_by` was cleared.
    pub complaints: usize,
    /// Comments written by the employee, deleted.
    pub comments: usize,
    /// Images uploaded by the employee, deleted.
    pub images: usize,
}

/// Repository interface for employees.
pub trait EmployeeRepository {
    fn create_employee(&self, employee: &Employee) -> RepoResult<Employee>;
    fn update_employee(&self, employee: &Employee) -> RepoResult<()>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn list_employees(&self) -> RepoResult<Vec<Employee>>;
    /// Direct reports of `supervisor_id`, ordered by id.
    fn list_subordinates(&self, supervisor_id: EmployeeId) -> RepoResult<Vec<Employee>>;
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<EmployeeDetachSummary>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &Employee) -> RepoResult<Employee> {
        if employee.id.is_some() {
            return Err(RepoError::InvalidData(
                "create_employee expects an unsaved employee (id = None)".to_string(),
            ));
        }
        employee.validate()?;

        self.conn.execute(
            "INSERT INTO employees (
                name,
                email,
                password_hash,
                role,
                supervisor_id,
                created_at,
                active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                employee.name.as_str(),
                employee.email.as_str(),
                employee.password_hash.as_str(),
                role_to_db(employee.role),
                employee.supervisor_id,
                employee.created_at,
                bool_to_int(employee.active),
            ],
        )?;

        let mut created = employee.clone();
        created.id = Some(self.conn.last_insert_rowid());
        Ok(created)
    }

    fn update_employee(&self, employee: &Employee) -> RepoResult<()> {
        let id = employee.id.ok_or_else(|| {
            RepoError::InvalidData("update_employee requires a persisted employee".to_string())
        })?;
        employee.validate()?;

        let changed = self.conn.execute(
            "UPDATE employees
             SET
                name = ?1,
                email = ?2,
                password_hash = ?3,
                role = ?4,
                supervisor_id = ?5,
                active = ?6
             WHERE id = ?7;",
            params![
                employee.name.as_str(),
                employee.email.as_str(),
                employee.password_hash.as_str(),
                role_to_db(employee.role),
                employee.supervisor_id,
                bool_to_int(employee.active),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "employee",
                id,
            });
        }
        Ok(())
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }
        Ok(None)
    }

    fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        self.query_employees(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id ASC;"), None)
    }

    fn list_subordinates(&self, supervisor_id: EmployeeId) -> RepoResult<Vec<Employee>> {
        self.query_employees(
            &format!("{EMPLOYEE_SELECT_SQL} WHERE supervisor_id = ?1 ORDER BY id ASC;"),
            Some(supervisor_id),
        )
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<EmployeeDetachSummary> {
        let tx = DeleteScope::begin(self.conn)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotFound {
                entity: "employee",
                id,
            });
        }

        let outcome = detach_employee(&tx, id);
        match outcome {
            Ok(summary) => {
                tx.commit()?;
                info!(
                    "event=employee_delete module=repo status=ok employee_id={} subordinates={} complaints={} comments={} images={}",
                    id, summary.subordinates, summary.complaints, summary.comments, summary.images
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    "event=employee_delete module=repo status=error employee_id={} error={}",
                    id, err
                );
                Err(RepoError::CascadeFailure {
                    entity: "employee",
                    id,
                    reason: err.to_string(),
                })
            }
        }
    }
}

impl SqliteEmployeeRepository<'_> {
    fn query_employees(&self, sql: &str, key: Option<i64>) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match key {
            Some(key) => stmt.query([key])?,
            None => stmt.query([])?,
        };
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }
}

fn detach_employee(conn: &Connection, id: EmployeeId) -> rusqlite::Result<EmployeeDetachSummary> {
    let subordinates = conn.execute(
        "UPDATE employees SET supervisor_id = NULL WHERE supervisor_id = ?1;",
        [id],
    )?;
    let complaints = conn.execute(
        "UPDATE complaints
         SET
            assigned_to = CASE WHEN assigned_to = ?1 THEN NULL ELSE assigned_to END,
            assigned_by = CASE WHEN assigned_by = ?1 THEN NULL ELSE assigned_by END
         WHERE assigned_to = ?1 OR assigned_by = ?1;",
        [id],
    )?;
    let (comments, images) = delete_authored_rows(conn, ActorRef::Employee(id))?;
    conn.execute("DELETE FROM employees WHERE id = ?1;", [id])?;

    Ok(EmployeeDetachSummary {
        subordinates,
        complaints,
        comments,
        images,
    })
}

fn role_to_db(role: EmployeeRole) -> &'static str {
    match role {
        EmployeeRole::Agent => "AGENT",
        EmployeeRole::Manager => "MANAGER",
        EmployeeRole::Admin => "ADMIN",
    }
}

fn parse_role(value: &str) -> Option<EmployeeRole> {
    match value {
        "AGENT" => Some(EmployeeRole::Agent),
        "MANAGER" => Some(EmployeeRole::Manager),
        "ADMIN" => Some(EmployeeRole::Admin),
        _ => None,
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let role_text: String = row.get("role")?;
    let role = parse_role(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid employee role `{role_text}` in employees.role"))
    })?;

    let employee = Employee {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role,
        supervisor_id: row.get("supervisor_id")?,
        created_at: row.get("created_at")?,
        active: parse_bool(row.get("active")?, "employees.active")?,
    };
    employee.validate()?;
    Ok(employee)
}
