#![allow(dead_code)]

use complaint_core::db::open_db_in_memory;
use complaint_core::{
    Complaint, ComplaintDraft, ComplaintRepository, Employee, EmployeeRepository, EmployeeRole,
    SqliteComplaintRepository, SqliteEmployeeRepository, SqliteUserRepository, User,
    UserRepository,
};
use rusqlite::Connection;

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn insert_user(conn: &Connection, email: &str) -> User {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    repo.create_user(&User::new("Test User", email, "$argon2id$hash"))
        .unwrap()
}

pub fn insert_employee(conn: &Connection, email: &str, role: EmployeeRole) -> Employee {
    let repo = SqliteEmployeeRepository::try_new(conn).unwrap();
    repo.create_employee(&Employee::new("Test Agent", email, "$argon2id$hash", role))
        .unwrap()
}

pub fn draft(issue: &str) -> ComplaintDraft {
    ComplaintDraft {
        product_type: "washing machine".to_string(),
        product_model: "WM-200".to_string(),
        purchased_from: "Main Street Store".to_string(),
        purchase_date: Some(1_700_000_000_000),
        issue_description: issue.to_string(),
    }
}

pub fn insert_complaint(conn: &Connection, user: &User, issue: &str) -> Complaint {
    let repo = SqliteComplaintRepository::try_new(conn).unwrap();
    repo.create_complaint(&Complaint::new(user.id.unwrap(), draft(issue)))
        .unwrap()
}

pub fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
