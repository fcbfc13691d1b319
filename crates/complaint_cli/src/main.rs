//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured complaint store and report schema and row counts.
//! - Keep output deterministic for quick local sanity checks.

use complaint_core::db::migrations::current_user_version;
use complaint_core::db::open_db;
use complaint_core::{
    init_logging, ComplaintCommentRepository, ComplaintImageRepository, CoreConfig,
    SqliteComplaintCommentRepository, SqliteComplaintImageRepository, SqliteUserRepository,
    UserRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("complaint_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env();
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let users = SqliteUserRepository::try_new(&conn)?.count_users()?;
    let comments = SqliteComplaintCommentRepository::try_new(&conn)?.count()?;
    let images = SqliteComplaintImageRepository::try_new(&conn)?.count()?;
    info!("event=cli_summary module=cli status=ok users={users} comments={comments} images={images}");

    println!("complaint_core version={}", complaint_core::core_version());
    println!("db_path={}", config.db_path.display());
    println!("schema_version={}", current_user_version(&conn)?);
    println!("users={users} comments={comments} images={images}");
    Ok(())
}
