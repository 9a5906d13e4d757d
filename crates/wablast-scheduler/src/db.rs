//! SQLite schema for jobs and their execution history. All statements are
//! idempotent so startup can run them unconditionally.

use rusqlite::Connection;

pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_name TEXT NOT NULL,
            job_trigger TEXT NOT NULL,
            target_contact_or_group TEXT NOT NULL,
            message TEXT NOT NULL,
            job_cron_expression TEXT NOT NULL,
            job_status INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(job_status);
        CREATE INDEX IF NOT EXISTS idx_jobs_deleted_at ON jobs(deleted_at);

        CREATE TABLE IF NOT EXISTS job_histories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_name TEXT NOT NULL,
            job_execute_time TEXT NOT NULL,
            job_complete_time TEXT NOT NULL,
            job_error_message TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_job_histories_name ON job_histories(job_name);",
    )
}
