//! Job persistence over a shared SQLite connection.
//!
//! Read and write operations never surface database errors to callers:
//! failures are logged and a neutral value is returned (`None`, `0` or an
//! empty vec). Only construction is fallible.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::error;

use crate::db::init_db;
use crate::error::Result;
use crate::types::{Job, JobHistory, JobStatus, JobUpdate, NewJob};

const JOB_COLUMNS: &str = "id, job_name, job_trigger, target_contact_or_group, message, \
     job_cron_expression, job_status, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct JobStore {
    conn: Arc<Mutex<Connection>>,
}

impl JobStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(JobStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new active job and return its id, or 0 on failure.
    pub fn create(&self, job: &NewJob) -> i64 {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO jobs (job_name, job_trigger, target_contact_or_group, message, \
             job_cron_expression) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                job.name,
                job.trigger,
                job.target,
                job.message,
                job.cron_expression
            ],
        );
        match result {
            Ok(_) => conn.last_insert_rowid(),
            Err(e) => {
                error!(name = %job.name, error = %e, "failed to create job");
                0
            }
        }
    }

    pub fn find_by_id(&self, id: i64) -> Option<Job> {
        let conn = self.conn.lock().unwrap();
        match find_by_id(&conn, id) {
            Ok(job) => job,
            Err(e) => {
                error!(job_id = id, error = %e, "failed to load job");
                None
            }
        }
    }

    pub fn find_by_status(&self, status: JobStatus) -> Vec<Job> {
        let conn = self.conn.lock().unwrap();
        let result = query_jobs(
            &conn,
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_status = ?1 ORDER BY id"),
            rusqlite::params![status.as_i64()],
        );
        result.unwrap_or_else(|e| {
            error!(error = %e, "failed to load jobs by status");
            Vec::new()
        })
    }

    /// Jobs eligible for scheduling: active, not soft-deleted, and with a
    /// non-empty target and message.
    pub fn eligible_jobs(&self) -> Vec<Job> {
        let conn = self.conn.lock().unwrap();
        let result = query_jobs(
            &conn,
            &format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE job_status = 1 \
                 AND deleted_at IS NULL \
                 AND target_contact_or_group <> '' AND message <> '' \
                 ORDER BY id"
            ),
            [],
        );
        result.unwrap_or_else(|e| {
            error!(error = %e, "failed to load eligible jobs");
            Vec::new()
        })
    }

    /// Newest-first page of non-deleted jobs. `search` matches the job
    /// name or target as a substring; an empty search matches everything.
    /// Pages are 1-based.
    pub fn paginate(&self, search: &str, limit: u32, page: u32) -> Vec<Job> {
        let offset = i64::from(limit) * i64::from(page.max(1) - 1);
        let pattern = format!("%{search}%");
        let conn = self.conn.lock().unwrap();
        let result = query_jobs(
            &conn,
            &format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE deleted_at IS NULL \
                 AND (job_name LIKE ?1 OR target_contact_or_group LIKE ?1) \
                 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
            ),
            rusqlite::params![pattern, limit, offset],
        );
        result.unwrap_or_else(|e| {
            error!(error = %e, "failed to paginate jobs");
            Vec::new()
        })
    }

    /// Count of non-deleted jobs.
    pub fn count_all(&self) -> i64 {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        );
        result.unwrap_or_else(|e| {
            error!(error = %e, "failed to count jobs");
            0
        })
    }

    /// Apply the non-`None` fields of `update` and return the updated row,
    /// or `None` when the id does not exist or the write fails.
    pub fn update_by_id(&self, id: i64, update: &JobUpdate) -> Option<Job> {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "UPDATE jobs SET \
             job_name = COALESCE(?1, job_name), \
             job_trigger = COALESCE(?2, job_trigger), \
             target_contact_or_group = COALESCE(?3, target_contact_or_group), \
             message = COALESCE(?4, message), \
             job_cron_expression = COALESCE(?5, job_cron_expression), \
             job_status = COALESCE(?6, job_status), \
             updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?7",
            rusqlite::params![
                update.name,
                update.trigger,
                update.target,
                update.message,
                update.cron_expression,
                update.status.map(JobStatus::as_i64),
                id
            ],
        );
        match result {
            Ok(0) => None,
            Ok(_) => find_by_id(&conn, id).ok().flatten(),
            Err(e) => {
                error!(job_id = id, error = %e, "failed to update job");
                None
            }
        }
    }

    /// Mark a job deleted without removing the row. Returns the marked job.
    pub fn soft_delete_by_id(&self, id: i64) -> Option<Job> {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "UPDATE jobs SET deleted_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?1",
            [id],
        );
        match result {
            Ok(0) => None,
            Ok(_) => find_by_id(&conn, id).ok().flatten(),
            Err(e) => {
                error!(job_id = id, error = %e, "failed to soft-delete job");
                None
            }
        }
    }

    /// Remove the row permanently. Returns the job as it was before the
    /// delete.
    pub fn force_delete_by_id(&self, id: i64) -> Option<Job> {
        let conn = self.conn.lock().unwrap();
        let job = match find_by_id(&conn, id) {
            Ok(job) => job?,
            Err(e) => {
                error!(job_id = id, error = %e, "failed to load job for delete");
                return None;
            }
        };
        match conn.execute("DELETE FROM jobs WHERE id = ?1", [id]) {
            Ok(0) => None,
            Ok(_) => Some(job),
            Err(e) => {
                error!(job_id = id, error = %e, "failed to delete job");
                None
            }
        }
    }

    /// Record one execution. `error_message` is set only for transport
    /// failures.
    pub fn append_history(
        &self,
        job_name: &str,
        execute_time: &str,
        complete_time: &str,
        error_message: Option<&str>,
    ) {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO job_histories (job_name, job_execute_time, job_complete_time, \
             job_error_message) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![job_name, execute_time, complete_time, error_message],
        );
        if let Err(e) = result {
            error!(name = %job_name, error = %e, "failed to record job history");
        }
    }

    /// Most recent executions, newest first.
    pub fn recent_history(&self, limit: u32) -> Vec<JobHistory> {
        let conn = self.conn.lock().unwrap();
        let result = (|| -> rusqlite::Result<Vec<JobHistory>> {
            let mut stmt = conn.prepare(
                "SELECT id, job_name, job_execute_time, job_complete_time, job_error_message \
                 FROM job_histories ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map([limit], |row| {
                Ok(JobHistory {
                    id: row.get(0)?,
                    job_name: row.get(1)?,
                    execute_time: row.get(2)?,
                    complete_time: row.get(3)?,
                    error_message: row.get(4)?,
                })
            })?;
            rows.collect()
        })();
        result.unwrap_or_else(|e| {
            error!(error = %e, "failed to load job history");
            Vec::new()
        })
    }
}

fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Job>> {
    conn.query_row(
        &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"),
        [id],
        row_to_job,
    )
    .optional()
}

fn query_jobs<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<Vec<Job>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_job)?;
    rows.collect()
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        name: row.get(1)?,
        trigger: row.get(2)?,
        target: row.get(3)?,
        message: row.get(4)?,
        cron_expression: row.get(5)?,
        status: JobStatus::from_i64(row.get(6)?),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        deleted_at: row.get(9)?,
    })
}
