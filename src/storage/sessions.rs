//! Session repository

use crate::storage::db::{decode_time, encode_time, Database};
use crate::storage::{Session, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

impl Database {
    pub fn insert_session(&self, session: &Session) -> StorageResult<()> {
        self.conn()?.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
            params![
                session.token,
                session.user_id,
                encode_time(&session.created_at),
                encode_time(&session.expires_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_session(&self, token: &str) -> StorageResult<Option<Session>> {
        let raw = self
            .conn()?
            .query_row(
                "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?",
                params![token],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((token, user_id, created_at, expires_at)) => Ok(Some(Session {
                token,
                user_id,
                created_at: decode_time(&created_at)?,
                expires_at: decode_time(&expires_at)?,
            })),
            None => Ok(None),
        }
    }

    /// Returns false if the token was unknown
    pub fn delete_session(&self, token: &str) -> StorageResult<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM sessions WHERE token = ?", params![token])?;
        Ok(removed > 0)
    }

    pub fn delete_sessions_for_user(&self, user_id: &str) -> StorageResult<usize> {
        let removed = self
            .conn()?
            .execute("DELETE FROM sessions WHERE user_id = ?", params![user_id])?;
        Ok(removed)
    }

    /// Drop every session that expired before `now`
    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        // RFC 3339 strings in UTC sort lexicographically, but only with equal
        // precision, so compare parsed values instead of strings.
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT token, expires_at FROM sessions")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut removed = 0;
        for (token, expires_at) in rows {
            if decode_time(&expires_at)? <= now {
                removed += conn.execute("DELETE FROM sessions WHERE token = ?", params![token])?;
            }
        }

        Ok(removed)
    }
}
