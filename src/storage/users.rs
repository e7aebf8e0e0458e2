//! User repository

use crate::storage::db::{decode_time, encode_time, map_unique, Database};
use crate::storage::{Role, RoleProfile, StorageError, StorageResult, User};
use rusqlite::{params, OptionalExtension, Row};

const USER_COLUMNS: &str =
    "id, email, name, role, verified, profile, created_at, updated_at, password_hash";

/// Row as stored, before decoding
struct RawUser {
    id: String,
    email: String,
    name: String,
    role: String,
    verified: bool,
    profile: Option<String>,
    created_at: String,
    updated_at: String,
    password_hash: String,
}

impl RawUser {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: row.get(3)?,
            verified: row.get(4)?,
            profile: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            password_hash: row.get(8)?,
        })
    }

    fn decode(self) -> StorageResult<(User, String)> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e: String| StorageError::Corruption(e))?;

        let profile = match self.profile {
            Some(raw) => Some(serde_json::from_str::<RoleProfile>(&raw)?),
            None => None,
        };

        let user = User {
            id: self.id,
            email: self.email,
            name: self.name,
            role,
            verified: self.verified,
            profile,
            created_at: decode_time(&self.created_at)?,
            updated_at: decode_time(&self.updated_at)?,
        };

        Ok((user, self.password_hash))
    }
}

/// Head counts for the admin overview
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCounts {
    pub admins: usize,
    pub staff: usize,
    pub students: usize,
    pub pending: usize,
    pub verified: usize,
    pub without_profile: usize,
}

fn encode_profile(user: &User) -> StorageResult<Option<String>> {
    user.profile
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(StorageError::from)
}

impl Database {
    /// Insert a new user with its password hash
    pub fn insert_user(&self, user: &User, password_hash: &str) -> StorageResult<()> {
        let profile = encode_profile(user)?;

        self.conn()?
            .execute(
                "INSERT INTO users (id, email, name, role, verified, password_hash, profile, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    user.id,
                    user.email,
                    user.name,
                    user.role.as_str(),
                    user.verified,
                    password_hash,
                    profile,
                    encode_time(&user.created_at),
                    encode_time(&user.updated_at),
                ],
            )
            .map_err(|e| map_unique(e, "users.email"))?;

        Ok(())
    }

    /// Fetch a user by id
    pub fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        let raw = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                RawUser::from_row,
            )
            .optional()?;

        raw.map(|r| r.decode().map(|(user, _)| user)).transpose()
    }

    /// Fetch a user and password hash by (case-insensitive) email
    pub fn get_user_with_hash(&self, email: &str) -> StorageResult<Option<(User, String)>> {
        let raw = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![email.trim().to_lowercase()],
                RawUser::from_row,
            )
            .optional()?;

        raw.map(RawUser::decode).transpose()
    }

    /// All users, newest first
    pub fn list_users(&self) -> StorageResult<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id",
            USER_COLUMNS
        ))?;

        let raws = stmt
            .query_map([], RawUser::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raws.into_iter()
            .map(|r| r.decode().map(|(user, _)| user))
            .collect()
    }

    /// Users with a given role
    pub fn list_users_by_role(&self, role: Role) -> StorageResult<Vec<User>> {
        Ok(self
            .list_users()?
            .into_iter()
            .filter(|u| u.role == role)
            .collect())
    }

    /// Overwrite the mutable columns of a user. Returns false if it is gone.
    pub fn update_user(&self, user: &User) -> StorageResult<bool> {
        let profile = encode_profile(user)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let changed = tx
            .execute(
                "UPDATE users SET email = ?, name = ?, role = ?, verified = ?, profile = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    user.email,
                    user.name,
                    user.role.as_str(),
                    user.verified,
                    profile,
                    encode_time(&user.updated_at),
                    user.id,
                ],
            )
            .map_err(|e| map_unique(e, "users.email"))?;

        // Only students can be linked from a lead
        if changed > 0 && user.role != Role::Student {
            tx.execute(
                "UPDATE leads SET student_id = NULL WHERE student_id = ?",
                params![user.id],
            )?;
        }
        tx.commit()?;

        Ok(changed > 0)
    }

    /// Delete a user; sessions go with it and leads linked to them are
    /// unlinked. Returns false if it was not there.
    pub fn delete_user(&self, id: &str) -> StorageResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM sessions WHERE user_id = ?", params![id])?;
        tx.execute(
            "UPDATE leads SET student_id = NULL WHERE student_id = ?",
            params![id],
        )?;
        let removed = tx.execute("DELETE FROM users WHERE id = ?", params![id])?;
        tx.commit()?;

        Ok(removed > 0)
    }

    /// Head counts by role and approval state
    pub fn user_counts(&self) -> StorageResult<UserCounts> {
        let conn = self.conn()?;
        let counts = conn.query_row(
            "SELECT
                COALESCE(SUM(role = 'admin'), 0),
                COALESCE(SUM(role = 'staff'), 0),
                COALESCE(SUM(role = 'student'), 0),
                COALESCE(SUM(role != 'admin' AND verified = 0), 0),
                COALESCE(SUM(verified = 1), 0),
                COALESCE(SUM(profile IS NULL), 0)
             FROM users",
            [],
            |row| {
                Ok(UserCounts {
                    admins: row.get::<_, i64>(0)? as usize,
                    staff: row.get::<_, i64>(1)? as usize,
                    students: row.get::<_, i64>(2)? as usize,
                    pending: row.get::<_, i64>(3)? as usize,
                    verified: row.get::<_, i64>(4)? as usize,
                    without_profile: row.get::<_, i64>(5)? as usize,
                })
            },
        )?;

        Ok(counts)
    }
}
