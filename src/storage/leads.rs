//! Lead repository

use crate::storage::db::{decode_time, encode_time, map_unique, Database};
use crate::storage::{Lead, LeadSource, LeadStatus, StorageError, StorageResult};
use rusqlite::{params, OptionalExtension, Row};

const LEAD_COLUMNS: &str = "id, name, english_name, class, number, description, mother_name, \
     father_name, photo_url, email, status, source, student_id, created_at, updated_at";

struct RawLead {
    lead: Lead,
    status: String,
    source: String,
    created_at: String,
    updated_at: String,
}

impl RawLead {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let placeholder = chrono::DateTime::<chrono::Utc>::default();
        Ok(Self {
            lead: Lead {
                id: row.get(0)?,
                name: row.get(1)?,
                english_name: row.get(2)?,
                class: row.get(3)?,
                number: row.get(4)?,
                description: row.get(5)?,
                mother_name: row.get(6)?,
                father_name: row.get(7)?,
                photo_url: row.get(8)?,
                email: row.get(9)?,
                status: LeadStatus::default(),
                source: LeadSource::default(),
                student_id: row.get(12)?,
                created_at: placeholder,
                updated_at: placeholder,
            },
            status: row.get(10)?,
            source: row.get(11)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn decode(self) -> StorageResult<Lead> {
        let mut lead = self.lead;
        lead.status = self.status.parse().map_err(StorageError::Corruption)?;
        lead.source = self.source.parse().map_err(StorageError::Corruption)?;
        lead.created_at = decode_time(&self.created_at)?;
        lead.updated_at = decode_time(&self.updated_at)?;
        Ok(lead)
    }
}

impl Database {
    /// Insert a lead. A taken phone number yields `StorageError::Duplicate`.
    pub fn insert_lead(&self, lead: &Lead) -> StorageResult<()> {
        self.conn()?
            .execute(
                &format!(
                    "INSERT INTO leads ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    LEAD_COLUMNS
                ),
                params![
                    lead.id,
                    lead.name,
                    lead.english_name,
                    lead.class,
                    lead.number,
                    lead.description,
                    lead.mother_name,
                    lead.father_name,
                    lead.photo_url,
                    lead.email,
                    lead.status.as_str(),
                    lead.source.as_str(),
                    lead.student_id,
                    encode_time(&lead.created_at),
                    encode_time(&lead.updated_at),
                ],
            )
            .map_err(|e| map_unique(e, "leads.number"))?;

        Ok(())
    }

    pub fn get_lead(&self, id: &str) -> StorageResult<Option<Lead>> {
        let raw = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM leads WHERE id = ?", LEAD_COLUMNS),
                params![id],
                RawLead::from_row,
            )
            .optional()?;

        raw.map(RawLead::decode).transpose()
    }

    pub fn find_lead_by_number(&self, number: &str) -> StorageResult<Option<Lead>> {
        let raw = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM leads WHERE number = ?", LEAD_COLUMNS),
                params![number.trim()],
                RawLead::from_row,
            )
            .optional()?;

        raw.map(RawLead::decode).transpose()
    }

    /// All leads, newest first
    pub fn list_leads(&self) -> StorageResult<Vec<Lead>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM leads ORDER BY created_at DESC, id",
            LEAD_COLUMNS
        ))?;

        let raws = stmt
            .query_map([], RawLead::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raws.into_iter().map(RawLead::decode).collect()
    }

    /// Overwrite a lead. Returns false if it is gone.
    pub fn update_lead(&self, lead: &Lead) -> StorageResult<bool> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE leads SET name = ?, english_name = ?, class = ?, number = ?, description = ?,
                    mother_name = ?, father_name = ?, photo_url = ?, email = ?, status = ?,
                    student_id = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    lead.name,
                    lead.english_name,
                    lead.class,
                    lead.number,
                    lead.description,
                    lead.mother_name,
                    lead.father_name,
                    lead.photo_url,
                    lead.email,
                    lead.status.as_str(),
                    lead.student_id,
                    encode_time(&lead.updated_at),
                    lead.id,
                ],
            )
            .map_err(|e| map_unique(e, "leads.number"))?;

        Ok(changed > 0)
    }

    pub fn delete_lead(&self, id: &str) -> StorageResult<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM leads WHERE id = ?", params![id])?;
        Ok(removed > 0)
    }
}
