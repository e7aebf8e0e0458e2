//! Lead input: the admin form and the public admission form

use crate::storage::{Lead, LeadSource, LeadStatus};
use crate::validation::{is_valid_email, is_valid_phone, is_valid_url, max_len, require};
use chrono::Utc;
use serde::{Deserialize, Deserializer};

/// Lead fields as submitted by the admin desk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadDraft {
    pub name: String,
    pub number: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub email: String,
    /// Status string; parsed case-insensitively, defaults to "Not Admitted"
    #[serde(default)]
    pub status: Option<String>,
    /// Linked student account. Absent keeps the current link on update,
    /// `null` or an empty string clears it.
    #[serde(default, deserialize_with = "present")]
    pub student_id: Option<Option<String>>,
}

/// Tell a field sent as `null` apart from one left out
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn link_id(student_id: Option<String>) -> Option<String> {
    student_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

impl LeadDraft {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            ..Default::default()
        }
    }

    /// Check required fields and formats; returns the parsed status
    pub fn validate(&self) -> Result<LeadStatus, String> {
        require("Name", &self.name)?;
        require("Number", &self.number)?;
        max_len("Name", &self.name, 200)?;
        max_len("Description", &self.description, 2000)?;

        if !is_valid_phone(&self.number) {
            return Err(format!("Invalid phone number: {}", self.number.trim()));
        }
        if !self.email.trim().is_empty() && !is_valid_email(&self.email) {
            return Err(format!("Invalid email: {}", self.email.trim()));
        }
        if !self.photo_url.trim().is_empty() && !is_valid_url(&self.photo_url) {
            return Err("Photo URL must be an http(s) link".to_string());
        }

        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(LeadStatus::NotAdmitted),
            Some(status) => status.parse(),
        }
    }

    /// Validate and build a new lead
    pub fn into_lead(mut self, source: LeadSource) -> Result<Lead, String> {
        let status = self.validate()?;
        let mut lead = Lead::new(&self.name, &self.number)
            .status(status)
            .source(source);
        lead.student_id = link_id(self.student_id.take().flatten());
        self.fill(&mut lead);
        Ok(lead)
    }

    /// Validate and overwrite an existing lead, keeping id, source and creation time
    pub fn apply_to(mut self, lead: &mut Lead) -> Result<(), String> {
        let status = self.validate()?;
        lead.name = self.name.trim().to_string();
        lead.number = self.number.trim().to_string();
        lead.status = status;
        if let Some(student_id) = self.student_id.take() {
            lead.student_id = link_id(student_id);
        }
        self.fill(lead);
        lead.updated_at = Utc::now();
        Ok(())
    }

    fn fill(self, lead: &mut Lead) {
        lead.english_name = self.english_name.trim().to_string();
        lead.class = self.class.trim().to_string();
        lead.description = self.description.trim().to_string();
        lead.mother_name = self.mother_name.trim().to_string();
        lead.father_name = self.father_name.trim().to_string();
        lead.photo_url = self.photo_url.trim().to_string();
        lead.email = self.email.trim().to_lowercase();
    }
}

/// Public admission form. Always lands as a "Not Admitted" intake lead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeForm {
    pub name: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub class: String,
    pub phone_number: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub photo_url: String,
}

impl From<IntakeForm> for LeadDraft {
    fn from(form: IntakeForm) -> Self {
        LeadDraft {
            name: form.name,
            number: form.phone_number,
            english_name: form.english_name,
            class: form.class,
            description: form.description,
            mother_name: form.mother_name,
            father_name: form.father_name,
            photo_url: form.photo_url,
            email: form.email,
            status: None,
            student_id: None,
        }
    }
}

impl IntakeForm {
    pub fn into_lead(self) -> Result<Lead, String> {
        require("Class", &self.class)?;
        LeadDraft::from(self).into_lead(LeadSource::Intake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_name_and_number() {
        assert_eq!(
            LeadDraft::new(" ", "01712345678").validate().unwrap_err(),
            "Name is required"
        );
        assert_eq!(
            LeadDraft::new("Rahim", "").validate().unwrap_err(),
            "Number is required"
        );
    }

    #[test]
    fn test_status_parsing() {
        let mut draft = LeadDraft::new("Rahim", "01712345678");
        assert_eq!(draft.validate(), Ok(LeadStatus::NotAdmitted));

        draft.status = Some("admitted".to_string());
        assert_eq!(draft.validate(), Ok(LeadStatus::Admitted));

        draft.status = Some("maybe".to_string());
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_formats() {
        let mut draft = LeadDraft::new("Rahim", "not a number");
        assert!(draft.validate().is_err());

        draft.number = "01712345678".to_string();
        draft.email = "nope".to_string();
        assert!(draft.validate().unwrap_err().starts_with("Invalid email"));

        draft.email = String::new();
        draft.photo_url = "file:///etc/passwd".to_string();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_into_lead_trims() {
        let mut draft = LeadDraft::new(" Rahim ", " 01712345678 ");
        draft.class = " Play ".to_string();
        draft.student_id = Some(Some("  ".to_string()));

        let lead = draft.into_lead(LeadSource::Manual).unwrap();
        assert_eq!(lead.name, "Rahim");
        assert_eq!(lead.number, "01712345678");
        assert_eq!(lead.class, "Play");
        assert!(lead.student_id.is_none());
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut lead = LeadDraft::new("Rahim", "01712345678")
            .into_lead(LeadSource::Intake)
            .unwrap();
        let id = lead.id.clone();
        let created = lead.created_at;

        let mut update = LeadDraft::new("Rahim Uddin", "01712345678");
        update.status = Some("Canceled".to_string());
        update.apply_to(&mut lead).unwrap();

        assert_eq!(lead.id, id);
        assert_eq!(lead.created_at, created);
        assert_eq!(lead.source, LeadSource::Intake);
        assert_eq!(lead.status, LeadStatus::Canceled);
        assert_eq!(lead.name, "Rahim Uddin");
    }

    #[test]
    fn test_update_keeps_link_unless_sent() {
        let mut lead = Lead::new("Rahim", "01712345678");
        lead.student_id = Some("student-1".to_string());

        let draft: LeadDraft =
            serde_json::from_str(r#"{"name": "Rahim", "number": "01712345678"}"#).unwrap();
        assert!(draft.student_id.is_none());
        draft.apply_to(&mut lead).unwrap();
        assert_eq!(lead.student_id.as_deref(), Some("student-1"));

        let draft: LeadDraft = serde_json::from_str(
            r#"{"name": "Rahim", "number": "01712345678", "student_id": " student-2 "}"#,
        )
        .unwrap();
        draft.apply_to(&mut lead).unwrap();
        assert_eq!(lead.student_id.as_deref(), Some("student-2"));

        let draft: LeadDraft = serde_json::from_str(
            r#"{"name": "Rahim", "number": "01712345678", "student_id": null}"#,
        )
        .unwrap();
        assert_eq!(draft.student_id, Some(None));
        draft.apply_to(&mut lead).unwrap();
        assert!(lead.student_id.is_none());
    }

    #[test]
    fn test_intake_form() {
        let form = IntakeForm {
            name: "সালমা".to_string(),
            english_name: "Salma".to_string(),
            class: "প্রথম".to_string(),
            phone_number: "01812345678".to_string(),
            ..Default::default()
        };
        let lead = form.into_lead().unwrap();
        assert_eq!(lead.source, LeadSource::Intake);
        assert_eq!(lead.status, LeadStatus::NotAdmitted);

        let missing_class = IntakeForm {
            name: "Salma".to_string(),
            phone_number: "01812345678".to_string(),
            ..Default::default()
        };
        assert_eq!(missing_class.into_lead().unwrap_err(), "Class is required");
    }
}
