//! Core data types for the SchoolHub store
//!
//! This module defines the records persisted by the storage layer:
//! - `User`: an account with a role, an approval flag and a role profile
//! - `RoleProfile`: student, staff or admin specific details
//! - `Lead`: an admission enquiry tracked by the marketing desk
//! - `Session`: a bearer token bound to a user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Student,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Staff, Role::Student]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "student" => Ok(Role::Student),
            other => Err(format!(
                "Invalid role: {}. Use admin, staff, or student",
                other
            )),
        }
    }
}

/// Student specific details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Staff specific details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StaffProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_bangla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Admin specific details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Role specific details, tagged by the role they belong to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Student(StudentProfile),
    Staff(StaffProfile),
    Admin(AdminProfile),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Student(_) => Role::Student,
            RoleProfile::Staff(_) => Role::Staff,
            RoleProfile::Admin(_) => Role::Admin,
        }
    }

    /// Phone number a parent or staff member can be reached on
    pub fn phone(&self) -> Option<&str> {
        match self {
            RoleProfile::Student(p) => p.phone_number.as_deref(),
            RoleProfile::Staff(p) => p.mobile.as_deref(),
            RoleProfile::Admin(p) => p.phone.as_deref(),
        }
    }

    /// Class for students, designation for staff and admins
    pub fn placement(&self) -> Option<&str> {
        match self {
            RoleProfile::Student(p) => p.class.as_deref(),
            RoleProfile::Staff(p) => p.designation.as_deref(),
            RoleProfile::Admin(p) => p.designation.as_deref(),
        }
    }
}

/// A portal account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<RoleProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unverified user with no profile
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into().trim().to_lowercase(),
            name: name.into().trim().to_string(),
            role,
            verified: false,
            profile: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder method: set approval flag
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Builder method: attach a profile (must match the role)
    pub fn with_profile(mut self, profile: RoleProfile) -> Result<Self, String> {
        self.assign_role(self.role, Some(profile))?;
        Ok(self)
    }

    /// Change role and profile together.
    ///
    /// A profile of another role is rejected. Switching role without a new
    /// profile drops the previous one, since it described the old role.
    pub fn assign_role(&mut self, role: Role, profile: Option<RoleProfile>) -> Result<(), String> {
        match profile {
            Some(profile) if profile.role() != role => Err(format!(
                "Profile for role '{}' does not match role '{}'",
                profile.role(),
                role
            )),
            Some(profile) => {
                self.role = role;
                self.profile = Some(profile);
                Ok(())
            }
            None => {
                if self.profile.as_ref().map(|p| p.role()) != Some(role) {
                    self.profile = None;
                }
                self.role = role;
                Ok(())
            }
        }
    }

    /// Whether the user may use the role areas of the portal
    pub fn is_approved(&self) -> bool {
        self.role == Role::Admin || self.verified
    }

    pub fn student_profile(&self) -> Option<&StudentProfile> {
        match &self.profile {
            Some(RoleProfile::Student(p)) => Some(p),
            _ => None,
        }
    }

    pub fn staff_profile(&self) -> Option<&StaffProfile> {
        match &self.profile {
            Some(RoleProfile::Staff(p)) => Some(p),
            _ => None,
        }
    }
}

/// Admission status of a lead
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum LeadStatus {
    #[serde(rename = "Admitted")]
    Admitted,
    #[default]
    #[serde(rename = "Not Admitted")]
    NotAdmitted,
    #[serde(rename = "Canceled")]
    Canceled,
}

impl LeadStatus {
    pub fn all() -> &'static [LeadStatus] {
        &[
            LeadStatus::Admitted,
            LeadStatus::NotAdmitted,
            LeadStatus::Canceled,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Admitted => "Admitted",
            LeadStatus::NotAdmitted => "Not Admitted",
            LeadStatus::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "admitted" => Ok(LeadStatus::Admitted),
            "not admitted" => Ok(LeadStatus::NotAdmitted),
            "canceled" | "cancelled" => Ok(LeadStatus::Canceled),
            _ => Err(format!(
                "Invalid status: {}. Use Admitted, Not Admitted, or Canceled",
                s
            )),
        }
    }
}

/// Where a lead came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
    /// Entered by the admin desk
    #[default]
    Manual,
    /// Submitted through the public admission form
    Intake,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Manual => "manual",
            LeadSource::Intake => "intake",
        }
    }
}

impl FromStr for LeadSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(LeadSource::Manual),
            "intake" => Ok(LeadSource::Intake),
            other => Err(format!("Invalid lead source: {}", other)),
        }
    }
}

/// An admission enquiry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub class: String,
    pub number: String,
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
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub source: LeadSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Create a lead with the two required fields
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into().trim().to_string(),
            english_name: String::new(),
            class: String::new(),
            number: number.into().trim().to_string(),
            description: String::new(),
            mother_name: String::new(),
            father_name: String::new(),
            photo_url: String::new(),
            email: String::new(),
            status: LeadStatus::NotAdmitted,
            source: LeadSource::Manual,
            student_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder method: set class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Builder method: set status
    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method: set source
    pub fn source(mut self, source: LeadSource) -> Self {
        self.source = source;
        self
    }

    /// Builder method: set parents' names
    pub fn parents(mut self, father: impl Into<String>, mother: impl Into<String>) -> Self {
        self.father_name = father.into();
        self.mother_name = mother.into();
        self
    }

    /// Builder method: set English name
    pub fn english_name(mut self, english_name: impl Into<String>) -> Self {
        self.english_name = english_name.into();
        self
    }

    /// Builder method: set photo URL
    pub fn photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = url.into();
        self
    }

    /// Profile fields the marketing desk expects to be filled in
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("class", &self.class),
            ("number", &self.number),
            ("english_name", &self.english_name),
            ("mother_name", &self.mother_name),
            ("father_name", &self.father_name),
            ("photo_url", &self.photo_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A bearer session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
