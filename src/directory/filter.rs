//! Search and status filters for user and lead listings

use crate::storage::{Lead, LeadStatus, Role, User};
use serde::Deserialize;

/// Case-insensitive substring match; an empty needle matches everything
fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

/// Treats "", "all" and "any" as "no constraint"
fn is_wildcard(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "" | "all" | "any")
}

/// Query parameters accepted by user listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilterParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

/// Parsed user filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    search: String,
    pub role: Option<Role>,
    pub verified: Option<bool>,
}

impl UserFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: free-text search over name and email
    pub fn search(mut self, term: &str) -> Self {
        self.search = term.trim().to_lowercase();
        self
    }

    /// Builder method: restrict to one role
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Builder method: restrict to approved or pending accounts
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    /// Build from query parameters; an unknown role is an error
    pub fn from_params(params: &UserFilterParams) -> Result<Self, String> {
        let mut filter = Self::new().search(params.search.as_deref().unwrap_or(""));

        if let Some(role) = params.role.as_deref().filter(|r| !is_wildcard(r)) {
            filter = filter.role(role.parse()?);
        }
        filter.verified = params.verified;

        Ok(filter)
    }

    pub fn matches(&self, user: &User) -> bool {
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }

        if let Some(verified) = self.verified {
            if user.verified != verified {
                return false;
            }
        }

        contains_ci(&user.name, &self.search) || contains_ci(&user.email, &self.search)
    }

    pub fn apply(&self, users: Vec<User>) -> Vec<User> {
        users.into_iter().filter(|u| self.matches(u)).collect()
    }
}

/// Query parameters accepted by lead listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilterParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Parsed lead filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    search: String,
    pub status: Option<LeadStatus>,
}

impl LeadFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: free-text search over names, number and class
    pub fn search(mut self, term: &str) -> Self {
        self.search = term.trim().to_lowercase();
        self
    }

    /// Builder method: restrict to one status
    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn from_params(params: &LeadFilterParams) -> Result<Self, String> {
        let mut filter = Self::new().search(params.search.as_deref().unwrap_or(""));

        if let Some(status) = params.status.as_deref().filter(|s| !is_wildcard(s)) {
            filter = filter.status(status.parse()?);
        }

        Ok(filter)
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(status) = self.status {
            if lead.status != status {
                return false;
            }
        }

        [
            &lead.name,
            &lead.english_name,
            &lead.number,
            &lead.class,
            &lead.father_name,
            &lead.mother_name,
        ]
        .iter()
        .any(|field| contains_ci(field, &self.search))
    }

    pub fn apply(&self, leads: Vec<Lead>) -> Vec<Lead> {
        leads.into_iter().filter(|l| self.matches(l)).collect()
    }
}
