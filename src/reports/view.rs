//! How a lead reads in reports

use crate::storage::{Lead, LeadStatus, User};
use std::collections::HashMap;

/// Lead fields as printed or exported
#[derive(Debug, Clone, PartialEq)]
pub struct LeadView<'a> {
    pub name: &'a str,
    pub number: &'a str,
    pub class: &'a str,
    pub english_name: &'a str,
    pub mother_name: &'a str,
    pub father_name: &'a str,
    pub photo_url: &'a str,
    pub status: LeadStatus,
}

/// Students on the roll, by account id.
///
/// Admitted leads linked to one of them read from the student's record, since
/// the desk edits those details on the user account after admission. Fields
/// the student profile leaves empty fall back to the lead.
pub struct StudentLinks<'a> {
    by_id: HashMap<&'a str, &'a User>,
}

impl<'a> StudentLinks<'a> {
    pub fn new(students: &'a [User]) -> Self {
        Self {
            by_id: students.iter().map(|u| (u.id.as_str(), u)).collect(),
        }
    }

    pub fn view(&self, lead: &'a Lead) -> LeadView<'a> {
        let own = LeadView {
            name: &lead.name,
            number: &lead.number,
            class: &lead.class,
            english_name: &lead.english_name,
            mother_name: &lead.mother_name,
            father_name: &lead.father_name,
            photo_url: &lead.photo_url,
            status: lead.status,
        };

        let student = match (lead.status, lead.student_id.as_deref()) {
            (LeadStatus::Admitted, Some(id)) => self.by_id.get(id).copied(),
            _ => None,
        };
        let Some(student) = student else {
            return own;
        };

        let profile = student.student_profile();
        let pick = |field: Option<&'a Option<String>>, fallback: &'a str| -> &'a str {
            field
                .and_then(|v| v.as_deref())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        LeadView {
            name: Some(student.name.trim())
                .filter(|n| !n.is_empty())
                .unwrap_or(own.name),
            number: pick(profile.map(|p| &p.phone_number), own.number),
            class: pick(profile.map(|p| &p.class), own.class),
            english_name: pick(profile.map(|p| &p.english_name), own.english_name),
            mother_name: pick(profile.map(|p| &p.mother_name), own.mother_name),
            father_name: pick(profile.map(|p| &p.father_name), own.father_name),
            photo_url: pick(profile.map(|p| &p.photo_url), own.photo_url),
            status: lead.status,
        }
    }
}
