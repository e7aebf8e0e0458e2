//! CSV exports for the lead book and the user directory

use super::view::StudentLinks;
use super::{ReportError, ReportResult};
use crate::storage::{Lead, User};
use chrono::NaiveDate;

pub const LEADS_HEADER: [&str; 9] = [
    "Name",
    "Number",
    "Status",
    "Class",
    "English Name",
    "Mother Name",
    "Father Name",
    "Description",
    "Photo URL",
];

pub const USERS_HEADER: [&str; 7] = [
    "Name",
    "Email",
    "Role",
    "Verified",
    "Class / Designation",
    "Phone",
    "Created At",
];

/// Placeholder written for empty cells
const EMPTY_CELL: &str = "-";

/// Leading characters a spreadsheet reads as the start of a formula
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Cell text for a field: empty becomes the placeholder, and text a
/// spreadsheet would evaluate is prefixed with `'` so it stays text.
fn cell(value: &str) -> String {
    let trimmed = value.trim_matches(' ');
    if trimmed.trim().is_empty() {
        return EMPTY_CELL.to_string();
    }
    if trimmed.starts_with(FORMULA_PREFIXES) {
        format!("'{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn opt_cell(value: Option<&str>) -> String {
    cell(value.unwrap_or(""))
}

pub fn leads_filename(date: NaiveDate) -> String {
    format!("marketing_leads_{}.csv", date.format("%Y-%m-%d"))
}

pub fn users_filename(date: NaiveDate) -> String {
    format!("users_{}.csv", date.format("%Y-%m-%d"))
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ReportResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Encoding(e.to_string()))
}

/// Render leads as CSV.
///
/// Admitted leads linked to a student on the roll read from the student's
/// record (see [`StudentLinks`]).
pub fn leads_csv(leads: &[Lead], students: &[User]) -> ReportResult<String> {
    let links = StudentLinks::new(students);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LEADS_HEADER)?;

    for lead in leads {
        let view = links.view(lead);
        writer.write_record([
            cell(view.name),
            cell(view.number),
            view.status.as_str().to_string(),
            cell(view.class),
            cell(view.english_name),
            cell(view.mother_name),
            cell(view.father_name),
            cell(&lead.description),
            cell(view.photo_url),
        ])?;
    }

    finish(writer)
}

/// Render users as CSV
pub fn users_csv(users: &[User]) -> ReportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(USERS_HEADER)?;

    for user in users {
        let profile = user.profile.as_ref();
        let created = user.created_at.format("%Y-%m-%d %H:%M").to_string();
        writer.write_record([
            cell(&user.name),
            cell(&user.email),
            user.role.as_str().to_string(),
            if user.verified { "yes" } else { "no" }.to_string(),
            opt_cell(profile.and_then(|p| p.placement())),
            opt_cell(profile.and_then(|p| p.phone())),
            created,
        ])?;
    }

    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LeadStatus, Role, RoleProfile, StaffProfile, StudentProfile};

    fn lines(csv: &str) -> Vec<&str> {
        csv.lines().collect()
    }

    #[test]
    fn test_filenames() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(leads_filename(date), "marketing_leads_2024-03-09.csv");
        assert_eq!(users_filename(date), "users_2024-03-09.csv");
    }

    #[test]
    fn test_leads_csv_fills_empty_cells() {
        let leads = vec![Lead::new("Rahim", "01712345678").class("Play")];
        let out = leads_csv(&leads, &[]).unwrap();
        let rows = lines(&out);

        assert_eq!(
            rows[0],
            "Name,Number,Status,Class,English Name,Mother Name,Father Name,Description,Photo URL"
        );
        assert_eq!(rows[1], "Rahim,01712345678,Not Admitted,Play,-,-,-,-,-");
    }

    #[test]
    fn test_leads_csv_quotes_commas() {
        let mut lead = Lead::new("Rahim", "01712345678");
        lead.description = "Called twice, no answer".to_string();
        let out = leads_csv(&[lead], &[]).unwrap();
        assert!(out.contains("\"Called twice, no answer\""));
    }

    #[test]
    fn test_admitted_lead_uses_student_record() {
        let student = User::new("karim@school.test", "Karim Uddin", Role::Student)
            .with_profile(RoleProfile::Student(StudentProfile {
                class: Some("Two".to_string()),
                phone_number: Some("01900000000".to_string()),
                ..Default::default()
            }))
            .unwrap();

        let mut lead = Lead::new("Karim", "01712345678")
            .class("One")
            .status(LeadStatus::Admitted);
        lead.student_id = Some(student.id.clone());

        let mut pending = lead.clone();
        pending.status = LeadStatus::NotAdmitted;
        pending.number = "01800000000".to_string();

        let out = leads_csv(&[lead, pending], &[student]).unwrap();
        let rows = lines(&out);
        assert!(rows[1].starts_with("Karim Uddin,01900000000,Admitted,Two,"));
        assert!(rows[2].starts_with("Karim,01800000000,Not Admitted,One,"));
    }

    #[test]
    fn test_formula_text_stays_text() {
        let mut lead = Lead::new("=HYPERLINK(\"http://evil.test\",\"x\")", "01712345678");
        lead.father_name = "@SUM(A1:A9)".to_string();
        lead.mother_name = "-".to_string();
        lead.description = "+1 call back".to_string();

        let out = leads_csv(&[lead], &[]).unwrap();
        let row = lines(&out)[1];
        assert!(row.starts_with("\"'=HYPERLINK(\"\"http://evil.test\"\",\"\"x\"\")\",01712345678,"));
        assert!(row.contains(",'-,'@SUM(A1:A9),'+1 call back,"));
        assert!(row.ends_with(",-"));
    }

    #[test]
    fn test_cell() {
        assert_eq!(cell(""), "-");
        assert_eq!(cell("  "), "-");
        assert_eq!(cell(" Rahim "), "Rahim");
        assert_eq!(cell("=1+1"), "'=1+1");
        assert_eq!(cell("\t=1"), "'\t=1");
        assert_eq!(cell("a=b"), "a=b");
    }

    #[test]
    fn test_users_csv() {
        let staff = User::new("t@school.test", "Teacher", Role::Staff)
            .verified(true)
            .with_profile(RoleProfile::Staff(StaffProfile {
                designation: Some("Assistant Teacher".to_string()),
                mobile: Some("01711111111".to_string()),
                ..Default::default()
            }))
            .unwrap();
        let student = User::new("s@school.test", "Student", Role::Student);

        let out = users_csv(&[staff, student]).unwrap();
        let rows = lines(&out);
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("Teacher,t@school.test,staff,yes,Assistant Teacher,01711111111,"));
        assert!(rows[2].starts_with("Student,s@school.test,student,no,-,-,"));
    }
}
