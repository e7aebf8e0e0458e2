//! Printable lead report
//!
//! A self-contained HTML page the browser can print or save as PDF.

use super::view::StudentLinks;
use crate::marketing::MarketingStats;
use crate::storage::{Lead, User};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Escape text for HTML element and attribute content
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:24px}\
h1{font-size:20px}table{border-collapse:collapse;width:100%;font-size:12px}\
th,td{border:1px solid #999;padding:4px 6px;text-align:left}\
th{background:#eee}.summary span{margin-right:16px}\
@media print{.no-print{display:none}}";

/// Render the printable report. `stats` describes the whole lead book,
/// `leads` the filtered rows to list. Admitted leads linked to one of
/// `students` show the student's details, as in the CSV export.
pub fn leads_report_html(
    title: &str,
    leads: &[Lead],
    students: &[User],
    stats: &MarketingStats,
    generated_at: DateTime<Utc>,
) -> String {
    let mut html = String::new();
    let title = escape_html(title);
    let status = &stats.status_breakdown;

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body>\
         <h1>{title}</h1><p>Generated {generated}</p>\
         <div class=\"summary\"><span>Total: {total}</span>\
         <span>Admitted: {admitted} ({admitted_pct}%)</span>\
         <span>Not Admitted: {not_admitted} ({not_admitted_pct}%)</span>\
         <span>Canceled: {canceled} ({canceled_pct}%)</span></div>",
        generated = generated_at.format("%Y-%m-%d %H:%M UTC"),
        total = stats.total_leads,
        admitted = status.admitted,
        admitted_pct = status.admitted_percentage,
        not_admitted = status.not_admitted,
        not_admitted_pct = status.not_admitted_percentage,
        canceled = status.canceled,
        canceled_pct = status.canceled_percentage,
    );

    html.push_str(
        "<table><thead><tr><th>#</th><th>Name</th><th>English Name</th><th>Class</th>\
         <th>Number</th><th>Father</th><th>Mother</th><th>Status</th></tr></thead><tbody>",
    );

    let links = StudentLinks::new(students);
    for (i, lead) in leads.iter().enumerate() {
        let view = links.view(lead);
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            escape_html(view.name),
            escape_html(view.english_name),
            escape_html(view.class),
            escape_html(view.number),
            escape_html(view.father_name),
            escape_html(view.mother_name),
            view.status,
        );
    }

    if leads.is_empty() {
        html.push_str("<tr><td colspan=\"8\">No leads</td></tr>");
    }

    let _ = write!(
        html,
        "</tbody></table><p>{} lead(s) listed</p></body></html>",
        leads.len()
    );
    html
}
