//! Reports
//!
//! - [`csv_export`]: lead and user CSV files
//! - [`print`]: printable HTML lead report
//! - [`view`]: lead fields as reports show them

mod csv_export;
mod print;
mod view;

pub use csv_export::{
    leads_csv, leads_filename, users_csv, users_filename, LEADS_HEADER, USERS_HEADER,
};
pub use print::{escape_html, leads_report_html};
pub use view::{LeadView, StudentLinks};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

pub type ReportResult<T> = Result<T, ReportError>;
