//! Marketing desk
//!
//! Admission enquiries ("leads") and the numbers the desk tracks about them.
//!
//! - [`draft`]: validated input from the admin form and the public intake form
//! - [`stats`]: `MarketingStats` (status breakdown, number analysis, class
//!   distribution, data quality)

mod draft;
mod stats;

pub use draft::{IntakeForm, LeadDraft};
pub use stats::{
    percentage, ClassBreakdown, DataQuality, MarketingStats, MissingFields, NumberAnalysis,
    StatusBreakdown, UNASSIGNED_CLASS,
};
