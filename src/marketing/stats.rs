//! Marketing statistics over the lead book

use crate::storage::{Lead, LeadStatus, User};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Class label used for leads without a class
pub const UNASSIGNED_CLASS: &str = "Unassigned";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusBreakdown {
    pub admitted: usize,
    pub not_admitted: usize,
    pub canceled: usize,
    pub admitted_percentage: String,
    pub not_admitted_percentage: String,
    pub canceled_percentage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumberAnalysis {
    pub total_numbers: usize,
    pub unique_numbers: usize,
    pub duplicate_numbers: usize,
    pub matching_with_students: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassBreakdown {
    pub total: usize,
    pub admitted: usize,
    pub not_admitted: usize,
    pub canceled: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingFields {
    pub name: usize,
    pub class: usize,
    pub number: usize,
    pub english_name: usize,
    pub mother_name: usize,
    pub father_name: usize,
    pub photo_url: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub complete_profiles: usize,
    pub incomplete_profiles: usize,
    pub missing_fields: MissingFields,
}

/// Everything the marketing dashboard cards show
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketingStats {
    pub total_leads: usize,
    pub status_breakdown: StatusBreakdown,
    pub number_analysis: NumberAnalysis,
    pub class_distribution: BTreeMap<String, ClassBreakdown>,
    pub data_quality: DataQuality,
}

/// Share of `part` in `total` with two decimals; "0.00" for an empty book
pub fn percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", part as f64 * 100.0 / total as f64)
}

impl MarketingStats {
    /// Compute statistics for `leads`. `students` supplies the phone numbers
    /// already on the roll, used to spot enquiries from enrolled families.
    pub fn compute(leads: &[Lead], students: &[User]) -> Self {
        let total = leads.len();

        let mut admitted = 0;
        let mut not_admitted = 0;
        let mut canceled = 0;
        let mut class_distribution: BTreeMap<String, ClassBreakdown> = BTreeMap::new();
        let mut quality = DataQuality::default();

        for lead in leads {
            let class_key = match lead.class.trim() {
                "" => UNASSIGNED_CLASS.to_string(),
                class => class.to_string(),
            };
            let bucket = class_distribution.entry(class_key).or_default();
            bucket.total += 1;

            match lead.status {
                LeadStatus::Admitted => {
                    admitted += 1;
                    bucket.admitted += 1;
                }
                LeadStatus::NotAdmitted => {
                    not_admitted += 1;
                    bucket.not_admitted += 1;
                }
                LeadStatus::Canceled => {
                    canceled += 1;
                    bucket.canceled += 1;
                }
            }

            let missing = lead.missing_fields();
            if missing.is_empty() {
                quality.complete_profiles += 1;
            } else {
                quality.incomplete_profiles += 1;
            }
            for field in missing {
                let counter = match field {
                    "name" => &mut quality.missing_fields.name,
                    "class" => &mut quality.missing_fields.class,
                    "number" => &mut quality.missing_fields.number,
                    "english_name" => &mut quality.missing_fields.english_name,
                    "mother_name" => &mut quality.missing_fields.mother_name,
                    "father_name" => &mut quality.missing_fields.father_name,
                    _ => &mut quality.missing_fields.photo_url,
                };
                *counter += 1;
            }
        }

        Self {
            total_leads: total,
            status_breakdown: StatusBreakdown {
                admitted,
                not_admitted,
                canceled,
                admitted_percentage: percentage(admitted, total),
                not_admitted_percentage: percentage(not_admitted, total),
                canceled_percentage: percentage(canceled, total),
            },
            number_analysis: analyze_numbers(leads, students),
            class_distribution,
            data_quality: quality,
        }
    }
}

fn analyze_numbers(leads: &[Lead], students: &[User]) -> NumberAnalysis {
    let numbers: Vec<&str> = leads
        .iter()
        .map(|l| l.number.trim())
        .filter(|n| !n.is_empty())
        .collect();
    let unique: HashSet<&str> = numbers.iter().copied().collect();

    let student_numbers: HashSet<&str> = students
        .iter()
        .filter_map(|u| u.student_profile())
        .filter_map(|p| p.phone_number.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();

    NumberAnalysis {
        total_numbers: numbers.len(),
        unique_numbers: unique.len(),
        duplicate_numbers: numbers.len() - unique.len(),
        matching_with_students: unique.intersection(&student_numbers).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Role, RoleProfile, StudentProfile};

    fn complete(name: &str, number: &str, class: &str, status: LeadStatus) -> Lead {
        Lead::new(name, number)
            .class(class)
            .status(status)
            .english_name(name)
            .parents("Father", "Mother")
            .photo_url("https://i.ibb.co/x.png")
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), "0.00");
        assert_eq!(percentage(1, 3), "33.33");
        assert_eq!(percentage(2, 3), "66.67");
        assert_eq!(percentage(4, 4), "100.00");
    }

    #[test]
    fn test_empty_book() {
        let stats = MarketingStats::compute(&[], &[]);
        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.status_breakdown.admitted_percentage, "0.00");
        assert!(stats.class_distribution.is_empty());
    }

    #[test]
    fn test_status_and_class_breakdown() {
        let leads = vec![
            complete("A", "1", "Play", LeadStatus::Admitted),
            complete("B", "2", "Play", LeadStatus::NotAdmitted),
            complete("C", "3", "Nursery", LeadStatus::Canceled),
            Lead::new("D", "4"),
        ];

        let stats = MarketingStats::compute(&leads, &[]);
        assert_eq!(stats.total_leads, 4);
        assert_eq!(stats.status_breakdown.admitted, 1);
        assert_eq!(stats.status_breakdown.not_admitted, 2);
        assert_eq!(stats.status_breakdown.canceled, 1);
        assert_eq!(stats.status_breakdown.not_admitted_percentage, "50.00");

        let play = &stats.class_distribution["Play"];
        assert_eq!((play.total, play.admitted, play.not_admitted), (2, 1, 1));
        assert_eq!(stats.class_distribution[UNASSIGNED_CLASS].total, 1);
    }

    #[test]
    fn test_data_quality() {
        let leads = vec![
            complete("A", "1", "Play", LeadStatus::Admitted),
            Lead::new("B", "2").class("Play"),
        ];

        let quality = MarketingStats::compute(&leads, &[]).data_quality;
        assert_eq!(quality.complete_profiles, 1);
        assert_eq!(quality.incomplete_profiles, 1);
        assert_eq!(quality.missing_fields.photo_url, 1);
        assert_eq!(quality.missing_fields.class, 0);
        assert_eq!(quality.missing_fields.father_name, 1);
    }

    #[test]
    fn test_number_analysis() {
        // Computed over plain slices, so duplicates can be fed in directly.
        let leads = vec![
            Lead::new("A", "0171"),
            Lead::new("B", "0171"),
            Lead::new("C", "0181"),
        ];
        let student = User::new("s@school.test", "S", Role::Student)
            .with_profile(RoleProfile::Student(StudentProfile {
                phone_number: Some(" 0181 ".to_string()),
                ..Default::default()
            }))
            .unwrap();

        let numbers = MarketingStats::compute(&leads, &[student]).number_analysis;
        assert_eq!(numbers.total_numbers, 3);
        assert_eq!(numbers.unique_numbers, 2);
        assert_eq!(numbers.duplicate_numbers, 1);
        assert_eq!(numbers.matching_with_students, 1);
    }
}
