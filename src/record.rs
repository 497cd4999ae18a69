//! Graduate records and default-substitution for incomplete input.
//!
//! Rows are strongly typed; columns that may be absent in the source table
//! (`location`, `job_search_duration`, `salary`, `employed`) are `Option`
//! fields, and every downstream computation branches explicitly on presence.

use serde::{Deserialize, Serialize};

/// Capital region, highest salary premium.
pub const CAPITAL_REGION: &str = "Minsk";

/// Regional centers with a moderate salary premium.
pub const SECONDARY_REGIONS: [&str; 2] = ["Grodno", "Brest"];

/// Substitute for a missing `job_search_duration`, in days.
pub const DEFAULT_JOB_SEARCH_DURATION: u32 = 90;

/// One graduate, as provided by the raw-table producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraduateRecord {
    pub student_id: Option<String>,
    pub faculty: String,
    pub university: String,
    pub location: Option<String>,
    /// Grade-point average on the national 10-point scale (plausible range 5.0-10.0).
    pub gpa: f64,
    pub internships: u32,
    pub projects: u32,
    pub certificates: u32,
    pub graduation_year: i32,
    /// Days spent searching for a job, when known.
    pub job_search_duration: Option<u32>,
    /// Monthly salary; zero or absent when not employed. Source tables name
    /// this column either `salary` or `salary_byn`.
    #[serde(alias = "salary_byn")]
    pub salary: Option<f64>,
    /// Outcome label; `None` on inference input.
    pub employed: Option<bool>,
}

impl Default for GraduateRecord {
    fn default() -> Self {
        GraduateRecord {
            student_id: None,
            faculty: String::new(),
            university: String::new(),
            location: None,
            gpa: 5.0,
            internships: 0,
            projects: 0,
            certificates: 0,
            graduation_year: 2024,
            job_search_duration: None,
            salary: None,
            employed: None,
        }
    }
}

impl GraduateRecord {
    /// The outcome invariant: a positive salary implies employment, and an
    /// unemployed graduate has zero salary.
    pub fn outcome_is_consistent(&self) -> bool {
        match (self.employed, self.salary) {
            (Some(false), Some(s)) => s == 0.0,
            (Some(true), _) | (None, _) | (_, None) => true,
        }
    }
}

/// Fill absent optional columns with the documented defaults, in place.
///
/// Missing `location` becomes the capital region, missing `salary` becomes
/// zero, missing `job_search_duration` becomes 90 days. Rows violating the
/// salary/employment invariant have their salary zeroed. Returns the number
/// of repaired fields; repairs are warnings, never errors.
pub fn repair_records(records: &mut [GraduateRecord]) -> usize {
    let mut repaired = 0usize;
    for record in records.iter_mut() {
        if record.location.is_none() {
            record.location = Some(CAPITAL_REGION.to_string());
            repaired += 1;
        }
        if record.job_search_duration.is_none() {
            record.job_search_duration = Some(DEFAULT_JOB_SEARCH_DURATION);
            repaired += 1;
        }
        if record.salary.is_none() {
            record.salary = Some(0.0);
            repaired += 1;
        }
        if !record.outcome_is_consistent() {
            record.salary = Some(0.0);
            repaired += 1;
        }
    }
    if repaired > 0 {
        log::warn!(
            "filled {} missing or inconsistent fields across {} records",
            repaired,
            records.len()
        );
    }
    repaired
}
