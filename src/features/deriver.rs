//! Deterministic feature derivation and target encoding.
//!
//! `FeatureDeriver::fit` learns three per-category tables from training data
//! (faculty employment rate, university prestige, location economic score);
//! `transform` recomputes every derived feature from scratch for each record
//! against that frozen state. Unseen categories resolve to fixed fallback
//! constants instead of failing, and absent optional columns contribute
//! their neutral defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{GraduateRecord, CAPITAL_REGION, SECONDARY_REGIONS};

/// Reference year for `years_since_graduation`.
pub const REFERENCE_YEAR: i32 = 2025;

/// Employment rate assigned to a faculty never seen during fit.
pub const FACULTY_RATE_FALLBACK: f64 = 0.5;

/// Prestige assigned to an unseen university, and to every university when
/// the score cannot be normalized (single category or max == min).
pub const PRESTIGE_FALLBACK: f64 = 5.0;

/// Economic score assigned to an unseen location, same degenerate rule.
pub const ECONOMIC_FALLBACK: f64 = 5.0;

/// Per-category statistics learned from training data, immutable after fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingState {
    /// Mean employment rate by faculty.
    pub faculty_employment_rates: BTreeMap<String, f64>,
    /// Min-max normalized mean salary of employed members, 0-10, by university.
    pub university_prestige_scores: BTreeMap<String, f64>,
    /// Same normalization over locations.
    pub location_economic_scores: BTreeMap<String, f64>,
}

/// All derived columns for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatures {
    pub years_since_graduation: f64,
    pub is_recent_graduate: f64,
    pub skills_diversity: f64,
    pub total_experience_score: f64,
    pub academic_performance_index: f64,
    pub career_readiness_index: f64,
    pub gpa_experience_interaction: f64,
    pub location_premium: f64,
    pub faculty_employment_rate: f64,
    pub university_prestige_score: f64,
    pub location_economic_score: f64,
    pub has_high_gpa: f64,
    pub has_multiple_internships: f64,
    pub has_projects: f64,
    pub has_certificates: f64,
    pub market_competitiveness_index: f64,
}

/// Pure row-to-features transformer with fitted per-category tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureDeriver {
    encodings: Option<EncodingState>,
}

/// Look a category up in a fitted table, falling back to the documented
/// constant for unseen categories, absent columns, or an unfitted table.
fn resolve_or_default(
    table: Option<&BTreeMap<String, f64>>,
    key: Option<&str>,
    default: f64,
) -> f64 {
    match (table, key) {
        (Some(table), Some(key)) => table.get(key).copied().unwrap_or(default),
        _ => default,
    }
}

fn location_premium(location: Option<&str>) -> f64 {
    match location {
        Some(loc) if loc == CAPITAL_REGION => 1.5,
        Some(loc) if SECONDARY_REGIONS.contains(&loc) => 1.2,
        Some(_) => 1.0,
        None => 1.0,
    }
}

/// Min-max normalize per-category means onto a 0-10 scale; every category
/// collapses to the fallback when normalization is impossible.
fn normalized_scores(means: BTreeMap<String, f64>, fallback: f64) -> BTreeMap<String, f64> {
    if means.len() <= 1 {
        return means.into_keys().map(|k| (k, fallback)).collect();
    }
    let min = means.values().cloned().fold(f64::INFINITY, f64::min);
    let max = means.values().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return means.into_keys().map(|k| (k, fallback)).collect();
    }
    means
        .into_iter()
        .map(|(k, v)| (k, (v - min) / (max - min) * 10.0))
        .collect()
}

impl FeatureDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.encodings.is_some()
    }

    /// Learn the three category tables. Without labels this is a no-op that
    /// keeps any previously fitted state.
    pub fn fit(&mut self, records: &[GraduateRecord], labels: Option<&[bool]>) {
        let Some(labels) = labels else {
            return;
        };
        debug_assert_eq!(records.len(), labels.len());

        let mut faculty_counts: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for (record, &employed) in records.iter().zip(labels) {
            let entry = faculty_counts.entry(record.faculty.clone()).or_default();
            entry.0 += employed as u8 as f64;
            entry.1 += 1.0;
        }
        let faculty_employment_rates = faculty_counts
            .into_iter()
            .map(|(k, (hits, total))| (k, hits / total))
            .collect();

        let university_prestige_scores = normalized_scores(
            mean_salary_of_employed(records, labels, |r| Some(r.university.as_str())),
            PRESTIGE_FALLBACK,
        );
        let location_economic_scores = normalized_scores(
            mean_salary_of_employed(records, labels, |r| r.location.as_deref()),
            ECONOMIC_FALLBACK,
        );

        let state = EncodingState {
            faculty_employment_rates,
            university_prestige_scores,
            location_economic_scores,
        };
        log::debug!(
            "fitted category encodings: {} faculties, {} universities, {} locations",
            state.faculty_employment_rates.len(),
            state.university_prestige_scores.len(),
            state.location_economic_scores.len()
        );
        self.encodings = Some(state);
    }

    /// Compute every derived feature for one record against the fitted state.
    pub fn transform(&self, record: &GraduateRecord) -> DerivedFeatures {
        let enc = self.encodings.as_ref();

        let years_since_graduation = (REFERENCE_YEAR - record.graduation_year) as f64;
        let is_recent_graduate = (years_since_graduation <= 1.0) as u8 as f64;

        let skills_diversity = (record.internships > 0) as u8 as f64 * 2.0
            + (record.projects > 0) as u8 as f64 * 1.5
            + (record.certificates > 0) as u8 as f64;

        // total_experience_score consumes skills_diversity; this order is
        // part of the contract, not a style choice.
        let total_experience_score = record.internships as f64 * 0.4
            + record.projects as f64 * 0.3
            + record.certificates as f64 * 0.2
            + skills_diversity * 0.1;

        let academic_performance_index = record.gpa * 0.6 + (record.projects as f64 / 10.0) * 0.4;

        let mut career_readiness_index = record.gpa * 0.25
            + total_experience_score * 0.35
            + skills_diversity * 0.20
            + (record.graduation_year - 2010) as f64 * 0.10;
        if let Some(duration) = record.job_search_duration {
            if duration <= 30 {
                career_readiness_index += 0.10;
            }
        }

        let gpa_experience_interaction = record.gpa * total_experience_score;
        let location_premium = location_premium(record.location.as_deref());

        let faculty_employment_rate = resolve_or_default(
            enc.map(|e| &e.faculty_employment_rates),
            Some(record.faculty.as_str()),
            FACULTY_RATE_FALLBACK,
        );
        let university_prestige_score = resolve_or_default(
            enc.map(|e| &e.university_prestige_scores),
            Some(record.university.as_str()),
            PRESTIGE_FALLBACK,
        );
        let location_economic_score = resolve_or_default(
            enc.map(|e| &e.location_economic_scores),
            record.location.as_deref(),
            ECONOMIC_FALLBACK,
        );

        let has_high_gpa = (record.gpa >= 7.5) as u8 as f64;
        let has_multiple_internships = (record.internships >= 1) as u8 as f64;
        let has_projects = (record.projects >= 2) as u8 as f64;
        let has_certificates = (record.certificates >= 1) as u8 as f64;

        let market_competitiveness_index = university_prestige_score * 0.3
            + faculty_employment_rate * 0.3
            + career_readiness_index * 0.2
            + location_economic_score * 0.2;

        DerivedFeatures {
            years_since_graduation,
            is_recent_graduate,
            skills_diversity,
            total_experience_score,
            academic_performance_index,
            career_readiness_index,
            gpa_experience_interaction,
            location_premium,
            faculty_employment_rate,
            university_prestige_score,
            location_economic_score,
            has_high_gpa,
            has_multiple_internships,
            has_projects,
            has_certificates,
            market_competitiveness_index,
        }
    }
}

/// Group mean salary of employed members by a category key. Categories with
/// no employed members contribute a 0.0 mean.
fn mean_salary_of_employed<'a, F>(
    records: &'a [GraduateRecord],
    labels: &[bool],
    key: F,
) -> BTreeMap<String, f64>
where
    F: Fn(&'a GraduateRecord) -> Option<&'a str>,
{
    let mut sums: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for (record, &employed) in records.iter().zip(labels) {
        let Some(category) = key(record) else {
            continue;
        };
        // Every observed category participates, even with zero employed.
        let entry = sums.entry(category.to_string()).or_default();
        if employed {
            entry.0 += record.salary.unwrap_or(0.0);
            entry.1 += 1.0;
        }
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, if n > 0.0 { sum / n } else { 0.0 }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grad(
        faculty: &str,
        university: &str,
        location: Option<&str>,
        gpa: f64,
        employed: bool,
        salary: f64,
    ) -> GraduateRecord {
        GraduateRecord {
            faculty: faculty.into(),
            university: university.into(),
            location: location.map(|s| s.to_string()),
            gpa,
            internships: 1,
            projects: 2,
            certificates: 0,
            graduation_year: 2023,
            employed: Some(employed),
            salary: Some(salary),
            ..Default::default()
        }
    }

    fn fitted_deriver() -> FeatureDeriver {
        let records = vec![
            grad("IT", "BSU", Some("Minsk"), 8.0, true, 2000.0),
            grad("IT", "BSU", Some("Minsk"), 7.0, true, 1800.0),
            grad("Economics", "BSEU", Some("Brest"), 6.0, false, 0.0),
            grad("Economics", "BSEU", Some("Brest"), 6.5, true, 900.0),
        ];
        let labels: Vec<bool> = records.iter().map(|r| r.employed.unwrap()).collect();
        let mut deriver = FeatureDeriver::new();
        deriver.fit(&records, Some(&labels));
        deriver
    }

    #[test]
    fn fit_without_labels_keeps_prior_state() {
        let mut deriver = fitted_deriver();
        let before = deriver.clone();
        deriver.fit(&[], None);
        assert_eq!(
            before.transform(&grad("IT", "BSU", Some("Minsk"), 8.0, true, 0.0)),
            deriver.transform(&grad("IT", "BSU", Some("Minsk"), 8.0, true, 0.0))
        );
        assert!(deriver.is_fitted());
    }

    #[test]
    fn skills_diversity_takes_documented_values() {
        let deriver = FeatureDeriver::new();
        let allowed = [0.0, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.5];
        for internships in [0u32, 2] {
            for projects in [0u32, 3] {
                for certificates in [0u32, 1] {
                    let record = GraduateRecord {
                        faculty: "IT".into(),
                        university: "BSU".into(),
                        internships,
                        projects,
                        certificates,
                        gpa: 7.0,
                        graduation_year: 2022,
                        ..Default::default()
                    };
                    let d = deriver.transform(&record);
                    assert!(
                        allowed.contains(&d.skills_diversity),
                        "unexpected skills_diversity {}",
                        d.skills_diversity
                    );
                }
            }
        }
    }

    #[test]
    fn career_readiness_increases_with_gpa() {
        let deriver = FeatureDeriver::new();
        let mut prev = f64::NEG_INFINITY;
        for gpa in [5.0, 6.0, 7.5, 9.0, 10.0] {
            let d = deriver.transform(&grad("IT", "BSU", None, gpa, true, 0.0));
            assert!(d.career_readiness_index > prev);
            prev = d.career_readiness_index;
        }
    }

    #[test]
    fn career_readiness_exact_value() {
        let deriver = FeatureDeriver::new();
        let record = GraduateRecord {
            faculty: "IT".into(),
            university: "BSU".into(),
            gpa: 8.0,
            internships: 1,
            projects: 2,
            certificates: 0,
            graduation_year: 2023,
            job_search_duration: Some(20),
            ..Default::default()
        };
        let d = deriver.transform(&record);
        // skills_diversity = 2 + 1.5 = 3.5
        // total_experience = 0.4 + 0.6 + 0 + 0.35 = 1.35
        // career = 2.0 + 0.4725 + 0.7 + 1.3 + 0.1 bonus = 4.5725
        assert!((d.skills_diversity - 3.5).abs() < 1e-12);
        assert!((d.total_experience_score - 1.35).abs() < 1e-12);
        assert!((d.career_readiness_index - 4.5725).abs() < 1e-12);
    }

    #[test]
    fn slow_job_search_gets_no_bonus() {
        let deriver = FeatureDeriver::new();
        let mut record = grad("IT", "BSU", None, 8.0, true, 0.0);
        record.job_search_duration = Some(31);
        let slow = deriver.transform(&record).career_readiness_index;
        record.job_search_duration = None;
        let absent = deriver.transform(&record).career_readiness_index;
        record.job_search_duration = Some(30);
        let fast = deriver.transform(&record).career_readiness_index;
        assert_eq!(slow, absent);
        assert!((fast - slow - 0.10).abs() < 1e-12);
    }

    #[test]
    fn location_premium_tiers() {
        let deriver = FeatureDeriver::new();
        let premium = |loc: Option<&str>| {
            deriver
                .transform(&grad("IT", "BSU", loc, 7.0, true, 0.0))
                .location_premium
        };
        assert_eq!(premium(Some("Minsk")), 1.5);
        assert_eq!(premium(Some("Grodno")), 1.2);
        assert_eq!(premium(Some("Brest")), 1.2);
        assert_eq!(premium(Some("Gomel")), 1.0);
        assert_eq!(premium(None), 1.0);
    }

    #[test]
    fn unseen_categories_fall_back_to_constants() {
        let deriver = fitted_deriver();
        let d = deriver.transform(&grad("Law", "GSU", Some("Vitebsk"), 7.0, true, 0.0));
        assert_eq!(d.faculty_employment_rate, FACULTY_RATE_FALLBACK);
        assert_eq!(d.university_prestige_score, PRESTIGE_FALLBACK);
        assert_eq!(d.location_economic_score, ECONOMIC_FALLBACK);
    }

    #[test]
    fn seen_categories_use_training_statistics() {
        let deriver = fitted_deriver();
        let d = deriver.transform(&grad("IT", "BSU", Some("Minsk"), 7.0, true, 0.0));
        assert_eq!(d.faculty_employment_rate, 1.0);
        // BSU has the highest mean salary of employed members -> 10.0
        assert!((d.university_prestige_score - 10.0).abs() < 1e-12);
        assert!((d.location_economic_score - 10.0).abs() < 1e-12);

        let d = deriver.transform(&grad("Economics", "BSEU", Some("Brest"), 7.0, true, 0.0));
        assert_eq!(d.faculty_employment_rate, 0.5);
        assert!(d.university_prestige_score.abs() < 1e-12);
    }

    #[test]
    fn single_category_prestige_defaults_to_neutral() {
        let records = vec![
            grad("IT", "BSU", Some("Minsk"), 8.0, true, 2000.0),
            grad("IT", "BSU", Some("Minsk"), 7.0, false, 0.0),
        ];
        let labels = vec![true, false];
        let mut deriver = FeatureDeriver::new();
        deriver.fit(&records, Some(&labels));
        let d = deriver.transform(&records[0]);
        assert_eq!(d.university_prestige_score, PRESTIGE_FALLBACK);
        assert_eq!(d.location_economic_score, ECONOMIC_FALLBACK);
    }
}
