//! Feature-matrix orchestration: derivation, imputation and scaling.
//!
//! `FeatureEngineer` turns graduate records into the fixed-width numeric
//! matrix consumed by the classifiers. The column list is frozen at fit time
//! and never changes afterwards; inference rows missing an optional value
//! flow through the median imputer instead of failing.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::PredictorError;
use crate::features::deriver::FeatureDeriver;
use crate::preprocessing::{
    fit_imputer, fit_scaler, impute_all, transform_all, MedianImputer, Scaler,
};
use crate::record::GraduateRecord;

/// Every column that can reach the model input. Raw categorical columns are
/// deliberately absent: only engineered numeric features are used.
pub const CANDIDATE_FEATURES: [&str; 23] = [
    // Raw numeric columns
    "gpa",
    "internships",
    "projects",
    "certificates",
    "graduation_year",
    "salary",
    "job_search_duration",
    // Derived columns
    "years_since_graduation",
    "total_experience_score",
    "academic_performance_index",
    "gpa_experience_interaction",
    "location_premium",
    "faculty_employment_rate",
    "university_prestige_score",
    "location_economic_score",
    "career_readiness_index",
    "market_competitiveness_index",
    "skills_diversity",
    // Indicator columns
    "is_recent_graduate",
    "has_high_gpa",
    "has_multiple_internships",
    "has_projects",
    "has_certificates",
];

/// Fitted feature pipeline: deriver encodings, imputer, scaler and the
/// frozen feature-name list. Serialized as part of the trained artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureEngineer {
    deriver: FeatureDeriver,
    imputer: Option<MedianImputer>,
    scaler: Option<Scaler>,
    feature_names: Vec<String>,
}

impl FeatureEngineer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.imputer.is_some() && self.scaler.is_some()
    }

    /// Frozen column list; empty before fit.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Fit the deriver and preprocessing pipeline, then transform.
    ///
    /// Labels are taken from the `employed` column when every row carries
    /// it; the deriver's target encodings are only learned in that case.
    /// Any failure is logged with context and re-raised: a corrupted
    /// feature matrix must not reach model fitting.
    pub fn fit_transform(
        &mut self,
        records: &[GraduateRecord],
    ) -> anyhow::Result<(Array2<f64>, Option<Vec<bool>>)> {
        let result = self.fit_transform_inner(records);
        if let Err(e) = &result {
            log::error!("feature preparation failed: {:#}", e);
        }
        result
    }

    fn fit_transform_inner(
        &mut self,
        records: &[GraduateRecord],
    ) -> anyhow::Result<(Array2<f64>, Option<Vec<bool>>)> {
        if records.is_empty() {
            return Err(PredictorError::EmptyDataset.into());
        }

        let labels = collect_labels(records);
        self.deriver.fit(records, labels.as_deref());
        self.feature_names = CANDIDATE_FEATURES.iter().map(|s| s.to_string()).collect();

        let raw = self.raw_matrix(records);
        let imputer = fit_imputer(&raw);
        let imputed = impute_all(&raw, &imputer);
        let scaler = fit_scaler(&imputed);
        let x = transform_all(&imputed, &scaler);

        self.imputer = Some(imputer);
        self.scaler = Some(scaler);

        log::info!(
            "prepared {} rows x {} features (fit)",
            x.nrows(),
            x.ncols()
        );
        Ok((x, labels))
    }

    /// Transform-only path against the frozen state.
    pub fn transform(&self, records: &[GraduateRecord]) -> anyhow::Result<Array2<f64>> {
        let result = self.transform_inner(records);
        if let Err(e) = &result {
            log::error!("feature transform failed: {:#}", e);
        }
        result
    }

    fn transform_inner(&self, records: &[GraduateRecord]) -> anyhow::Result<Array2<f64>> {
        if records.is_empty() {
            return Err(PredictorError::EmptyDataset.into());
        }
        let (imputer, scaler) = match (&self.imputer, &self.scaler) {
            (Some(i), Some(s)) => (i, s),
            _ => return Err(PredictorError::NotFitted.into()),
        };

        let raw = self.raw_matrix(records);
        let imputed = impute_all(&raw, imputer);
        Ok(transform_all(&imputed, scaler))
    }

    /// Assemble the raw (pre-imputation) matrix; absent optional values
    /// become NaN so the imputer can fill them.
    fn raw_matrix(&self, records: &[GraduateRecord]) -> Array2<f64> {
        let ncols = CANDIDATE_FEATURES.len();
        let mut data = Vec::with_capacity(records.len() * ncols);
        for record in records {
            let derived = self.deriver.transform(record);
            for &name in CANDIDATE_FEATURES.iter() {
                let value = match name {
                    "gpa" => record.gpa,
                    "internships" => record.internships as f64,
                    "projects" => record.projects as f64,
                    "certificates" => record.certificates as f64,
                    "graduation_year" => record.graduation_year as f64,
                    "salary" => record.salary.unwrap_or(f64::NAN),
                    "job_search_duration" => record
                        .job_search_duration
                        .map(|d| d as f64)
                        .unwrap_or(f64::NAN),
                    "years_since_graduation" => derived.years_since_graduation,
                    "total_experience_score" => derived.total_experience_score,
                    "academic_performance_index" => derived.academic_performance_index,
                    "gpa_experience_interaction" => derived.gpa_experience_interaction,
                    "location_premium" => derived.location_premium,
                    "faculty_employment_rate" => derived.faculty_employment_rate,
                    "university_prestige_score" => derived.university_prestige_score,
                    "location_economic_score" => derived.location_economic_score,
                    "career_readiness_index" => derived.career_readiness_index,
                    "market_competitiveness_index" => derived.market_competitiveness_index,
                    "skills_diversity" => derived.skills_diversity,
                    "is_recent_graduate" => derived.is_recent_graduate,
                    "has_high_gpa" => derived.has_high_gpa,
                    "has_multiple_internships" => derived.has_multiple_internships,
                    "has_projects" => derived.has_projects,
                    "has_certificates" => derived.has_certificates,
                    other => unreachable!("unknown candidate feature {}", other),
                };
                data.push(value);
            }
        }
        Array2::from_shape_vec((records.len(), ncols), data)
            .expect("row-major assembly matches (nrows, ncols)")
    }
}

/// The outcome column, present only when every row carries it.
fn collect_labels(records: &[GraduateRecord]) -> Option<Vec<bool>> {
    records
        .iter()
        .map(|r| r.employed)
        .collect::<Option<Vec<bool>>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_records(n: usize) -> Vec<GraduateRecord> {
        (0..n)
            .map(|i| GraduateRecord {
                faculty: if i % 2 == 0 { "IT" } else { "Economics" }.into(),
                university: if i % 3 == 0 { "BSU" } else { "BSEU" }.into(),
                location: Some(if i % 2 == 0 { "Minsk" } else { "Brest" }.into()),
                gpa: 5.0 + (i % 6) as f64,
                internships: (i % 3) as u32,
                projects: (i % 4) as u32,
                certificates: (i % 2) as u32,
                graduation_year: 2020 + (i % 5) as i32,
                job_search_duration: Some(30 + (i % 90) as u32),
                salary: Some(if i % 2 == 0 { 1000.0 + i as f64 } else { 0.0 }),
                employed: Some(i % 2 == 0),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn fit_transform_produces_fixed_width_matrix() {
        let records = training_records(20);
        let mut engineer = FeatureEngineer::new();
        let (x, labels) = engineer.fit_transform(&records).unwrap();
        assert_eq!(x.dim(), (20, CANDIDATE_FEATURES.len()));
        assert_eq!(labels.unwrap().len(), 20);
        assert!(engineer.is_fitted());
        assert_eq!(engineer.feature_names().len(), CANDIDATE_FEATURES.len());
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn transform_before_fit_is_an_error() {
        let engineer = FeatureEngineer::new();
        let err = engineer.transform(&training_records(2)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PredictorError>(),
            Some(&PredictorError::NotFitted)
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        let mut engineer = FeatureEngineer::new();
        let err = engineer.fit_transform(&[]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PredictorError>(),
            Some(&PredictorError::EmptyDataset)
        );
    }

    #[test]
    fn missing_optional_values_are_imputed_not_fatal() {
        let records = training_records(20);
        let mut engineer = FeatureEngineer::new();
        engineer.fit_transform(&records).unwrap();

        let sparse = GraduateRecord {
            faculty: "IT".into(),
            university: "BSU".into(),
            location: None,
            gpa: 7.0,
            graduation_year: 2024,
            job_search_duration: None,
            salary: None,
            employed: None,
            ..Default::default()
        };
        let x = engineer.transform(&[sparse]).unwrap();
        assert_eq!(x.nrows(), 1);
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn labels_absent_when_any_row_lacks_outcome() {
        let mut records = training_records(10);
        records[3].employed = None;
        assert!(collect_labels(&records).is_none());
    }
}
