//! Threshold policy rendered into the catalog's SQL templates.
//!
//! The age-bucket boundaries and the stop-duration-to-minutes mapping are
//! embedded as literals in two of the standard queries. They live here so
//! they can be overridden from a TOML file without touching the catalog
//! table. The defaults reproduce the dashboard's long-standing values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Environment variable naming an optional policy TOML file.
pub const POLICY_PATH_ENV: &str = "CATALOG_POLICY_PATH";

/// Thresholds substituted into the catalog's SQL templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogPolicy {
    /// Driver age group boundaries.
    pub age_buckets: AgeBuckets,
    /// Representative minutes for each stop-duration bucket.
    pub duration_minutes: DurationMinutes,
}

/// Driver age group boundaries, in years.
///
/// Ages below `minor_below` are minors; the remaining groups are closed on
/// their upper bound (`age <= young_adult_max`, and so on). Anything above
/// `senior_max` falls into the open-ended oldest group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeBuckets {
    pub minor_below: u32,
    pub young_adult_max: u32,
    pub adult_max: u32,
    pub middle_age_max: u32,
    pub senior_max: u32,
}

impl Default for AgeBuckets {
    fn default() -> Self {
        Self {
            minor_below: 18,
            young_adult_max: 25,
            adult_max: 35,
            middle_age_max: 50,
            senior_max: 65,
        }
    }
}

impl AgeBuckets {
    /// `(upper bound, group label)` pairs for the closed groups, in
    /// ascending order. The minor and open-ended groups are not included.
    #[must_use]
    pub fn closed_groups(&self) -> [(u32, String); 4] {
        [
            (
                self.young_adult_max,
                format!("{}-{}", self.minor_below, self.young_adult_max),
            ),
            (
                self.adult_max,
                format!("{}-{}", self.young_adult_max + 1, self.adult_max),
            ),
            (
                self.middle_age_max,
                format!("{}-{}", self.adult_max + 1, self.middle_age_max),
            ),
            (
                self.senior_max,
                format!("{}-{}", self.middle_age_max + 1, self.senior_max),
            ),
        ]
    }

    /// Label of the group below `minor_below`.
    #[must_use]
    pub fn minor_label(&self) -> String {
        format!("under{}", self.minor_below)
    }

    /// Label of the open-ended group above `senior_max`.
    #[must_use]
    pub fn oldest_label(&self) -> String {
        format!("{}+", self.senior_max)
    }
}

/// Minutes substituted for each stop-duration bucket when averaging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationMinutes {
    /// Minutes for `0-15 Min`.
    pub short: f64,
    /// Minutes for `16-30 Min`.
    pub medium: f64,
    /// Minutes for `30+ Min`.
    pub long: f64,
}

impl Default for DurationMinutes {
    fn default() -> Self {
        Self {
            short: 7.5,
            medium: 23.0,
            long: 35.0,
        }
    }
}

impl DurationMinutes {
    /// Minutes in bucket order, matching
    /// [`enforceiq_stop_models::DURATION_BUCKETS`].
    #[must_use]
    pub const fn in_bucket_order(&self) -> [f64; 3] {
        [self.short, self.medium, self.long]
    }
}

impl CatalogPolicy {
    /// Parses a policy from TOML and validates it. Missing tables and keys
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// * If the TOML is malformed
    /// * If the parsed policy fails [`CatalogPolicy::validate`]
    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let policy: Self = toml::de::from_str(s)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reads and parses a policy file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If its contents fail [`CatalogPolicy::from_toml_str`]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads the policy file named by `CATALOG_POLICY_PATH`, or the default
    /// policy when the variable is unset or empty.
    ///
    /// # Errors
    ///
    /// * If the named file cannot be loaded
    pub fn from_env() -> Result<Self, CatalogError> {
        match std::env::var(POLICY_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                log::info!("Loading catalog policy from {path}");
                Self::load(Path::new(path.trim()))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Checks that the age groups are ordered and the minutes are usable.
    ///
    /// # Errors
    ///
    /// * If `minor_below` exceeds `young_adult_max`
    /// * If the age maxima are not strictly increasing
    /// * If any duration is negative or not finite
    pub fn validate(&self) -> Result<(), CatalogError> {
        let ages = &self.age_buckets;

        if ages.minor_below > ages.young_adult_max {
            return Err(CatalogError::InvalidPolicy {
                message: format!(
                    "minor_below ({}) must not exceed young_adult_max ({})",
                    ages.minor_below, ages.young_adult_max
                ),
            });
        }

        let maxima = [
            ("young_adult_max", ages.young_adult_max),
            ("adult_max", ages.adult_max),
            ("middle_age_max", ages.middle_age_max),
            ("senior_max", ages.senior_max),
        ];
        for pair in maxima.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            if lower >= upper {
                return Err(CatalogError::InvalidPolicy {
                    message: format!(
                        "{upper_name} ({upper}) must be greater than {lower_name} ({lower})"
                    ),
                });
            }
        }

        let minutes = &self.duration_minutes;
        for (name, value) in [
            ("short", minutes.short),
            ("medium", minutes.medium),
            ("long", minutes.long),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogError::InvalidPolicy {
                    message: format!("duration_minutes.{name} must be a non-negative number"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        CatalogPolicy::default().validate().unwrap();
    }

    #[test]
    fn default_group_labels() {
        let ages = AgeBuckets::default();
        assert_eq!(ages.minor_label(), "under18");
        assert_eq!(ages.oldest_label(), "65+");
        let labels: Vec<String> = ages.closed_groups().into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec!["18-25", "26-35", "36-50", "51-65"]);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let policy = CatalogPolicy::from_toml_str(
            r"
            [duration_minutes]
            long = 45.0
            ",
        )
        .unwrap();

        assert_eq!(policy.age_buckets, AgeBuckets::default());
        assert!((policy.duration_minutes.short - 7.5).abs() < f64::EPSILON);
        assert!((policy.duration_minutes.long - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            CatalogPolicy::from_toml_str("").unwrap(),
            CatalogPolicy::default()
        );
    }

    #[test]
    fn rejects_unordered_ages() {
        let err = CatalogPolicy::from_toml_str(
            r"
            [age_buckets]
            adult_max = 20
            ",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPolicy { .. }));
        assert!(err.to_string().contains("adult_max"));
    }

    #[test]
    fn rejects_minor_bound_above_first_group() {
        let err = CatalogPolicy::from_toml_str(
            r"
            [age_buckets]
            minor_below = 30
            ",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPolicy { .. }));
    }

    #[test]
    fn rejects_negative_minutes() {
        let err = CatalogPolicy::from_toml_str(
            r"
            [duration_minutes]
            short = -1.0
            ",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPolicy { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = CatalogPolicy::from_toml_str("[age_buckets\nadult_max = ").unwrap_err();
        assert!(matches!(err, CatalogError::Toml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CatalogPolicy::load(Path::new("/nonexistent/enforceiq/policy.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(
            err.to_string()
                .starts_with("Failed to read catalog policy /nonexistent/enforceiq/policy.toml: ")
        );
    }
}
