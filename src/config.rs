//! Configuration for timetable runs.
//!
//! Load the calendar tables, solver tunables, catalog options and course
//! filters from TOML without code changes. Every section is optional; missing
//! sections fall back to the defaults below.
//!
//! # Examples
//!
//! ```
//! use u_timetable::config::{SearchMode, TimetableConfig};
//! use std::time::Duration;
//!
//! let config = TimetableConfig::from_toml_str(r#"
//!     [solver]
//!     mode = "first_solution"
//!     strict_mode = false
//!     time_limit_secs = 5.0
//!
//!     [filter]
//!     semesters = [1]
//! "#).unwrap();
//!
//! assert_eq!(config.solver.mode, SearchMode::FirstSolution);
//! assert!(!config.solver.strict_mode);
//! assert_eq!(config.solver.time_limit(), Duration::from_secs(5));
//! assert_eq!(config.calendar.weekdays.len(), 5);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conflict::RuleSettings;
use crate::models::{Calendar, CourseFilter};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration of a timetable run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TimetableConfig {
    /// Weekdays, time bands, night bands and night program.
    #[serde(default)]
    pub calendar: Calendar,

    /// Search and conflict-relation tunables.
    #[serde(default)]
    pub solver: SolverConfig,

    /// Raw-record conversion options.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Optional course filters applied before splitting into parts.
    #[serde(default)]
    pub filter: CourseFilter,
}

impl TimetableConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML,
    /// or fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the solver configuration.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the calendar.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the course filter.
    pub fn with_filter(mut self, filter: CourseFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calendar.validate()?;
        self.solver.validate()
    }
}

/// Search strategy of the backtracking solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Stop at the first complete conflict-free assignment.
    FirstSolution,
    /// Collect up to `solution_cap` assignments within the time budget
    /// and keep the one with the lowest gap score.
    #[default]
    Optimize,
}

/// Solver tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    pub mode: SearchMode,

    /// Forces every session of a course onto one room.
    ///
    /// Read by the conflict builder; the solver rejects a conflict relation
    /// built with a different value.
    pub strict_mode: bool,

    /// Wall-clock budget for [`SearchMode::Optimize`], in seconds.
    pub time_limit_secs: f64,

    /// Maximum number of complete solutions collected in optimize mode.
    pub solution_cap: usize,

    /// Node expansions between two clock reads.
    pub poll_interval: u64,

    /// Node expansions between two progress events.
    pub log_interval: u64,

    /// Pairwise daily workload cap (hours) for one professor.
    ///
    /// Must match the cap the conflict relation was built with.
    pub daily_hour_cap: u32,

    /// Rank collected solutions by gap score. When off, the first
    /// collected solution is returned.
    pub optimize_gaps: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Optimize,
            strict_mode: true,
            time_limit_secs: 30.0,
            solution_cap: 50,
            poll_interval: 1_000,
            log_interval: 10_000,
            daily_hour_cap: 8,
            optimize_gaps: true,
        }
    }
}

impl SolverConfig {
    /// Creates a first-solution configuration.
    pub fn first_solution() -> Self {
        Self {
            mode: SearchMode::FirstSolution,
            ..Self::default()
        }
    }

    /// Sets strict room mode.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Sets the time budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = limit.as_secs_f64();
        self
    }

    /// Sets the solution cap.
    pub fn with_solution_cap(mut self, cap: usize) -> Self {
        self.solution_cap = cap;
        self
    }

    /// Sets the clock poll interval.
    pub fn with_poll_interval(mut self, nodes: u64) -> Self {
        self.poll_interval = nodes;
        self
    }

    /// Enables or disables gap-score ranking.
    pub fn with_gap_optimization(mut self, enabled: bool) -> Self {
        self.optimize_gaps = enabled;
        self
    }

    /// Conflict rule settings carried by this configuration.
    pub fn rule_settings(&self) -> RuleSettings {
        RuleSettings {
            strict_mode: self.strict_mode,
            daily_hour_cap: self.daily_hour_cap,
        }
    }

    /// Returns the time budget as a `Duration`.
    ///
    /// Non-finite or negative values collapse to zero.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::ZERO)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_limit_secs.is_finite() || self.time_limit_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_limit_secs must be a non-negative number, got {}",
                self.time_limit_secs
            )));
        }
        if self.solution_cap == 0 {
            return Err(ConfigError::Invalid("solution_cap must be at least 1".into()));
        }
        if self.poll_interval == 0 {
            return Err(ConfigError::Invalid("poll_interval must be at least 1".into()));
        }
        Ok(())
    }
}

/// Options for converting raw course records.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CatalogConfig {
    /// Program code marking elective courses when a record carries no
    /// explicit kind. Compared case-insensitively.
    pub elective_program: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            elective_program: "OPTATIVA".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TimetableConfig::default();
        assert_eq!(config.solver.mode, SearchMode::Optimize);
        assert!(config.solver.strict_mode);
        assert_eq!(config.solver.solution_cap, 50);
        assert_eq!(config.solver.time_limit(), Duration::from_secs(30));
        assert_eq!(config.solver.daily_hour_cap, 8);
        assert_eq!(config.calendar.night_program, "SIN");
        assert_eq!(config.catalog.elective_program, "OPTATIVA");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = TimetableConfig::from_toml_str("").unwrap();
        assert_eq!(config.solver.solution_cap, 50);
        assert_eq!(config.calendar.bands.len(), 8);
    }

    #[test]
    fn test_partial_solver_section() {
        let config = TimetableConfig::from_toml_str(
            r#"
            [solver]
            solution_cap = 7
            poll_interval = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.solver.solution_cap, 7);
        assert_eq!(config.solver.poll_interval, 64);
        assert!(config.solver.strict_mode);
    }

    #[test]
    fn test_calendar_section() {
        let config = TimetableConfig::from_toml_str(
            r#"
            [calendar]
            night_program = "NIGHT"
            night_bands = [3]
            bands = ["pre", "a", "b", "c", "post"]

            [[calendar.weekdays]]
            number = 2
            name = "Monday"
            "#,
        )
        .unwrap();
        assert_eq!(config.calendar.night_program, "NIGHT");
        assert_eq!(config.calendar.weekdays.len(), 1);
        assert_eq!(config.calendar.valid_hours(), vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_section() {
        let config = TimetableConfig::from_toml_str(
            r#"
            [filter]
            periods = [1, 2]
            programs = ["cco"]
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.periods, Some(vec![1, 2]));
        assert_eq!(config.filter.programs, Some(vec!["cco".to_string()]));
        assert!(config.filter.semesters.is_none());
    }

    #[test]
    fn test_invalid_time_limit() {
        let err = TimetableConfig::from_toml_str(
            r#"
            [solver]
            time_limit_secs = -1.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_cap_rejected() {
        let solver = SolverConfig::default().with_solution_cap(0);
        assert!(solver.validate().is_err());
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let err = TimetableConfig::from_toml_str(
            r#"
            [solver]
            mode = "anneal"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TimetableConfig::load("/nonexistent/timetable.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_builder() {
        let solver = SolverConfig::first_solution()
            .with_strict_mode(false)
            .with_time_limit(Duration::from_millis(1500))
            .with_poll_interval(10)
            .with_gap_optimization(false);
        assert_eq!(solver.mode, SearchMode::FirstSolution);
        assert!(!solver.strict_mode);
        assert_eq!(solver.time_limit(), Duration::from_millis(1500));
        assert_eq!(solver.poll_interval, 10);
        assert!(!solver.optimize_gaps);
    }
}
