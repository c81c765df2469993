//! End-to-end timetabling pipeline.
//!
//! # Stages
//!
//! 1. Validate the catalog (fatal issues abort, warnings are kept).
//! 2. Apply the configured course filter.
//! 3. Build the candidate graph.
//! 4. Build the conflict relation.
//! 5. Solve.
//! 6. Decode the selected solution and compute KPIs.
//!
//! Each stage logs a structured event with its counts and duration.

use std::time::Instant;

use tracing::{info, warn};

use crate::config::TimetableConfig;
use crate::conflict::ConflictBuilder;
use crate::error::{Result, TimetableError};
use crate::graph::CandidateGraphBuilder;
use crate::models::{Catalog, CourseRecord, Schedule};
use crate::solver::{BacktrackingSolver, SolveOutcome, SolverStats};
use crate::validation::{validate_catalog, ValidationError};

use super::TimetableKpi;

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct TimetableOutcome {
    /// The selected schedule; `None` when the instance is infeasible.
    pub schedule: Option<Schedule>,
    /// KPIs of the selected schedule.
    pub kpi: Option<TimetableKpi>,
    pub stats: SolverStats,
    /// Non-fatal validation findings.
    pub warnings: Vec<ValidationError>,
    /// Course parts after filtering.
    pub parts: usize,
    pub candidates: usize,
    pub conflicts: usize,
}

impl TimetableOutcome {
    /// Whether a schedule was found.
    pub fn is_feasible(&self) -> bool {
        self.schedule.is_some()
    }
}

/// Runs the full pipeline with one configuration.
///
/// # Example
///
/// ```
/// use u_timetable::config::{SolverConfig, TimetableConfig};
/// use u_timetable::models::CourseRecord;
/// use u_timetable::scheduler::Timetabler;
///
/// let records = vec![
///     CourseRecord::new("ALG", "Algorithms", 4)
///         .with_program("CCO")
///         .with_period(1)
///         .with_professors("P1"),
/// ];
/// let professors = vec![("P1".to_string(), "Ada".to_string())];
/// let rooms = vec![("R1".to_string(), "Room 1".to_string())];
///
/// let config = TimetableConfig::new().with_solver(SolverConfig::first_solution());
/// let outcome = Timetabler::new(config)
///     .run_records(&records, professors, rooms)
///     .unwrap();
/// assert_eq!(outcome.schedule.unwrap().assignment_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Timetabler {
    config: TimetableConfig,
}

impl Timetabler {
    pub fn new(config: TimetableConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    /// Builds a catalog from raw records with the configured calendar and
    /// runs the pipeline on it.
    pub fn run_records<P, R>(
        &self,
        records: &[CourseRecord],
        professors: P,
        rooms: R,
    ) -> Result<TimetableOutcome>
    where
        P: IntoIterator<Item = (String, String)>,
        R: IntoIterator<Item = (String, String)>,
    {
        let catalog = Catalog::from_records(
            records,
            professors,
            rooms,
            &self.config.calendar,
            &self.config.catalog,
        )?;
        self.run(&catalog)
    }

    /// Runs the pipeline on a catalog whose slots come from the configured
    /// calendar.
    ///
    /// # Errors
    /// - [`TimetableError::Config`] for an inconsistent configuration.
    /// - [`TimetableError::InvalidInput`] for fatal validation findings.
    /// - [`TimetableError::EmptyDomain`] when a part has no candidate.
    ///
    /// Infeasibility is reported through [`TimetableOutcome::schedule`].
    pub fn run(&self, catalog: &Catalog) -> Result<TimetableOutcome> {
        let started = Instant::now();
        self.config.validate()?;

        let warnings = validate_catalog(catalog).map_err(TimetableError::InvalidInput)?;

        let filtered;
        let catalog = if self.config.filter.is_empty() {
            catalog
        } else {
            filtered = catalog.filtered(&self.config.filter);
            info!(
                event = "catalog_filtered",
                courses_before = catalog.courses.len(),
                courses_after = filtered.courses.len(),
            );
            &filtered
        };

        info!(
            event = "pipeline_start",
            courses = catalog.courses.len(),
            parts = catalog.parts.len(),
            professors = catalog.professors.len(),
            rooms = catalog.rooms.len(),
            slots = catalog.slots.len(),
            warnings = warnings.len(),
        );

        let solver_config = &self.config.solver;
        let graph = CandidateGraphBuilder::new(catalog, &self.config.calendar).build()?;
        let conflicts = ConflictBuilder::new(&graph)
            .with_settings(solver_config.rule_settings())
            .build()?;

        let outcome = BacktrackingSolver::new(&graph, &conflicts, solver_config.clone()).solve()?;

        let (schedule, kpi, stats) = match outcome {
            SolveOutcome::Solved { solution, stats } => {
                let schedule = solution.to_schedule(&graph)?;
                let kpi = TimetableKpi::calculate(&schedule, solver_config.daily_hour_cap);
                if !kpi.within_daily_cap() {
                    warn!(
                        event = "daily_cap_exceeded",
                        days = kpi.overloaded_days.len(),
                        "pairwise workload rule admitted overloaded days"
                    );
                }
                (Some(schedule), Some(kpi), stats)
            }
            SolveOutcome::Infeasible { stats } => {
                warn!(
                    event = "infeasible",
                    nodes_explored = stats.nodes_explored,
                    "no conflict-free timetable exists"
                );
                (None, None, stats)
            }
        };

        info!(
            event = "pipeline_end",
            feasible = schedule.is_some(),
            gap_score = schedule.as_ref().map(|s| s.gap_score),
            duration_ms = started.elapsed().as_millis() as u64,
        );

        Ok(TimetableOutcome {
            schedule,
            kpi,
            stats,
            warnings,
            parts: graph.part_count(),
            candidates: graph.candidate_count(),
            conflicts: conflicts.edge_count(),
        })
    }
}
