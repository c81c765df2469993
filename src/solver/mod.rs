//! Exhaustive backtracking search over the candidate graph.
//!
//! # Algorithm
//! - Variables (course parts) are ordered once by ascending domain size
//!   (minimum remaining values, stable on ties).
//! - Values are tried in domain generation order.
//! - A value is rejected when it conflicts with any candidate already on
//!   the trail. There is no deeper propagation.
//!
//! # Modes
//! - [`SearchMode::FirstSolution`]: stop at the first complete assignment.
//! - [`SearchMode::Optimize`]: collect complete assignments until the
//!   solution cap is reached, or the time budget is exceeded with at least
//!   one solution recorded. The clock is read every `poll_interval` node
//!   expansions. The collected solution with the lowest gap score wins.
//!
//! Aborts return a stop signal through every active frame; each frame pops
//! its trail entry before returning, so the trail is empty when
//! [`BacktrackingSolver::solve`] returns.
//!
//! # Reference
//! - Bitner & Reingold (1975), "Backtrack Programming Techniques"
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"

mod score;

pub use score::{gap_penalty, gap_score, schedule_gap_score};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConfigError, SearchMode, SolverConfig};
use crate::conflict::ConflictGraph;
use crate::error::{Result, TimetableError};
use crate::graph::CandidateGraph;
use crate::models::Schedule;

/// Why the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every branch was explored.
    Exhausted,
    /// First-solution mode found its solution.
    FirstSolution,
    /// Optimize mode collected `solution_cap` solutions.
    SolutionCap,
    /// Optimize mode ran out of time after recording a solution.
    TimeLimit,
}

/// Search statistics, reported in every mode.
#[derive(Debug, Clone, Serialize)]
pub struct SolverStats {
    /// Candidate expansions.
    pub nodes_explored: u64,
    pub elapsed: Duration,
    /// Complete assignments recorded.
    pub solutions_found: usize,
    pub stop_reason: StopReason,
}

/// A complete conflict-free assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// Chosen candidate index per part position.
    candidates: Vec<usize>,
    gap_score: u64,
}

impl Solution {
    /// Chosen candidate indices, indexed by part position.
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Candidate chosen for one part.
    pub fn candidate_for(&self, part: usize) -> Option<usize> {
        self.candidates.get(part).copied()
    }

    pub fn gap_score(&self) -> u64 {
        self.gap_score
    }

    /// Number of assigned parts.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Decodes into the read-only schedule view.
    pub fn to_schedule(&self, graph: &CandidateGraph) -> Result<Schedule> {
        graph.decode(&self.candidates, self.gap_score)
    }
}

/// Result of one solve.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// At least one complete assignment was found; this is the selected one.
    Solved { solution: Solution, stats: SolverStats },
    /// The search space holds no complete assignment.
    Infeasible { stats: SolverStats },
}

impl SolveOutcome {
    pub fn stats(&self) -> &SolverStats {
        match self {
            Self::Solved { stats, .. } | Self::Infeasible { stats } => stats,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Solved { solution, .. } => Some(solution),
            Self::Infeasible { .. } => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

/// Recursion control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Backtracking solver over a candidate graph and its conflict relation.
///
/// # Example
/// ```
/// use u_timetable::config::SolverConfig;
/// use u_timetable::conflict::ConflictBuilder;
/// use u_timetable::graph::CandidateGraphBuilder;
/// use u_timetable::models::{Calendar, Catalog, Course, CourseKind, Professor, Room};
/// use u_timetable::solver::BacktrackingSolver;
///
/// let calendar = Calendar::default();
/// let course = Course::new("ALG_0", "ALG", "Algorithms", CourseKind::Mandatory, 4).unwrap();
/// let catalog = Catalog::new(
///     vec![course],
///     vec![Professor::new("P1", "Ada").with_course("ALG_0")],
///     vec![Room::new("R1", "Room 1")],
///     &calendar,
/// );
/// let graph = CandidateGraphBuilder::new(&catalog, &calendar).build().unwrap();
/// let conflicts = ConflictBuilder::new(&graph).build().unwrap();
///
/// let outcome = BacktrackingSolver::new(&graph, &conflicts, SolverConfig::first_solution())
///     .solve()
///     .unwrap();
/// assert_eq!(outcome.solution().unwrap().len(), 2);
/// ```
pub struct BacktrackingSolver<'a> {
    graph: &'a CandidateGraph,
    conflicts: &'a ConflictGraph,
    config: SolverConfig,
}

impl<'a> BacktrackingSolver<'a> {
    pub fn new(graph: &'a CandidateGraph, conflicts: &'a ConflictGraph, config: SolverConfig) -> Self {
        Self {
            graph,
            conflicts,
            config,
        }
    }

    /// Runs the search and selects a solution.
    ///
    /// # Errors
    /// Invalid solver configuration, or a conflict relation built for a
    /// different candidate universe.
    pub fn solve(&self) -> Result<SolveOutcome> {
        let search = self.run()?;
        let stats = SolverStats {
            nodes_explored: search.nodes,
            elapsed: search.started.elapsed(),
            solutions_found: search.solutions.len(),
            stop_reason: search.stop.unwrap_or(StopReason::Exhausted),
        };

        let solution = self.select(search.solutions)?;
        info!(
            event = "solve_end",
            mode = ?self.config.mode,
            nodes_explored = stats.nodes_explored,
            solutions_found = stats.solutions_found,
            stop_reason = ?stats.stop_reason,
            gap_score = solution.as_ref().map(Solution::gap_score),
            duration_ms = stats.elapsed.as_millis() as u64,
        );

        Ok(match solution {
            Some(solution) => SolveOutcome::Solved { solution, stats },
            None => SolveOutcome::Infeasible { stats },
        })
    }

    /// Runs the depth-first search and returns its final state.
    fn run(&self) -> Result<Search<'a>> {
        self.config.validate()?;
        if self.conflicts.candidate_count() != self.graph.candidate_count() {
            return Err(TimetableError::Graph(format!(
                "conflict relation covers {} candidates, graph has {}",
                self.conflicts.candidate_count(),
                self.graph.candidate_count()
            )));
        }
        let expected = self.config.rule_settings();
        if self.conflicts.settings() != expected {
            return Err(TimetableError::Config(ConfigError::Invalid(format!(
                "conflict relation built with {:?}, solver configured for {:?}",
                self.conflicts.settings(),
                expected
            ))));
        }

        let domains = self.graph.domains();
        let mut order: Vec<usize> = (0..domains.len()).collect();
        order.sort_by_key(|&part| domains[part].len());

        info!(
            event = "solve_start",
            mode = ?self.config.mode,
            parts = order.len(),
            candidates = self.graph.candidate_count(),
            time_limit_ms = self.config.time_limit().as_millis() as u64,
            solution_cap = self.config.solution_cap,
        );

        let mut search = Search {
            domains,
            conflicts: self.conflicts,
            order,
            mode: self.config.mode,
            solution_cap: self.config.solution_cap,
            time_limit: self.config.time_limit(),
            poll_interval: self.config.poll_interval.max(1),
            log_interval: self.config.log_interval,
            trail: Vec::with_capacity(domains.len()),
            solutions: Vec::new(),
            nodes: 0,
            started: Instant::now(),
            stop: None,
        };
        search.descend(0);
        debug_assert!(search.trail.is_empty());
        Ok(search)
    }

    /// Scores recorded solutions and picks one.
    fn select(&self, solutions: Vec<Vec<usize>>) -> Result<Option<Solution>> {
        let keys = self.gap_keys()?;
        let score = |chosen: &[usize]| gap_score(chosen.iter().map(|&c| keys[c]));

        let picked = if self.config.optimize_gaps {
            solutions.into_iter().min_by_key(|s| score(s.as_slice()))
        } else {
            solutions.into_iter().next()
        };

        Ok(picked.map(|candidates| {
            let gap_score = score(candidates.as_slice());
            Solution {
                candidates,
                gap_score,
            }
        }))
    }

    /// Per-candidate ((curriculum group, weekday), hour) scoring key.
    fn gap_keys(&self) -> Result<Vec<((usize, u8), usize)>> {
        let mut groups: HashMap<(&str, Option<u32>), usize> = HashMap::new();
        let mut keys = Vec::with_capacity(self.graph.candidate_count());
        for cand in self.graph.candidates() {
            let part = self.graph.part(cand.part_node)?;
            let slot = self.graph.slot(cand.slot)?;
            let next = groups.len();
            let group = *groups
                .entry((part.program.trim(), part.period))
                .or_insert(next);
            keys.push(((group, slot.weekday), slot.hour));
        }
        Ok(keys)
    }
}

/// Mutable state of one search run.
struct Search<'a> {
    domains: &'a [Vec<usize>],
    conflicts: &'a ConflictGraph,
    /// Part positions in branching order.
    order: Vec<usize>,
    mode: SearchMode,
    solution_cap: usize,
    time_limit: Duration,
    poll_interval: u64,
    log_interval: u64,
    /// Candidates chosen so far, one per depth.
    trail: Vec<usize>,
    /// Recorded assignments, indexed by part position.
    solutions: Vec<Vec<usize>>,
    nodes: u64,
    started: Instant,
    stop: Option<StopReason>,
}

impl Search<'_> {
    fn descend(&mut self, depth: usize) -> Flow {
        if depth == self.order.len() {
            return self.record();
        }

        let domains = self.domains;
        let part = self.order[depth];
        for &candidate in &domains[part] {
            self.nodes += 1;
            if self.nodes % self.poll_interval == 0 && self.out_of_time() {
                self.stop = Some(StopReason::TimeLimit);
                return Flow::Stop;
            }
            if self.log_interval > 0 && self.nodes % self.log_interval == 0 {
                debug!(
                    event = "progress",
                    nodes_explored = self.nodes,
                    depth,
                    solutions_found = self.solutions.len(),
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                );
            }

            if self
                .trail
                .iter()
                .any(|&chosen| self.conflicts.conflicts(chosen, candidate))
            {
                continue;
            }

            self.trail.push(candidate);
            let flow = self.descend(depth + 1);
            self.trail.pop();
            if flow == Flow::Stop {
                return Flow::Stop;
            }
        }

        Flow::Continue
    }

    /// Records the complete trail as a solution.
    fn record(&mut self) -> Flow {
        let mut by_part = vec![0; self.order.len()];
        for (depth, &candidate) in self.trail.iter().enumerate() {
            by_part[self.order[depth]] = candidate;
        }
        self.solutions.push(by_part);

        match self.mode {
            SearchMode::FirstSolution => {
                self.stop = Some(StopReason::FirstSolution);
                Flow::Stop
            }
            SearchMode::Optimize if self.solutions.len() >= self.solution_cap => {
                self.stop = Some(StopReason::SolutionCap);
                Flow::Stop
            }
            SearchMode::Optimize => Flow::Continue,
        }
    }

    /// Whether the optimize budget is spent and a solution exists.
    fn out_of_time(&self) -> bool {
        self.mode == SearchMode::Optimize
            && !self.solutions.is_empty()
            && self.started.elapsed() >= self.time_limit
    }
}
