//! Pairwise conflict relation between candidates.
//!
//! Two candidates conflict when they cannot both belong to one solution.
//! Every unordered pair of distinct candidates is evaluated once against the
//! rule list in [`ConflictRule::ALL`] order; the first rule that fires is
//! recorded and the pair becomes an edge of the symmetric, irreflexive
//! [`ConflictGraph`].
//!
//! # Complexity
//! O(n²) in the number of candidates. Each candidate is first reduced to a
//! [`CandidateProfile`] of interned integers so the inner loop does no string
//! work.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::graph::CandidateGraph;
use crate::models::{ConflictRule, DEFAULT_DAILY_HOUR_CAP};

/// Rule toggles and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Enables the strict room consistency rule.
    pub strict_mode: bool,
    /// Pairwise daily workload cap in hours.
    pub daily_hour_cap: u32,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            strict_mode: true,
            daily_hour_cap: DEFAULT_DAILY_HOUR_CAP,
        }
    }
}

/// The attributes of one candidate the rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateProfile {
    /// Part position.
    pub part: usize,
    /// Interned parent course.
    pub course: usize,
    /// Interned (program, period); `None` when either is missing.
    pub curriculum: Option<usize>,
    pub professor: usize,
    pub room: usize,
    pub slot: usize,
    pub weekday: u8,
    pub hour: usize,
    /// Hours carried by the part.
    pub hours: u32,
}

/// Returns the first rule making `a` and `b` mutually exclusive.
///
/// Symmetric in its arguments. Callers never pass the same candidate twice.
pub fn evaluate_pair(
    a: &CandidateProfile,
    b: &CandidateProfile,
    settings: &RuleSettings,
) -> Option<ConflictRule> {
    if a.part == b.part {
        return Some(ConflictRule::Identity);
    }

    let same_slot = a.slot == b.slot;
    let same_professor = a.professor == b.professor;
    let same_course = a.course == b.course;

    if same_professor && same_slot {
        return Some(ConflictRule::ProfessorClash);
    }
    if a.room == b.room && same_slot {
        return Some(ConflictRule::RoomClash);
    }
    if same_slot && !same_course && a.curriculum.is_some() && a.curriculum == b.curriculum {
        return Some(ConflictRule::CurriculumClash);
    }

    let same_day = a.weekday == b.weekday;
    if same_professor && same_day && a.hours + b.hours > settings.daily_hour_cap {
        return Some(ConflictRule::DailyWorkload);
    }
    if same_course && same_day && a.hour.abs_diff(b.hour) == 1 {
        return Some(ConflictRule::Adjacency);
    }
    if settings.strict_mode && same_course && a.room != b.room {
        return Some(ConflictRule::StrictRoom);
    }

    None
}

/// Builds the [`ConflictGraph`] of a candidate graph.
pub struct ConflictBuilder<'a> {
    graph: &'a CandidateGraph,
    settings: RuleSettings,
}

impl<'a> ConflictBuilder<'a> {
    /// Creates a builder with default settings (strict, cap 8).
    pub fn new(graph: &'a CandidateGraph) -> Self {
        Self {
            graph,
            settings: RuleSettings::default(),
        }
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.settings.strict_mode = strict;
        self
    }

    pub fn with_daily_hour_cap(mut self, cap: u32) -> Self {
        self.settings.daily_hour_cap = cap;
        self
    }

    /// Replaces all settings at once.
    pub fn with_settings(mut self, settings: RuleSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Reduces every candidate to its profile, in candidate-index order.
    pub fn profiles(&self) -> Result<Vec<CandidateProfile>> {
        let mut courses: HashMap<&str, usize> = HashMap::new();
        let mut curricula: HashMap<(&str, u32), usize> = HashMap::new();
        let mut profiles = Vec::with_capacity(self.graph.candidate_count());

        for cand in self.graph.candidates() {
            let part = self.graph.part(cand.part_node)?;
            let slot = self.graph.slot(cand.slot)?;

            let next = courses.len();
            let course = *courses.entry(part.course_id.as_str()).or_insert(next);

            let program = part.program.trim();
            let curriculum = match part.period {
                Some(period) if !program.is_empty() => {
                    let next = curricula.len();
                    Some(*curricula.entry((program, period)).or_insert(next))
                }
                _ => None,
            };

            profiles.push(CandidateProfile {
                part: cand.part,
                course,
                curriculum,
                professor: cand.professor.index(),
                room: cand.room.index(),
                slot: cand.slot.index(),
                weekday: slot.weekday,
                hour: slot.hour,
                hours: part.hours,
            });
        }

        Ok(profiles)
    }

    /// Evaluates every unordered candidate pair.
    pub fn build(&self) -> Result<ConflictGraph> {
        let started = Instant::now();
        let profiles = self.profiles()?;
        let n = profiles.len();

        info!(
            event = "conflict_build_start",
            candidates = n,
            strict_mode = self.settings.strict_mode,
            daily_hour_cap = self.settings.daily_hour_cap,
        );

        let mut conflicts = ConflictGraph::with_candidates(n);
        conflicts.settings = self.settings;
        for i in 0..n {
            for j in (i + 1)..n {
                conflicts.pairs_evaluated += 1;
                if let Some(rule) = evaluate_pair(&profiles[i], &profiles[j], &self.settings) {
                    conflicts.insert(i, j, rule);
                }
            }
        }

        for rule in ConflictRule::ALL {
            debug!(
                event = "conflict_rule_count",
                rule = rule.name(),
                edges = conflicts.rule_count(rule),
            );
        }
        info!(
            event = "conflict_build_end",
            pairs_evaluated = conflicts.pairs_evaluated,
            edges = conflicts.edge_count(),
            duration_ms = started.elapsed().as_millis() as u64,
        );

        Ok(conflicts)
    }
}

/// Symmetric, irreflexive conflict relation indexed by candidate index.
#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    adjacency: Vec<HashSet<usize>>,
    edges: usize,
    pairs_evaluated: u64,
    rule_counts: [usize; 7],
    settings: RuleSettings,
}

impl ConflictGraph {
    /// An edgeless relation over `n` candidates, tagged with default settings.
    pub fn with_candidates(n: usize) -> Self {
        Self {
            adjacency: vec![HashSet::new(); n],
            ..Self::default()
        }
    }

    /// Settings the relation was built with.
    pub fn settings(&self) -> RuleSettings {
        self.settings
    }

    /// Adds an edge; self-loops and repeated pairs are ignored.
    pub fn insert(&mut self, a: usize, b: usize, rule: ConflictRule) {
        if a == b || a >= self.adjacency.len() || b >= self.adjacency.len() {
            return;
        }
        if self.adjacency[a].insert(b) {
            self.adjacency[b].insert(a);
            self.edges += 1;
            self.rule_counts[rule.index()] += 1;
        }
    }

    /// Whether two candidates conflict.
    #[inline]
    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.adjacency.get(a).is_some_and(|n| n.contains(&b))
    }

    /// Candidates conflicting with `a`, in no particular order.
    pub fn neighbors(&self, a: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(a).into_iter().flatten().copied()
    }

    pub fn degree(&self, a: usize) -> usize {
        self.adjacency.get(a).map_or(0, HashSet::len)
    }

    pub fn candidate_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Unordered pairs examined by the builder.
    pub fn pairs_evaluated(&self) -> u64 {
        self.pairs_evaluated
    }

    /// Edges attributed to one rule.
    pub fn rule_count(&self, rule: ConflictRule) -> usize {
        self.rule_counts[rule.index()]
    }
}
