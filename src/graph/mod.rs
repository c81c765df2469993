//! Multilayer candidate graph.
//!
//! Builds a heterogeneous graph with four node layers (course parts,
//! professors, rooms, slots) and feasibility edges from each part to the
//! resources it may use, then expands those edges into atomic assignment
//! candidates per part.
//!
//! # Edge Rules
//! - Part ↔ Professor: the professor is qualified for the parent course.
//! - Part ↔ Room: always.
//! - Part ↔ Slot: always, except that mandatory courses of the night program
//!   only connect to night-band slots. Each slot edge records whether it is a
//!   preferred (elective, night) placement; the flag is never enforced.
//!
//! # Candidate Order
//! Within a part's domain candidates are generated professor-major,
//! room-mid, slot-minor, following layer insertion order. The solver keeps
//! this order.

mod node;

pub use node::{Edge, Layer, Node, PartNode, ProfessorNode, RoomNode, SlotNode};

use std::collections::HashSet;
use std::time::Instant;

use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use tracing::info;

use crate::error::{Result, TimetableError};
use crate::models::{Assignment, Calendar, Catalog, CourseKind, Schedule};

/// One concrete (part, professor, room, slot) assignment option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// `assign_{part}__prof_{p}__room_{r}__slot_{s}`; equal tuples give
    /// equal ids.
    pub id: String,
    /// Position of the part in the graph's part list.
    pub part: usize,
    #[serde(skip)]
    pub part_node: NodeIndex,
    #[serde(skip)]
    pub professor: NodeIndex,
    #[serde(skip)]
    pub room: NodeIndex,
    #[serde(skip)]
    pub slot: NodeIndex,
}

/// Builds a [`CandidateGraph`] from a catalog and calendar.
///
/// # Example
/// ```
/// use u_timetable::graph::CandidateGraphBuilder;
/// use u_timetable::models::{Calendar, Catalog, Course, CourseKind, Professor, Room};
///
/// let course = Course::new("ALG_0", "ALG", "Algorithms", CourseKind::Mandatory, 2).unwrap();
/// let catalog = Catalog::new(
///     vec![course],
///     vec![Professor::new("P1", "Ada").with_course("ALG_0")],
///     vec![Room::new("R1", "Room 1")],
///     &Calendar::default(),
/// );
/// let graph = CandidateGraphBuilder::new(&catalog, &Calendar::default()).build().unwrap();
/// assert_eq!(graph.domain(0).len(), 30);
/// ```
pub struct CandidateGraphBuilder<'a> {
    catalog: &'a Catalog,
    calendar: &'a Calendar,
}

impl<'a> CandidateGraphBuilder<'a> {
    /// Creates a new builder.
    pub fn new(catalog: &'a Catalog, calendar: &'a Calendar) -> Self {
        Self { catalog, calendar }
    }

    /// Builds nodes, edges and candidates.
    ///
    /// # Errors
    /// [`TimetableError::EmptyDomain`] naming the first part without any
    /// candidate. Raised before any search begins.
    pub fn build(&self) -> Result<CandidateGraph> {
        let started = Instant::now();
        let mut graph = self.build_layers();
        graph.generate_candidates()?;

        info!(
            event = "candidate_graph_built",
            parts = graph.part_count(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            candidates = graph.candidate_count(),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        Ok(graph)
    }

    /// Builds the layered graph (nodes and feasibility edges) without
    /// generating candidates.
    pub fn build_layers(&self) -> CandidateGraph {
        let mut graph = UnGraph::<Node, Edge>::new_undirected();

        let parts: Vec<NodeIndex> = self
            .catalog
            .parts
            .iter()
            .map(|p| graph.add_node(Node::Part(PartNode::from(p))))
            .collect();
        let professors: Vec<NodeIndex> = self
            .catalog
            .professors
            .iter()
            .map(|p| graph.add_node(Node::Professor(ProfessorNode::from(p))))
            .collect();
        let rooms: Vec<NodeIndex> = self
            .catalog
            .rooms
            .iter()
            .map(|r| graph.add_node(Node::Room(RoomNode::from(r))))
            .collect();
        let slots: Vec<NodeIndex> = self
            .catalog
            .slots
            .iter()
            .map(|s| graph.add_node(Node::Slot(SlotNode::from(s))))
            .collect();

        for (part, &part_idx) in self.catalog.parts.iter().zip(&parts) {
            for (prof, &prof_idx) in self.catalog.professors.iter().zip(&professors) {
                if prof.is_qualified_for(part.course_id()) {
                    graph.add_edge(part_idx, prof_idx, Edge::Qualified);
                }
            }

            for &room_idx in &rooms {
                graph.add_edge(part_idx, room_idx, Edge::Hosts);
            }

            let night_only = part.kind() == CourseKind::Mandatory
                && self.calendar.is_night_program(part.program());
            for (slot, &slot_idx) in self.catalog.slots.iter().zip(&slots) {
                let night = self.calendar.is_night(slot.hour);
                if night_only && !night {
                    continue;
                }
                let preferred_elective = part.kind() == CourseKind::Elective && night;
                graph.add_edge(part_idx, slot_idx, Edge::Offered { preferred_elective });
            }
        }

        let domains = vec![Vec::new(); parts.len()];
        CandidateGraph {
            graph,
            parts,
            professors,
            rooms,
            slots,
            candidates: Vec::new(),
            domains,
        }
    }
}

/// The multilayer graph plus the candidate universe.
///
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct CandidateGraph {
    graph: UnGraph<Node, Edge>,
    parts: Vec<NodeIndex>,
    professors: Vec<NodeIndex>,
    rooms: Vec<NodeIndex>,
    slots: Vec<NodeIndex>,
    candidates: Vec<Candidate>,
    /// Candidate indices per part position.
    domains: Vec<Vec<usize>>,
}

impl CandidateGraph {
    /// Expands feasibility edges into candidates for every part.
    fn generate_candidates(&mut self) -> Result<()> {
        self.candidates.clear();
        for (position, &part_idx) in self.parts.iter().enumerate() {
            let neighbors: HashSet<NodeIndex> = self.graph.neighbors(part_idx).collect();
            let pick = |layer: &[NodeIndex]| -> Vec<NodeIndex> {
                layer
                    .iter()
                    .copied()
                    .filter(|idx| neighbors.contains(idx))
                    .collect()
            };
            let professors = pick(&self.professors);
            let rooms = pick(&self.rooms);
            let slots = pick(&self.slots);

            let part_id = self.part(part_idx)?.part_id.clone();
            let mut domain = Vec::with_capacity(professors.len() * rooms.len() * slots.len());
            for &professor in &professors {
                for &room in &rooms {
                    for &slot in &slots {
                        let id = format!(
                            "assign_{}__{}__{}__{}",
                            part_id,
                            self.graph[professor].key(),
                            self.graph[room].key(),
                            self.graph[slot].key(),
                        );
                        domain.push(self.candidates.len());
                        self.candidates.push(Candidate {
                            id,
                            part: position,
                            part_node: part_idx,
                            professor,
                            room,
                            slot,
                        });
                    }
                }
            }
            self.domains[position] = domain;
        }

        for (position, domain) in self.domains.iter().enumerate() {
            if domain.is_empty() {
                let part = self.part_at(position)?;
                return Err(TimetableError::EmptyDomain {
                    part_id: part.part_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Underlying petgraph graph (for visualization collaborators).
    pub fn inner(&self) -> &UnGraph<Node, Edge> {
        &self.graph
    }

    /// Node payload.
    pub fn node(&self, idx: NodeIndex) -> Result<&Node> {
        self.graph
            .node_weight(idx)
            .ok_or_else(|| TimetableError::Graph(format!("node {} does not exist", idx.index())))
    }

    /// Part node payload; errors on a different layer.
    pub fn part(&self, idx: NodeIndex) -> Result<&PartNode> {
        match self.node(idx)? {
            Node::Part(n) => Ok(n),
            other => Err(layer_mismatch(idx, Layer::Part, other)),
        }
    }

    /// Professor node payload; errors on a different layer.
    pub fn professor(&self, idx: NodeIndex) -> Result<&ProfessorNode> {
        match self.node(idx)? {
            Node::Professor(n) => Ok(n),
            other => Err(layer_mismatch(idx, Layer::Professor, other)),
        }
    }

    /// Room node payload; errors on a different layer.
    pub fn room(&self, idx: NodeIndex) -> Result<&RoomNode> {
        match self.node(idx)? {
            Node::Room(n) => Ok(n),
            other => Err(layer_mismatch(idx, Layer::Room, other)),
        }
    }

    /// Slot node payload; errors on a different layer.
    pub fn slot(&self, idx: NodeIndex) -> Result<&SlotNode> {
        match self.node(idx)? {
            Node::Slot(n) => Ok(n),
            other => Err(layer_mismatch(idx, Layer::Slot, other)),
        }
    }

    /// Part node by part position.
    pub fn part_at(&self, position: usize) -> Result<&PartNode> {
        let idx = self.parts.get(position).copied().ok_or_else(|| {
            TimetableError::Graph(format!("part position {position} out of range"))
        })?;
        self.part(idx)
    }

    /// Whether a feasibility edge connects two nodes.
    pub fn has_edge(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    /// Edge payload between two nodes.
    pub fn edge(&self, a: NodeIndex, b: NodeIndex) -> Option<&Edge> {
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
    }

    /// Part node indices, in part-position order.
    pub fn part_nodes(&self) -> &[NodeIndex] {
        &self.parts
    }

    pub fn professor_nodes(&self) -> &[NodeIndex] {
        &self.professors
    }

    pub fn room_nodes(&self) -> &[NodeIndex] {
        &self.rooms
    }

    pub fn slot_nodes(&self) -> &[NodeIndex] {
        &self.slots
    }

    /// All candidates, indexed by candidate index.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidate by index.
    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    /// Candidate indices of one part.
    pub fn domain(&self, part: usize) -> &[usize] {
        self.domains.get(part).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidate indices of every part.
    pub fn domains(&self) -> &[Vec<usize>] {
        &self.domains
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Builds the read-only schedule view for a set of chosen candidates.
    pub fn decode(&self, chosen: &[usize], gap_score: u64) -> Result<Schedule> {
        let mut schedule = Schedule::new();
        schedule.gap_score = gap_score;

        for &index in chosen {
            let cand = self.candidate(index).ok_or_else(|| {
                TimetableError::Graph(format!("candidate {index} does not exist"))
            })?;
            let part = self.part(cand.part_node)?;
            let prof = self.professor(cand.professor)?;
            let room = self.room(cand.room)?;
            let slot = self.slot(cand.slot)?;
            let preferred_elective = matches!(
                self.edge(cand.part_node, cand.slot),
                Some(Edge::Offered {
                    preferred_elective: true
                })
            );

            schedule.add_assignment(Assignment {
                candidate_id: cand.id.clone(),
                part_id: part.part_id.clone(),
                course_id: part.course_id.clone(),
                code: part.code.clone(),
                name: part.name.clone(),
                part: part.part,
                hours: part.hours,
                kind: part.kind,
                program: part.program.clone(),
                period: part.period,
                semester: part.semester,
                professor_id: prof.id.clone(),
                professor_name: prof.name.clone(),
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                slot_id: slot.id.clone(),
                weekday: slot.weekday,
                weekday_name: slot.weekday_name.clone(),
                hour: slot.hour,
                time_range: slot.time_range.clone(),
                preferred_elective,
            });
        }

        Ok(schedule)
    }
}

fn layer_mismatch(idx: NodeIndex, expected: Layer, found: &Node) -> TimetableError {
    TimetableError::Graph(format!(
        "node {} is in layer {:?}, expected {:?}",
        idx.index(),
        found.layer(),
        expected
    ))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::{Professor, Weekday};

    fn night_calendar() -> Calendar {
        Calendar::new(
            vec![Weekday::new(2, "Mon")],
            vec!["pre".into(), "a".into(), "b".into(), "c".into(), "post".into()],
        )
        .with_night_bands(vec![3])
        .with_night_program("SIN")
    }

    #[test]
    fn test_nodes_and_edges() {
        let cal = two_day_calendar();
        let cat = catalog(
            vec![course("A", CourseKind::Mandatory, 2, "CCO", 1)],
            vec![
                Professor::new("P1", "Ada").with_course("A"),
                Professor::new("P2", "Idle"),
            ],
            2,
            &cal,
        );
        let graph = CandidateGraphBuilder::new(&cat, &cal).build().unwrap();

        // 1 part + 2 profs + 2 rooms + 4 slots
        assert_eq!(graph.node_count(), 9);
        // 1 qualified + 2 rooms + 4 slots
        assert_eq!(graph.edge_count(), 7);
        assert_eq!(graph.candidate_count(), 8);
    }

    #[test]
    fn test_candidates_reference_existing_edges() {
        let cal = Calendar::default();
        let cat = catalog(
            vec![
                course("A", CourseKind::Mandatory, 4, "CCO", 1),
                course("B", CourseKind::Elective, 2, "OPT", 2),
                course("C", CourseKind::Mandatory, 2, "SIN", 3),
            ],
            vec![
                Professor::new("P1", "Ada").with_course("A").with_course("C"),
                Professor::new("P2", "Grace").with_course("B").with_course("A"),
            ],
            2,
            &cal,
        );
        let graph = CandidateGraphBuilder::new(&cat, &cal).build().unwrap();

        for cand in graph.candidates() {
            assert!(graph.part(cand.part_node).is_ok());
            assert!(graph.professor(cand.professor).is_ok());
            assert!(graph.room(cand.room).is_ok());
            assert!(graph.slot(cand.slot).is_ok());
            assert!(graph.has_edge(cand.part_node, cand.professor));
            assert!(graph.has_edge(cand.part_node, cand.room));
            assert!(graph.has_edge(cand.part_node, cand.slot));
            assert_eq!(graph.part_nodes()[cand.part], cand.part_node);
        }
        for part in 0..graph.part_count() {
            assert!(!graph.domain(part).is_empty());
        }
    }

    #[test]
    fn test_candidate_order_professor_major() {
        let cal = two_day_calendar();
        let cat = catalog(
            vec![course("A", CourseKind::Mandatory, 2, "CCO", 1)],
            vec![
                Professor::new("P1", "Ada").with_course("A"),
                Professor::new("P2", "Grace").with_course("A"),
            ],
            2,
            &cal,
        );
        let graph = CandidateGraphBuilder::new(&cat, &cal).build().unwrap();
        let ids: Vec<&str> = graph
            .domain(0)
            .iter()
            .map(|&i| graph.candidates()[i].id.as_str())
            .collect();
        assert_eq!(ids.len(), 16);
        assert_eq!(ids[0], "assign_A_p1__prof_P1__room_R1__slot_2_1");
        assert_eq!(ids[1], "assign_A_p1__prof_P1__room_R1__slot_2_2");
        assert_eq!(ids[4], "assign_A_p1__prof_P1__room_R2__slot_2_1");
        assert_eq!(ids[8], "assign_A_p1__prof_P2__room_R1__slot_2_1");
    }

    #[test]
    fn test_candidate_ids_deterministic() {
        let cal = Calendar::default();
        let make = || {
            let cat = catalog(
                vec![course("A", CourseKind::Mandatory, 4, "CCO", 1)],
                vec![Professor::new("P1", "Ada").with_course("A")],
                3,
                &cal,
            );
            CandidateGraphBuilder::new(&cat, &cal).build().unwrap()
        };
        let (g1, g2) = (make(), make());
        assert_eq!(g1.candidates(), g2.candidates());
        let unique: HashSet<&str> = g1.candidates().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(unique.len(), g1.candidate_count());
    }

    #[test]
    fn test_night_program_mandatory_restricted() {
        let cal = night_calendar();
        let cat = catalog(
            vec![
                course("N", CourseKind::Mandatory, 2, "sin", 1),
                course("E", CourseKind::Elective, 2, "SIN", 1),
                course("D", CourseKind::Mandatory, 2, "CCO", 1),
            ],
            vec![Professor::new("P1", "Ada")
                .with_course("N")
                .with_course("E")
                .with_course("D")],
            1,
            &cal,
        );
        let graph = CandidateGraphBuilder::new(&cat, &cal).build().unwrap();

        let hours_of = |part: usize| -> Vec<usize> {
            graph
                .domain(part)
                .iter()
                .map(|&i| graph.slot(graph.candidates()[i].slot).unwrap().hour)
                .collect()
        };
        assert_eq!(hours_of(0), vec![3]);
        assert_eq!(hours_of(1), vec![1, 2, 3]);
        assert_eq!(hours_of(2), vec![1, 2, 3]);
    }

    #[test]
    fn test_preferred_elective_flag() {
        let cal = night_calendar();
        let cat = catalog(
            vec![
                course("E", CourseKind::Elective, 2, "OPT", 1),
                course("D", CourseKind::Mandatory, 2, "CCO", 1),
            ],
            vec![Professor::new("P1", "Ada").with_course("E").with_course("D")],
            1,
            &cal,
        );
        let graph = CandidateGraphBuilder::new(&cat, &cal).build_layers();
        let elective = graph.part_nodes()[0];
        let mandatory = graph.part_nodes()[1];
        for &slot in graph.slot_nodes() {
            let hour = graph.slot(slot).unwrap().hour;
            assert_eq!(
                graph.edge(elective, slot),
                Some(&Edge::Offered {
                    preferred_elective: hour == 3
                })
            );
            assert_eq!(
                graph.edge(mandatory, slot),
                Some(&Edge::Offered {
                    preferred_elective: false
                })
            );
        }
    }

    #[test]
    fn test_empty_domain_names_part() {
        let cal = two_day_calendar();
        let cat = catalog(
            vec![
                course("A", CourseKind::Mandatory, 2, "CCO", 1),
                course("B", CourseKind::Mandatory, 4, "CCO", 1),
            ],
            vec![Professor::new("P1", "Ada").with_course("A")],
            1,
            &cal,
        );
        let err = CandidateGraphBuilder::new(&cat, &cal).build().unwrap_err();
        match err {
            TimetableError::EmptyDomain { part_id } => assert_eq!(part_id, "B_p1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_rooms_is_empty_domain() {
        let cal = two_day_calendar();
        let cat = catalog(
            vec![course("A", CourseKind::Mandatory, 2, "CCO", 1)],
            vec![Professor::new("P1", "Ada").with_course("A")],
            0,
            &cal,
        );
        assert!(matches!(
            CandidateGraphBuilder::new(&cat, &cal).build(),
            Err(TimetableError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn test_wrong_layer_lookup_errors() {
        let cal = two_day_calendar();
        let cat = catalog(
            vec![course("A", CourseKind::Mandatory, 2, "CCO", 1)],
            vec![Professor::new("P1", "Ada").with_course("A")],
            1,
            &cal,
        );
        let graph = CandidateGraphBuilder::new(&cat, &cal).build().unwrap();
        let part = graph.part_nodes()[0];
        assert!(matches!(graph.slot(part), Err(TimetableError::Graph(_))));
        assert!(graph.node(NodeIndex::new(999)).is_err());
        assert!(graph.part_at(5).is_err());
    }

    #[test]
    fn test_decode() {
        let cal = two_day_calendar();
        let cat = catalog(
            vec![course("A", CourseKind::Mandatory, 4, "CCO", 1)],
            vec![Professor::new("P1", "Ada").with_course("A")],
            1,
            &cal,
        );
        let graph = CandidateGraphBuilder::new(&cat, &cal).build().unwrap();
        let chosen = [graph.domain(0)[0], graph.domain(1)[3]];
        let schedule = graph.decode(&chosen, 7).unwrap();

        assert_eq!(schedule.gap_score, 7);
        assert_eq!(schedule.assignment_count(), 2);
        let first = &schedule.assignments[0];
        assert_eq!(first.part_id, "A_p1");
        assert_eq!(first.professor_name, "Ada");
        assert_eq!(first.room_id, "R1");
        assert_eq!(first.slot_id, "2_1");
        assert_eq!(first.weekday_name, "Mon");
        assert_eq!(first.time_range, "h1");
        let second = &schedule.assignments[1];
        assert_eq!(second.part, 2);
        assert_eq!(second.slot_id, "3_2");

        assert!(graph.decode(&[999], 0).is_err());
    }
}
