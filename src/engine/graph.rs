//! Graph view of one workflow: reachability and configuration audit.

use super::error::Result;
use super::order::RelationOrder;
use super::ports::StatusLookup;
use super::transition::pick_initial;
use super::types::{Status, StatusId, StatusRelation, Workflow};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Bfs;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A configuration gap or contradiction found by [`WorkflowGraph::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConfigIssue {
    NoRelations,
    NoInitialEdge,
    MultipleInitialEdges { count: usize },
    DuplicateEdge { from: String, to: String },
    SelfLoop { status: String },
    DeadEnd { status: String },
    Unreachable { status: String },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRelations => write!(f, "workflow has no transitions; every status is allowed"),
            Self::NoInitialEdge => write!(f, "no transition is flagged initial"),
            Self::MultipleInitialEdges { count } => {
                write!(f, "{count} transitions are flagged initial; the first one wins")
            }
            Self::DuplicateEdge { from, to } => {
                write!(f, "transition {from} -> {to} is defined twice")
            }
            Self::SelfLoop { status } => {
                write!(f, "transition {status} -> {status} loops on itself")
            }
            Self::DeadEnd { status } => {
                write!(f, "'{status}' is not final but no transition leaves it")
            }
            Self::Unreachable { status } => {
                write!(f, "'{status}' cannot be reached from the initial status")
            }
        }
    }
}

pub struct WorkflowGraph {
    graph: DiGraphMap<StatusId, ()>,
    statuses: HashMap<StatusId, Status>,
    relations: Vec<StatusRelation>,
    initial: Option<StatusId>,
}

impl WorkflowGraph {
    /// Loads the relations of `workflow` and builds its graph.
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub fn build<L: StatusLookup>(
        lookup: &L,
        workflow: &Workflow,
        order: RelationOrder,
    ) -> Result<Self> {
        let relations = lookup.list_relations(workflow)?;
        Ok(Self::from_relations(relations, order))
    }

    /// Builds the graph from relations already loaded.
    #[must_use]
    pub fn from_relations(mut relations: Vec<StatusRelation>, order: RelationOrder) -> Self {
        order.apply(&mut relations);

        let mut graph = DiGraphMap::new();
        let mut statuses = HashMap::new();
        for relation in &relations {
            let to = relation.to_status.id;
            graph.add_node(to);
            statuses.insert(to, relation.to_status.clone());
            if let Some(from) = &relation.from_status {
                graph.add_node(from.id);
                statuses.insert(from.id, from.clone());
                if from.id != to {
                    graph.add_edge(from.id, to, ());
                }
            }
        }

        let initial = pick_initial(&relations).map(|s| s.id);
        Self {
            graph,
            statuses,
            relations,
            initial,
        }
    }

    /// The status a new item starts in, if the workflow yields one.
    #[must_use]
    pub fn initial_status(&self) -> Option<&Status> {
        self.initial.and_then(|id| self.statuses.get(&id))
    }

    /// Statuses directly reachable from `status`, in sort order.
    #[must_use]
    pub fn successors(&self, status: &Status) -> Vec<&Status> {
        if !self.graph.contains_node(status.id) {
            return Vec::new();
        }
        let mut next: Vec<_> = self
            .graph
            .neighbors_directed(status.id, Direction::Outgoing)
            .filter_map(|id| self.statuses.get(&id))
            .collect();
        sort_statuses(&mut next);
        next
    }

    /// Statuses reachable from the initial status or any entry edge.
    #[must_use]
    pub fn reachable(&self) -> Vec<&Status> {
        let seen = self.reachable_ids();
        let mut reached: Vec<_> = seen.iter().filter_map(|id| self.statuses.get(id)).collect();
        sort_statuses(&mut reached);
        reached
    }

    /// Every status used by the workflow, in sort order.
    #[must_use]
    pub fn statuses(&self) -> Vec<&Status> {
        let mut all: Vec<_> = self.statuses.values().collect();
        sort_statuses(&mut all);
        all
    }

    /// Reports configuration gaps. An empty result means the workflow is
    /// fully specified.
    #[must_use]
    pub fn audit(&self) -> Vec<ConfigIssue> {
        if self.relations.is_empty() {
            return vec![ConfigIssue::NoRelations];
        }

        let mut issues = Vec::new();
        match self.relations.iter().filter(|r| r.initial_status).count() {
            0 => issues.push(ConfigIssue::NoInitialEdge),
            1 => {}
            count => issues.push(ConfigIssue::MultipleInitialEdges { count }),
        }

        let mut edges = HashSet::new();
        for relation in &self.relations {
            let from = relation.from_status.as_ref();
            if from.is_some_and(|f| f.same_as(&relation.to_status)) {
                issues.push(ConfigIssue::SelfLoop {
                    status: relation.to_status.name.clone(),
                });
                continue;
            }
            if !edges.insert((from.map(|f| f.id), relation.to_status.id)) {
                issues.push(ConfigIssue::DuplicateEdge {
                    from: from.map_or_else(|| "(entry)".to_string(), |f| f.name.clone()),
                    to: relation.to_status.name.clone(),
                });
            }
        }

        let reached = self.reachable_ids();
        for status in self.statuses() {
            let leaves = self
                .graph
                .neighbors_directed(status.id, Direction::Outgoing)
                .next()
                .is_some();
            if !status.is_final && !leaves {
                issues.push(ConfigIssue::DeadEnd {
                    status: status.name.clone(),
                });
            }
            if !reached.contains(&status.id) {
                issues.push(ConfigIssue::Unreachable {
                    status: status.name.clone(),
                });
            }
        }

        issues
    }

    fn reachable_ids(&self) -> HashSet<StatusId> {
        let roots = self.initial.into_iter().chain(
            self.relations
                .iter()
                .filter(|r| r.is_entry())
                .map(|r| r.to_status.id),
        );

        let mut seen = HashSet::new();
        for root in roots {
            if seen.contains(&root) {
                continue;
            }
            let mut bfs = Bfs::new(&self.graph, root);
            while let Some(id) = bfs.next(&self.graph) {
                seen.insert(id);
            }
        }
        seen
    }
}

fn sort_statuses(statuses: &mut [&Status]) {
    statuses.sort_by_key(|s| (s.sort_order, s.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::fixtures::{edge, status};

    fn linear() -> (Vec<Status>, Vec<StatusRelation>) {
        let todo = status(1, "To Do");
        let doing = status(2, "In Progress");
        let mut done = status(3, "Done");
        done.is_final = true;
        let relations = vec![
            edge(1, None, &todo, true),
            edge(2, Some(&todo), &doing, false),
            edge(3, Some(&doing), &done, false),
        ];
        (vec![todo, doing, done], relations)
    }

    fn names(statuses: &[&Status]) -> Vec<String> {
        statuses.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_clean_workflow_has_no_issues() {
        let (_, relations) = linear();
        let graph = WorkflowGraph::from_relations(relations, RelationOrder::Sequence);
        assert!(graph.audit().is_empty());
        assert_eq!(graph.initial_status().map(|s| s.name.as_str()), Some("To Do"));
        assert_eq!(names(&graph.reachable()), ["To Do", "In Progress", "Done"]);
    }

    #[test]
    fn test_successors() {
        let (statuses, relations) = linear();
        let graph = WorkflowGraph::from_relations(relations, RelationOrder::Sequence);
        assert_eq!(names(&graph.successors(&statuses[0])), ["In Progress"]);
        assert!(graph.successors(&statuses[2]).is_empty());
        assert!(graph.successors(&status(99, "Other")).is_empty());
    }

    #[test]
    fn test_empty_workflow() {
        let graph = WorkflowGraph::from_relations(vec![], RelationOrder::Sequence);
        assert_eq!(graph.audit(), [ConfigIssue::NoRelations]);
        assert!(graph.initial_status().is_none());
    }

    #[test]
    fn test_dead_end_and_missing_initial() {
        let a = status(1, "A");
        let b = status(2, "B");
        let graph = WorkflowGraph::from_relations(
            vec![edge(1, Some(&a), &b, false)],
            RelationOrder::Sequence,
        );
        let issues = graph.audit();
        assert!(issues.contains(&ConfigIssue::NoInitialEdge));
        assert!(issues.contains(&ConfigIssue::DeadEnd {
            status: "B".to_string()
        }));
        assert!(!issues.iter().any(|i| matches!(i, ConfigIssue::Unreachable { .. })));
    }

    #[test]
    fn test_unreachable_status() {
        let (mut statuses, mut relations) = linear();
        let mut orphan = status(4, "Blocked");
        orphan.is_final = true;
        relations.push(edge(4, Some(&orphan), &statuses[2], false));
        statuses.push(orphan);

        let graph = WorkflowGraph::from_relations(relations, RelationOrder::Sequence);
        assert_eq!(
            graph.audit(),
            [ConfigIssue::Unreachable {
                status: "Blocked".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicates_self_loops_and_initial_flags() {
        let a = status(1, "A");
        let mut b = status(2, "B");
        b.is_final = true;
        let relations = vec![
            edge(1, None, &a, true),
            edge(2, None, &b, true),
            edge(3, Some(&a), &b, false),
            edge(4, Some(&a), &b, false),
            edge(5, Some(&a), &a, false),
        ];
        let issues = WorkflowGraph::from_relations(relations, RelationOrder::Sequence).audit();
        assert_eq!(
            issues,
            [
                ConfigIssue::MultipleInitialEdges { count: 2 },
                ConfigIssue::DuplicateEdge {
                    from: "A".to_string(),
                    to: "B".to_string()
                },
                ConfigIssue::SelfLoop {
                    status: "A".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_issue_messages() {
        let issue = ConfigIssue::DeadEnd {
            status: "Review".to_string(),
        };
        assert_eq!(issue.to_string(), "'Review' is not final but no transition leaves it");
        let json = serde_json::to_string(&ConfigIssue::NoInitialEdge).unwrap();
        assert_eq!(json, r#"{"issue":"no_initial_edge"}"#);
    }
}
