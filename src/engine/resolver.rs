//! Reference resolver: matches human queries to statuses, workflows and items.
//!
//! A query is tried as a numeric id, then as an exact case-insensitive name,
//! then (unless strict) by fuzzy score against every candidate name.

use super::error::{EngineError, Result};
use super::repo::{ItemRepo, StatusRepo, WorkflowRepo};
use super::types::{ItemId, Scope, Status, StatusId, WorkItem, Workflow, WorkflowId};
use rusqlite::Connection;
use std::collections::HashSet;

const MIN_SCORE: f64 = 0.3;

#[derive(Debug)]
pub struct Resolved<T> {
    pub value: T,
    /// 1.0 for id and exact-name matches.
    pub confidence: f64,
}

impl<T> Resolved<T> {
    fn exact(value: T) -> Self {
        Self {
            value,
            confidence: 1.0,
        }
    }
}

pub struct Resolver<'a> {
    conn: &'a Connection,
    scope: &'a Scope,
    strict: bool,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection, scope: &'a Scope) -> Self {
        Self {
            conn,
            scope,
            strict: false,
        }
    }

    /// A resolver that only accepts ids and exact names.
    #[must_use]
    pub fn strict(conn: &'a Connection, scope: &'a Scope) -> Self {
        Self {
            conn,
            scope,
            strict: true,
        }
    }

    /// Resolves a status in the resolver's scope.
    ///
    /// # Errors
    /// `NotFound` when nothing matches, or the lookup error.
    pub fn status(&self, query: &str) -> Result<Resolved<Status>> {
        let repo = StatusRepo::new(self.conn);
        if let Ok(id) = query.parse::<i64>() {
            if let Some(status) = repo.find_by_id(StatusId(id))? {
                if status.scope == *self.scope {
                    return Ok(Resolved::exact(status));
                }
            }
        }
        if let Some(status) = repo.find_by_name(self.scope, query)? {
            return Ok(Resolved::exact(status));
        }
        self.fuzzy("Status", query, repo.list(self.scope)?, |s| s.name.as_str())
    }

    /// Resolves a workflow in the resolver's scope.
    ///
    /// # Errors
    /// `NotFound` when nothing matches, or the lookup error.
    pub fn workflow(&self, query: &str) -> Result<Resolved<Workflow>> {
        let repo = WorkflowRepo::new(self.conn);
        if let Ok(id) = query.parse::<i64>() {
            if let Some(workflow) = repo.find_by_id(WorkflowId(id))? {
                if workflow.scope == *self.scope {
                    return Ok(Resolved::exact(workflow));
                }
            }
        }
        if let Some(workflow) = repo.find_by_name(self.scope, query)? {
            return Ok(Resolved::exact(workflow));
        }
        self.fuzzy("Workflow", query, repo.list(Some(self.scope))?, |w| w.name.as_str())
    }

    /// Resolves a work item in the resolver's scope. `#12` and `12` both
    /// mean id 12.
    ///
    /// # Errors
    /// `NotFound` when nothing matches, or the lookup error.
    pub fn item(&self, query: &str) -> Result<Resolved<WorkItem>> {
        let repo = ItemRepo::new(self.conn);
        if let Ok(id) = query.trim_start_matches('#').parse::<i64>() {
            if let Some(item) = repo.find_by_id(ItemId(id))? {
                if item.scope == *self.scope {
                    return Ok(Resolved::exact(item));
                }
            }
        }
        if let Some(item) = repo.find_by_name(self.scope, query)? {
            return Ok(Resolved::exact(item));
        }
        self.fuzzy("Item", query, repo.list(Some(self.scope))?, |i| i.name.as_str())
    }

    fn fuzzy<T>(
        &self,
        kind: &'static str,
        query: &str,
        candidates: Vec<T>,
        name: impl Fn(&T) -> &str,
    ) -> Result<Resolved<T>> {
        if self.strict {
            return Err(EngineError::not_found(kind, query));
        }

        let query_lower = query.to_lowercase();
        let words: Vec<_> = query_lower.split_whitespace().collect();

        let mut best: Option<(f64, T)> = None;
        for candidate in candidates {
            let score = calculate_score(name(&candidate), &query_lower, &words);
            if score > MIN_SCORE && best.as_ref().map_or(true, |(b, _)| score > *b) {
                best = Some((score, candidate));
            }
        }

        let (confidence, value) = best.ok_or_else(|| EngineError::not_found(kind, query))?;
        tracing::debug!(kind, query, confidence, "fuzzy match");
        Ok(Resolved { value, confidence })
    }
}

/// Calculates a match score between a candidate name and a query.
fn calculate_score(name: &str, query: &str, query_words: &[&str]) -> f64 {
    let name_lower = name.to_lowercase();
    let mut score = 0.0;

    if name_lower.contains(query) {
        score += 0.7;
    }
    for word in query_words {
        if name_lower.contains(word) {
            score += 0.25;
        }
    }
    if name_lower.starts_with(query) {
        score += 0.5;
    }
    score += string_similarity(&name_lower, query) * 0.4;

    score.min(1.0)
}

#[allow(clippy::cast_precision_loss)]
fn string_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: HashSet<char> = a.chars().collect();
    let b_chars: HashSet<char> = b.chars().collect();

    let intersection = a_chars.intersection(&b_chars).count();
    let union = a_chars.union(&b_chars).count();

    intersection as f64 / union as f64
}
