//! Multi-dimensional lookup over one scan's call records.
//!
//! The index buckets records by method and by target in a single pass and
//! keeps the distinct name sets so pattern queries resolve against names
//! instead of scanning every record. It is read-only after [`CallIndex::build`]
//! and holds borrowed views into the record slice, never copies.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use ir::CallRecord;
use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone)]
/// One dimension of a call query: a single identifier, a set of
/// identifiers, or a pattern expanded against the distinct-name sets.
pub enum Selector {
    Literal(String),
    AnyOf(Vec<String>),
    Pattern(Regex),
}

impl Selector {
    pub fn literal(name: impl Into<String>) -> Self {
        Selector::Literal(name.into())
    }

    pub fn any_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selector::AnyOf(names.into_iter().map(Into::into).collect())
    }

    pub fn pattern(pattern: Regex) -> Self {
        Selector::Pattern(pattern)
    }

    /// Tests a single stringified identifier against this selector.
    fn matches(&self, name: &str) -> bool {
        match self {
            Selector::Literal(literal) => literal == name,
            Selector::AnyOf(names) => names.iter().any(|n| n == name),
            Selector::Pattern(pattern) => pattern.is_match(name),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Receiver constraint of a query. [`TargetFilter::Any`] places no
/// constraint; [`TargetFilter::NoReceiver`] keeps only receiver-less calls,
/// which is distinct from not caring about the receiver.
pub enum TargetFilter {
    #[default]
    Any,
    NoReceiver,
    Is(Selector),
}

#[derive(Debug, Clone, Default)]
/// Transient request describing which records to retrieve. Constructed
/// fresh per query and never mutated by the index.
pub struct CallQuery {
    pub target: TargetFilter,
    pub method: Option<Selector>,
    /// Match the target against the first link of the receiver chain
    /// instead of the receiver itself.
    pub chained: bool,
    /// Include calls that are arguments of other indexed calls.
    pub nested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Diagnostic attached to a degenerate query. The index never logs or
/// aborts; the caller decides whether and how to surface this.
pub enum QueryDiagnostic {
    /// Neither a target nor a method was supplied on a non-chained query.
    MissingCriteria,
}

impl fmt::Display for QueryDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryDiagnostic::MissingCriteria => {
                write!(f, "call query supplied neither a target nor a method")
            }
        }
    }
}

#[derive(Debug, Default)]
/// Result of one query: matched records in index order plus an optional
/// diagnostic.
pub struct QueryOutcome<'a> {
    pub calls: Vec<&'a CallRecord>,
    pub diagnostic: Option<QueryDiagnostic>,
}

impl<'a> QueryOutcome<'a> {
    fn matched(calls: Vec<&'a CallRecord>) -> Self {
        Self {
            calls,
            diagnostic: None,
        }
    }

    fn invalid(diagnostic: QueryDiagnostic) -> Self {
        Self {
            calls: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Read-only lookup structures over one scan's call records.
pub struct CallIndex<'a> {
    calls_by_method: HashMap<&'a str, Vec<&'a CallRecord>>,
    calls_by_target: HashMap<&'a str, Vec<&'a CallRecord>>,
    /// Receiver-less calls, bucketed apart from named targets.
    no_target: Vec<&'a CallRecord>,
    /// Distinct name sets, ordered so pattern expansion is deterministic.
    methods: BTreeSet<&'a str>,
    targets: BTreeSet<&'a str>,
}

impl<'a> CallIndex<'a> {
    /// Indexes `records` in a single pass, preserving insertion order
    /// within every bucket.
    pub fn build(records: &'a [CallRecord]) -> Self {
        let mut index = CallIndex {
            calls_by_method: HashMap::new(),
            calls_by_target: HashMap::new(),
            no_target: Vec::new(),
            methods: BTreeSet::new(),
            targets: BTreeSet::new(),
        };

        for record in records {
            index.methods.insert(record.method.as_str());
            index
                .calls_by_method
                .entry(record.method.as_str())
                .or_default()
                .push(record);
            match record.target.as_deref() {
                Some(target) => {
                    index.targets.insert(target);
                    index
                        .calls_by_target
                        .entry(target)
                        .or_default()
                        .push(record);
                }
                None => index.no_target.push(record),
            }
        }

        debug!(
            records = records.len(),
            methods = index.methods.len(),
            targets = index.targets.len(),
            "call index built"
        );
        index
    }

    /// Resolves a structured query into the matching records, in index
    /// order. Pure with respect to index state and repeatable.
    ///
    /// Degenerate queries never abort: an unknown literal or a pattern
    /// matching no distinct name contributes an empty set, and a query
    /// naming no dimension at all returns empty calls with a
    /// [`QueryDiagnostic`] attached.
    pub fn find_calls(&self, query: &CallQuery) -> QueryOutcome<'a> {
        if query.chained {
            return QueryOutcome::matched(self.find_chain(query));
        }

        let calls = match (&query.target, &query.method) {
            // Both dimensions are literal arrays: look up the smaller side,
            // scan-filter by the larger. Internal heuristic only; the
            // observable result is the same either way.
            (
                TargetFilter::Is(target @ Selector::AnyOf(targets)),
                Some(method @ Selector::AnyOf(methods)),
            ) => {
                if targets.len() > methods.len() {
                    filter_by_target(self.calls_by_method(method), target)
                } else {
                    filter_by_method(self.calls_by_target(target), method)
                }
            }
            (TargetFilter::Is(target), Some(method)) => {
                filter_by_method(self.calls_by_target(target), method)
            }
            (TargetFilter::Is(target), None) => self.calls_by_target(target),
            (TargetFilter::NoReceiver, Some(method)) => self
                .calls_by_method(method)
                .into_iter()
                .filter(|call| call.target.is_none())
                .collect(),
            (TargetFilter::NoReceiver, None) => self.no_target.clone(),
            (TargetFilter::Any, Some(method)) => self.calls_by_method(method),
            (TargetFilter::Any, None) => {
                return QueryOutcome::invalid(QueryDiagnostic::MissingCriteria);
            }
        };

        // Calls that are arguments of other indexed calls are dropped unless
        // explicitly requested, so a check matching both a call and its
        // containing call reports it once.
        let calls = if query.nested {
            calls
        } else {
            filter_nested(calls)
        };

        QueryOutcome::matched(calls)
    }

    fn find_chain(&self, query: &CallQuery) -> Vec<&'a CallRecord> {
        let Some(method) = &query.method else {
            return Vec::new();
        };
        let calls = self.calls_by_method(method);

        match &query.target {
            TargetFilter::Any => calls
                .into_iter()
                .filter(|call| !call.chain.is_empty())
                .collect(),
            // Chain links are always identifiers; an explicit no-receiver
            // filter can never match a first link.
            TargetFilter::NoReceiver => Vec::new(),
            TargetFilter::Is(selector) => calls
                .into_iter()
                .filter(|call| {
                    call.chain
                        .first()
                        .is_some_and(|link| selector.matches(link))
                })
                .collect(),
        }
    }

    fn calls_by_method(&self, selector: &Selector) -> Vec<&'a CallRecord> {
        match selector {
            Selector::Literal(name) => self.method_bucket(name),
            Selector::AnyOf(names) => self.union_methods(names.iter().map(String::as_str)),
            Selector::Pattern(pattern) => {
                match resolve_pattern(&self.methods, pattern).as_slice() {
                    [] => Vec::new(),
                    [name] => self.method_bucket(name),
                    names => self.union_methods(names.iter().copied()),
                }
            }
        }
    }

    fn calls_by_target(&self, selector: &Selector) -> Vec<&'a CallRecord> {
        match selector {
            Selector::Literal(name) => self.target_bucket(name),
            Selector::AnyOf(names) => self.union_targets(names.iter().map(String::as_str)),
            Selector::Pattern(pattern) => {
                match resolve_pattern(&self.targets, pattern).as_slice() {
                    [] => Vec::new(),
                    [name] => self.target_bucket(name),
                    names => self.union_targets(names.iter().copied()),
                }
            }
        }
    }

    fn method_bucket(&self, name: &str) -> Vec<&'a CallRecord> {
        self.calls_by_method.get(name).cloned().unwrap_or_default()
    }

    fn target_bucket(&self, name: &str) -> Vec<&'a CallRecord> {
        self.calls_by_target.get(name).cloned().unwrap_or_default()
    }

    fn union_methods<'n>(&self, names: impl Iterator<Item = &'n str>) -> Vec<&'a CallRecord> {
        let mut calls = Vec::new();
        for name in names {
            if let Some(bucket) = self.calls_by_method.get(name) {
                calls.extend_from_slice(bucket);
            }
        }
        calls
    }

    fn union_targets<'n>(&self, names: impl Iterator<Item = &'n str>) -> Vec<&'a CallRecord> {
        let mut calls = Vec::new();
        for name in names {
            if let Some(bucket) = self.calls_by_target.get(name) {
                calls.extend_from_slice(bucket);
            }
        }
        calls
    }
}

/// Expands a pattern against a distinct-name set. The set is small compared
/// to the record sequence, so a selective pattern avoids a full scan.
fn resolve_pattern<'a>(names: &BTreeSet<&'a str>, pattern: &Regex) -> Vec<&'a str> {
    names
        .iter()
        .copied()
        .filter(|name| pattern.is_match(name))
        .collect()
}

fn filter_by_method<'a>(calls: Vec<&'a CallRecord>, selector: &Selector) -> Vec<&'a CallRecord> {
    match selector {
        Selector::AnyOf(names) => {
            let names: HashSet<&str> = names.iter().map(String::as_str).collect();
            calls
                .into_iter()
                .filter(|call| names.contains(call.method.as_str()))
                .collect()
        }
        _ => calls
            .into_iter()
            .filter(|call| selector.matches(&call.method))
            .collect(),
    }
}

fn filter_by_target<'a>(calls: Vec<&'a CallRecord>, selector: &Selector) -> Vec<&'a CallRecord> {
    match selector {
        Selector::AnyOf(names) => {
            let names: HashSet<&str> = names.iter().map(String::as_str).collect();
            calls
                .into_iter()
                .filter(|call| call.target.as_deref().is_some_and(|t| names.contains(t)))
                .collect()
        }
        _ => calls
            .into_iter()
            .filter(|call| call.target.as_deref().is_some_and(|t| selector.matches(t)))
            .collect(),
    }
}

fn filter_nested(calls: Vec<&CallRecord>) -> Vec<&CallRecord> {
    calls.into_iter().filter(|call| !call.nested).collect()
}
