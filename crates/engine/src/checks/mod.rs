//! Check boundary: checks issue queries against the read-only index,
//! classify confidence locally and emit findings.
//!
//! The runner evaluates independent checks in parallel. That is safe
//! because the index is built to completion first and no query path writes
//! to it; every check owns its mutable state (dedup set, visitor state).

mod weak_hash;

use std::collections::HashSet;
use std::fmt;

use ir::{CallRecord, Meta};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::index::{CallIndex, CallQuery};

pub use weak_hash::WeakHash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// How certain a check is that a finding is a real problem.
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Result of a check matching one call record. Consumed by the reporting
/// layer outside this crate.
pub struct Finding {
    /// Check that produced the finding.
    pub check: String,
    /// Human-facing category, e.g. "Weak Hash".
    pub category: String,
    /// Stable machine code, e.g. "weak_hash_digest".
    pub code: String,
    /// Descriptive message of the problem.
    pub message: String,
    pub confidence: Confidence,
    /// Location of the matched call.
    pub evidence: Meta,
}

/// A vulnerability check evaluated against one scan's call index.
///
/// Queries and visitor walks are pure and repeatable; a check may issue any
/// number of them.
pub trait Check: Send {
    fn name(&self) -> &'static str;

    /// Runs the check to completion, returning its findings.
    fn run(&mut self, index: &CallIndex<'_>) -> Vec<Finding>;
}

#[derive(Debug, Default)]
/// Dedup set keyed by record identity, so overlapping queries within one
/// check report each call once.
pub struct ReportedCalls {
    seen: HashSet<usize>,
}

impl ReportedCalls {
    /// Marks `call` as reported; returns false when it already was.
    pub fn record(&mut self, call: &CallRecord) -> bool {
        self.seen.insert(call.id)
    }
}

/// Resolves `query` for `check`, surfacing any diagnostic on the warn
/// channel. The index itself never logs.
pub fn expect_calls<'a>(
    index: &CallIndex<'a>,
    query: &CallQuery,
    check: &str,
) -> Vec<&'a CallRecord> {
    let outcome = index.find_calls(query);
    if let Some(diagnostic) = outcome.diagnostic {
        warn!(check, %diagnostic, "call query rejected");
    }
    outcome.calls
}

/// Evaluates every check against the index and collects their findings in
/// check order.
pub fn run_checks(index: &CallIndex<'_>, checks: &mut [Box<dyn Check>]) -> Vec<Finding> {
    let findings: Vec<Finding> = checks
        .par_iter_mut()
        .flat_map(|check| {
            debug!(check = check.name(), "running check");
            let findings = check.run(index);
            debug!(
                check = check.name(),
                findings = findings.len(),
                "check completed"
            );
            findings
        })
        .collect();
    debug!(findings = findings.len(), "all checks completed");
    findings
}
