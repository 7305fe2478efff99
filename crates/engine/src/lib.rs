//! Query engine over indexed call records.
//!
//! The tracker delivers one frozen sequence of [`ir::CallRecord`] per scan;
//! [`CallIndex::build`] derives read-only lookup structures from it once,
//! and checks then resolve any number of structured queries against the
//! index. The [`visitor`] module provides the depth-first expression
//! dispatcher checks use for local syntactic judgments, and [`checks`]
//! holds the check boundary plus the built-in weak-hash check.

pub mod checks;
pub mod index;
pub mod visitor;

pub use checks::{run_checks, Check, Confidence, Finding, ReportedCalls};
pub use index::{CallIndex, CallQuery, QueryDiagnostic, QueryOutcome, Selector, TargetFilter};
pub use visitor::ExprWalker;
