//! Data model for the callprobe query engine.
//!
//! The upstream tracker walks each parsed file and flattens every call site
//! into an immutable [`CallRecord`]. Argument expressions keep their tree
//! shape as [`ExprNode`] values (module [`expr`]) so checks can make local
//! syntactic judgments without re-parsing. Both share the [`Meta`]
//! structure for location data.

pub mod expr;

use serde::{Deserialize, Serialize};

pub use expr::{ExprKind, ExprNode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Location metadata shared by call records and expression nodes.
pub struct Meta {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

/// Generates a stable identifier by combining file, position and name.
///
/// It uses a simple FNV mix and a bitwise combination of line and column to
/// avoid external dependencies.
pub fn stable_id(file: &str, line: usize, column: usize, name: &str) -> usize {
    let mut h: u64 = 0xcbf29ce484222325; // offset basis
    for b in file.as_bytes().iter().chain(name.as_bytes()) {
        h ^= *b as u64;
        h = h.wrapping_mul(0x100000001b3); // FNV prime
    }
    h ^= ((line as u64) << 32) | column as u64;
    h as usize
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One indexed call site, produced by the tracker and never mutated after.
pub struct CallRecord {
    /// Stable identifier of the record within a scan.
    #[serde(default)]
    pub id: usize,
    /// Method name; never empty.
    pub method: String,
    /// Receiver identifier. `None` marks a receiver-less call, which is
    /// distinct from a query that does not care about the receiver.
    #[serde(default)]
    pub target: Option<String>,
    /// Ordered argument expressions.
    #[serde(default)]
    pub arguments: Vec<ExprNode>,
    /// Receiver chain leading to this call; empty when the call is not
    /// part of a chain.
    #[serde(default)]
    pub chain: Vec<String>,
    /// True when the call occurs as a sub-expression or argument of
    /// another indexed call. Computed by the tracker.
    #[serde(default)]
    pub nested: bool,
    /// Location metadata.
    pub meta: Meta,
}

impl CallRecord {
    /// Returns the argument at `idx`, if present.
    pub fn arg(&self, idx: usize) -> Option<&ExprNode> {
        self.arguments.get(idx)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Call records extracted from a single processed file.
pub struct FileCalls {
    pub file_path: String,
    pub file_type: String, // ruby|python|...
    pub records: Vec<CallRecord>,
}

impl FileCalls {
    /// Creates a new empty instance for the specified file.
    ///
    /// # Example
    /// ```
    /// use ir::{CallRecord, FileCalls, Meta};
    /// let mut calls = FileCalls::new("a.rb".into(), "ruby".into());
    /// calls.push(CallRecord {
    ///     id: 0,
    ///     method: "digest".into(),
    ///     target: Some("Digest::MD5".into()),
    ///     arguments: vec![],
    ///     chain: vec![],
    ///     nested: false,
    ///     meta: Meta { file: "a.rb".into(), line: 1, column: 1 },
    /// });
    /// assert_eq!(calls.records.len(), 1);
    /// assert_ne!(calls.records[0].id, 0);
    /// ```
    pub fn new(file_path: String, file_type: String) -> Self {
        Self {
            file_path,
            file_type,
            records: Vec::new(),
        }
    }

    /// Adds a record, assigning a stable id when the producer left it at zero.
    pub fn push(&mut self, mut record: CallRecord) {
        if record.id == 0 {
            record.id = stable_id(
                &self.file_path,
                record.meta.line,
                record.meta.column,
                &record.method,
            );
        }
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests;
