//! Expression trees attached to call arguments.
//!
//! The index treats these as opaque; only the visitor cares about them, and
//! it dispatches purely on the closed [`ExprKind`] tag. Anything the tracker
//! cannot classify lands in [`ExprKind::Other`] and still traverses
//! normally.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::Meta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Closed classification of expression nodes.
pub enum ExprKind {
    /// A call sub-expression; the node value is the method name.
    Call,
    /// Instance-scoped variable reference.
    InstanceVar,
    /// Local variable reference.
    LocalVar,
    /// A literal value.
    Literal,
    /// Everything else: operators, constants, blocks, ...
    Other,
}

impl ExprKind {
    pub const ALL: [ExprKind; 5] = [
        ExprKind::Call,
        ExprKind::InstanceVar,
        ExprKind::LocalVar,
        ExprKind::Literal,
        ExprKind::Other,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One node of an argument expression tree.
pub struct ExprNode {
    pub kind: ExprKind,
    /// Value associated with the node (method name, variable name, literal).
    pub value: JsonValue,
    /// Node children in left-to-right source order.
    #[serde(default)]
    pub children: Vec<ExprNode>,
    /// Marker set by the tracker when the expression traces to user input.
    #[serde(default)]
    pub user_input: bool,
    /// Location metadata.
    pub meta: Meta,
}

impl ExprNode {
    pub fn new(kind: ExprKind, value: JsonValue, children: Vec<ExprNode>, meta: Meta) -> Self {
        Self {
            kind,
            value,
            children,
            user_input: false,
            meta,
        }
    }

    /// String form of the node value, when it has one.
    pub fn name(&self) -> Option<&str> {
        self.value.as_str()
    }
}
