//! Depth-first dispatcher over expression-node kinds.
//!
//! Checks register a handler per [`ExprKind`] and walk argument subtrees
//! with caller-owned state. Kinds without a handler recurse by default, so
//! a detector only names the kinds it cares about.

use std::collections::HashMap;

use ir::{ExprKind, ExprNode};

/// Handler invoked once for each visited node of its kind. Returns whether
/// to descend into the node's children.
pub type KindHandler<'h, S> = Box<dyn FnMut(&ExprNode, &mut S) -> bool + 'h>;

/// Pre-order, depth-first walker dispatching on the closed node-kind tag.
///
/// # Example
/// ```
/// use engine::ExprWalker;
/// use ir::{ExprKind, ExprNode, Meta};
/// use serde_json::json;
///
/// let meta = Meta { file: "a.rb".into(), line: 1, column: 1 };
/// let arg = ExprNode::new(
///     ExprKind::Other,
///     json!(null),
///     vec![ExprNode::new(ExprKind::LocalVar, json!("password"), vec![], meta.clone())],
///     meta,
/// );
///
/// let mut found = false;
/// ExprWalker::new()
///     .on(ExprKind::LocalVar, |node: &ExprNode, found: &mut bool| {
///         if node.name() == Some("password") {
///             *found = true;
///         }
///         true
///     })
///     .walk(&arg, &mut found);
/// assert!(found);
/// ```
pub struct ExprWalker<'h, S> {
    handlers: HashMap<ExprKind, KindHandler<'h, S>>,
}

impl<'h, S> ExprWalker<'h, S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn on<F>(mut self, kind: ExprKind, handler: F) -> Self
    where
        F: FnMut(&ExprNode, &mut S) -> bool + 'h,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Visits `root` and its descendants depth-first, pre-order, each node
    /// exactly once. A handler returning false prunes that node's subtree
    /// only; children are visited in left-to-right order.
    pub fn walk(&mut self, root: &ExprNode, state: &mut S) {
        let descend = match self.handlers.get_mut(&root.kind) {
            Some(handler) => handler(root, state),
            None => true,
        };
        if descend {
            for child in &root.children {
                self.walk(child, state);
            }
        }
    }
}

impl<S> Default for ExprWalker<'_, S> {
    fn default() -> Self {
        Self::new()
    }
}
