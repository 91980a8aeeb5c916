//! Control flow graph.
//!
//! Flow nodes live in a per-file arena and point backwards: every node names
//! its antecedents, so the graph is walked from a reference towards the start
//! of its container. Labels join several antecedents; everything else has
//! exactly one.
//!
//! Two sentinels sit at fixed indices. `UNREACHABLE` marks code after a
//! jump; once a statement there has been reported the binder switches to
//! `REPORTED_UNREACHABLE` so the rest of the region is not reported again.

use serde::Serialize;
use tsbind_ast::types::{FlowFlags, FlowNodeId, NodeId};
use tsbind_core::FxHashSet;

/// One node of the control flow graph.
#[derive(Debug, Clone, Serialize)]
pub struct FlowNode {
    pub flags: FlowFlags,
    pub kind: FlowNodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FlowNodeKind {
    Unreachable,
    /// Entry of a container. `container` is set for function expressions,
    /// arrows and object-literal or class-expression methods.
    Start { container: Option<NodeId> },
    BranchLabel { antecedents: Vec<FlowNodeId> },
    LoopLabel { antecedents: Vec<FlowNodeId> },
    Assignment { node: NodeId, antecedent: FlowNodeId },
    Condition { node: NodeId, antecedent: FlowNodeId },
    ArrayMutation { node: NodeId, antecedent: FlowNodeId },
    Call { node: NodeId, antecedent: FlowNodeId },
    /// A `case` range of a switch. `clause_start == clause_end` stands for
    /// the implicit default.
    SwitchClause {
        switch_statement: NodeId,
        clause_start: usize,
        clause_end: usize,
        antecedent: FlowNodeId,
    },
    /// Temporarily narrows the antecedents of `target` while analysis walks
    /// back through a finally block.
    ReduceLabel {
        target: FlowNodeId,
        antecedents: Vec<FlowNodeId>,
        antecedent: FlowNodeId,
    },
}

impl FlowNode {
    /// The single predecessor of a non-label node.
    pub fn antecedent(&self) -> Option<FlowNodeId> {
        match &self.kind {
            FlowNodeKind::Assignment { antecedent, .. }
            | FlowNodeKind::Condition { antecedent, .. }
            | FlowNodeKind::ArrayMutation { antecedent, .. }
            | FlowNodeKind::Call { antecedent, .. }
            | FlowNodeKind::SwitchClause { antecedent, .. }
            | FlowNodeKind::ReduceLabel { antecedent, .. } => Some(*antecedent),
            _ => None,
        }
    }

    /// The predecessors of a label.
    pub fn antecedents(&self) -> &[FlowNodeId] {
        match &self.kind {
            FlowNodeKind::BranchLabel { antecedents } | FlowNodeKind::LoopLabel { antecedents } => antecedents,
            _ => &[],
        }
    }

    /// The AST node this flow node records, if any.
    pub fn node(&self) -> Option<NodeId> {
        match &self.kind {
            FlowNodeKind::Assignment { node, .. }
            | FlowNodeKind::Condition { node, .. }
            | FlowNodeKind::ArrayMutation { node, .. }
            | FlowNodeKind::Call { node, .. } => Some(*node),
            FlowNodeKind::SwitchClause { switch_statement, .. } => Some(*switch_statement),
            FlowNodeKind::Start { container } => *container,
            _ => None,
        }
    }

    #[inline]
    pub fn is_unreachable(&self) -> bool {
        self.flags.contains(FlowFlags::UNREACHABLE)
    }
}

/// Arena of flow nodes for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowGraph {
    pub const UNREACHABLE: FlowNodeId = FlowNodeId(0);
    pub const REPORTED_UNREACHABLE: FlowNodeId = FlowNodeId(1);

    pub fn new() -> Self {
        let sentinel = FlowNode {
            flags: FlowFlags::UNREACHABLE,
            kind: FlowNodeKind::Unreachable,
        };
        Self {
            nodes: vec![sentinel.clone(), sentinel],
        }
    }

    pub fn get(&self, id: FlowNodeId) -> &FlowNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowNodeId, &FlowNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (FlowNodeId::from_index(i), node))
    }

    #[inline]
    pub fn is_unreachable(&self, id: FlowNodeId) -> bool {
        self.get(id).is_unreachable()
    }

    fn is_sentinel(id: FlowNodeId) -> bool {
        id == Self::UNREACHABLE || id == Self::REPORTED_UNREACHABLE
    }

    pub(crate) fn alloc(&mut self, flags: FlowFlags, kind: FlowNodeKind) -> FlowNodeId {
        let id = FlowNodeId::from_index(self.nodes.len());
        self.nodes.push(FlowNode { flags, kind });
        id
    }

    pub(crate) fn create_start(&mut self, container: Option<NodeId>) -> FlowNodeId {
        self.alloc(FlowFlags::START, FlowNodeKind::Start { container })
    }

    pub(crate) fn create_branch_label(&mut self) -> FlowNodeId {
        self.alloc(
            FlowFlags::BRANCH_LABEL,
            FlowNodeKind::BranchLabel {
                antecedents: Vec::new(),
            },
        )
    }

    pub(crate) fn create_loop_label(&mut self) -> FlowNodeId {
        self.alloc(
            FlowFlags::LOOP_LABEL,
            FlowNodeKind::LoopLabel {
                antecedents: Vec::new(),
            },
        )
    }

    /// A branch label over a precomputed antecedent list. Duplicates are
    /// dropped; reference counts are left alone.
    pub(crate) fn create_branch_label_from(&mut self, antecedents: impl IntoIterator<Item = FlowNodeId>) -> FlowNodeId {
        let mut list: Vec<FlowNodeId> = Vec::new();
        for antecedent in antecedents {
            if !list.contains(&antecedent) {
                list.push(antecedent);
            }
        }
        self.alloc(FlowFlags::BRANCH_LABEL, FlowNodeKind::BranchLabel { antecedents: list })
    }

    pub(crate) fn create_reduce_label(
        &mut self,
        target: FlowNodeId,
        antecedents: Vec<FlowNodeId>,
        antecedent: FlowNodeId,
    ) -> FlowNodeId {
        self.alloc(
            FlowFlags::REDUCE_LABEL,
            FlowNodeKind::ReduceLabel {
                target,
                antecedents,
                antecedent,
            },
        )
    }

    /// Add `antecedent` to `label` unless it is unreachable or already there.
    pub(crate) fn add_antecedent(&mut self, label: FlowNodeId, antecedent: FlowNodeId) {
        if self.is_unreachable(antecedent) {
            return;
        }
        let added = match &mut self.nodes[label.index()].kind {
            FlowNodeKind::BranchLabel { antecedents } | FlowNodeKind::LoopLabel { antecedents } => {
                if antecedents.contains(&antecedent) {
                    false
                } else {
                    antecedents.push(antecedent);
                    true
                }
            }
            _ => false,
        };
        if added {
            self.set_referenced(antecedent);
        }
    }

    /// Collapse a branch label: no antecedents makes it unreachable, a
    /// single antecedent is used directly.
    pub(crate) fn finish_label(&mut self, label: FlowNodeId) -> FlowNodeId {
        match self.get(label).antecedents() {
            [] => Self::UNREACHABLE,
            [only] => *only,
            _ => label,
        }
    }

    /// Count a reference; a second reference marks the node shared.
    pub(crate) fn set_referenced(&mut self, id: FlowNodeId) {
        if Self::is_sentinel(id) {
            return;
        }
        let flags = &mut self.nodes[id.index()].flags;
        if flags.contains(FlowFlags::REFERENCED) {
            flags.insert(FlowFlags::SHARED);
        }
        flags.insert(FlowFlags::REFERENCED);
    }

    pub(crate) fn antecedents_of(&self, label: FlowNodeId) -> Vec<FlowNodeId> {
        self.get(label).antecedents().to_vec()
    }

    /// Whether `target` is reachable by walking backwards from `from`.
    ///
    /// Reduce labels are walked through their regular antecedent.
    pub fn reaches(&self, from: FlowNodeId, target: FlowNodeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            let node = self.get(id);
            stack.extend(node.antecedents().iter().copied());
            stack.extend(node.antecedent());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_unreachable() {
        let graph = FlowGraph::new();
        assert!(graph.is_unreachable(FlowGraph::UNREACHABLE));
        assert!(graph.is_unreachable(FlowGraph::REPORTED_UNREACHABLE));
        assert_ne!(FlowGraph::UNREACHABLE, FlowGraph::REPORTED_UNREACHABLE);
    }

    #[test]
    fn test_finish_empty_label_is_unreachable() {
        let mut graph = FlowGraph::new();
        let label = graph.create_branch_label();
        graph.add_antecedent(label, FlowGraph::UNREACHABLE);
        assert_eq!(graph.finish_label(label), FlowGraph::UNREACHABLE);
    }

    #[test]
    fn test_finish_single_antecedent_collapses() {
        let mut graph = FlowGraph::new();
        let start = graph.create_start(None);
        let label = graph.create_branch_label();
        graph.add_antecedent(label, start);
        assert_eq!(graph.finish_label(label), start);
    }

    #[test]
    fn test_add_antecedent_deduplicates_and_marks_shared() {
        let mut graph = FlowGraph::new();
        let start = graph.create_start(None);
        let a = graph.create_branch_label();
        let b = graph.create_branch_label();
        graph.add_antecedent(a, start);
        graph.add_antecedent(a, start);
        assert_eq!(graph.get(a).antecedents(), &[start]);
        assert!(!graph.get(start).flags.contains(FlowFlags::SHARED));
        graph.add_antecedent(b, start);
        let flags = graph.get(start).flags;
        assert!(flags.contains(FlowFlags::REFERENCED | FlowFlags::SHARED), "Expected shared, got {:?}", flags);
        assert_eq!(graph.finish_label(a), start);
    }

    #[test]
    fn test_reaches_walks_labels() {
        let mut graph = FlowGraph::new();
        let start = graph.create_start(None);
        let other = graph.create_start(None);
        let label = graph.create_branch_label();
        graph.add_antecedent(label, start);
        graph.add_antecedent(label, other);
        assert!(graph.reaches(label, start));
        assert!(graph.reaches(label, other));
        assert!(!graph.reaches(start, other));
    }
}
