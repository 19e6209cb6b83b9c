//! MCTS tree node representation.
//!
//! Each node is a position reached by playing `action` from its parent.
//! Values are stored from the point of view of the player to move at the node.

use crate::board::Pos;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Move that led here; the previous real move for the root
    pub action: Pos,

    pub visit_count: u32,

    /// Sum of backed-up values. Q = value_sum / visit_count
    pub value_sum: f32,

    /// Prior assigned by the parent's policy call
    pub prior: f32,

    /// Set once the position is known to be decided
    pub terminal_value: Option<f32>,

    pub expanded: bool,

    /// (move, child) pairs in move order. Empty until expanded.
    pub children: Vec<(Pos, NodeId)>,
}

impl Default for MctsNode {
    fn default() -> Self {
        Self::new(NodeId::NONE, Pos::NONE, 1.0)
    }
}

impl MctsNode {
    pub fn new(parent: NodeId, action: Pos, prior: f32) -> Self {
        Self {
            parent,
            action,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            terminal_value: None,
            expanded: false,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal_value.is_some()
    }

    /// Mean value, 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// UCB score of this node seen from its parent.
    ///
    /// The child's Q is negated: a position bad for the child's mover is good
    /// for the parent's mover.
    #[inline]
    pub fn ucb_score(&self, parent_visits_sqrt: f32, c_puct: f32) -> f32 {
        let q = -self.mean_value();
        let u = c_puct * self.prior * parent_visits_sqrt / (1.0 + self.visit_count as f32);
        q + u
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_mean_value() {
        let mut node = MctsNode::new(NodeId(0), Pos::new(1, 1), 0.5);
        assert_eq!(node.mean_value(), 0.0);
        node.visit_count = 4;
        node.value_sum = 2.0;
        assert!((node.mean_value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ucb_prefers_unvisited_with_prior() {
        let a = MctsNode::new(NodeId(0), Pos::new(0, 0), 0.8);
        let b = MctsNode::new(NodeId(0), Pos::new(0, 1), 0.2);
        let sqrt_n = 3.0;
        assert!(a.ucb_score(sqrt_n, 5.0) > b.ucb_score(sqrt_n, 5.0));
    }

    #[test]
    fn test_ucb_negates_child_value() {
        // Child lost every visit: great for the parent
        let mut losing = MctsNode::new(NodeId(0), Pos::new(0, 0), 0.5);
        losing.visit_count = 2;
        losing.value_sum = -2.0;
        let mut winning = losing.clone();
        winning.value_sum = 2.0;
        assert!(losing.ucb_score(2.0, 1.0) > winning.ucb_score(2.0, 1.0));
    }
}
