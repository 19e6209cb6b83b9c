//! MCTS tree structure with arena allocation.
//!
//! Nodes live in a contiguous Vec and refer to each other by `NodeId`.
//! Promoting a child to root rebuilds the arena from that subtree, which
//! drops every node outside it.

use std::collections::VecDeque;
use std::mem;

use super::node::{MctsNode, NodeId};
use crate::board::Pos;

#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    root: NodeId,
}

impl MctsTree {
    /// Tree with a single unexpanded root reached by `last_move`.
    pub fn new(last_move: Pos) -> Self {
        Self {
            nodes: vec![MctsNode::new(NodeId::NONE, last_move, 1.0)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child of `node` reached by `mv`, if expanded.
    pub fn child(&self, node: NodeId, mv: Pos) -> Option<NodeId> {
        let children = &self.get(node).children;
        children
            .binary_search_by(|(m, _)| m.cmp(&mv))
            .ok()
            .map(|i| children[i].1)
    }

    /// Attach one child per `(move, prior)` entry. Entries must be sorted by move.
    pub fn expand(&mut self, node: NodeId, priors: &[(Pos, f32)]) {
        debug_assert!(priors.windows(2).all(|w| w[0].0 < w[1].0));
        let mut children = Vec::with_capacity(priors.len());
        for &(mv, prior) in priors {
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(MctsNode::new(node, mv, prior));
            children.push((mv, id));
        }
        let parent = self.get_mut(node);
        parent.children = children;
        parent.expanded = true;
    }

    /// Select the child with the highest UCB score; the first one wins ties.
    pub fn select_child(&self, node: NodeId, c_puct: f32) -> Option<NodeId> {
        let parent = self.get(node);
        // Pre-compute sqrt once instead of per-child comparison
        let parent_visits_sqrt = (parent.visit_count as f32).sqrt();

        let mut best: Option<(NodeId, f32)> = None;
        for &(_, id) in &parent.children {
            let score = self.get(id).ucb_score(parent_visits_sqrt, c_puct);
            match best {
                Some((_, s)) if score <= s => {}
                _ => best = Some((id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Backpropagate a value from a leaf to the root.
    /// Value is negated at each level (opponent's perspective).
    pub fn backpropagate(&mut self, leaf: NodeId, value: f32) {
        let mut current = leaf;
        let mut current_value = value;

        while current.is_some() {
            let node = self.get_mut(current);
            node.visit_count += 1;
            node.value_sum += current_value;
            current_value = -current_value;
            current = node.parent;
        }
    }

    /// Most visited root child.
    ///
    /// Ties go to the higher mean value for the root's mover, then the higher
    /// prior, then the lower move index.
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &(_, id) in &self.get(self.root).children {
            let better = match best {
                None => true,
                Some(b) => {
                    let (c, b) = (self.get(id), self.get(b));
                    (c.visit_count, -c.mean_value(), c.prior)
                        .partial_cmp(&(b.visit_count, -b.mean_value(), b.prior))
                        .is_some_and(|o| o.is_gt())
                }
            };
            if better {
                best = Some(id);
            }
        }
        best
    }

    /// Make `child` the new root, keeping its subtree and dropping the rest.
    pub fn promote(&mut self, child: NodeId) {
        let mut old = mem::take(&mut self.nodes);
        let mut nodes = Vec::with_capacity(old.len());

        let mut root = mem::take(&mut old[child.index()]);
        root.parent = NodeId::NONE;
        nodes.push(root);

        let mut queue = VecDeque::from([0usize]);
        while let Some(idx) = queue.pop_front() {
            let children = mem::take(&mut nodes[idx].children);
            let mut remapped = Vec::with_capacity(children.len());
            for (mv, old_id) in children {
                let mut node = mem::take(&mut old[old_id.index()]);
                node.parent = NodeId(idx as u32);
                let id = nodes.len();
                nodes.push(node);
                remapped.push((mv, NodeId(id as u32)));
                queue.push_back(id);
            }
            nodes[idx].children = remapped;
        }

        self.nodes = nodes;
        self.root = NodeId(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> MctsTree {
        let mut tree = MctsTree::new(Pos::NONE);
        let root = tree.root();
        tree.expand(root, &[(Pos::new(0, 0), 0.25), (Pos::new(0, 1), 0.75)]);
        tree
    }

    #[test]
    fn test_expand_and_lookup() {
        let tree = sample_tree();
        let root = tree.get(tree.root());
        assert!(root.expanded);
        assert_eq!(root.children.len(), 2);
        assert!(tree.child(tree.root(), Pos::new(0, 1)).is_some());
        assert!(tree.child(tree.root(), Pos::new(1, 1)).is_none());
    }

    #[test]
    fn test_backpropagate_negates() {
        let mut tree = sample_tree();
        let leaf = tree.child(tree.root(), Pos::new(0, 0)).unwrap();
        tree.backpropagate(leaf, 1.0);
        assert_eq!(tree.get(leaf).value_sum, 1.0);
        assert_eq!(tree.get(tree.root()).value_sum, -1.0);
        assert_eq!(tree.get(tree.root()).visit_count, 1);
    }

    #[test]
    fn test_select_prefers_prior_then_first() {
        let mut tree = sample_tree();
        tree.get_mut(tree.root()).visit_count = 1;
        let pick = tree.select_child(tree.root(), 1.0).unwrap();
        assert_eq!(tree.get(pick).action, Pos::new(0, 1));

        let mut flat = MctsTree::new(Pos::NONE);
        flat.expand(flat.root(), &[(Pos::new(0, 0), 0.5), (Pos::new(0, 1), 0.5)]);
        let pick = flat.select_child(flat.root(), 1.0).unwrap();
        assert_eq!(flat.get(pick).action, Pos::new(0, 0));
    }

    #[test]
    fn test_best_child_tie_breaks() {
        let mut tree = sample_tree();
        let a = tree.child(tree.root(), Pos::new(0, 0)).unwrap();
        let b = tree.child(tree.root(), Pos::new(0, 1)).unwrap();

        // Equal visits and value: higher prior wins
        tree.get_mut(a).visit_count = 3;
        tree.get_mut(b).visit_count = 3;
        assert_eq!(tree.best_child(), Some(b));

        // Lower child value is better for the root's mover
        tree.get_mut(a).value_sum = -3.0;
        assert_eq!(tree.best_child(), Some(a));

        // Visits dominate
        tree.get_mut(b).visit_count = 4;
        assert_eq!(tree.best_child(), Some(b));
    }

    #[test]
    fn test_best_child_full_tie_takes_lowest_move() {
        let mut tree = MctsTree::new(Pos::NONE);
        let root = tree.root();
        tree.expand(root, &[(Pos::new(2, 2), 0.5), (Pos::new(3, 0), 0.5)]);
        let best = tree.best_child().unwrap();
        assert_eq!(tree.get(best).action, Pos::new(2, 2));
    }

    #[test]
    fn test_promote_keeps_subtree() {
        let mut tree = sample_tree();
        let keep = tree.child(tree.root(), Pos::new(0, 1)).unwrap();
        tree.expand(keep, &[(Pos::new(1, 0), 0.4), (Pos::new(1, 1), 0.6)]);
        let grandchild = tree.child(keep, Pos::new(1, 1)).unwrap();
        tree.backpropagate(grandchild, 0.5);
        tree.backpropagate(grandchild, 0.5);
        assert_eq!(tree.len(), 5);

        tree.promote(keep);
        assert_eq!(tree.len(), 3);
        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.action, Pos::new(0, 1));
        assert_eq!(root.visit_count, 2);
        assert!((root.value_sum + 1.0).abs() < 1e-6);

        let g = tree.child(tree.root(), Pos::new(1, 1)).unwrap();
        assert_eq!(tree.get(g).visit_count, 2);
        assert_eq!(tree.get(g).parent, tree.root());
        assert!((tree.get(g).prior - 0.6).abs() < 1e-6);
    }
}
