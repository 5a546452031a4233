use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::huffman::{Symbol, frequency::FrequencyMap};

if_tracing! {
    use tracing::debug;
}

/// Handle of a node inside a [`HuffmanTree`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: Symbol, freq: u64 },
    Internal { left: NodeId, right: NodeId, freq: u64 },
}

impl Node {
    pub const fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } | Node::Internal { freq, .. } => *freq,
        }
    }
}

/// A Huffman prefix tree stored as an arena of nodes.
///
/// Leaves hold symbols, internal nodes hold exactly two children, and every
/// node's frequency is the sum of the frequencies of the leaves below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// Builds the tree for `frequencies`, or `None` when the map is empty.
    ///
    /// The two lowest-frequency nodes are merged until one remains. The first
    /// node popped becomes the left child. Ties go to whichever node entered
    /// the queue first: leaves enter in ascending symbol order, merged nodes
    /// enter after everything already queued.
    pub fn build(frequencies: &FrequencyMap) -> Option<Self> {
        let mut nodes = Vec::with_capacity(frequencies.len().saturating_mul(2));
        let mut queue = BinaryHeap::with_capacity(frequencies.len());
        let mut seq = 0u64;

        for (symbol, freq) in frequencies.iter() {
            let id = NodeId(nodes.len());
            nodes.push(Node::Leaf { symbol, freq });
            queue.push(Reverse((freq, seq, id)));
            seq += 1;
        }

        while queue.len() > 1 {
            let Reverse((lf, _, left)) = queue.pop()?;
            let Reverse((rf, _, right)) = queue.pop()?;
            // bounded by the map total, which fits in a u64
            let freq = lf + rf;
            let id = NodeId(nodes.len());
            nodes.push(Node::Internal { left, right, freq });
            queue.push(Reverse((freq, seq, id)));
            seq += 1;
        }

        let Reverse((_, _, root)) = queue.pop()?;
        let tree = Self { nodes, root };

        if_tracing! {{
            debug!(leaves = frequencies.len(), nodes = tree.nodes.len(), depth = tree.depth(), "tree built");
        }}
        Some(tree)
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Frequency of the root, which is the number of symbols the tree was built from.
    pub fn freq(&self) -> u64 {
        self.node(self.root).freq()
    }

    /// True when the alphabet has a single symbol and the root is that leaf.
    pub fn is_single_leaf(&self) -> bool {
        matches!(self.node(self.root), Node::Leaf { .. })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match self.node(id) {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Internal { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        deepest
    }

    /// Leaves as `(symbol, freq)` pairs, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Leaf { symbol, freq } => Some((*symbol, *freq)),
            Node::Internal { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(data: &[u8]) -> FrequencyMap {
        FrequencyMap::count(data).unwrap()
    }

    #[test]
    fn empty_map_has_no_tree() {
        assert!(HuffmanTree::build(&FrequencyMap::default()).is_none());
    }

    #[test]
    fn single_symbol_is_a_lone_leaf() {
        let tree = HuffmanTree::build(&map(b"aaaaa")).unwrap();
        assert!(tree.is_single_leaf());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node(tree.root()), &Node::Leaf { symbol: b'a', freq: 5 });
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn internal_nodes_have_two_children_and_summed_freq() {
        let tree = HuffmanTree::build(&map(b"the quick brown fox jumps over the lazy dog")).unwrap();
        for i in 0..tree.node_count() {
            if let Node::Internal { left, right, freq } = tree.node(NodeId(i)) {
                assert_ne!(left, right);
                assert_eq!(*freq, tree.node(*left).freq() + tree.node(*right).freq());
            }
        }
        // n leaves always need n - 1 merges
        assert_eq!(tree.node_count(), 2 * tree.leaves().count() - 1);
    }

    #[test]
    fn root_freq_is_conserved() {
        let data = b"mississippi river banks";
        let tree = HuffmanTree::build(&map(data)).unwrap();
        let leaf_sum: u64 = tree.leaves().map(|(_, f)| f).sum();
        assert_eq!(tree.freq(), leaf_sum);
        assert_eq!(tree.freq(), data.len() as u64);
    }

    #[test]
    fn first_popped_goes_left() {
        // a:3 b:2 c:1 -> merge c(1) + b(2) = 3, then tie between a(3, seq 0)
        // and the merged node (3, seq 3): a was queued first, so it goes left.
        let tree = HuffmanTree::build(&map(b"aaabbc")).unwrap();
        let Node::Internal { left, right, freq } = tree.node(tree.root()) else {
            panic!("root should be internal");
        };
        assert_eq!(*freq, 6);
        assert_eq!(tree.node(*left), &Node::Leaf { symbol: b'a', freq: 3 });

        let Node::Internal { left, right, .. } = tree.node(*right) else {
            panic!("right child should be internal");
        };
        assert_eq!(tree.node(*left), &Node::Leaf { symbol: b'c', freq: 1 });
        assert_eq!(tree.node(*right), &Node::Leaf { symbol: b'b', freq: 2 });
    }

    #[test]
    fn equal_weights_break_ties_by_symbol_order() {
        let tree = HuffmanTree::build(&map(b"dcba")).unwrap();
        let Node::Internal { left, right, .. } = tree.node(tree.root()) else {
            panic!("root should be internal");
        };
        // a+b merged first, then c+d; the a+b node was queued first.
        let Node::Internal { left: ll, right: lr, .. } = tree.node(*left) else {
            panic!("left should be internal");
        };
        assert_eq!(tree.node(*ll), &Node::Leaf { symbol: b'a', freq: 1 });
        assert_eq!(tree.node(*lr), &Node::Leaf { symbol: b'b', freq: 1 });
        let Node::Internal { left: rl, .. } = tree.node(*right) else {
            panic!("right should be internal");
        };
        assert_eq!(tree.node(*rl), &Node::Leaf { symbol: b'c', freq: 1 });
    }

    #[test]
    fn near_max_total_builds() {
        let freqs = FrequencyMap::from_counts([(b'a', u64::MAX - 1), (b'b', 1)]).unwrap();
        let tree = HuffmanTree::build(&freqs).unwrap();
        assert_eq!(tree.freq(), u64::MAX);
    }

    #[test]
    fn build_is_deterministic() {
        let freqs = map(b"abracadabra alakazam");
        assert_eq!(HuffmanTree::build(&freqs), HuffmanTree::build(&freqs));
    }
}
