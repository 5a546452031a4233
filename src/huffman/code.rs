use core::fmt;
use std::collections::BTreeMap;

use crate::huffman::{
    Symbol,
    frequency::FrequencyMap,
    tree::{HuffmanTree, Node},
};

/// A root-to-leaf path, first step first. `false` is a left turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    /// The code given to the only symbol of a single-symbol alphabet.
    pub fn lone() -> Self {
        Self { bits: vec![true] }
    }

    /// This path extended by one step.
    fn then(&self, bit: bool) -> Self {
        let mut bits = Vec::with_capacity(self.bits.len() + 1);
        bits.extend_from_slice(&self.bits);
        bits.push(bit);
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol to code lookup, derived once from a finished tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<Symbol, Code>,
}

impl CodeTable {
    /// Walks `tree` depth-first, appending 0 for every left descent and 1 for
    /// every right descent. A tree that is a single leaf yields the code `1`;
    /// no tree yields an empty table.
    pub fn derive(tree: Option<&HuffmanTree>) -> Self {
        let mut codes = BTreeMap::new();
        let Some(tree) = tree else {
            return Self { codes };
        };

        if let Node::Leaf { symbol, .. } = tree.node(tree.root()) {
            codes.insert(*symbol, Code::lone());
            return Self { codes };
        }

        let mut stack = vec![(tree.root(), Code::default())];
        while let Some((id, path)) = stack.pop() {
            match tree.node(id) {
                Node::Leaf { symbol, .. } => {
                    codes.insert(*symbol, path);
                }
                Node::Internal { left, right, .. } => {
                    stack.push((*right, path.then(true)));
                    stack.push((*left, path.then(false)));
                }
            }
        }

        Self { codes }
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Code)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Exact number of bits encoding a stream with these frequencies will
    /// produce, or `None` if that does not fit in a `u64`.
    pub fn encoded_bits(&self, frequencies: &FrequencyMap) -> Option<u64> {
        frequencies.iter().try_fold(0u64, |bits, (symbol, count)| {
            let len = self.get(symbol).map_or(0, Code::len) as u64;
            bits.checked_add(len.checked_mul(count)?)
        })
    }
}
