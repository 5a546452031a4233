use crate::huffman::{code::CodeTable, frequency::FrequencyMap, tree::HuffmanTree};

/// Everything derived from one frequency map: the tree the decoder walks and
/// the flat table the encoder looks codes up in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Codebook {
    frequencies: FrequencyMap,
    tree: Option<HuffmanTree>,
    table: CodeTable,
}

impl Codebook {
    pub fn new(frequencies: FrequencyMap) -> Self {
        let tree = HuffmanTree::build(&frequencies);
        let table = CodeTable::derive(tree.as_ref());
        Self { frequencies, tree, table }
    }

    pub const fn frequencies(&self) -> &FrequencyMap {
        &self.frequencies
    }

    /// `None` for an empty alphabet.
    pub const fn tree(&self) -> Option<&HuffmanTree> {
        self.tree.as_ref()
    }

    pub const fn table(&self) -> &CodeTable {
        &self.table
    }

    pub fn total_symbols(&self) -> u64 {
        self.frequencies.total()
    }

    /// Payload size, in bits, of the stream these frequencies were counted
    /// from. `None` if it overflows a `u64`.
    pub fn encoded_bits(&self) -> Option<u64> {
        self.table.encoded_bits(&self.frequencies)
    }
}
