//! Static two-pass Huffman codec.
//!
//! The stages run in order, each a function of the previous one's output:
//! [`FrequencyMap`](frequency::FrequencyMap) →
//! [`HuffmanTree`](tree::HuffmanTree) → [`CodeTable`](code::CodeTable).
//! [`Codebook`](codebook::Codebook) bundles the three, the
//! [`Encoder`](encoder::Encoder) reads the table and the
//! [`Decoder`](decoder::Decoder) walks the tree.

pub mod code;
pub mod codebook;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod tree;

/// One unit of the input alphabet.
pub type Symbol = u8;
