use std::io::{self, Read, Write};

use arcode::bitbit::{BitReader, MSB};

use crate::huffman::{
    Symbol,
    error::{CodecError, Result},
    tree::{HuffmanTree, Node, NodeId},
};

if_tracing! {
    use tracing::debug;
}

/// Replays root-to-leaf descents over a bit stream.
///
/// Feed bits one at a time with [`push_bit`](Decoder::push_bit); a symbol comes
/// out whenever a descent lands on a leaf, and the next bit starts again from
/// the root.
pub struct Decoder<'t> {
    tree: Option<&'t HuffmanTree>,
    /// `None` at a code boundary, otherwise the internal node reached so far.
    position: Option<NodeId>,
    bits_read: u64,
}

impl<'t> Decoder<'t> {
    pub const fn new(tree: Option<&'t HuffmanTree>) -> Self {
        Self {
            tree,
            position: None,
            bits_read: 0,
        }
    }

    pub const fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// True when the decoder sits between two codes.
    pub const fn at_boundary(&self) -> bool {
        self.position.is_none()
    }

    /// Takes one step down the tree.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingTree`] if the decoder was built without a tree.
    pub fn push_bit(&mut self, bit: bool) -> Result<Option<Symbol>> {
        let tree = self.tree.ok_or(CodecError::MissingTree)?;
        self.bits_read += 1;

        let from = self.position.unwrap_or(tree.root());
        let next = match tree.node(from) {
            // only reachable when the root itself is a leaf
            Node::Leaf { symbol, .. } => return Ok(Some(*symbol)),
            Node::Internal { left, right, .. } => {
                if bit {
                    *right
                } else {
                    *left
                }
            }
        };

        match tree.node(next) {
            Node::Leaf { symbol, .. } => {
                self.position = None;
                Ok(Some(*symbol))
            }
            Node::Internal { .. } => {
                self.position = Some(next);
                Ok(None)
            }
        }
    }

    /// Checks that the stream ended on a code boundary.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if a code was left half-read.
    pub fn finish(&self) -> Result<()> {
        if self.at_boundary() {
            Ok(())
        } else {
            Err(CodecError::Truncated {
                bits_read: self.bits_read,
            })
        }
    }

    /// Decodes exactly `bit_count` bits of packed, MSB-first `input` into
    /// `output`, returning the number of symbols written. Without a tree
    /// nothing is read.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if `input` runs out early or ends
    /// mid-code, and [`CodecError::Io`] on other stream failures.
    pub fn decode<R: Read, W: Write>(&mut self, input: R, bit_count: u64, mut output: W) -> Result<u64> {
        if self.tree.is_none() {
            return Ok(0);
        }

        let mut input = BitReader::<_, MSB>::new(NoShortReads(input));
        let mut symbols = 0u64;
        for _ in 0..bit_count {
            let bit = input.read_bit().map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => CodecError::Truncated {
                    bits_read: self.bits_read,
                },
                _ => CodecError::Io(e),
            })?;
            if let Some(symbol) = self.push_bit(bit)? {
                output.write_all(&[symbol])?;
                symbols += 1;
            }
        }
        self.finish()?;

        if_tracing! {{
            debug!(bits = bit_count, symbols = symbols, "decode pass complete");
        }}
        Ok(symbols)
    }
}

/// Reports a zero-length read as `UnexpectedEof`.
struct NoShortReads<R>(R);

impl<R: Read> Read for NoShortReads<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 if !buf.is_empty() => Err(io::ErrorKind::UnexpectedEof.into()),
            n => Ok(n),
        }
    }
}
