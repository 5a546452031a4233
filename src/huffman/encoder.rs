use std::io::{BufRead, Write};

use arcode::bitbit::BitWriter;

use crate::huffman::{
    code::CodeTable,
    error::{CodecError, Result},
};

if_tracing! {
    use tracing::debug;
}

/// What an encode pass produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub symbols: u64,
    pub bits: u64,
}

/// Writes the code of every input symbol, back to back, into a bit writer.
pub struct Encoder<'t> {
    table: &'t CodeTable,
}

impl<'t> Encoder<'t> {
    pub const fn new(table: &'t CodeTable) -> Self {
        Self { table }
    }

    /// Encodes all of `input`. The writer is not padded; the caller decides
    /// how the final partial byte is finished.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownSymbol`] when `input` holds a symbol the
    /// table has no code for, and [`CodecError::Io`] on stream failures.
    pub fn encode<R: BufRead, W: Write>(&self, input: R, output: &mut BitWriter<W>) -> Result<EncodeStats> {
        let mut stats = EncodeStats::default();

        for byte in input.bytes() {
            let symbol = byte?;
            let code = self.table.get(symbol).ok_or(CodecError::UnknownSymbol {
                symbol,
                offset: stats.symbols,
            })?;
            for &bit in code.bits() {
                output.write_bit(bit)?;
            }
            stats.symbols += 1;
            stats.bits += code.len() as u64;
        }

        if_tracing! {{
            debug!(symbols = stats.symbols, bits = stats.bits, "encode pass complete");
        }}
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::{frequency::FrequencyMap, tree::HuffmanTree};

    fn table_for(data: &[u8]) -> CodeTable {
        let freqs = FrequencyMap::count(data).unwrap();
        CodeTable::derive(HuffmanTree::build(&freqs).as_ref())
    }

    fn encode_padded(table: &CodeTable, data: &[u8]) -> Result<(EncodeStats, Vec<u8>)> {
        let mut out = Vec::new();
        let stats = {
            let mut bits = BitWriter::new(&mut out);
            let stats = Encoder::new(table).encode(data, &mut bits)?;
            if stats.bits % 8 != 0 {
                bits.pad_to_byte()?;
            }
            stats
        };
        Ok((stats, out))
    }

    #[test]
    fn lone_symbol_sets_one_bit_per_occurrence() {
        let table = table_for(b"aaaaa");
        let (stats, out) = encode_padded(&table, b"aaaaa").unwrap();
        assert_eq!(stats, EncodeStats { symbols: 5, bits: 5 });
        assert_eq!(out, vec![0b1111_1000]);
    }

    #[test]
    fn concatenates_codes_msb_first() {
        // a = 0, c = 10, b = 11
        let table = table_for(b"aaabbc");
        let (stats, out) = encode_padded(&table, b"aaabbc").unwrap();
        assert_eq!(stats, EncodeStats { symbols: 6, bits: 9 });
        // 000 11 11 10 -> 0001_1111 0(000_0000)
        assert_eq!(out, vec![0b0001_1111, 0b0000_0000]);
    }

    #[test]
    fn empty_input_writes_nothing() {
        let table = CodeTable::derive(None);
        let (stats, out) = encode_padded(&table, b"").unwrap();
        assert_eq!(stats, EncodeStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let table = table_for(b"aaabbc");
        let err = encode_padded(&table, b"abcd").unwrap_err();
        assert!(matches!(err, CodecError::UnknownSymbol { symbol: b'd', offset: 3 }));
    }
}
