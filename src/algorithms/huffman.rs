use std::io;

use crate::{
    algorithms::DynMutator,
    huffman::container::{self, Framing},
    mutator::Result,
};

if_tracing! {
    use tracing::debug;
}

/// Framed static Huffman coding over in-memory buffers.
pub const HuffmanCoding: DynMutator = DynMutator {
    name: "huffman",
    drive_mutation: huffman_encode,
    revert_mutation: huffman_decode,
};

pub use self::HuffmanCoding as ThisMutator;

pub fn huffman_encode(data: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    if_tracing! {{
        debug!(input_len = data.len(), "huffman encode start");
    }}
    buf.clear();
    // a slice can be re-read for free, so both passes share it
    container::compress(|| Ok::<_, io::Error>(data), &mut *buf, Framing::Embedded)?;
    Ok(())
}

pub fn huffman_decode(data: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    if_tracing! {{
        debug!(input_len = data.len(), "huffman decode start");
    }}
    buf.clear();
    container::decompress(data, &mut *buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutator::Mutator;

    #[test]
    fn roundtrip_tests() {
        crate::tests::roundtrip_test(ThisMutator);
    }

    #[test]
    fn clears_previous_buffer_contents() {
        let mut buf = b"stale".to_vec();
        huffman_encode(b"", &mut buf).unwrap();
        assert!(buf.is_empty());

        let mut packed = Vec::new();
        huffman_encode(b"fresh", &mut packed).unwrap();
        let mut out = b"stale".to_vec();
        huffman_decode(&packed, &mut out).unwrap();
        assert_eq!(out, b"fresh");
    }

    #[test]
    fn corrupt_input_surfaces_as_error() {
        let mut mutator = ThisMutator;
        let mut out = Vec::new();
        let err = mutator.revert_mutation(b"garbage", &mut out).unwrap_err();
        assert!(err.to_string().contains("invalid header"), "{err}");
    }

    #[test]
    fn single_symbol_file_compresses_to_a_bit_per_byte() {
        let data = vec![b'a'; 800];
        let mut mutator = ThisMutator;
        let result = mutator.test_roundtrip(&data).unwrap();
        assert!(result.is_successful());
        // fixed header fields, one entry, 800 bits of payload
        assert_eq!(result.get_compressed().len(), 15 + 9 + 100);
    }
}
