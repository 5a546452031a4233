//! On-disk layout of a compressed stream.
//!
//! A framed stream starts with a header carrying the frequency map, so the
//! decoder can rebuild the exact tree the encoder used:
//!
//! ```text
//! magic      4 bytes   "HUFP"
//! version    1 byte
//! entries    u16 LE    distinct symbols, at most 256
//! entry      9 bytes   symbol (u8), frequency (u64 LE); ascending symbols
//! bit_count  u64 LE    meaningful payload bits
//! payload              codes, MSB first, zero padded to a byte
//! ```
//!
//! A raw stream is the payload alone; the decoder has to be handed the
//! frequencies some other way. An empty input compresses to zero bytes in
//! either mode, and zero bytes decompress to nothing. Nothing may follow the
//! payload.

use std::io::{self, BufRead, Read, Write};

use arcode::bitbit::BitWriter;

use crate::huffman::{
    Symbol,
    codebook::Codebook,
    decoder::Decoder,
    encoder::{EncodeStats, Encoder},
    error::{CodecError, Result},
    frequency::FrequencyMap,
};

if_tracing! {
    use tracing::{debug, info};
}

pub const MAGIC: [u8; 4] = *b"HUFP";
pub const VERSION: u8 = 1;

/// Whether the frequency map travels with the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Framing {
    #[default]
    Embedded,
    Raw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub frequencies: FrequencyMap,
    pub bit_count: u64,
}

#[derive(Clone, Debug)]
pub struct CompressSummary {
    pub codebook: Codebook,
    pub stats: EncodeStats,
    pub bytes_written: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecompressSummary {
    pub symbols: u64,
    pub bits: u64,
}

/// Compresses the stream produced by `open` in two passes: one to count
/// symbols, one to encode them.
///
/// `open` is called once per pass and must yield the same bytes both times.
/// Each handle is dropped when its pass ends.
///
/// # Errors
///
/// Propagates I/O failures. If the second pass disagrees with the first, the
/// result is [`CodecError::UnknownSymbol`] or [`CodecError::CountMismatch`],
/// and whatever was already written to `output` must be discarded.
pub fn compress<R, W, F>(mut open: F, mut output: W, framing: Framing) -> Result<CompressSummary>
where
    R: BufRead,
    W: Write,
    F: FnMut() -> io::Result<R>,
{
    let codebook = Codebook::new(FrequencyMap::count(open()?)?);
    if codebook.tree().is_none() {
        return Ok(CompressSummary {
            codebook,
            stats: EncodeStats::default(),
            bytes_written: 0,
        });
    }

    let bit_count = codebook.encoded_bits().ok_or(CodecError::Overflow("payload bit count"))?;
    let mut bytes_written = 0;
    if framing == Framing::Embedded {
        bytes_written += write_header(&mut output, codebook.frequencies(), bit_count)?;
    }

    let stats = {
        let mut bits = BitWriter::new(&mut output);
        let stats = Encoder::new(codebook.table()).encode(open()?, &mut bits)?;
        if stats.bits % 8 != 0 {
            bits.pad_to_byte()?;
        }
        stats
    };
    output.flush()?;

    check_count("symbols", codebook.total_symbols(), stats.symbols)?;
    check_count("bits", bit_count, stats.bits)?;
    bytes_written += stats.bits.div_ceil(8);

    if_tracing! {{
        info!(?framing, symbols = stats.symbols, bits = stats.bits, bytes = bytes_written, "compressed");
    }}
    Ok(CompressSummary {
        codebook,
        stats,
        bytes_written,
    })
}

/// Decompresses a framed stream.
///
/// # Errors
///
/// Returns [`CodecError::InvalidHeader`] for a malformed header or one whose
/// `bit_count` disagrees with its frequencies, [`CodecError::Truncated`] for a
/// short payload, [`CodecError::TrailingData`] if bytes follow the payload, and
/// [`CodecError::CountMismatch`] if the payload decodes to a different number
/// of symbols than the header promises.
pub fn decompress<R: Read, W: Write>(mut input: R, output: W) -> Result<DecompressSummary> {
    let Some(header) = read_header(&mut input)? else {
        return Ok(DecompressSummary::default());
    };
    let codebook = Codebook::new(header.frequencies);
    match codebook.encoded_bits() {
        Some(bits) if bits == header.bit_count => {}
        predicted => {
            return Err(CodecError::InvalidHeader(format!(
                "bit_count {} but the frequencies need {}",
                header.bit_count,
                predicted.map_or_else(|| "more than u64::MAX".to_string(), |bits| bits.to_string())
            )));
        }
    }
    decode_payload(&codebook, header.bit_count, input, output)
}

/// Decompresses a raw payload using frequencies obtained elsewhere, such as a
/// side-car file or a recount of the original input.
///
/// # Errors
///
/// Same as [`decompress`], minus header validation, plus
/// [`CodecError::Overflow`] if the frequencies predict more than `u64::MAX`
/// payload bits.
pub fn decompress_raw<R: Read, W: Write>(frequencies: FrequencyMap, input: R, output: W) -> Result<DecompressSummary> {
    let codebook = Codebook::new(frequencies);
    let bit_count = codebook.encoded_bits().ok_or(CodecError::Overflow("payload bit count"))?;
    decode_payload(&codebook, bit_count, input, output)
}

fn decode_payload<R: Read, W: Write>(codebook: &Codebook, bit_count: u64, mut input: R, mut output: W) -> Result<DecompressSummary> {
    let mut decoder = Decoder::new(codebook.tree());
    let symbols = decoder.decode(&mut input, bit_count, &mut output)?;
    output.flush()?;
    check_count("symbols", codebook.total_symbols(), symbols)?;
    if fill(&mut input, &mut [0u8; 1])? != 0 {
        return Err(CodecError::TrailingData);
    }

    if_tracing! {{
        info!(symbols = symbols, bits = bit_count, "decompressed");
    }}
    Ok(DecompressSummary { symbols, bits: bit_count })
}

fn check_count(unit: &'static str, expected: u64, actual: u64) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(CodecError::CountMismatch { unit, expected, actual })
    }
}

/// Writes a header and returns its size in bytes.
pub fn write_header<W: Write>(output: &mut W, frequencies: &FrequencyMap, bit_count: u64) -> Result<u64> {
    let entries = u16::try_from(frequencies.len())
        .map_err(|_| CodecError::InvalidHeader(format!("{} distinct symbols", frequencies.len())))?;

    output.write_all(&MAGIC)?;
    output.write_all(&[VERSION])?;
    output.write_all(&entries.to_le_bytes())?;
    for (symbol, freq) in frequencies.iter() {
        output.write_all(&[symbol])?;
        output.write_all(&freq.to_le_bytes())?;
    }
    output.write_all(&bit_count.to_le_bytes())?;

    Ok(header_len(frequencies.len()))
}

pub const fn header_len(entries: usize) -> u64 {
    (MAGIC.len() + 1 + 2 + entries * 9 + 8) as u64
}

/// Reads and validates a header. Returns `None` if `input` is empty.
pub fn read_header<R: Read>(input: &mut R) -> Result<Option<Header>> {
    let mut magic = [0u8; 4];
    match fill(input, &mut magic)? {
        0 => return Ok(None),
        4 if magic == MAGIC => {}
        _ => return Err(CodecError::InvalidHeader("not a huffpack stream".into())),
    }

    let [version] = read_array::<_, 1>(input)?;
    if version != VERSION {
        return Err(CodecError::InvalidHeader(format!("unsupported version {}", version)));
    }

    let entries = u16::from_le_bytes(read_array(input)?) as usize;
    if entries > 256 {
        return Err(CodecError::InvalidHeader(format!("{} distinct symbols", entries)));
    }

    let mut pairs = Vec::with_capacity(entries);
    let mut previous: Option<Symbol> = None;
    for _ in 0..entries {
        let [symbol] = read_array::<_, 1>(input)?;
        let freq = u64::from_le_bytes(read_array(input)?);
        if previous.is_some_and(|p| p >= symbol) {
            return Err(CodecError::InvalidHeader(format!("symbol {:#04x} out of order", symbol)));
        }
        if freq == 0 {
            return Err(CodecError::InvalidHeader(format!("symbol {:#04x} has zero frequency", symbol)));
        }
        previous = Some(symbol);
        pairs.push((symbol, freq));
    }

    let bit_count = u64::from_le_bytes(read_array(input)?);
    if entries == 0 && bit_count != 0 {
        return Err(CodecError::InvalidHeader("payload bits without an alphabet".into()));
    }

    if_tracing! {{
        debug!(entries = entries, bit_count = bit_count, "header read");
    }}
    let frequencies = FrequencyMap::from_counts(pairs)
        .ok_or_else(|| CodecError::InvalidHeader("frequencies sum past u64::MAX".into()))?;
    Ok(Some(Header { frequencies, bit_count }))
}

fn read_array<R: Read, const N: usize>(input: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => CodecError::InvalidHeader("header ends early".into()),
        _ => CodecError::Io(e),
    })?;
    Ok(buf)
}

/// Reads until `buf` is full or the stream ends, returning the bytes read.
fn fill<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
