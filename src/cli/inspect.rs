use std::ascii;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::{FileFormatHandler, InspectArgs, Result, WithPath};
use crate::huffman::{
    Symbol,
    codebook::Codebook,
    container,
    error::{self, CodecError},
};

#[derive(Serialize, Debug)]
pub struct Report {
    pub input: PathBuf,
    pub total_symbols: u64,
    pub distinct_symbols: usize,
    pub tree_depth: usize,
    pub encoded_bits: u64,
    /// Raw output size.
    pub payload_bytes: u64,
    /// Framed output size, header included.
    pub framed_bytes: u64,
    /// Most frequent first.
    pub symbols: Vec<SymbolReport>,
}

#[derive(Serialize, Debug)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub printable: String,
    pub frequency: u64,
    pub code: String,
}

impl Report {
    pub fn new(input: &Path, codebook: &Codebook) -> error::Result<Self> {
        let mut symbols: Vec<SymbolReport> = codebook
            .frequencies()
            .iter()
            .map(|(symbol, frequency)| SymbolReport {
                symbol,
                printable: ascii::escape_default(symbol).to_string(),
                frequency,
                code: codebook.table().get(symbol).map(ToString::to_string).unwrap_or_default(),
            })
            .collect();
        symbols.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.symbol.cmp(&b.symbol)));

        let encoded_bits = codebook.encoded_bits().ok_or(CodecError::Overflow("payload bit count"))?;
        let payload_bytes = encoded_bits.div_ceil(8);
        let framed_bytes = if codebook.tree().is_none() {
            0
        } else {
            container::header_len(codebook.frequencies().len()) + payload_bytes
        };

        Ok(Self {
            input: input.to_path_buf(),
            total_symbols: codebook.total_symbols(),
            distinct_symbols: codebook.frequencies().len(),
            tree_depth: codebook.tree().map_or(0, |tree| tree.depth()),
            encoded_bits,
            payload_bytes,
            framed_bytes,
            symbols,
        })
    }
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let frequencies = FileFormatHandler::count_reference(&args.input)?;
    let report = Report::new(&args.input, &Codebook::new(frequencies)).at(&args.input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}: {} symbols, {} distinct, tree depth {}",
        report.input.display(),
        report.total_symbols,
        report.distinct_symbols,
        report.tree_depth
    );
    println!(
        "payload: {} bits ({} bytes raw, {} bytes framed)",
        report.encoded_bits, report.payload_bytes, report.framed_bytes
    );
    println!("{:>6} {:>8} {:>12}  code", "byte", "char", "count");
    for entry in &report.symbols {
        println!("{:>6} {:>8} {:>12}  {}", entry.symbol, entry.printable, entry.frequency, entry.code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::frequency::FrequencyMap;

    #[test]
    fn report_orders_by_frequency() {
        let codebook = Codebook::new(FrequencyMap::count(&b"aaabbc\n"[..]).unwrap());
        let report = Report::new(Path::new("x.txt"), &codebook).unwrap();

        assert_eq!(report.total_symbols, 7);
        assert_eq!(report.distinct_symbols, 4);
        let order: Vec<Symbol> = report.symbols.iter().map(|s| s.symbol).collect();
        assert_eq!(order, vec![b'a', b'b', b'\n', b'c']);
        assert_eq!(report.symbols[2].printable, "\\n");
        assert_eq!(report.payload_bytes, report.encoded_bits.div_ceil(8));
        assert_eq!(report.framed_bytes, container::header_len(4) + report.payload_bytes);
    }

    #[test]
    fn single_symbol_report() {
        let codebook = Codebook::new(FrequencyMap::count(&b"aaaaa"[..]).unwrap());
        let report = Report::new(Path::new("a.txt"), &codebook).unwrap();
        assert_eq!(report.symbols[0].code, "1");
        assert_eq!(report.encoded_bits, 5);
        assert_eq!(report.tree_depth, 0);
    }

    #[test]
    fn empty_report_serializes() {
        let report = Report::new(Path::new("empty"), &Codebook::new(FrequencyMap::default())).unwrap();
        assert_eq!(report.framed_bytes, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_symbols"], 0);
        assert!(json["symbols"].as_array().unwrap().is_empty());
    }

    #[test]
    fn inspect_runs_on_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, b"hello huffman").unwrap();
        inspect(InspectArgs { input: input.clone(), json: false }).unwrap();
        inspect(InspectArgs { input, json: true }).unwrap();
    }
}
