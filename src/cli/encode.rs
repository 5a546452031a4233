use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use voxell_timer::time_fn;

use crate::cli::{EncodeArgs, FileFormatHandler, Result, WithPath, default_encode_output};
use crate::huffman::container::{self, Framing};

pub fn encode(args: EncodeArgs) -> Result<()> {
    let input_path = &args.input;
    let output_path = match args.output {
        Some(path) => path,
        None => default_encode_output(input_path)?,
    };
    let framing = if args.raw { Framing::Raw } else { Framing::Embedded };

    if_tracing! {
        let span = tracing::span!(tracing::Level::INFO, "encode", input = %input_path.display(), output = %output_path.display());
        let _enter = span.enter();
    }

    // fail on a missing input before the output gets created
    fs::metadata(input_path).at(input_path)?;
    let mut output = BufWriter::new(File::create(&output_path).at(&output_path)?);

    let (result, elapsed) = time_fn(|| container::compress(|| File::open(input_path).map(BufReader::new), &mut output, framing));
    drop(output);

    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            if_tracing! {{
                tracing::error!(event = "encode_failed", error = %err, "removing partial output");
            }}
            let _ = fs::remove_file(&output_path);
            return Err(err).at(input_path);
        }
    };

    if framing == Framing::Raw && !args.no_sidecar {
        let sidecar = FileFormatHandler::save_frequency_file(summary.codebook.frequencies(), &output_path)?;
        if_tracing! {{
            tracing::info!(event = "sidecar_written", path = %sidecar.display(), "frequency file written");
        }}
        if_not_tracing! {{
            let _ = sidecar;
        }}
    }

    if_tracing! {
        tracing::info!(event = "encode_complete", elapsed_us = %elapsed.as_micros(), symbols = summary.stats.symbols, bits = summary.stats.bits, bytes = summary.bytes_written, "encode finished");
    }
    eprintln!(
        "{} -> {}: {} bytes -> {} bytes in {:.0?}",
        input_path.display(),
        output_path.display(),
        summary.stats.symbols,
        summary.bytes_written,
        elapsed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CliError, DecodeArgs, decode::decode};

    fn encode_args(input: &std::path::Path, output: &std::path::Path, raw: bool) -> EncodeArgs {
        EncodeArgs {
            input: input.to_path_buf(),
            output: Some(output.to_path_buf()),
            raw,
            no_sidecar: false,
        }
    }

    #[test]
    fn framed_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("constitution.txt");
        let packed = dir.path().join("constitution.huf");
        let restored = dir.path().join("restored.txt");
        let text = b"We the People of the United States, in Order to form a more perfect Union".repeat(20);
        fs::write(&input, &text).unwrap();

        encode(encode_args(&input, &packed, false)).unwrap();
        assert!(fs::metadata(&packed).unwrap().len() < text.len() as u64);

        decode(DecodeArgs {
            input: packed,
            output: Some(restored.clone()),
            freq_file: None,
            reference: None,
        })
        .unwrap();
        assert_eq!(fs::read(&restored).unwrap(), text);
    }

    #[test]
    fn raw_writes_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        let packed = dir.path().join("a.huf");
        fs::write(&input, b"aaaaa").unwrap();

        encode(encode_args(&input, &packed, true)).unwrap();
        assert_eq!(fs::read(&packed).unwrap(), vec![0b1111_1000]);
        assert!(dir.path().join("a.freq.json").exists());
    }

    #[test]
    fn default_output_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        fs::write(&input, b"").unwrap();

        encode(EncodeArgs {
            input: input.clone(),
            output: None,
            raw: false,
            no_sidecar: false,
        })
        .unwrap();
        let packed = dir.path().join("empty_compressed.huf");
        assert_eq!(fs::read(packed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn missing_input_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let packed = dir.path().join("out.huf");
        let err = encode(encode_args(&dir.path().join("nope.txt"), &packed, false)).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
        assert!(!packed.exists());
    }
}
