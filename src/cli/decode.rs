use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use voxell_timer::time_fn;

use crate::cli::{DecodeArgs, FileFormatHandler, FrequencySource, Result, WithPath, default_decode_output};
use crate::huffman::container;

pub fn decode(args: DecodeArgs) -> Result<()> {
    let source = args.frequency_source();
    let input_path = &args.input;
    let output_path = match args.output {
        Some(ref path) => path.clone(),
        None => default_decode_output(input_path)?,
    };

    if_tracing! {
        let span = tracing::span!(tracing::Level::INFO, "decode", input = %input_path.display(), output = %output_path.display(), source = ?source);
        let _enter = span.enter();
    }

    let frequencies = match &source {
        FrequencySource::Header => None,
        FrequencySource::FromFile(path) => Some(FileFormatHandler::load_frequency_file(path)?),
        FrequencySource::Reference(path) => Some(FileFormatHandler::count_reference(path)?),
    };

    let mut input = BufReader::new(File::open(input_path).at(input_path)?);
    let mut output = BufWriter::new(File::create(&output_path).at(&output_path)?);

    let (result, elapsed) = time_fn(|| match &frequencies {
        None => container::decompress(&mut input, &mut output),
        Some(frequencies) => container::decompress_raw(frequencies.clone(), &mut input, &mut output),
    });
    drop(output);

    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            if_tracing! {{
                tracing::error!(event = "decode_failed", error = %err, "removing partial output");
            }}
            let _ = fs::remove_file(&output_path);
            return Err(err).at(input_path);
        }
    };

    if_tracing! {
        tracing::info!(event = "decode_complete", elapsed_us = %elapsed.as_micros(), symbols = summary.symbols, bits = summary.bits, "decode finished");
    }
    eprintln!(
        "{} -> {}: {} bytes restored in {:.0?}",
        input_path.display(),
        output_path.display(),
        summary.symbols,
        elapsed
    );
    Ok(())
}
