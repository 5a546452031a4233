use std::{fs, path::Path, time::Duration};

use voxell_timer::time_fn;
use walkdir::WalkDir;

use crate::{
    algorithms::huffman::HuffmanCoding,
    cli::{CliError, CorpusArgs, Result, WithPath},
    mutator::{self, Mutator},
};

pub fn corpus(args: CorpusArgs) -> Result<()> {
    let mut total = 0usize;
    let mut failed = 0usize;

    for entry in WalkDir::new(&args.dir) {
        let entry = entry.map_err(|e| CliError::Io {
            path: e.path().map_or_else(|| args.dir.clone(), Path::to_path_buf),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let input = fs::read(path).at(path)?;
        total += 1;
        if !roundtrip_file(path, &input) {
            failed += 1;
        }
    }

    eprintln!("{} of {} files passed", total - failed, total);
    if failed > 0 {
        return Err(CliError::RoundTrip(format!("{} of {} corpus files", failed, total)));
    }
    Ok(())
}

/// Round-trips one file, prints the result, and reports whether it passed.
fn roundtrip_file(path: &Path, input: &[u8]) -> bool {
    let mut mutator = HuffmanCoding;

    let mut compressed = Vec::new();
    let (res, comp_dur) = time_fn(|| mutator.drive_mutation(input, &mut compressed));

    let mut decompressed = Vec::new();
    let (revert_res, decomp_dur) = time_fn(|| mutator.revert_mutation(&compressed, &mut decompressed));
    let res = res.and(revert_res);

    validate_and_print_results(res, path, input, &compressed, &decompressed, comp_dur, decomp_dur)
}

fn validate_and_print_results(
    res: mutator::Result<()>,
    path: &Path,
    expected: &[u8],
    intermediate: &[u8],
    got: &[u8],
    compression_time: Duration,
    decompression_time: Duration,
) -> bool {
    let original_size = expected.len();
    let compressed_size = intermediate.len();

    let ratio = if original_size == 0 {
        1.0
    } else {
        compressed_size as f64 / original_size as f64
    };
    let bytes_saved = original_size as isize - compressed_size as isize;

    let passed = res.is_ok() && expected == got;
    let detail = match res {
        Err(e) => format!("\n\terror: {:#}", e),
        Ok(()) if !passed => "\n\terror: decompressed bytes differ from the original".to_string(),
        Ok(()) => String::new(),
    };

    eprintln!(
        "======== {} {} ========\n\t{:.0?} encode\n\t{:.0?} decode\n\toriginal: {} bytes\n\tcompressed: {} bytes\n\tratio: {:.1}% (compressed/original)\n\tsaved: {:+} bytes{}",
        if passed { "PASSED" } else { "FAILED" },
        path.display(),
        compression_time,
        decompression_time,
        original_size,
        compressed_size,
        ratio * 100.0,
        bytes_saved,
        detail
    );
    passed
}
