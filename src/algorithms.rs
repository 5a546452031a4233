use voxell_timer::time_fn;

use crate::mutator::{Mutator, Result};

if_tracing! {
    use tracing::{debug, error};
}

pub mod huffman;

/// A mutator made of two plain functions, so it can live in a `const`.
#[derive(Clone, Copy, Debug)]
pub struct DynMutator {
    pub name: &'static str,
    pub drive_mutation: fn(data: &[u8], buf: &mut Vec<u8>) -> Result<()>,
    pub revert_mutation: fn(data: &[u8], buf: &mut Vec<u8>) -> Result<()>,
}

impl Mutator for DynMutator {
    fn drive_mutation(&mut self, data: &[u8], buf: &mut Vec<u8>) -> Result<()> {
        if_tracing! {
            let span = tracing::span!(tracing::Level::INFO, "compressor", name = self.name, func = "compress");
            let _enter = span.enter();
        }
        let (res, d) = time_fn(|| (self.drive_mutation)(data, buf));
        if_tracing! {{
            match &res {
                Ok(()) => debug!(elapsed_us = %d.as_micros(), in_len = data.len(), out_len = buf.len(), "compress finished"),
                Err(err) => error!(elapsed_us = %d.as_micros(), in_len = data.len(), error = %err, "compress failed"),
            }
        }}
        if_not_tracing! {{
            let _ = d;
        }}
        res
    }

    fn revert_mutation(&mut self, data: &[u8], buf: &mut Vec<u8>) -> Result<()> {
        if_tracing! {
            let span = tracing::span!(tracing::Level::INFO, "compressor", name = self.name, func = "decompress");
            let _enter = span.enter();
        }
        let (res, d) = time_fn(|| (self.revert_mutation)(data, buf));
        if_tracing! {{
            match &res {
                Ok(()) => debug!(elapsed_us = %d.as_micros(), in_len = data.len(), out_len = buf.len(), "decompress finished"),
                Err(err) => error!(elapsed_us = %d.as_micros(), in_len = data.len(), error = %err, "decompress failed"),
            }
        }}
        if_not_tracing! {{
            let _ = d;
        }}
        res
    }
}
