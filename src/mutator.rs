pub use anyhow::Result;

/// A reversible transformation over whole byte buffers.
///
/// [`drive_mutation`](Mutator::drive_mutation) compresses `data` into `buf`,
/// [`revert_mutation`](Mutator::revert_mutation) undoes it. Both replace the
/// previous contents of `buf`.
pub trait Mutator {
    fn drive_mutation(&mut self, data: &[u8], buf: &mut Vec<u8>) -> Result<()>;
    fn revert_mutation(&mut self, data: &[u8], buf: &mut Vec<u8>) -> Result<()>;

    /// Runs `data` forward and back again.
    ///
    /// Use for sanity checking. An `Err` means one of the directions failed
    /// outright; a mismatch is reported through [`RoundTripTestResult::is_successful`].
    fn test_roundtrip<'orig>(&mut self, data: &'orig [u8]) -> Result<RoundTripTestResult<'orig>> {
        let mut compressed = Vec::new();
        self.drive_mutation(data, &mut compressed)?;
        let mut decompressed = Vec::new();
        self.revert_mutation(&compressed, &mut decompressed)?;

        Ok(RoundTripTestResult {
            equal: data == decompressed.as_slice(),
            original: data,
            compressed,
            decompressed,
        })
    }
}

/// Outcome of [`Mutator::test_roundtrip`].
#[derive(Clone, Debug, Hash)]
pub struct RoundTripTestResult<'orig> {
    equal: bool,
    original: &'orig [u8],
    compressed: Vec<u8>,
    decompressed: Vec<u8>,
}

impl<'orig> RoundTripTestResult<'orig> {
    /// Whether the original and decompressed data were equal.
    pub const fn is_successful(&self) -> bool {
        self.equal
    }

    pub const fn get_original(&self) -> &'orig [u8] {
        self.original
    }

    pub fn get_compressed(&self) -> &[u8] {
        self.compressed.as_slice()
    }

    pub fn get_decompressed(&self) -> &[u8] {
        self.decompressed.as_slice()
    }

    /// Compressed size over original size; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original.is_empty() {
            0.0
        } else {
            self.compressed.len() as f64 / self.original.len() as f64
        }
    }
}
