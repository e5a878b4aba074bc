//! The cipher-mode contract shared by `cbc-mode`, `cfb-mode`, `ctr-mode`, and
//! `ofb-mode` (spec §4.4 "Cipher-mode engine").

use crate::{block_cipher::BLOCK_SIZE, CipherDirection, Error};

/// Default parallel block size: a cache-friendly multiple of the block size
/// times the platform's reported core count (spec §3 "preset to a
/// cache-friendly default").
///
/// 32 KiB is half of a typical 64 KiB L1 data cache, matching CEX's
/// "L1D/2 per worker" sizing rationale; multiplying by worker count happens
/// at construction time once the degree of parallelism is known.
pub const DEFAULT_PARALLEL_BLOCK_SIZE_PER_WORKER: usize = 32 * 1024;

/// Smallest legal parallel block size: one wide-block's worth of work per
/// worker is not useful, so the floor is the minimum useful segment,
/// 1024 bytes (spec §8 "boundary behaviors", `parallel_min`).
pub const PARALLEL_MIN: usize = 1024;

/// Largest legal parallel block size. Bounds the tuning knob of spec §4.4's
/// `ParallelBlockSizeInvalid` failure mode.
pub const PARALLEL_MAX: usize = 32 * 1024 * 1024;

/// Tunable knobs controlling a mode's parallel fan-out (spec §5 "Scheduling
/// model").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParallelOptions {
    /// Enables the parallel decomposition at all. When `false`, the mode
    /// always runs the sequential path regardless of buffer size.
    pub is_parallel: bool,
    /// Number of workers to fan out across; must be a positive power of two
    /// not exceeding the platform's reported core count.
    pub degree: usize,
    /// Threshold, in bytes, at and above which `transform` fans out. Must be
    /// a multiple of `block_size * degree` and lie within
    /// `[PARALLEL_MIN, PARALLEL_MAX]`.
    pub parallel_block_size: usize,
}

impl ParallelOptions {
    /// Build options for `degree` workers using the default cache-friendly
    /// block size.
    #[must_use]
    pub fn with_degree(degree: usize) -> Self {
        let per_worker = DEFAULT_PARALLEL_BLOCK_SIZE_PER_WORKER;
        Self {
            is_parallel: degree > 1,
            degree: degree.max(1),
            parallel_block_size: per_worker * degree.max(1),
        }
    }

    /// Options for the platform's reported core count.
    #[must_use]
    pub fn for_this_machine() -> Self {
        Self::with_degree(num_cpus_hint())
    }

    /// Sequential-only options (`is_parallel = false`).
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            is_parallel: false,
            degree: 1,
            parallel_block_size: PARALLEL_MIN,
        }
    }

    /// Validate `parallel_block_size` against `block_size * degree` and the
    /// `[PARALLEL_MIN, PARALLEL_MAX]` range.
    pub fn validate(&self, block_size: usize) -> Result<(), Error> {
        let required_multiple = block_size * self.degree;
        let in_range =
            self.parallel_block_size >= PARALLEL_MIN && self.parallel_block_size <= PARALLEL_MAX;
        let aligned = required_multiple != 0 && self.parallel_block_size % required_multiple == 0;
        if !in_range || !aligned {
            return Err(Error::ParallelBlockSizeInvalid {
                actual: self.parallel_block_size,
                required_multiple,
                min: PARALLEL_MIN,
                max: PARALLEL_MAX,
            });
        }
        Ok(())
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self::for_this_machine()
    }
}

/// Reads the platform core count without pulling `num_cpus` into `hx-core`
/// itself (only `hx-parallel` depends on it); falls back to 1.
fn num_cpus_hint() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

/// A block-cipher mode of operation: CBC, CFB, CTR/ICM, or OFB.
///
/// State machine (spec §4.4 "State machine"): `Fresh` -> `Initialized` ->
/// `Transforming` -> (`Initialized` | `Closed`). Implementors track this
/// internally; `transform` must fail with [`Error::NotInitialized`] before
/// [`CipherMode::initialize`] has succeeded.
pub trait CipherMode {
    /// Human-readable mode name, e.g. `"CBC"`.
    fn name(&self) -> &'static str;

    /// Block size of the wrapped cipher (always [`BLOCK_SIZE`] in this
    /// workspace).
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Seed the mode's IV/feedback/counter register and select direction.
    ///
    /// # Errors
    /// [`Error::InvalidIvSize`] if `iv.len() != self.block_size()`.
    fn initialize(&mut self, direction: CipherDirection, iv: &[u8]) -> Result<(), Error>;

    /// `true` once `initialize` has completed successfully.
    fn is_initialized(&self) -> bool;

    /// Transform `input` into `output`, advancing internal state as if the
    /// call were the continuation of every prior `transform` call on this
    /// instance.
    ///
    /// # Errors
    /// [`Error::NotInitialized`] before init; [`Error::BufferMisaligned`] for
    /// modes whose sequential path requires block-aligned input (CBC, CFB in
    /// non-tail calls); [`Error::BufferTooShort`] if `output` is shorter than
    /// `input`.
    fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error>;

    /// `true` if this mode requires block-aligned input on `transform`
    /// (CBC, CFB). `false` for genuine stream-cipher modes (CTR, OFB),
    /// which accept arbitrary lengths and rely on their own partial-tail
    /// handling instead of padding (spec §4.8 "Cipher stream").
    fn requires_alignment(&self) -> bool {
        true
    }

    /// Current parallel-fan-out configuration.
    fn parallel_options(&self) -> ParallelOptions;

    /// Replace the parallel-fan-out configuration.
    ///
    /// # Errors
    /// [`Error::ParallelBlockSizeInvalid`] if the options are out of range
    /// for this mode's block size.
    fn set_parallel_options(&mut self, options: ParallelOptions) -> Result<(), Error>;

    /// The mode's current IV/feedback/counter register, exposed read-only so
    /// callers can persist/resume a stream (e.g. `ctr-drbg`).
    fn iv_current(&self) -> &[u8];
}
