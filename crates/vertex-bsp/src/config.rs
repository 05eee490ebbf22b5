//! Build configuration and tuning constants.

/// Default epsilon exponent: points closer than `1e-5` to a plane count as on it.
pub const DEFAULT_EPSILON_EXPONENT: u32 = 5;

/// Default number of pivot candidates from which scoring is spread over worker threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Remaining stack below which recursive routines switch to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated for deep recursion.
const STACK_GROWTH: usize = 1024 * 1024;

/// Settings that control how a tree classifies and partitions geometry.
///
/// The configuration is stored in the tree so that later operations
/// (notably [`BspTree::unify`](crate::BspTree::unify)) classify with the same
/// tolerance the tree was built with.
///
/// ```
/// use vertex_bsp::BspConfig;
///
/// let config = BspConfig::default().with_epsilon_exponent(3);
/// assert!((config.epsilon() - 1e-3).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BspConfig {
    epsilon_exponent: u32,
    parallel_threshold: usize,
}

impl BspConfig {
    /// Sets the decimal exponent of the classification epsilon.
    ///
    /// `0` means a tolerance of `1`, `1` means `0.1`, `2` means `0.01` and so on.
    /// Pick it according to the physical scale of the model.
    pub fn with_epsilon_exponent(mut self, exponent: u32) -> Self {
        self.epsilon_exponent = exponent;
        self
    }

    /// Sets the candidate count from which pivot scoring runs in parallel.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns the decimal epsilon exponent.
    #[inline]
    pub fn epsilon_exponent(&self) -> u32 {
        self.epsilon_exponent
    }

    /// Returns the parallel scoring threshold.
    #[inline]
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Returns the classification tolerance, `10^-exponent`.
    pub fn epsilon(&self) -> f32 {
        let exponent = i32::try_from(self.epsilon_exponent).unwrap_or(i32::MAX);
        10f32.powi(-exponent)
    }
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            epsilon_exponent: DEFAULT_EPSILON_EXPONENT,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Runs a recursive step, growing the stack on the heap when it runs low.
#[inline]
pub(crate) fn guard_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, f)
}
