/// Injectable source of pseudo-random draws.
///
/// Everything in the pipeline that "adds variety" (fallback viseme choice, deformation jitter)
/// draws from one of these, so a fixed seed reproduces a job exactly.
pub trait RandomSource: Send {
    /// Next raw 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Uniform `f64` in `[0, 1)`.
    fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform `f64` in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64_01()
    }

    /// Uniform integer in `[lo, hi]` (both inclusive). Returns `lo` when `hi < lo`.
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (i64::from(hi) - i64::from(lo) + 1) as u64;
        (i64::from(lo) + (self.next_u64() % span) as i64) as i32
    }

    /// Uniform index in `[0, len)`; `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len.max(1) as u64) as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from a 128-bit identifier (e.g. a job id).
    pub fn from_u128(v: u128) -> Self {
        Self::new(fold_u128(v))
    }
}

/// XOR the two halves of a 128-bit value into a 64-bit seed.
pub fn fold_u128(v: u128) -> u64 {
    (v as u64) ^ ((v >> 64) as u64)
}

impl RandomSource for Rng64 {
    fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}
