//! Value noise and fractal Brownian motion (fBm).
//!
//! Lattice values come from an integer mixing function, so every sample is a
//! pure function of `(seed, x, z)` and can be evaluated on any thread in any
//! order.

use glam::DVec2;

const PRIME_X: u64 = 0x9E37_79B9_7F4A_7C15;
const PRIME_Z: u64 = 0xC2B2_AE3D_27D4_EB4F;

/// splitmix64 finalizer.
#[inline]
fn mix64(mut v: u64) -> u64 {
    v = (v ^ (v >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    v = (v ^ (v >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    v ^ (v >> 31)
}

/// Pseudo-random value in `[0, 1)` for integer lattice point `(x, z)`.
#[inline]
pub fn lattice_value(seed: u64, x: i64, z: i64) -> f64 {
    let h = mix64(seed.wrapping_add((x as u64).wrapping_mul(PRIME_X)));
    let h = mix64(h ^ (z as u64).wrapping_mul(PRIME_Z));
    // Top 53 bits fill an f64 mantissa exactly.
    (h >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// 2D value noise: lattice values bilinearly interpolated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueNoise {
    seed: u64,
}

impl ValueNoise {
    /// Create a noise field for `seed`.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Sample at `point`. Output is in `[0, 1)`.
    pub fn sample(&self, point: DVec2) -> f64 {
        let floor = point.floor();
        let frac = point - floor;
        let (x0, z0) = (floor.x as i64, floor.y as i64);

        let v00 = lattice_value(self.seed, x0, z0);
        let v01 = lattice_value(self.seed, x0, z0 + 1);
        let v10 = lattice_value(self.seed, x0 + 1, z0);
        let v11 = lattice_value(self.seed, x0 + 1, z0 + 1);

        let top = v00 + frac.x * (v10 - v00);
        let bottom = v01 + frac.x * (v11 - v01);
        top + frac.y * (bottom - top)
    }
}

/// Fractal Brownian motion over [`ValueNoise`].
///
/// Layer `o` uses seed `seed + o`, frequency `frequency * 2^o`, and amplitude
/// `2^-o`. The sum is divided by `2 - 2^-(octaves-1)`, the total amplitude,
/// so output stays in `[0, 1)` whatever the octave count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fbm {
    /// Seed of the first layer.
    pub seed: u64,
    /// Number of layers. `0` is treated as `1`.
    pub octaves: u32,
    /// Frequency of the first layer.
    pub frequency: f64,
}

impl Fbm {
    /// Octave count used for terrain heights.
    pub const HEIGHT_OCTAVES: u32 = 5;

    /// Create an fBm sampler.
    pub fn new(seed: u64, octaves: u32, frequency: f64) -> Self {
        Self {
            seed,
            octaves,
            frequency,
        }
    }

    /// Sample at `point`.
    pub fn sample(&self, point: DVec2) -> f64 {
        let octaves = self.octaves.max(1);
        let mut total = 0.0;
        let mut frequency = self.frequency;
        let mut amplitude = 1.0;

        for layer in 0..octaves {
            let noise = ValueNoise::new(self.seed.wrapping_add(u64::from(layer)));
            total += amplitude * noise.sample(point * frequency);
            frequency *= 2.0;
            amplitude *= 0.5;
        }

        total / self.amplitude_sum()
    }

    /// Sum of all layer amplitudes: `2 - 2^-(octaves-1)`.
    pub fn amplitude_sum(&self) -> f64 {
        let octaves = self.octaves.max(1);
        2.0 - 0.5_f64.powi(octaves as i32 - 1)
    }
}

/// Min-max normalize `values` into `[0, 1]` in place.
///
/// A set with zero spread (including an empty or single-element set) becomes
/// all zeros.
pub fn normalize_min_max(values: &mut [f64]) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let spread = max - min;
    if spread <= 0.0 || !spread.is_finite() {
        values.fill(0.0);
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - min) / spread;
    }
}
