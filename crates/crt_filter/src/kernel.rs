//! The horizontal blur applied on top of the phosphor mask.

/// Number of taps on each side of the center, center included.
pub const BLUR_TAPS: usize = 5;

/// Horizontal offsets of the taps, in source pixels.
pub const BLUR_OFFSETS: [f32; BLUR_TAPS] = [0.0, 1.0, 2.0, 3.0, 4.0];

/// Gaussian weights of the taps.
///
/// The center tap is sampled once and every other tap twice (left and right), so
/// `BLUR_WEIGHTS[0] + 2 * (BLUR_WEIGHTS[1] + … + BLUR_WEIGHTS[4]) == 1`.
///
/// Weighting the center twice as well would give a gain of about 1.227 and brighten the
/// output. The center is counted once on purpose.
pub const BLUR_WEIGHTS: [f32; BLUR_TAPS] = [
    0.227_027_03,
    0.194_594_6,
    0.121_621_62,
    0.054_054_055,
    0.016_216_217,
];

/// Total gain of the kernel when applied to a flat image.
pub fn blur_gain() -> f64 {
    let sides: f64 = BLUR_WEIGHTS[1..].iter().map(|&w| f64::from(w)).sum();
    f64::from(BLUR_WEIGHTS[0]) + 2.0 * sides
}
