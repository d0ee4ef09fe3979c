//! Deterministic positional jitter for co-located markers.

/// Width of the offset range on each axis, in degrees. Offsets fall in
/// `[-JITTER_MAGNITUDE / 2, JITTER_MAGNITUDE / 2]`, so at most ~2.8 m.
const JITTER_MAGNITUDE: f64 = 0.000_05;

/// Nudges a point by a few meters, deterministically.
///
/// Many events share a venue, so identical coordinates are common; a
/// small per-marker offset keeps them visually separable. The offset is
/// derived from the coordinates themselves plus a response-local ordinal
/// `salt` via the classic `sin`-hash-to-float trick, so the same inputs
/// always produce the same output while different salts decorrelate
/// markers sitting on the same spot. Not a source of randomness.
#[must_use]
pub fn jitter(lat: f64, lng: f64, salt: u32) -> (f64, f64) {
    let s = ((lat + lng + f64::from(salt)) * 12.9898).sin() * 43758.5453;
    let r1 = fract(s) - 0.5;
    let r2 = fract(s * 1.1337) - 0.5;

    (
        r1.mul_add(JITTER_MAGNITUDE, lat),
        r2.mul_add(JITTER_MAGNITUDE, lng),
    )
}

/// Fractional part in `[0, 1)` for negative inputs too, unlike
/// `f64::fract`.
fn fract(x: f64) -> f64 {
    x - x.floor()
}
