//! Stable per-class colors for the overlay renderer.
//!
//! The renderer draws each detection class in its own color. The color is a
//! pure function of the class id so that a class keeps its color across
//! frames and runs without any shared RNG state.

/// Offset mixed into the class id before hashing.
const CLASS_SEED_OFFSET: u64 = 8;

/// Returns an RGB color for `class_id`.
pub fn color(class_id: u32) -> (u8, u8, u8) {
    let mixed = splitmix64(class_id as u64 + CLASS_SEED_OFFSET);
    let [r, g, b, ..] = mixed.to_le_bytes();
    (r, g, b)
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
