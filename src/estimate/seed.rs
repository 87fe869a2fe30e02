//! Per-comparison random seeds.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(hash: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(hash, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derive the seed of one (entity, comparator) comparison from the run seed.
///
/// Depends only on its inputs, so results do not change with scheduling
/// order or thread count.
pub fn derive_seed(run_seed: u64, entity: &str, comparator: &str) -> u64 {
    let mut hash = fnv1a(FNV_OFFSET, entity.as_bytes());
    // Separator byte keeps ("ab", "c") and ("a", "bc") apart.
    hash = fnv1a(hash, &[0xff]);
    hash = fnv1a(hash, comparator.as_bytes());
    splitmix64(hash ^ run_seed)
}
