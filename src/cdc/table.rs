//! Byte substitution table shared by the rolling hashes.

/// Seed for the table generator. Changing it changes every chunk boundary.
const TABLE_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// 256 pseudo-random words, one per byte value.
///
/// Generated at compile time with splitmix64 so boundaries are identical on
/// every platform and build.
pub(crate) static BYTE_TABLE: [u64; 256] = generate(TABLE_SEED);

const fn generate(seed: u64) -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut state = seed;
    let mut i = 0;
    while i < 256 {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        table[i] = z ^ (z >> 31);
        i += 1;
    }
    table
}
