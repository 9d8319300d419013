//! Offline generation of magic bitboard tables for rooks and bishops.
//!
//! Builds the relevant-occupancy mask for every square, enumerates every
//! submask of that mask via the Carry-Rippler trick, finds a magic multiplier
//! that maps each submask to a unique index via [`find_magic_number_for_square`],
//! and bakes the resulting attack table.

use super::attacks::{bishop_attacks_per_square, rook_attacks_per_square};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::{RngCore, SeedableRng, rngs::StdRng};

const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = 0x8080_8080_8080_8080;
const RANK_1: u64 = 0x0000_0000_0000_00FF;
const RANK_8: u64 = 0xFF00_0000_0000_0000;
const EDGES: u64 = FILE_A | FILE_H | RANK_1 | RANK_8;

/// How to seed the PRNG used during magic-number search.
pub enum MagicTableSeed {
    /// A fixed seed, for reproducible tables (used by tests and by the
    /// `deterministic_magic` feature).
    Fixed(u64),
    /// Seed from OS randomness.
    Random,
}

fn rng_for(seed: &MagicTableSeed) -> StdRng {
    match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(*s),
        MagicTableSeed::Random => {
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            StdRng::from_seed(bytes)
        }
    }
}

fn rook_mask(square: usize) -> u64 {
    let full = rook_attacks_per_square(square, 0);
    let rank = square / 8;
    let file = square % 8;
    // Exclude edges, except the edge that is this square's own rank/file terminus
    // is still excluded: relevant occupancy never includes the final square on a ray.
    let mut mask = full & !EDGES;
    // A rook on an edge rank/file still needs the orthogonal edge excluded correctly;
    // re-including same-rank/file edge bits that aren't part of `EDGES` for this square
    // would be wrong, so nothing further is required: `full` already stops one square
    // short of the board edge along any ray that doesn't start on that edge.
    let _ = (rank, file);
    mask
}

fn bishop_mask(square: usize) -> u64 {
    bishop_attacks_per_square(square, 0) & !EDGES
}

/// Enumerate every submask of `mask` via the Carry-Rippler technique.
fn submasks(mask: u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(1usize << mask.count_ones());
    let mut submask = 0u64;
    loop {
        out.push(submask);
        submask = submask.wrapping_sub(mask) & mask;
        if submask == 0 {
            break;
        }
    }
    out
}

fn build_rook_entries(rng: &mut StdRng) -> Result<Vec<MagicEntry>, String> {
    let mut entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = rook_mask(square);
        let shift = 64 - mask.count_ones();
        let blockers = submasks(mask);
        let attacks: Vec<u64> = blockers
            .iter()
            .map(|&b| rook_attacks_per_square(square, b))
            .collect();

        let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

        let table_size = 1usize << mask.count_ones();
        let mut table = vec![0u64; table_size];
        for (b, a) in blockers.iter().zip(attacks.iter()) {
            let index = ((b.wrapping_mul(magic)) >> shift) as usize;
            table[index] = *a;
        }

        entries.push(MagicEntry {
            magic,
            shift,
            mask,
            table: table.into_boxed_slice(),
        });
    }
    Ok(entries)
}

fn build_bishop_entries(rng: &mut StdRng) -> Result<Vec<MagicEntry>, String> {
    let mut entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = bishop_mask(square);
        let shift = 64 - mask.count_ones();
        let blockers = submasks(mask);
        let attacks: Vec<u64> = blockers
            .iter()
            .map(|&b| bishop_attacks_per_square(square, b))
            .collect();

        let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

        let table_size = 1usize << mask.count_ones();
        let mut table = vec![0u64; table_size];
        for (b, a) in blockers.iter().zip(attacks.iter()) {
            let index = ((b.wrapping_mul(magic)) >> shift) as usize;
            table[index] = *a;
        }

        entries.push(MagicEntry {
            magic,
            shift,
            mask,
            table: table.into_boxed_slice(),
        });
    }
    Ok(entries)
}

/// Generate complete rook and bishop magic tables for all 64 squares.
pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = rng_for(&seed);
    let rook = RookMagicTables {
        entries: build_rook_entries(&mut rng)?,
    };
    let bishop = BishopMagicTables {
        entries: build_bishop_entries(&mut rng)?,
    };
    Ok(MagicTables { rook, bishop })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submasks_of_zero_is_just_zero() {
        assert_eq!(submasks(0), vec![0]);
    }

    #[test]
    fn submasks_count_matches_popcount() {
        let mask = 0b1011u64;
        let subs = submasks(mask);
        assert_eq!(subs.len(), 1 << mask.count_ones());
        // every submask must be a subset of mask
        assert!(subs.iter().all(|&s| s & !mask == 0));
    }

    #[test]
    fn rook_mask_excludes_board_edges() {
        let mask = rook_mask(27); // d4
        assert_eq!(mask & EDGES, 0);
    }

    #[test]
    fn generated_tables_reproduce_scan_attacks() {
        let tables = generate_magic_tables(MagicTableSeed::Fixed(0x45)).unwrap();
        let d4 = 27usize;
        let blockers = (1u64 << 19) | (1u64 << 35); // d3, d6
        assert_eq!(
            tables.rook.get_attacks(d4, blockers),
            rook_attacks_per_square(d4, blockers)
        );
        let blockers_b = (1u64 << 41) | (1u64 << 21); // b6, f2
        assert_eq!(
            tables.bishop.get_attacks(d4, blockers_b),
            bishop_attacks_per_square(d4, blockers_b)
        );
    }
}
