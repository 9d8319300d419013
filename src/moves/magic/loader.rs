//! Process-wide access to the magic bitboard tables.
//!
//! The tables are expensive to generate (≈128 per-square magic searches) so
//! they are built once, lazily, behind a [`OnceCell`], exactly the way the
//! Zobrist key table is handled in [`crate::hash::zobrist`].

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;
use once_cell::sync::OnceCell;

/// Fixed constant used whenever reproducible tables are required (tests, and
/// the `deterministic_magic`/`load_magic` features).
const MAGIC_SEED: u64 = 0x1F2E_3D4C_5B6A_7988;

fn build_tables() -> MagicTables {
    #[cfg(any(feature = "deterministic_magic", feature = "load_magic"))]
    {
        generate_magic_tables(MagicTableSeed::Fixed(MAGIC_SEED))
            .expect("magic table generation failed for the fixed seed")
    }
    #[cfg(not(any(feature = "deterministic_magic", feature = "load_magic")))]
    {
        generate_magic_tables(MagicTableSeed::Random)
            .expect("magic table generation failed")
    }
}

static TABLES: OnceCell<MagicTables> = OnceCell::new();

/// Returns the process-wide rook/bishop magic attack tables, generating them
/// on first use. Cloning is cheap relative to generation: callers that need
/// repeated lookups should hold onto the returned value rather than calling
/// this in a hot loop.
pub fn load_magic_tables() -> MagicTables {
    TABLES.get_or_init(build_tables).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_is_idempotent() {
        let a = load_magic_tables();
        let b = load_magic_tables();
        assert_eq!(a.rook.entries[0].magic, b.rook.entries[0].magic);
        assert_eq!(a.bishop.entries[0].magic, b.bishop.entries[0].magic);
    }
}
