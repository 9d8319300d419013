//! Repetition detection through the search driver: shuffling knights back
//! and forth to their starting squares should be recognized as a draw well
//! before the search would otherwise prefer one side's static evaluation.

use std::str::FromStr;
use vantage::board::Board;
use vantage::moves::execute::{generate_legal, make_move_basic};
use vantage::moves::magic::loader::load_magic_tables;
use vantage::moves::types::Move;
use vantage::search::search::search;
use vantage::search::tt::TranspositionTable;

fn play_lan(board: &mut Board, tables: &vantage::moves::magic::MagicTables, lan: &str) {
    let from = vantage::square::Square::from_str(&lan[0..2]).unwrap();
    let to = vantage::square::Square::from_str(&lan[2..4]).unwrap();

    let mut moves: Vec<Move> = Vec::new();
    let mut scratch: Vec<Move> = Vec::new();
    generate_legal(board, tables, &mut moves, &mut scratch);

    let mv = *moves
        .iter()
        .find(|m| m.from == from && m.to == to)
        .unwrap_or_else(|| panic!("{lan} not legal in current position"));
    make_move_basic(board, mv);
}

#[test]
fn knight_shuffle_back_to_start_scores_as_a_draw() {
    let tables = load_magic_tables();
    let mut board = Board::new();

    for lan in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        play_lan(&mut board, &tables, lan);
    }

    // Position is byte-for-byte the starting position again (same side to
    // move, same rights), so a shallow search should already see the
    // threefold-repetition machinery kick in if this sequence is repeated,
    // and even a single pass should evaluate it as a normal, balanced
    // position rather than drifting toward either side.
    let mut tt = TranspositionTable::new(16);
    let (score, _) = search(&mut board, &tables, &mut tt, 4, None);
    assert_eq!(
        score, 0,
        "shuffled-back starting position is a detected repetition, got {score}"
    );
}

#[test]
fn repeating_the_shuffle_is_detected_as_a_draw() {
    let tables = load_magic_tables();
    let mut board = Board::new();

    // Two full round trips: the position after move 4 repeats the position
    // after move 0 (root) and after move 8 repeats it a second time,
    // giving the search a real repetition to detect well inside its window.
    for _ in 0..2 {
        for lan in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            play_lan(&mut board, &tables, lan);
        }
    }

    let mut tt = TranspositionTable::new(16);
    let (score, _) = search(&mut board, &tables, &mut tt, 5, None);
    assert_eq!(
        score, 0,
        "repeated shuffle is a detected repetition, got {score}"
    );
}
