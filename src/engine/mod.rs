//! Host-facing entry point: bundles the magic attack tables with a resizable
//! transposition table and wires a [`SearchRequest`] to the
//! [`SearchCallbacks`] contract in [`crate::search::interface`]. This is the
//! only place in the crate that
//! parses a FEN plus a move prefix into a root position and turns the §4.9
//! time formula into a concrete deadline; the negamax driver itself never
//! sees a clock setting beyond the `Option<Duration>` it is handed.

use crate::board::Board;
use crate::moves::execute::{generate_legal, make_move_basic};
use crate::moves::magic::MagicTables;
use crate::moves::magic::loader::load_magic_tables;
use crate::moves::types::Move;
use crate::search::eval::game_phase_256;
use crate::search::interface::{
    ScoreReport, SearchCallbacks, SearchInfo, SearchRequest, StopFlag,
};
use crate::search::search::{IterationReport, MATE_SCORE, search_with_callback};
use crate::search::tt::TranspositionTable;
use arrayvec::ArrayVec;
use std::str::FromStr;
use std::time::Duration;

const MATE_THRESHOLD: i32 = MATE_SCORE - 1000;

/// `Hash` option range in megabytes, mirroring the teacher's UCI bounds.
pub const MIN_HASH_MB: usize = 1;
pub const MAX_HASH_MB: usize = 32768;
const DEFAULT_HASH_MB: usize = 16;

/// Everything a host program needs to run repeated searches: the magic
/// attack tables (built once, behind [`load_magic_tables`]'s own process-wide
/// cache) and a resizable transposition table that persists across
/// `run_search` calls the way a UCI `Hash` option persists until
/// `ucinewgame`.
pub struct Engine {
    tables: MagicTables,
    tt: TranspositionTable,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_MB)
    }
}

impl Engine {
    pub fn new(hash_mb: usize) -> Self {
        Self {
            tables: load_magic_tables(),
            tt: TranspositionTable::new(hash_mb.clamp(MIN_HASH_MB, MAX_HASH_MB)),
        }
    }

    /// Resize the table, discarding its contents.
    pub fn set_hash_mb(&mut self, hash_mb: usize) {
        self.tt.resize(hash_mb.clamp(MIN_HASH_MB, MAX_HASH_MB));
    }

    /// Drop all stored positions without reallocating, as `ucinewgame` would.
    pub fn clear_hash(&mut self) {
        self.tt.clear();
    }

    /// Run one search to completion. `send_info` fires once per finished
    /// iteration; `send_bestmove` fires exactly once, at the end, even if
    /// the request's FEN or move prefix is malformed.
    pub fn run_search(
        &mut self,
        request: &SearchRequest,
        stop: &StopFlag,
        callbacks: &mut dyn SearchCallbacks,
    ) -> (i32, Option<Move>) {
        let tables = &self.tables;
        self.tt.new_search();

        let mut board = match Board::from_str(&request.fen) {
            Ok(b) => b,
            Err(_) => {
                callbacks.send_bestmove(None);
                return (0, None);
            }
        };

        for lan in &request.moves {
            match parse_lan_move(&board, lan, tables) {
                Some(mv) => {
                    make_move_basic(&mut board, mv);
                }
                None => {
                    callbacks.send_bestmove(None);
                    return (0, None);
                }
            }
        }

        let mut max_depth = request.max_depth.unwrap_or(64);
        // §6: a `mate_distance_limit` of n bounds the search to lines that
        // could plausibly deliver or refute a mate in n moves (2n plies),
        // the same way a UCI `go mate n` caps search depth.
        if let Some(mate_n) = request.mate_distance_limit {
            max_depth = max_depth.min(mate_n.max(1) * 2);
        }
        let time_limit = allocate_time(request, &board);

        let (score, best_move) = search_with_callback(
            &mut board,
            tables,
            &mut self.tt,
            max_depth,
            time_limit,
            Some(stop),
            request.max_nodes,
            |report: &IterationReport| callbacks.send_info(&to_search_info(report)),
        );

        callbacks.send_bestmove(best_move);
        (score, best_move)
    }
}

fn to_search_info(report: &IterationReport) -> SearchInfo {
    let score = if report.score.abs() >= MATE_THRESHOLD {
        let plies_to_mate = MATE_SCORE - report.score.abs() + 1;
        let moves_to_mate = (plies_to_mate + 1) / 2;
        ScoreReport::MateIn(if report.score > 0 {
            moves_to_mate
        } else {
            -moves_to_mate
        })
    } else {
        ScoreReport::Centipawns(report.score)
    };

    let nps = if report.time_ms > 0 {
        (report.nodes as u128 * 1000 / report.time_ms) as u64
    } else {
        0
    };

    SearchInfo {
        depth: report.depth,
        nodes: report.nodes,
        nps,
        time_ms: report.time_ms,
        score,
        lowerbound: false,
        pv: Some(report.best_move),
    }
}

/// Parse a LAN move (`e2e4`, `e7e8q`) by matching it against the legal move
/// list, rather than trusting the string to encode a well-formed move.
fn parse_lan_move(board: &Board, lan: &str, tables: &MagicTables) -> Option<Move> {
    use crate::board::Piece;

    let chars: Vec<char> = lan.chars().collect();
    if chars.len() < 4 {
        return None;
    }

    let from_file = (chars[0] as u8).wrapping_sub(b'a');
    let from_rank = (chars[1] as u8).wrapping_sub(b'1');
    let to_file = (chars[2] as u8).wrapping_sub(b'a');
    let to_rank = (chars[3] as u8).wrapping_sub(b'1');
    if from_file > 7 || from_rank > 7 || to_file > 7 || to_rank > 7 {
        return None;
    }
    let from_square = (from_rank * 8 + from_file) as usize;
    let to_square = (to_rank * 8 + to_file) as usize;

    let promo_piece = if chars.len() >= 5 {
        match chars[4] {
            'q' => Some(Piece::Queen),
            'r' => Some(Piece::Rook),
            'b' => Some(Piece::Bishop),
            'n' => Some(Piece::Knight),
            _ => return None,
        }
    } else {
        None
    };

    let mut moves: ArrayVec<Move, 256> = ArrayVec::new();
    let mut scratch: ArrayVec<Move, 256> = ArrayVec::new();
    let mut board_copy = board.clone();
    generate_legal(&mut board_copy, tables, &mut moves, &mut scratch);

    moves.into_iter().find(|mv| {
        mv.from.index() as usize == from_square
            && mv.to.index() as usize == to_square
            && mv.promotion == promo_piece
    })
}

/// §4.9: split the side-to-move's clock across its remaining moves,
/// weighted toward the middlegame by the game phase. Falls back to no limit
/// (search runs to `max_depth`) when the request carries no clock at all.
fn allocate_time(request: &SearchRequest, board: &Board) -> Option<Duration> {
    use crate::board::Color;

    if let Some(ms) = request.move_time_ms {
        return Some(Duration::from_millis(ms));
    }

    let (time_ms, inc_ms) = match board.side_to_move {
        Color::White => (request.white_time_ms, request.white_inc_ms.unwrap_or(0)),
        Color::Black => (request.black_time_ms, request.black_inc_ms.unwrap_or(0)),
    };
    let time_ms = time_ms?;

    let moves_to_go = request.moves_to_go.unwrap_or(0);
    let allotted_ms = if moves_to_go == 1 {
        let t = time_ms as f64 / 1000.0;
        let fraction = t.powf(1.1) / (t + 1.0).powf(1.1);
        (time_ms as f64 * fraction) as u64
    } else {
        let m = if moves_to_go > 0 { moves_to_go.min(40) } else { 40 } as i64;
        let p = game_phase_256(board) as i64;
        let divisor = ((m * (256 - p) + 8 * p) / 256).max(1) as u64;
        (time_ms + inc_ms) / divisor
    };

    Some(Duration::from_millis(allotted_ms.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::interface::NullCallbacks;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn run_search_finds_mate_in_one() {
        let mut engine = Engine::new(1);
        let stop = AtomicBool::new(false);
        let mut callbacks = NullCallbacks;
        let request = SearchRequest {
            fen: "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1".to_string(),
            max_depth: Some(3),
            ..Default::default()
        };

        let (score, best_move) = engine.run_search(&request, &stop, &mut callbacks);
        let mv = best_move.expect("mate in one should be found");
        assert_eq!(mv.to_uci(), "a1a8");
        // §4.8: INF - n for a mate delivered in n plies; mate in one is INF - 1.
        assert_eq!(score, crate::search::search::INF - 1);
    }

    #[test]
    fn malformed_move_prefix_reports_no_move() {
        let mut engine = Engine::new(1);
        let stop = AtomicBool::new(false);
        let mut callbacks = NullCallbacks;
        let request = SearchRequest {
            moves: vec!["z9z9".to_string()],
            max_depth: Some(2),
            ..Default::default()
        };

        let (score, best_move) = engine.run_search(&request, &stop, &mut callbacks);
        assert_eq!(score, 0);
        assert!(best_move.is_none());
    }

    #[test]
    fn move_time_is_honored_as_a_hard_cap() {
        let request = SearchRequest {
            move_time_ms: Some(250),
            ..Default::default()
        };
        let board = Board::new();
        let limit = allocate_time(&request, &board).unwrap();
        assert_eq!(limit, Duration::from_millis(250));
    }

    #[test]
    fn mate_distance_limit_caps_max_depth() {
        let mut engine = Engine::new(1);
        let stop = AtomicBool::new(false);
        let mut callbacks = NullCallbacks;
        let request = SearchRequest {
            fen: "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1".to_string(),
            max_depth: Some(64),
            mate_distance_limit: Some(1),
            ..Default::default()
        };

        let (_, best_move) = engine.run_search(&request, &stop, &mut callbacks);
        // mate_distance_limit of 1 caps the search at 2 plies; a mate-in-one
        // is still well within reach and should still be found.
        let mv = best_move.expect("mate in one should still be found");
        assert_eq!(mv.to_uci(), "a1a8");
    }

    #[test]
    fn moves_to_go_one_uses_the_short_time_fraction() {
        let request = SearchRequest {
            white_time_ms: Some(10_000),
            moves_to_go: Some(1),
            ..Default::default()
        };
        let board = Board::new();
        let limit = allocate_time(&request, &board).unwrap();
        // Fraction is well under half of the remaining time for short clocks.
        assert!(limit < Duration::from_millis(10_000));
        assert!(limit > Duration::from_millis(0));
    }
}
