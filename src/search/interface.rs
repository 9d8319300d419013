//! Decoupled search entry contract: the negamax driver in [`crate::search::search`]
//! never touches stdout directly. Instead it reports progress through
//! `SearchCallbacks`, and checks an externally-owned stop flag so an I/O
//! adapter (a UCI loop, a demo binary, a wasm host) can cancel a search in
//! flight.

use crate::moves::types::Move;
use std::sync::atomic::AtomicBool;

/// A `go`-style request: initial position plus the knobs a time manager and
/// search driver need. All time/node fields are optional; an adapter fills
/// in only what its protocol supplied.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Starting position.
    pub fen: String,
    /// LAN moves applied to `fen` before search begins, to reach the true
    /// root. Their hashes are retained for repetition detection.
    pub moves: Vec<String>,
    pub max_depth: Option<i32>,
    pub max_nodes: Option<u64>,
    pub white_time_ms: Option<u64>,
    pub black_time_ms: Option<u64>,
    pub white_inc_ms: Option<u64>,
    pub black_inc_ms: Option<u64>,
    pub moves_to_go: Option<u32>,
    pub move_time_ms: Option<u64>,
    pub mate_distance_limit: Option<i32>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            fen: crate::board::STARTPOS_FEN.to_string(),
            moves: Vec::new(),
            max_depth: None,
            max_nodes: None,
            white_time_ms: None,
            black_time_ms: None,
            white_inc_ms: None,
            black_inc_ms: None,
            moves_to_go: None,
            move_time_ms: None,
            mate_distance_limit: None,
        }
    }
}

/// `mate` and `cp` are mutually exclusive; `lowerbound` only qualifies
/// whichever of the two is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreReport {
    Centipawns(i32),
    MateIn(i32),
}

#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: i32,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u128,
    pub score: ScoreReport,
    pub lowerbound: bool,
    pub pv: Option<Move>,
}

/// Callbacks supplied by the I/O adapter. `send_info` is invoked exactly
/// once per completed iteration, never concurrently with itself, and
/// `send_bestmove` exactly once, after the last `send_info`.
pub trait SearchCallbacks {
    fn send_info(&mut self, info: &SearchInfo);
    fn send_bestmove(&mut self, mv: Option<Move>);
}

/// A callback sink that discards everything; useful for tests and for
/// embedders that only want the returned `(score, move)` pair.
pub struct NullCallbacks;

impl SearchCallbacks for NullCallbacks {
    fn send_info(&mut self, _info: &SearchInfo) {}
    fn send_bestmove(&mut self, _mv: Option<Move>) {}
}

/// Shared stop signal. A reference is handed to the search driver; the
/// adapter sets it from another thread (or the same thread between polls)
/// to request cancellation.
pub type StopFlag = AtomicBool;
