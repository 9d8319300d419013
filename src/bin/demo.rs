//! Minimal host binary: loads the magic tables, builds a `SearchRequest`
//! from a FEN and a movetime argument, and prints each iteration plus the
//! final best move. This is not a UCI loop — it recognizes no protocol
//! commands, just its own argv.
//!
//! Usage: `vantage [fen] [movetime_ms]`
//!   - `fen` defaults to the starting position.
//!   - `movetime_ms` defaults to 1000.

use std::env;
use std::sync::atomic::AtomicBool;
use vantage::board::STARTPOS_FEN;
use vantage::engine::Engine;
use vantage::moves::types::Move;
use vantage::search::interface::{ScoreReport, SearchCallbacks, SearchInfo, SearchRequest};

struct Printer;

impl SearchCallbacks for Printer {
    fn send_info(&mut self, info: &SearchInfo) {
        let score = match info.score {
            ScoreReport::Centipawns(cp) => format!("cp {}", cp),
            ScoreReport::MateIn(n) => format!("mate {}", n),
        };
        let pv = info
            .pv
            .map(|mv: Move| mv.to_uci())
            .unwrap_or_else(|| "0000".to_string());
        println!(
            "info depth {} score {} nodes {} nps {} time {} pv {}",
            info.depth, score, info.nodes, info.nps, info.time_ms, pv
        );
    }

    fn send_bestmove(&mut self, mv: Option<Move>) {
        match mv {
            Some(mv) => println!("bestmove {}", mv.to_uci()),
            None => println!("bestmove 0000"),
        }
    }
}

fn main() {
    let mut args = env::args().skip(1);
    let fen = args.next().unwrap_or_else(|| STARTPOS_FEN.to_string());
    let movetime_ms: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    let request = SearchRequest {
        fen,
        move_time_ms: Some(movetime_ms),
        ..Default::default()
    };

    let mut engine = Engine::default();
    let stop = AtomicBool::new(false);
    let mut callbacks = Printer;
    engine.run_search(&request, &stop, &mut callbacks);
}
