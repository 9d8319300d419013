//! FEN parsing and emission for [`Board`].

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::square::Square;

impl Board {
    /// Replaces `self` in place with the position described by `fen`.
    ///
    /// On a syntax error `self` is left untouched (the new board is built on a
    /// scratch value and only swapped in once parsing succeeds).
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let parsed = parse_fen(fen)?;
        *self = parsed;
        Ok(())
    }

    /// Emits a canonical FEN string for the current position.
    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(64);
        for rank in (0..8).rev() {
            let mut empty_run = 0u32;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let idx = (color as usize) * 6 + (piece as usize);
                        placement.push(PC_TO_CHAR[idx]);
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank != 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.has_castling(CASTLE_WK) {
            castling.push('K');
        }
        if self.has_castling(CASTLE_WQ) {
            castling.push('Q');
        }
        if self.has_castling(CASTLE_BK) {
            castling.push('k');
        }
        if self.has_castling(CASTLE_BQ) {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }
}

fn parse_fen(fen: &str) -> Result<Board, String> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(format!(
            "FEN must have 6 space-separated fields, got {}",
            fields.len()
        ));
    }

    let mut board = Board::new_empty();
    board.piece_bb = [[0u64; 6]; 2];
    board.occ_white = 0;
    board.occ_black = 0;
    board.occ_all = 0;
    board.piece_on_sq = [super::EMPTY_SQ; 64];
    board.history.clear();

    parse_placement(fields[0], &mut board)?;

    board.side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(format!("invalid side-to-move field '{other}'")),
    };

    board.castling_rights = parse_castling(fields[2])?;

    board.en_passant = parse_ep_field(fields[3], &board)?;

    board.halfmove_clock = fields[4]
        .parse::<u32>()
        .map_err(|_| format!("invalid halfmove clock '{}'", fields[4]))?;
    board.fullmove_number = fields[5]
        .parse::<u32>()
        .map_err(|_| format!("invalid fullmove number '{}'", fields[5]))?;

    board.refresh_zobrist();
    board.validate()?;

    Ok(board)
}

fn parse_placement(field: &str, board: &mut Board) -> Result<(), String> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(format!(
            "piece placement must have 8 ranks, got {}",
            ranks.len()
        ));
    }

    // FEN ranks run 8 down to 1; our rank index runs 0 (rank 1) up to 7 (rank 8).
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as u8;
        let mut file: u8 = 0;
        for ch in rank_str.chars() {
            if file > 8 {
                return Err(format!("rank '{rank_str}' overflows the board"));
            }
            if let Some(skip) = ch.to_digit(10) {
                file += skip as u8;
                continue;
            }
            if file >= 8 {
                return Err(format!("rank '{rank_str}' overflows the board"));
            }
            let (piece, color) = CHAR_TO_PC[ch as usize]
                .ok_or_else(|| format!("invalid piece glyph '{ch}' in placement"))?;
            let sq = Square::from_file_rank(file, rank);
            let bb = board.bb(color, piece) | (1u64 << sq.index());
            board.set_bb(color, piece, bb);
            file += 1;
        }
        if file != 8 {
            return Err(format!("rank '{rank_str}' does not cover all 8 files"));
        }
    }

    Ok(())
}

fn parse_castling(field: &str) -> Result<u8, String> {
    if field == "-" {
        return Ok(0);
    }
    let mut rights = 0u8;
    for ch in field.chars() {
        rights |= match ch {
            'K' => CASTLE_WK,
            'Q' => CASTLE_WQ,
            'k' => CASTLE_BK,
            'q' => CASTLE_BQ,
            other => return Err(format!("invalid castling glyph '{other}'")),
        };
    }
    Ok(rights)
}

/// Per §4.1: the claimed en-passant square is kept only if a pawn of the side
/// to move actually attacks it pseudo-legally; otherwise it is dropped so two
/// FENs that differ only in a dead en-passant marker hash identically.
fn parse_ep_field(field: &str, board: &Board) -> Result<Option<Square>, String> {
    if field == "-" {
        return Ok(None);
    }
    let sq: Square = field
        .parse()
        .map_err(|_| format!("invalid en-passant square '{field}'"))?;

    const FILE_A: u64 = 0x0101_0101_0101_0101;
    const FILE_H: u64 = 0x8080_8080_8080_8080;
    let bb_s = 1u64 << sq.index();

    let attacked = match board.side_to_move {
        Color::White => {
            let src_ne = (bb_s >> 9) & !FILE_H;
            let src_nw = (bb_s >> 7) & !FILE_A;
            ((src_ne | src_nw) & board.bb(Color::White, Piece::Pawn)) != 0
        }
        Color::Black => {
            let src_se = (bb_s << 7) & !FILE_A;
            let src_sw = (bb_s << 9) & !FILE_H;
            ((src_se | src_sw) & board.bb(Color::Black, Piece::Pawn)) != 0
        }
    };

    Ok(if attacked { Some(sq) } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn startpos_round_trips() {
        let board: Board = STARTPOS.parse().unwrap();
        assert_eq!(board.to_fen(), STARTPOS);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").is_err());
    }

    #[test]
    fn rejects_bad_glyph() {
        assert!(parse_fen("rnbqkbXr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }

    #[test]
    fn dead_en_passant_marker_is_dropped() {
        // e3 is claimed but no black pawn can capture there: must be cleared.
        let board: Board = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq e3 0 1"
            .parse()
            .unwrap();
        assert_eq!(board.en_passant, None);
    }

    #[test]
    fn live_en_passant_marker_is_kept() {
        let board: Board =
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3"
                .parse()
                .unwrap();
        assert_eq!(board.en_passant.map(|s| s.to_string()), Some("d6".into()));
    }

    #[test]
    fn side_to_move_and_castling_rights_parsed() {
        let board: Board = "8/8/8/8/8/8/8/R3K2R w Kq - 3 10".parse().unwrap();
        assert_eq!(board.side_to_move, Color::White);
        assert!(board.has_castling(CASTLE_WK));
        assert!(!board.has_castling(CASTLE_WQ));
        assert!(!board.has_castling(CASTLE_BK));
        assert!(board.has_castling(CASTLE_BQ));
        assert_eq!(board.halfmove_clock, 3);
        assert_eq!(board.fullmove_number, 10);
    }
}
