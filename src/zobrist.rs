use once_cell::sync::OnceCell;
use rand::prelude::*;
use shakmaty::{Board, Color, Piece, Square};

use crate::types::{color_index, role_index};

const PIECE_KEYS: usize = 64 * 6 * 2;

pub static ZOBRIST_NUMBERS: OnceCell<Vec<u64>> = OnceCell::new();

pub fn zobrist_numbers() -> &'static Vec<u64> {
    ZOBRIST_NUMBERS.get_or_init(initialise_zobrist_numbers)
}

fn initialise_zobrist_numbers() -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(0x11A5117AB1E0);
    let mut numbers = vec![0; PIECE_KEYS + 1];

    rng.fill(&mut numbers[..]);

    numbers
}

pub fn zobrist_piece_index(piece: Piece, square: Square) -> usize {
    (usize::from(square) * 6 * 2) + (color_index(piece.color) * 6) + role_index(piece.role)
}

pub fn zobrist_player_index() -> usize {
    PIECE_KEYS
}

/// Fingerprint of a position built from scratch: occupancy and side to move only.
/// Castling rights, the en passant square and the clocks are deliberately left out.
pub fn fingerprint(board: &Board, turn: Color) -> u64 {
    let mut hash = board.occupied().into_iter().fold(0u64, |hash, square| {
        match board.piece_at(square) {
            Some(piece) => hash ^ zobrist_numbers()[zobrist_piece_index(piece, square)],
            None => hash,
        }
    });

    if turn == Color::Black {
        hash.update_player();
    }

    hash
}

pub trait ZobristHash {
    fn update_piece(&mut self, piece: Piece, square: Square);
    fn update_player(&mut self);
}

impl ZobristHash for u64 {
    fn update_piece(&mut self, piece: Piece, square: Square) {
        *self ^= zobrist_numbers()[zobrist_piece_index(piece, square)];
    }
    fn update_player(&mut self) {
        *self ^= zobrist_numbers()[zobrist_player_index()];
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use shakmaty::{fen::Fen, CastlingMode, Chess, Position, Role};

    use super::*;

    #[test]
    fn numbers_are_distinct() {
        let numbers = zobrist_numbers();
        assert_eq!(numbers.len(), 64 * 12 + 1);
        let unique = numbers.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), numbers.len());
    }

    #[test]
    fn side_to_move_changes_fingerprint() {
        let pos = Chess::default();
        let white = fingerprint(pos.board(), Color::White);
        let black = fingerprint(pos.board(), Color::Black);
        assert_ne!(white, black);
        assert_eq!(white ^ black, zobrist_numbers()[zobrist_player_index()]);
    }

    #[test]
    fn incremental_update_matches_scratch() -> Result<(), Box<dyn std::error::Error>> {
        let pos = Chess::default();
        let mut hash = fingerprint(pos.board(), Color::White);

        let knight = Piece {
            color: Color::White,
            role: Role::Knight,
        };
        hash.update_piece(knight, Square::G1);
        hash.update_piece(knight, Square::F3);

        let moved: Chess = "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R w KQkq - 1 1"
            .parse::<Fen>()?
            .into_position(CastlingMode::Standard)?;
        assert_eq!(hash, fingerprint(moved.board(), Color::White));
        Ok(())
    }
}
