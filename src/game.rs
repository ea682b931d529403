use std::ops::{Deref, DerefMut};

use shakmaty::{
    fen::Fen, Board, CastlingMode, Chess, Color, EnPassantMode, Piece, Position, Square,
};

use crate::{
    error::{EngineError, EngineResult},
    moves::Move,
    types::{COLORS, ROLES},
    zobrist::{self, ZobristHash},
};

#[derive(Clone, Debug)]
struct UnMove {
    position: Chess,
    hash: u64,
}

/// The position the search works on.
///
/// Legality and terminal-state rules come from `shakmaty`; this type adds the
/// incremental fingerprint, an undo stack and the repetition history. Undo
/// restores a snapshot, so castling rights, the en passant square and the
/// clocks come back exactly even though the fingerprint ignores them.
#[derive(Clone, Debug)]
pub struct Game {
    position: Chess,
    hash: u64,
    unmove_history: Vec<UnMove>,
    position_history: Vec<u64>,
}

impl Game {
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    pub fn from_position(position: Chess) -> Self {
        let hash = zobrist::fingerprint(position.board(), position.turn());
        Self {
            position,
            hash,
            unmove_history: Vec::new(),
            position_history: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let invalid = |reason: String| EngineError::InvalidFen {
            fen: fen.to_owned(),
            reason,
        };
        let setup = fen.trim().parse::<Fen>().map_err(|e| invalid(e.to_string()))?;
        let position: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self::from_position(position))
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn board(&self) -> &Board {
        self.position.board()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    pub fn fingerprint(&self) -> u64 {
        self.hash
    }

    pub fn recompute_fingerprint(&self) -> u64 {
        zobrist::fingerprint(self.position.board(), self.position.turn())
    }

    /// Every occupied square with its piece, a1 first
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        let board = self.position.board();
        board
            .occupied()
            .into_iter()
            .filter_map(move |square| board.piece_at(square).map(|piece| (square, piece)))
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .map(|m| self.annotate(m))
            .collect()
    }

    pub fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .filter(|m| m.from() == Some(square))
            .map(|m| self.annotate(m))
            .collect()
    }

    pub fn capture_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .filter(|m| m.is_capture())
            .map(|m| self.annotate(m))
            .collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        !self.position.legal_moves().is_empty()
    }

    fn annotate(&self, m: shakmaty::Move) -> Move {
        let mut after = self.position.clone();
        after.play_unchecked(&m);
        let gives_check = after.is_check();
        Move::new(m, gives_check)
    }

    /// Look up a legal move by its UCI coordinates
    pub fn parse_move(&self, uci: &str) -> EngineResult<Move> {
        self.legal_moves()
            .into_iter()
            .find(|m| m.coords() == uci)
            .ok_or_else(|| EngineError::UnknownMove {
                uci: uci.to_owned(),
            })
    }

    pub fn apply(&mut self, mv: &Move) -> EngineResult<()> {
        if !self.position.is_legal(mv.inner()) {
            return Err(EngineError::IllegalMove {
                uci: mv.coords(),
                fen: self.fen(),
            });
        }

        let before = self.position.clone();
        self.position.play_unchecked(mv.inner());

        // only the squares whose occupant changed need to be toggled
        let mut hash = self.hash;
        for color in COLORS {
            for role in ROLES {
                let piece = Piece { color, role };
                let changed =
                    before.board().by_piece(piece) ^ self.position.board().by_piece(piece);
                for square in changed {
                    hash.update_piece(piece, square);
                }
            }
        }
        hash.update_player();

        self.position_history.push(self.hash);
        self.unmove_history.push(UnMove {
            position: before,
            hash: self.hash,
        });
        self.hash = hash;
        debug_assert_eq!(self.hash, self.recompute_fingerprint());

        Ok(())
    }

    pub fn undo(&mut self) -> EngineResult<()> {
        let unmove = self
            .unmove_history
            .pop()
            .ok_or(EngineError::NothingToUndo)?;
        self.position = unmove.position;
        self.hash = unmove.hash;
        self.position_history.pop();
        Ok(())
    }

    /// Apply a move for the lifetime of the returned guard; dropping it undoes the move
    pub fn play(&mut self, mv: &Move) -> EngineResult<MoveGuard<'_>> {
        self.apply(mv)?;
        Ok(MoveGuard { game: self })
    }

    pub fn is_in_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_draw(&self) -> bool {
        self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100
            || self.is_repetition()
    }

    // third occurrence of the current fingerprint
    fn is_repetition(&self) -> bool {
        self.position_history
            .iter()
            .filter(|&&h| h == self.hash)
            .count()
            >= 2
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// A move applied to a [`Game`] that is taken back when the guard goes out of scope,
/// whether the enclosing frame returns normally, prunes early or propagates an error.
pub struct MoveGuard<'a> {
    game: &'a mut Game,
}

impl Deref for MoveGuard<'_> {
    type Target = Game;

    fn deref(&self) -> &Self::Target {
        self.game
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.game
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        let undone = self.game.undo();
        debug_assert!(undone.is_ok());
    }
}
