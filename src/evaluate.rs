use shakmaty::{Board, Color, Piece, Role, Square};

use crate::{
    game::Game,
    piece_tables::*,
    types::{relative_to, role_index, CHECKMATE_SCORE, DRAW_SCORE},
};

pub mod consts {
    pub const PIECE_VALUES: [i32; 6] = [
        100,    // pawn
        320,    // knight
        330,    // bishop
        500,    // rook
        900,    // queen
        20_000, // king
    ];

    // two knights, two bishops, two rooks and a queen per side
    pub const MAX_PHASE_MATERIAL: i32 = 2 * (2 * 320 + 2 * 330 + 2 * 500 + 900);

    pub const BISHOP_PAIR_BONUS: i32 = 50;
    pub const DOUBLED_PAWN_PENALTY: i32 = -20;
    pub const ISOLATED_PAWN_PENALTY: i32 = -15;
}
use consts::*;

/// Static evaluation in centipawns, positive when white is better.
///
/// Terminal positions are scored first: a mated side gets the full checkmate
/// score against it, and stalemate or any other draw is exactly zero.
pub fn evaluate(game: &Game) -> i32 {
    if !game.has_legal_moves() {
        if game.is_in_check() {
            return relative_to(game.side_to_move(), -CHECKMATE_SCORE);
        }
        return DRAW_SCORE;
    }
    if game.is_draw() {
        return DRAW_SCORE;
    }

    let board = game.board();
    let phase_material = phase_material(board);

    let mut result = 0;
    for (square, piece) in game.pieces() {
        let value = PIECE_VALUES[role_index(piece.role)] + placement(piece, square, phase_material);
        result += relative_to(piece.color, value);
    }

    result += bishop_pair(board, Color::White) - bishop_pair(board, Color::Black);
    result += pawn_structure(board, Color::White) - pawn_structure(board, Color::Black);

    result
}

/// [`evaluate`] from the point of view of the side to move
pub fn relative_eval(game: &Game) -> i32 {
    relative_to(game.side_to_move(), evaluate(game))
}

/// Non-pawn, non-king material of both sides, capped at the starting amount
fn phase_material(board: &Board) -> i32 {
    [Role::Knight, Role::Bishop, Role::Rook, Role::Queen]
        .into_iter()
        .map(|role| board.by_role(role).count() as i32 * PIECE_VALUES[role_index(role)])
        .sum::<i32>()
        .min(MAX_PHASE_MATERIAL)
}

fn placement(piece: Piece, square: Square, phase_material: i32) -> i32 {
    match piece.role {
        Role::King => king_placement(piece.color, square, phase_material),
        role => piece_square_bonus(role, piece.color, square),
    }
}

// linear blend: full midgame table with all material on, full endgame table with none
fn king_placement(color: Color, square: Square, phase_material: i32) -> i32 {
    let index = table_index(color, square);
    (KING_MIDGAME_TABLE[index] * phase_material
        + KING_ENDGAME_TABLE[index] * (MAX_PHASE_MATERIAL - phase_material))
        / MAX_PHASE_MATERIAL
}

fn bishop_pair(board: &Board, color: Color) -> i32 {
    if board.by_piece(Piece { color, role: Role::Bishop }).count() >= 2 {
        BISHOP_PAIR_BONUS
    } else {
        0
    }
}

fn pawn_structure(board: &Board, color: Color) -> i32 {
    let mut files = [0i32; 8];
    for square in board.by_piece(Piece { color, role: Role::Pawn }) {
        files[usize::from(square) % 8] += 1;
    }

    let mut result = 0;
    for (file, &count) in files.iter().enumerate() {
        if count == 0 {
            continue;
        }
        result += (count - 1) * DOUBLED_PAWN_PENALTY;

        let left = file.checked_sub(1).map_or(0, |f| files[f]);
        let right = files.get(file + 1).copied().unwrap_or(0);
        if left == 0 && right == 0 {
            result += count * ISOLATED_PAWN_PENALTY;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(evaluate(&Game::new()), 0);
    }

    #[test]
    fn evaluation_is_pure() -> Result<(), Box<dyn Error>> {
        let game =
            Game::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")?;
        let fen = game.fen();
        assert_eq!(evaluate(&game), evaluate(&game));
        assert_eq!(game.fen(), fen);
        Ok(())
    }

    #[test]
    fn mirrored_positions_cancel() -> Result<(), Box<dyn Error>> {
        let white_e4 =
            Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")?;
        let black_e5 =
            Game::from_fen("rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")?;
        assert_eq!(evaluate(&white_e4), 40);
        assert_eq!(evaluate(&black_e5), -40);
        assert_eq!(relative_eval(&white_e4), -40);
        assert_eq!(relative_eval(&black_e5), -40);
        Ok(())
    }

    #[test]
    fn checkmate_scores() -> Result<(), Box<dyn Error>> {
        let white_mated =
            Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")?;
        assert_eq!(evaluate(&white_mated), -CHECKMATE_SCORE);

        let black_mated = Game::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1")?;
        assert_eq!(evaluate(&black_mated), CHECKMATE_SCORE);
        Ok(())
    }

    #[test]
    fn draws_are_zero() -> Result<(), Box<dyn Error>> {
        // stalemated despite a queen up
        let stalemate = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1")?;
        assert_eq!(evaluate(&stalemate), DRAW_SCORE);

        let insufficient = Game::from_fen("8/8/8/4k3/8/8/8/3BK3 w - - 0 1")?;
        assert_eq!(evaluate(&insufficient), DRAW_SCORE);
        Ok(())
    }

    #[test]
    fn material_dominates() -> Result<(), Box<dyn Error>> {
        let queen_up = Game::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1")?;
        assert!(evaluate(&queen_up) > 800);
        Ok(())
    }

    #[test]
    fn king_table_follows_phase() -> Result<(), Box<dyn Error>> {
        let start = Game::new();
        assert_eq!(phase_material(start.board()), MAX_PHASE_MATERIAL);
        assert_eq!(
            king_placement(Color::White, Square::G1, MAX_PHASE_MATERIAL),
            KING_MIDGAME_TABLE[table_index(Color::White, Square::G1)]
        );

        let bare = Game::from_fen("4k3/8/8/8/3K4/8/8/8 w - - 0 1")?;
        assert_eq!(phase_material(bare.board()), 0);
        assert_eq!(king_placement(Color::White, Square::D4, 0), 40);
        assert_eq!(king_placement(Color::White, Square::D4, MAX_PHASE_MATERIAL), -40);
        assert_eq!(king_placement(Color::White, Square::D4, MAX_PHASE_MATERIAL / 2), 0);
        Ok(())
    }

    #[test]
    fn bishop_pair_bonus() -> Result<(), Box<dyn Error>> {
        let game = Game::from_fen("2b1k3/8/8/8/8/8/8/2B1KB2 w - - 0 1")?;
        assert_eq!(bishop_pair(game.board(), Color::White), BISHOP_PAIR_BONUS);
        assert_eq!(bishop_pair(game.board(), Color::Black), 0);
        Ok(())
    }

    #[test]
    fn doubled_and_isolated_pawns() -> Result<(), Box<dyn Error>> {
        let game = Game::from_fen("4k3/5pp1/8/8/8/2P5/2P5/4K3 w - - 0 1")?;
        // c-file pair: one doubled pawn, both isolated
        assert_eq!(
            pawn_structure(game.board(), Color::White),
            DOUBLED_PAWN_PENALTY + 2 * ISOLATED_PAWN_PENALTY
        );
        // f and g pawns support each other
        assert_eq!(pawn_structure(game.board(), Color::Black), 0);
        Ok(())
    }
}
