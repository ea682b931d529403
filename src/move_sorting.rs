use std::cmp::Reverse;

use shakmaty::Role;

use crate::{moves::Move, types::role_index};

// coarse material scale used only for ordering: P N B R Q K
pub const MVV_LVA_VALUES: [i32; 6] = [1, 3, 3, 5, 9, 10];

pub const PROMOTION_SCORE: i32 = 900;
pub const CHECK_SCORE: i32 = 5;

/// Most valuable victim, least valuable attacker
#[inline]
pub fn mvv_lva(victim: Role, attacker: Role) -> i32 {
    MVV_LVA_VALUES[role_index(victim)] * 10 - MVV_LVA_VALUES[role_index(attacker)]
}

pub fn score_move(mv: &Move) -> i32 {
    let mut score = 0;
    if mv.is_promotion() {
        score += PROMOTION_SCORE;
    }
    if let Some(victim) = mv.captured() {
        score += mvv_lva(victim, mv.piece());
    }
    if mv.gives_check() {
        score += CHECK_SCORE;
    }
    score
}

/// Sort by heuristic score, best first, then put the transposition table move in
/// front of everything. Ties keep generation order.
pub fn order_moves(moves: &mut [Move], tt_move: Option<&Move>) {
    moves.sort_by_key(|m| Reverse(score_move(m)));

    if let Some(tt_move) = tt_move {
        if let Some(index) = moves.iter().position(|m| m == tt_move) {
            moves[..=index].rotate_right(1);
        }
    }
}

pub fn order_captures(moves: &mut [Move]) {
    moves.sort_by_key(|m| Reverse(m.captured().map_or(0, |victim| mvv_lva(victim, m.piece()))));
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::game::Game;

    // white: pawn b7 about to promote, pawn c4 can take the queen, knight d3 can take the rook
    const MIXED: &str = "4k3/1P6/8/3q4/2P2r2/3N4/8/4K3 w - - 0 1";

    fn position(moves: &[Move], uci: &str) -> usize {
        moves
            .iter()
            .position(|m| m.coords() == uci)
            .unwrap_or(usize::MAX)
    }

    #[test]
    fn mvv_lva_prefers_big_victims_and_small_attackers() {
        assert_eq!(mvv_lva(Role::Queen, Role::Pawn), 89);
        assert_eq!(mvv_lva(Role::Rook, Role::Knight), 47);
        assert!(mvv_lva(Role::Queen, Role::Queen) > mvv_lva(Role::Rook, Role::Pawn));
        assert!(mvv_lva(Role::Knight, Role::Pawn) > mvv_lva(Role::Knight, Role::Rook));
    }

    #[test]
    fn ordering_priority() -> Result<(), Box<dyn Error>> {
        let game = Game::from_fen(MIXED)?;
        let tt_move = game.parse_move("d3e5")?;
        assert!(!tt_move.is_capture() && !tt_move.is_promotion());

        let mut moves = game.legal_moves();
        order_moves(&mut moves, Some(&tt_move));

        assert_eq!(moves[0], tt_move);

        let queen_promotion = position(&moves, "b7b8q");
        let pawn_takes_queen = position(&moves, "c4d5");
        let knight_takes_rook = position(&moves, "d3f4");
        assert!(queen_promotion < pawn_takes_queen);
        assert!(pawn_takes_queen < knight_takes_rook);

        // every promotion comes before every plain capture and quiet move
        let last_promotion = moves.iter().rposition(|m| m.is_promotion()).unwrap_or(0);
        let first_other = moves
            .iter()
            .skip(1)
            .position(|m| !m.is_promotion())
            .map_or(usize::MAX, |i| i + 1);
        assert!(last_promotion < first_other);

        // quiet moves follow the captures
        let last_capture = moves.iter().rposition(|m| m.is_capture()).unwrap_or(0);
        let first_quiet = moves
            .iter()
            .skip(1)
            .position(|m| !m.is_capture() && !m.is_promotion())
            .map_or(usize::MAX, |i| i + 1);
        assert!(last_capture < first_quiet);
        Ok(())
    }

    #[test]
    fn tt_move_already_first_is_left_alone() -> Result<(), Box<dyn Error>> {
        let game = Game::from_fen(MIXED)?;
        let mut moves = game.legal_moves();
        order_moves(&mut moves, None);
        let expected = moves.clone();

        let first = moves[0].clone();
        order_moves(&mut moves, Some(&first));
        assert_eq!(moves, expected);
        Ok(())
    }

    #[test]
    fn unknown_tt_move_is_ignored() -> Result<(), Box<dyn Error>> {
        let game = Game::from_fen(MIXED)?;
        let foreign = Game::new().parse_move("e2e4")?;
        let mut moves = game.legal_moves();
        let count = moves.len();
        order_moves(&mut moves, Some(&foreign));
        assert_eq!(moves.len(), count);
        assert!(moves[0].is_promotion());
        Ok(())
    }

    #[test]
    fn checks_break_ties() -> Result<(), Box<dyn Error>> {
        let game = Game::from_fen(MIXED)?;
        let mut moves = game.legal_moves();
        order_moves(&mut moves, None);
        // b8=Q and b8=R give check along the back rank
        assert!(moves[0].gives_check());
        assert_eq!(score_move(&moves[0]), PROMOTION_SCORE + CHECK_SCORE);
        Ok(())
    }

    #[test]
    fn captures_by_victim() -> Result<(), Box<dyn Error>> {
        let game = Game::from_fen(MIXED)?;
        let mut captures = game.capture_moves();
        order_captures(&mut captures);
        let order = captures.iter().map(|m| m.coords()).collect::<Vec<_>>();
        assert_eq!(order, vec!["c4d5", "d3f4"]);
        Ok(())
    }
}
