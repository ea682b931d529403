use shakmaty::{Color, Role};

pub const CHECKMATE_SCORE: i32 = 99_999;
pub const DRAW_SCORE: i32 = 0;
// anything beyond this is a forced mate rather than a material count
pub const MATE_THRESHOLD: i32 = 90_000;
pub const INF: i32 = 1_000_000;
pub const MINUS_INF: i32 = -INF;

pub const COLORS: [Color; 2] = [Color::White, Color::Black];
pub const ROLES: [Role; 6] = [
    Role::Pawn,
    Role::Knight,
    Role::Bishop,
    Role::Rook,
    Role::Queen,
    Role::King,
];

#[inline]
pub fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

#[inline]
pub fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

/// White-positive score turned around for the side to move
#[inline]
pub fn relative_to(color: Color, score: i32) -> i32 {
    match color {
        Color::White => score,
        Color::Black => -score,
    }
}
