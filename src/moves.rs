use std::fmt::Display;

use shakmaty::{CastlingMode, Role, Square};

/// A legal move as handed out by [`Game`](crate::game::Game).
///
/// Wraps the rules library's move together with the flags the search cares
/// about. Whether the move gives check is decided once at generation time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    inner: shakmaty::Move,
    gives_check: bool,
}

impl Move {
    pub(crate) fn new(inner: shakmaty::Move, gives_check: bool) -> Self {
        Self { inner, gives_check }
    }

    pub(crate) fn inner(&self) -> &shakmaty::Move {
        &self.inner
    }

    pub fn piece(&self) -> Role {
        self.inner.role()
    }

    pub fn from(&self) -> Option<Square> {
        self.inner.from()
    }

    // castling is encoded king-takes-rook, so this is the rook's square
    pub fn to(&self) -> Square {
        self.inner.to()
    }

    pub fn captured(&self) -> Option<Role> {
        self.inner.capture()
    }

    pub fn promotion(&self) -> Option<Role> {
        self.inner.promotion()
    }

    pub fn is_capture(&self) -> bool {
        self.inner.is_capture()
    }

    pub fn is_promotion(&self) -> bool {
        self.inner.is_promotion()
    }

    pub fn gives_check(&self) -> bool {
        self.gives_check
    }

    pub fn coords(&self) -> String {
        format!("{self}")
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.to_uci(CastlingMode::Standard))
    }
}
