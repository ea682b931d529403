use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The root position is already terminal
    #[error("no legal move available in this position")]
    NoLegalMoves,

    /// The rules collaborator refused a move, which means the search fed it
    /// something it did not generate for this position
    #[error("illegal move {uci} in position {fen}")]
    IllegalMove { uci: String, fen: String },

    #[error("undo requested with no move applied")]
    NothingToUndo,

    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("unknown or illegal move string: {uci}")]
    UnknownMove { uci: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
