pub mod error;
pub mod evaluate;
pub mod game;
pub mod move_sorting;
pub mod moves;
pub mod options;
pub mod piece_tables;
pub mod search;
pub mod transposition_table;
pub mod types;
pub mod zobrist;
