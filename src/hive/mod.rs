pub(crate) mod board;
pub mod hex;
pub(crate) mod notation;
mod options;
pub mod piece;

pub use board::{Board, GameState, Token, ZobristHash};
pub use hex::{Axial, Collection, Direction, Field, Hex, Perimeter};
pub use notation::types::*;
pub use options::{ExpansionOptions, Options};
pub use piece::{Bug, Piece, Player, Pouch};
