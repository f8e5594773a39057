mod game;
mod moves;
mod turn;

pub mod types
{
    pub use super::{
        game::{GameString, GameTypeString},
        moves::{Move, MoveString, NextTo},
        turn::{Turn, TurnString},
    };
}
