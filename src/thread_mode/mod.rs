//! Game where every participant runs on its own thread
//! and waits for the token on a condition variable.

mod game;
mod latch;
mod runner;
mod token;

pub use game::{Game, Stopper};
pub use token::TurnToken;

#[cfg(test)]
mod tests;
