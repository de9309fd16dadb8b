//! Game where every participant runs as tokio task
//! and waits for the token on [`Notify`][tokio::sync::Notify].

mod game;
mod runner;
mod token;

pub use game::{run, Game, Stopper};
pub use token::TurnToken;
