//! Definition of structures and functions,
//! which are used by [thread][crate::thread_mode], [async][crate::async_mode]
//! and [sequential][crate::sequential_mode] games.

pub mod cancel;
pub mod config;
pub mod error;
pub mod outcome;
pub mod participant;
pub mod roster;
pub mod sink;

pub(crate) mod table;
