//! # IO Module
//!
//! Boundary between the domain and the outside world: mapping domain models
//! to and from the wire records of the `shared` crate, and turning outcomes
//! into notices the screens can show.

pub mod mappers;
pub mod notices;

pub use mappers::{AccountMapper, MemberMapper};
pub use notices::Notice;
