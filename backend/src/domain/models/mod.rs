//! Domain models for accounts and their members.

pub mod account;
pub mod goal;
pub mod member;
pub mod patch;
pub mod pin;

pub use account::Account;
pub use goal::{GoalProgress, PointAccrual};
pub use member::{Member, ProfileImage};
pub use patch::MemberPatch;
pub use pin::{Pin, PinError};
