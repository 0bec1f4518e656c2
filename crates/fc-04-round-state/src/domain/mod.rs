//! Round-state domain entities and calculations

pub mod round_info;
pub mod validator;

pub use round_info::{round_info, starts_new_round, RoundInfo};
pub use validator::RoundValidator;
