pub mod key;
pub mod ping;
pub mod token;
