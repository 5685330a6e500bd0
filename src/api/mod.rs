// Response shaping shared by every handler
pub mod envelope;
