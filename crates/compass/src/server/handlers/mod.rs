pub mod compass;
pub mod status;
