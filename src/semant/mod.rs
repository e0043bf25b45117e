pub mod argument;
pub mod inference;
pub mod justification;
pub mod line;
pub mod proof;
