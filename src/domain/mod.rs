pub mod card;
pub mod mode;
