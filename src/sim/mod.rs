pub mod event;
pub mod round;
pub mod score;
