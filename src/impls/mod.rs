pub mod abilities;
pub mod cards;
