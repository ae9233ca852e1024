pub mod generator;
pub mod kind;
