pub mod assign;
pub mod generate;
