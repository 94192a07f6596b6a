pub mod envelope;
pub mod render;
pub mod text;
