pub mod document;
pub mod editor;
