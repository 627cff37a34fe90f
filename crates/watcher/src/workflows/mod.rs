pub mod bulletin;
pub mod catalog;
pub(crate) mod text;
pub mod vocabulary;
