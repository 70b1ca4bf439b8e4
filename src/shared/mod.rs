//! Helpers shared by the git backend and the scanner

pub mod text;

pub use text::decode_lossy;
