pub mod error;
pub mod streams;

pub use streams::{ReadLine, WriteFile, MAX_LINE_SIZE};
