//! I/O layer - filesystem access used by the compilation database core
//!
//! Everything the parser and filter touch on disk goes through
//! [`FileSystemTrait`], so tests can swap in an in-memory or mock filesystem.

pub mod file_system;

pub use file_system::{FileSystemTrait, RealFileSystem};
