//! Compilation database indexing and filtering
//!
//! A compilation database (`compile_commands.json`) records the compiler
//! invocation for every translation unit of a build. This module turns it
//! into a [`NormalizedIndex`] of per-file include directories, headers,
//! definitions and compilers, and can prune entries by command pattern.

pub mod error;
pub mod filter;
pub mod index;
pub mod lexer;
pub mod parser;
pub mod record;

pub use error::CompilationDatabaseError;
pub use filter::{FilterResult, filter, filter_with_fs};
pub use index::{NormalizedIndex, SourceFileRecord, SourceLanguage};
pub use lexer::CommandLexer;
pub use parser::{IncludeDirCache, ParseOptions, parse, parse_with_fs};
pub use record::InvocationRecord;
