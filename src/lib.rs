//! Compilation database indexer
//!
//! Reads a build's `compile_commands.json` (comments allowed) and summarizes
//! it for tools that need per-file include paths, header lists, preprocessor
//! definitions and compiler locations, such as static analyzers and
//! documentation generators.

pub mod compdb;
pub mod io;
pub mod jsonc;
pub mod logging;

#[cfg(test)]
mod test_utils;

pub use compdb::{
    CommandLexer, CompilationDatabaseError, FilterResult, InvocationRecord, NormalizedIndex,
    ParseOptions, SourceFileRecord, filter, parse,
};
