pub mod alignment;
pub mod io;
pub mod parsing;
pub mod reference;
pub mod typeset;
pub mod verse_map;
pub mod wire;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use alignment::{MappingColumns, MappingRow, ParallelRow, build_rows, skeleton};
pub use io::IoError;
pub use parsing::{ParsedBook, parse_document};
pub use reference::{RefError, RefRange, SecondaryRef, VerseRef};
pub use typeset::{DocumentMeta, Html, Latex, Typesetter, assemble, decode, render_verse};
pub use verse_map::VerseMap;
