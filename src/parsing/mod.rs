// Text parsing for command output: tokenizing helpers and table parsing.

pub mod common;
pub mod table;

pub use table::{parse_table, TableParser, TableRecord};
