//! SQL DDL to schema graph conversion.

mod parser;
mod statement;
mod types;

pub use parser::{TableBody, parse_ddl, parse_ddl_file, parse_table_body, parse_tables, split_top_level};
pub use statement::{Statements, TableBlock, statements};
pub use types::{TypeFamily, TypeMapper, classify, map_type};
