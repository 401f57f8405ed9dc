pub mod cache;
pub mod parse;
pub mod source;
pub mod table;

pub use cache::ReferenceCache;
pub use parse::parse_lms_table;
pub use source::{DirectorySource, InMemorySource, ReferenceResource, ReferenceSource};
pub use table::{LmsRow, LmsTable};
