pub mod collection_store;
pub mod section_parser;

pub use collection_store::{AppendOutcome, CollectionStore};
pub use section_parser::{parse_body, Section, SectionParser};
