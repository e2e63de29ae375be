pub mod collector;
pub mod digest;
pub mod domain;
pub mod parser;
pub mod sources;
pub mod store;

pub use collector::{collect_notices, CollectReport, SourceReport};
pub use domain::Notice;
pub use parser::{parse_notices, ExtractionStrategy, ParseOutcome};
pub use store::{JsonFileBackend, MergeSummary, NoticeBackend, NoticeStore, StoreError};
