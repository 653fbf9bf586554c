//! XMLTV guide handling: fetch, filter-and-merge, and output.
//!
//! This module implements the pipeline core over XMLTV documents:
//!
//! - [`dom`] - Owned element tree parsed from and serialized with `quick-xml`
//! - [`fetch`] - HTTP retrieval of one feed, with gzip handling
//! - [`merge`] - Allow-list filtering and accumulation into one `tv` document
//! - [`write`] - Plain and gzip-compressed serialization to disk

pub mod dom;
pub mod fetch;
pub mod merge;
pub mod write;

pub use dom::{parse_document, write_document, DomError, Element, Node};
pub use fetch::{fetch_feed, FetchError};
pub use merge::{build_epg, filter_into, MergeStats};
pub use write::{gz_path_for, write_outputs, WriteError};
