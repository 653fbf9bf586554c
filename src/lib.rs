//! epg-sift: fetch, filter, and merge XMLTV EPG feeds.
//!
//! The pipeline is a linear batch transform, run once per invocation:
//!
//! 1. Load an allow-list of channel identifiers ([`allowlist`])
//! 2. Fetch each configured feed URL, gzip-aware ([`xmltv::fetch`])
//! 3. Keep only allow-listed channels and programmes, normalizing a
//!    handful of programme titles ([`xmltv::merge`])
//! 4. Write the merged guide as plain and gzip-compressed XML
//!    ([`xmltv::write`])
//!
//! Individual feed failures are logged and skipped; only a missing
//! allow-list (or a failed output write) aborts the run.

pub mod allowlist;
pub mod config;
pub mod xmltv;

pub use allowlist::{AllowList, AllowListError};
pub use config::{Config, ConfigError};
