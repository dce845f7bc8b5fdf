//! procurement-fetch — resumable batch fetchers for federal procurement data.
//!
//! Award histories come from USAspending, capability-statement PDFs from
//! SBA certification pages, and the firm list from SAM.gov. Everything is
//! written to disk as raw JSON or PDF artifacts.

pub mod artifacts;
pub mod awards;
pub mod capability;
pub mod concat;
pub mod config;
pub mod entities;
pub mod http;
pub mod identifiers;
pub mod types;

pub use awards::fetch_awards;
pub use capability::fetch_capability_pdfs;
pub use concat::{concatenate, AwardRow, AwardTable};
pub use config::FetchConfig;
pub use entities::{fetch_entities, read_entity_identifiers, read_identifier_list};
pub use http::HttpClient;
pub use types::*;
