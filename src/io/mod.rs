//! File ingestion glue.
//!
//! Thin CSV entry point so the pipeline can be exercised end-to-end; the
//! full ingestion layer lives with the data-source collaborator.

mod csv;

pub use self::csv::{read_csv, write_csv};
