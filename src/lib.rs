//! churnprep — auditable tabular preparation for churn prediction.
//!
//! A staged pipeline over an in-memory column-oriented table, built around
//! one discipline enforced at every stage:
//!
//! ```text
//! diagnose -> explicit decision -> execute -> audit
//! ```
//!
//! No stage infers policy silently. Each transformation takes a
//! caller-supplied decision object, validates it strictly before touching
//! any data, executes only within the declared column scope (features vs
//! target), and returns a new table together with before/after audit
//! artifacts. The representation stage fits its encoder on the training
//! partition only and reuses it everywhere else — the central anti-leakage
//! invariant of the whole system.
//!
//! Stage order: contract enforcement -> categorical diagnosis ->
//! categorical standardization -> missing-value imputation -> target audit
//! -> train/test split -> supervised representation -> serving bridge.

pub mod audit;
pub mod column;
pub mod contract;
pub mod error;
pub mod frame;
pub mod io;
pub mod prep;
pub mod serve;
pub mod value;

// Re-export commonly used types
pub use column::{Column, ColumnType};
pub use contract::{load_contract_yaml, ContractConfig, Scope};
pub use error::{Error, Result};
pub use frame::Frame;
pub use value::DataValue;

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
