//! Input contract: declarative schema, column scope, and structural
//! conformance.
//!
//! The contract is the single external source of truth for which columns
//! the pipeline may see and which one it predicts. It is loaded once,
//! validated strictly, converted into an immutable [`Scope`], and passed
//! explicitly to every stage — there is no hidden global contract cache.

mod enforce;
mod loader;
mod scope;

pub use enforce::{enforce_contract, enforce_scope, ContractConformance};
pub use loader::{load_contract_yaml, parse_contract_yaml, ContractConfig};
pub use scope::Scope;
