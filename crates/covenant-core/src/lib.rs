pub mod value;
pub mod comparator;
pub mod report;
pub mod error;

// Re-export commonly used types
pub use value::Value;
pub use comparator::Comparator;
pub use report::{describe, Report, ReportSnapshot};
pub use error::{AssertError, ContractError, PreconditionError, SignatureError, UsageError};
