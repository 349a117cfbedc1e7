//! Runtime contract checking.
//!
//! Preconditions are declared over a function's parameters and evaluated
//! against the actual arguments every time the guarded function is called.
//!
//! # Architecture
//!
//! - [`Messenger`] records every check outcome as a [`Report`] and applies a
//!   [`FailurePolicy`]: collect silently, or return a typed error on the
//!   first failure.
//! - [`Assertion`] wraps one value and exposes one check per [`Comparator`],
//!   plus a negated view at `assertion.not`.
//! - [`pre`] guards a [`Function`]: it recovers the parameter names through a
//!   [`SignatureReader`], binds one assertion per parameter, runs the
//!   specification and only then calls the body.
//! - [`CheckScript`] describes checks as data so they can be loaded from
//!   JSON and run as a session or as a specification.
//!
//! # Usage
//!
//! ```ignore
//! let divide = pre(
//!     function(["n", "d"], |args: &[Value]| /* n / d */),
//!     |p| p["d"].not.equals(0).map_err(Into::into),
//! );
//! assert!(divide.call(&[Value::from(10), Value::from(0)]).is_err());
//! ```

pub mod assertion;
pub mod contract;
pub mod messenger;
pub mod script;

pub use assertion::{Assertion, Checks, Negation};
pub use contract::signature::{Declaration, Params, SignatureReader};
pub use contract::{function, pre, Bindings, Function, Guarded};
pub use messenger::{FailurePolicy, Messenger};
pub use script::{CheckScript, CheckStep};

pub use covenant_core::{
    AssertError, Comparator, ContractError, PreconditionError, Report, ReportSnapshot,
    SignatureError, UsageError, Value,
};
