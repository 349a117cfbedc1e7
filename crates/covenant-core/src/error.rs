//! Error types for contract checking.
//!
//! Uses `thiserror` for structured, matchable variants. Contract violations
//! ([`AssertError`], [`PreconditionError`]) are kept apart from programmer
//! misuse of the API ([`UsageError`]) and from parameter-name recovery
//! failures ([`SignatureError`]). [`ContractError`] unifies all three for
//! guarded calls.

use thiserror::Error;

/// A failed check inside contract enforcement.
///
/// Every `PreconditionError` converts into [`AssertError::Precondition`], so
/// code matching on `AssertError` sees precondition violations as well.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PreconditionError {
    /// The failing report's description.
    pub message: String,
}

impl PreconditionError {
    pub fn new(message: impl Into<String>) -> Self {
        PreconditionError {
            message: message.into(),
        }
    }
}

/// A failed check in a throwing session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertError {
    /// Generic contract violation.
    #[error("{message}")]
    Violation { message: String },

    /// Parameter contract violation.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

impl AssertError {
    /// The failing report's description.
    pub fn message(&self) -> &str {
        match self {
            AssertError::Violation { message } => message,
            AssertError::Precondition(e) => &e.message,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, AssertError::Precondition(_))
    }

    pub fn as_precondition(&self) -> Option<&PreconditionError> {
        match self {
            AssertError::Precondition(e) => Some(e),
            AssertError::Violation { .. } => None,
        }
    }
}

/// Misuse of the checking API itself. Never a contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// `enforce` was called without any argument.
    #[error("a value is required")]
    MissingValue,

    /// A check was requested by a name the registry does not know.
    #[error("no such check: '{id}'")]
    NoSuchCheck { id: String },

    /// A binding was requested for a name the function does not declare.
    #[error("unknown parameter: '{name}'")]
    UnknownParameter { name: String },

    /// A script step names neither a parameter nor an enforce target.
    #[error("step {index} has no target")]
    NoTarget { index: usize },
}

/// The declared parameter names could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("no parameter list found in '{text}'")]
    NoParameterList { text: String },

    #[error("unbalanced delimiters in '{text}'")]
    Unbalanced { text: String },

    /// Destructuring patterns and other non-identifier parameters.
    #[error("unsupported parameter at position {position}: '{text}'")]
    UnsupportedParameter { position: usize, text: String },

    #[error("invalid parameter name: '{name}'")]
    InvalidName { name: String },

    #[error("duplicate parameter name: '{name}'")]
    DuplicateName { name: String },
}

/// Anything a guarded call or a specification can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error(transparent)]
    Assert(#[from] AssertError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl From<PreconditionError> for ContractError {
    fn from(e: PreconditionError) -> Self {
        ContractError::Assert(AssertError::Precondition(e))
    }
}

impl ContractError {
    /// True for failed checks, false for usage and signature errors.
    pub fn is_violation(&self) -> bool {
        matches!(self, ContractError::Assert(_))
    }

    pub fn as_precondition(&self) -> Option<&PreconditionError> {
        match self {
            ContractError::Assert(e) => e.as_precondition(),
            _ => None,
        }
    }
}
