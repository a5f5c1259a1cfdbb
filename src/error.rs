//! Error taxonomy for configuration construction, assembly and rendering
//!
//! Every error carries the dotted path of the offending slot or field. Variant
//! resolution errors also carry the full list of legal alternatives so that a
//! caller can correct the input without looking anything up.

use std::fmt;

use thiserror::Error;

use crate::tagged;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Value shown for a required field that was not given
pub const MISSING: &str = "<missing>";

/// Constraint reported for a required field that was not given
pub const REQUIRED: &str = "field is required";

/// A single failed field constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub value: String,
    pub constraint: String,
}

impl FieldError {
    pub fn new(
        path: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (got {})", self.path, self.constraint, self.value)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{} invalid field(s): {}", .0.len(), join_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("{path}: missing discriminator 'model_type', expected one of [{}]", .expected.join(", "))]
    MissingDiscriminator {
        path: String,
        expected: Vec<&'static str>,
    },

    #[error("{path}: unknown variant '{tag}', expected one of [{}]", .expected.join(", "))]
    UnknownVariant {
        path: String,
        tag: String,
        expected: Vec<&'static str>,
    },

    #[error("{path}: unexpected field '{field}', expected one of [{}]", .expected.join(", "))]
    UnexpectedField {
        path: String,
        field: String,
        expected: Vec<&'static str>,
    },

    #[error("conflicting commands '{first}' and '{second}': {reason}")]
    ConflictingCommands {
        first: String,
        second: String,
        reason: String,
    },

    #[error("{path}: incomplete command: {reason}")]
    IncompleteCommand { path: String, reason: String },

    #[error("{path}: unsupported quantity '{quantity}', expected one of [{}]", .expected.join(", "))]
    UnsupportedQuantity {
        path: String,
        quantity: String,
        expected: Vec<&'static str>,
    },

    #[error("{path}: spectral data '{source_id}' {reason}")]
    IncompatibleSpectralShape {
        path: String,
        source_id: String,
        reason: String,
    },

    #[error("{path}: {message}")]
    Invalid { path: String, message: String },
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn prefix(outer: &str, inner: &str) -> String {
    match (outer.is_empty(), inner.is_empty()) {
        (true, _) => inner.to_string(),
        (false, true) => outer.to_string(),
        (false, false) if inner.starts_with('[') => format!("{outer}{inner}"),
        (false, false) => format!("{outer}.{inner}"),
    }
}

impl ConfigError {
    pub fn incomplete(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IncompleteCommand {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the error's path with an enclosing slot name.
    pub fn at(self, outer: &str) -> Self {
        match self {
            Self::Validation(errors) => Self::Validation(
                errors
                    .into_iter()
                    .map(|e| FieldError {
                        path: prefix(outer, &e.path),
                        ..e
                    })
                    .collect(),
            ),
            Self::MissingDiscriminator { path, expected } => Self::MissingDiscriminator {
                path: prefix(outer, &path),
                expected,
            },
            Self::UnknownVariant {
                path,
                tag,
                expected,
            } => Self::UnknownVariant {
                path: prefix(outer, &path),
                tag,
                expected,
            },
            Self::UnexpectedField {
                path,
                field,
                expected,
            } => Self::UnexpectedField {
                path: prefix(outer, &path),
                field,
                expected,
            },
            Self::IncompleteCommand { path, reason } => Self::IncompleteCommand {
                path: prefix(outer, &path),
                reason,
            },
            Self::UnsupportedQuantity {
                path,
                quantity,
                expected,
            } => Self::UnsupportedQuantity {
                path: prefix(outer, &path),
                quantity,
                expected,
            },
            Self::IncompatibleSpectralShape {
                path,
                source_id,
                reason,
            } => Self::IncompatibleSpectralShape {
                path: prefix(outer, &path),
                source_id,
                reason,
            },
            Self::Invalid { path, message } => Self::Invalid {
                path: prefix(outer, &path),
                message,
            },
            other @ Self::ConflictingCommands { .. } => other,
        }
    }

    /// Field errors when this is a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

// ============================================================================
// serde integration
// ============================================================================
//
// Variant resolution runs inside serde. Implementing `de::Error` lets the
// typed variants come straight out of `Deserialize` impls instead of being
// flattened into strings. Each error takes the path of the value being
// replayed when it is raised.

fn here(field: &str) -> String {
    prefix(&tagged::current_path(), field)
}

impl serde::de::Error for ConfigError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Invalid {
            path: tagged::current_path(),
            message: msg.to_string(),
        }
    }

    fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
        if variant.is_empty() {
            Self::MissingDiscriminator {
                path: tagged::current_path(),
                expected: expected.to_vec(),
            }
        } else {
            Self::UnknownVariant {
                path: tagged::current_path(),
                tag: variant.to_string(),
                expected: expected.to_vec(),
            }
        }
    }

    fn unknown_field(field: &str, expected: &'static [&'static str]) -> Self {
        Self::UnexpectedField {
            path: here(field),
            field: field.to_string(),
            expected: expected.to_vec(),
        }
    }

    fn missing_field(field: &'static str) -> Self {
        Self::Validation(vec![FieldError::new(here(field), MISSING, REQUIRED)])
    }
}
