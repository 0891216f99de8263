use std::fmt;

use crate::model::GoalKind;

/// Why an untyped goal configuration could not be narrowed to a variant.
///
/// Only produced by validation; calculations never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NotAnObject,
    MissingType,
    UnknownType(String),
    /// A calculator was handed another kind's configuration
    KindMismatch {
        expected: GoalKind,
        found: GoalKind,
    },
    /// Field shapes or enumerated values did not deserialize
    Malformed {
        kind: GoalKind,
        reason: String,
    },
    MissingField {
        kind: GoalKind,
        field: &'static str,
    },
    InvalidValue {
        kind: GoalKind,
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    /// Goal kind the error refers to, when the tag was recognised.
    pub fn kind(&self) -> Option<GoalKind> {
        match self {
            ConfigError::NotAnObject | ConfigError::MissingType | ConfigError::UnknownType(_) => {
                None
            }
            ConfigError::KindMismatch { found, .. } => Some(*found),
            ConfigError::Malformed { kind, .. }
            | ConfigError::MissingField { kind, .. }
            | ConfigError::InvalidValue { kind, .. } => Some(*kind),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotAnObject => write!(f, "goal configuration must be an object"),
            ConfigError::MissingType => write!(f, "goal configuration has no `type` tag"),
            ConfigError::UnknownType(tag) => write!(f, "unknown goal type `{tag}`"),
            ConfigError::KindMismatch { expected, found } => {
                write!(f, "expected a `{expected}` configuration, found `{found}`")
            }
            ConfigError::Malformed { kind, reason } => {
                write!(f, "malformed `{kind}` configuration: {reason}")
            }
            ConfigError::MissingField { kind, field } => {
                write!(f, "`{kind}` configuration is missing `{field}`")
            }
            ConfigError::InvalidValue {
                kind,
                field,
                reason,
            } => write!(f, "invalid `{field}` in `{kind}` configuration: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field_and_kind() {
        let err = ConfigError::MissingField {
            kind: GoalKind::ContinuousResidence,
            field: "visaStartDate",
        };
        assert_eq!(
            err.to_string(),
            "`continuous_residence` configuration is missing `visaStartDate`"
        );
        assert_eq!(err.kind(), Some(GoalKind::ContinuousResidence));
    }

    #[test]
    fn test_unknown_type_has_no_kind() {
        let err = ConfigError::UnknownType("visa_run".to_string());
        assert_eq!(err.kind(), None);
        assert!(err.to_string().contains("visa_run"));
    }
}
