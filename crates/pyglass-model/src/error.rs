use thiserror::Error;

/// Errors raised when following an alias to its target.
///
/// Accessing an unresolved alias never silently returns nothing: it either
/// delegates to the final target or surfaces one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("cannot resolve target {target} of alias {alias}")]
    Resolution { alias: String, target: String },

    #[error("cyclic alias chain: {}", chain.join(" -> "))]
    Cyclic { chain: Vec<String> },
}

impl AliasError {
    pub fn resolution(alias: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Resolution {
            alias: alias.into(),
            target: target.into(),
        }
    }
}

/// Errors raised while decoding a JSON dump back into an object tree.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown object kind {0:?}")]
    UnknownKind(String),

    #[error("missing required field {field:?} on {kind} object")]
    MissingField { kind: &'static str, field: &'static str },

    #[error("field {field:?} has an unexpected shape: {reason}")]
    FieldShape { field: &'static str, reason: String },

    #[error("expression decode error: {0}")]
    Expression(#[source] serde_json::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn missing(kind: &'static str, field: &'static str) -> Self {
        Self::MissingField { kind, field }
    }

    pub fn shape(field: &'static str, reason: impl Into<String>) -> Self {
        Self::FieldShape {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_error_message_lists_chain() {
        let err = AliasError::Cyclic {
            chain: vec!["a.X".to_string(), "b.X".to_string(), "a.X".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic alias chain: a.X -> b.X -> a.X");
    }

    #[test]
    fn test_resolution_error_message() {
        let err = AliasError::resolution("pkg.name", "other.name");
        assert!(err.to_string().contains("pkg.name"));
        assert!(err.to_string().contains("other.name"));
    }
}
