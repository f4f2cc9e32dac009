//! Breakage records and their rendering styles.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

/// The detected breakage kinds. Two reserved kinds exist for future type
/// comparison and are never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakageKind {
    #[serde(rename = "parameter-moved")]
    ParameterMoved,
    #[serde(rename = "parameter-removed")]
    ParameterRemoved,
    #[serde(rename = "parameter-kind-changed")]
    ParameterKindChanged,
    #[serde(rename = "parameter-default-changed")]
    ParameterDefaultChanged,
    #[serde(rename = "parameter-now-required")]
    ParameterNowRequired,
    #[serde(rename = "parameter-added-required")]
    ParameterAddedRequired,
    /// Reserved; types are not currently compared.
    #[serde(rename = "return-type-incompatible")]
    ReturnTypeIncompatible,
    #[serde(rename = "object-removed")]
    ObjectRemoved,
    #[serde(rename = "object-kind-changed")]
    ObjectKindChanged,
    /// Reserved; types are not currently compared.
    #[serde(rename = "attribute-type-incompatible")]
    AttributeTypeIncompatible,
    #[serde(rename = "attribute-value-changed")]
    AttributeValueChanged,
    #[serde(rename = "class-base-removed")]
    ClassBaseRemoved,
}

impl BreakageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakageKind::ParameterMoved => "parameter-moved",
            BreakageKind::ParameterRemoved => "parameter-removed",
            BreakageKind::ParameterKindChanged => "parameter-kind-changed",
            BreakageKind::ParameterDefaultChanged => "parameter-default-changed",
            BreakageKind::ParameterNowRequired => "parameter-now-required",
            BreakageKind::ParameterAddedRequired => "parameter-added-required",
            BreakageKind::ReturnTypeIncompatible => "return-type-incompatible",
            BreakageKind::ObjectRemoved => "object-removed",
            BreakageKind::ObjectKindChanged => "object-kind-changed",
            BreakageKind::AttributeTypeIncompatible => "attribute-type-incompatible",
            BreakageKind::AttributeValueChanged => "attribute-value-changed",
            BreakageKind::ClassBaseRemoved => "class-base-removed",
        }
    }
}

impl std::fmt::Display for BreakageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific explanation fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BreakageDetails {
    ParameterMoved {
        parameter: String,
        old_index: usize,
        new_index: usize,
    },
    ParameterRemoved {
        parameter: String,
    },
    ParameterKindChanged {
        parameter: String,
        old_kind: String,
        new_kind: String,
    },
    ParameterDefaultChanged {
        parameter: String,
        old_default: String,
        new_default: String,
    },
    ParameterNowRequired {
        parameter: String,
    },
    ParameterAddedRequired {
        parameter: String,
    },
    // Fieldless but brace-form: the details flatten into the record as a
    // map for every kind.
    ObjectRemoved {},
    ObjectKindChanged {
        old_kind: String,
        new_kind: String,
    },
    AttributeValueChanged {
        old_value: String,
        new_value: String,
    },
    ClassBaseRemoved {
        base: String,
    },
}

impl BreakageDetails {
    pub fn kind(&self) -> BreakageKind {
        match self {
            BreakageDetails::ParameterMoved { .. } => BreakageKind::ParameterMoved,
            BreakageDetails::ParameterRemoved { .. } => BreakageKind::ParameterRemoved,
            BreakageDetails::ParameterKindChanged { .. } => BreakageKind::ParameterKindChanged,
            BreakageDetails::ParameterDefaultChanged { .. } => BreakageKind::ParameterDefaultChanged,
            BreakageDetails::ParameterNowRequired { .. } => BreakageKind::ParameterNowRequired,
            BreakageDetails::ParameterAddedRequired { .. } => BreakageKind::ParameterAddedRequired,
            BreakageDetails::ObjectRemoved {} => BreakageKind::ObjectRemoved,
            BreakageDetails::ObjectKindChanged { .. } => BreakageKind::ObjectKindChanged,
            BreakageDetails::AttributeValueChanged { .. } => BreakageKind::AttributeValueChanged,
            BreakageDetails::ClassBaseRemoved { .. } => BreakageKind::ClassBaseRemoved,
        }
    }
}

/// One detected API breakage. The reported path is the public exposure in
/// the old snapshot; the location points at the new object when it exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakage {
    pub kind: BreakageKind,
    /// Public exposure path in the old snapshot.
    pub old_path: String,
    /// Path of the corresponding new object, when one exists.
    pub new_path: Option<String>,
    #[serde(flatten)]
    pub details: BreakageDetails,
    pub filepath: Option<PathBuf>,
    pub lineno: Option<usize>,
}

impl Breakage {
    pub fn new(old_path: impl Into<String>, details: BreakageDetails) -> Self {
        Self {
            kind: details.kind(),
            old_path: old_path.into(),
            new_path: None,
            details,
            filepath: None,
            lineno: None,
        }
    }

    pub fn at(mut self, filepath: Option<PathBuf>, lineno: Option<usize>) -> Self {
        self.filepath = filepath;
        self.lineno = lineno;
        self
    }

    pub fn with_new_path(mut self, new_path: impl Into<String>) -> Self {
        self.new_path = Some(new_path.into());
        self
    }

    /// Human-readable explanation of what broke.
    pub fn explain(&self) -> String {
        match &self.details {
            BreakageDetails::ParameterMoved {
                parameter,
                old_index,
                new_index,
            } => format!(
                "positional parameter '{parameter}' moved from index {old_index} to {new_index}"
            ),
            BreakageDetails::ParameterRemoved { parameter } => {
                format!("parameter '{parameter}' was removed")
            }
            BreakageDetails::ParameterKindChanged {
                parameter,
                old_kind,
                new_kind,
            } => format!("parameter '{parameter}' changed kind from {old_kind} to {new_kind}"),
            BreakageDetails::ParameterDefaultChanged {
                parameter,
                old_default,
                new_default,
            } => format!(
                "parameter '{parameter}' default changed from {old_default} to {new_default}"
            ),
            BreakageDetails::ParameterNowRequired { parameter } => {
                format!("parameter '{parameter}' is now required")
            }
            BreakageDetails::ParameterAddedRequired { parameter } => {
                format!("required parameter '{parameter}' was added")
            }
            BreakageDetails::ObjectRemoved {} => "public object was removed".to_string(),
            BreakageDetails::ObjectKindChanged { old_kind, new_kind } => {
                format!("object changed kind from {old_kind} to {new_kind}")
            }
            BreakageDetails::AttributeValueChanged {
                old_value,
                new_value,
            } => format!("attribute value changed from {old_value} to {new_value}"),
            BreakageDetails::ClassBaseRemoved { base } => {
                format!("base class {base} was removed")
            }
        }
    }

    pub fn render(&self, style: Style) -> String {
        match style {
            Style::OneLine => format!(
                "{}: {}: {}",
                self.old_path.bold(),
                self.kind.as_str().red(),
                self.explain()
            ),
            Style::Verbose => {
                let mut out = format!(
                    "{}: {}: {}",
                    self.old_path.bold(),
                    self.kind.as_str().red(),
                    self.explain()
                );
                if let (Some(filepath), Some(lineno)) = (&self.filepath, self.lineno) {
                    out.push_str(&format!("\n  at {}:{lineno}", filepath.display()));
                }
                if let Some(new_path) = &self.new_path {
                    out.push_str(&format!("\n  now: {new_path}"));
                }
                out
            }
            Style::Markdown => format!(
                "- `{}`: **{}**: {}",
                self.old_path,
                self.kind.as_str(),
                self.explain()
            ),
            Style::Github => {
                let mut location = String::new();
                if let Some(filepath) = &self.filepath {
                    location.push_str(&format!(" file={}", filepath.display()));
                    if let Some(lineno) = self.lineno {
                        location.push_str(&format!(",line={lineno}"));
                    }
                }
                format!(
                    "::warning{}::{}: {}: {}",
                    location,
                    self.old_path,
                    self.kind.as_str(),
                    self.explain()
                )
            }
        }
    }
}

/// Output styles; rendering is the CLI collaborator's concern, the core
/// only yields structured records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    OneLine,
    Verbose,
    Markdown,
    Github,
}

impl std::str::FromStr for Style {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "oneline" => Ok(Style::OneLine),
            "verbose" => Ok(Style::Verbose),
            "markdown" => Ok(Style::Markdown),
            "github" => Ok(Style::Github),
            other => Err(format!("unknown style {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Breakage {
        Breakage::new(
            "pkg.greet",
            BreakageDetails::ParameterNowRequired {
                parameter: "prefix".to_string(),
            },
        )
        .at(Some(PathBuf::from("/src/pkg/__init__.py")), Some(3))
    }

    #[test]
    fn test_kind_matches_details() {
        assert_eq!(sample().kind, BreakageKind::ParameterNowRequired);
    }

    #[test]
    fn test_render_styles() {
        colored::control::set_override(false);
        let breakage = sample();
        assert_eq!(
            breakage.render(Style::OneLine),
            "pkg.greet: parameter-now-required: parameter 'prefix' is now required"
        );
        assert!(breakage.render(Style::Verbose).contains("/src/pkg/__init__.py:3"));
        assert!(breakage.render(Style::Markdown).starts_with("- `pkg.greet`"));
        assert!(breakage
            .render(Style::Github)
            .starts_with("::warning file=/src/pkg/__init__.py,line=3::"));
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("markdown".parse::<Style>().unwrap(), Style::Markdown);
        assert!("fancy".parse::<Style>().is_err());
    }

    #[test]
    fn test_serialized_kind_discriminator() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["kind"], "parameter-now-required");
        assert_eq!(value["parameter"], "prefix");
    }
}
