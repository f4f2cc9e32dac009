use serde::{Deserialize, Serialize};

/// Docstring micro-format, named after the convention it follows.
///
/// Parsing is delegated to an external [`DocstringParser`]; the core only
/// records which style was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    Google,
    Numpy,
    Sphinx,
    /// Let the parser guess from the text shape.
    Auto,
}

/// One parsed docstring section (summary, parameters, returns, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocstringSection {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
}

/// External collaborator turning raw docstring text into sections.
pub trait DocstringParser {
    fn parse(&self, docstring: &Docstring, style: DocstringStyle) -> Vec<DocstringSection>;
}

/// Raw docstring attached to an entity: text plus its line range and the
/// style chosen at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Docstring {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineno: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endlineno: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<DocstringStyle>,
}

impl Docstring {
    pub fn new(value: impl Into<String>, lineno: Option<usize>, endlineno: Option<usize>) -> Self {
        Self {
            value: value.into(),
            lineno,
            endlineno,
            style: None,
        }
    }

    pub fn with_style(mut self, style: DocstringStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Hands the raw text to `parser`, honoring `style_override` over the
    /// stored style (falling back to [`DocstringStyle::Auto`]).
    pub fn parse(
        &self,
        parser: &dyn DocstringParser,
        style_override: Option<DocstringStyle>,
    ) -> Vec<DocstringSection> {
        let style = style_override
            .or(self.style)
            .unwrap_or(DocstringStyle::Auto);
        parser.parse(self, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneSection;

    impl DocstringParser for OneSection {
        fn parse(&self, docstring: &Docstring, style: DocstringStyle) -> Vec<DocstringSection> {
            vec![DocstringSection {
                kind: format!("{style:?}").to_lowercase(),
                title: None,
                text: docstring.value.clone(),
            }]
        }
    }

    #[test]
    fn test_parse_uses_stored_style() {
        let doc = Docstring::new("Summary.", Some(2), Some(2)).with_style(DocstringStyle::Numpy);
        let sections = doc.parse(&OneSection, None);
        assert_eq!(sections[0].kind, "numpy");
        assert_eq!(sections[0].text, "Summary.");
    }

    #[test]
    fn test_parse_override_wins() {
        let doc = Docstring::new("Summary.", None, None).with_style(DocstringStyle::Numpy);
        let sections = doc.parse(&OneSection, Some(DocstringStyle::Google));
        assert_eq!(sections[0].kind, "google");
    }

    #[test]
    fn test_parse_defaults_to_auto() {
        let doc = Docstring::new("Summary.", None, None);
        let sections = doc.parse(&OneSection, None);
        assert_eq!(sections[0].kind, "auto");
    }
}
