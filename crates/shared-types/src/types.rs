use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Header row every generated risk template is asked to carry.
pub const TEMPLATE_COLUMNS: [&str; 7] = [
    "Risk category",
    "Risk",
    "Control",
    "Mitigation",
    "Relevant Vendor Info/Docs",
    "Reference",
    "Risk Explainer",
];

/// Download name for a freshly generated template
pub const RISK_TEMPLATE_FILE: &str = "risk_template.csv";

/// Download name for a template regenerated with edit comments
pub const UPDATED_RISK_TEMPLATE_FILE: &str = "updated_risk_template.csv";

/// A file uploaded through the form. Lives for one request only.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Free-text context describing who the risk template is for
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RiskProfile {
    /// Industry, size & geography
    pub business_profile: String,
    /// R&D or production
    pub project_profile: String,
    /// Technology components
    pub tool_profile: String,
    /// Notes about the bespoke risk process
    pub extra_comments: String,
}

/// Requested length of the generated risk list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TemplateStyle {
    #[serde(rename = "long", alias = "Long & Granular")]
    LongGranular,
    #[default]
    #[serde(rename = "short", alias = "Short & Succinct")]
    ShortSuccinct,
}

impl TemplateStyle {
    pub const ALL: [TemplateStyle; 2] = [TemplateStyle::LongGranular, TemplateStyle::ShortSuccinct];

    /// Value used on the wire and in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStyle::LongGranular => "long",
            TemplateStyle::ShortSuccinct => "short",
        }
    }

    /// Button label shown on the form
    pub fn label(&self) -> &'static str {
        match self {
            TemplateStyle::LongGranular => "Long & Granular",
            TemplateStyle::ShortSuccinct => "Short & Succinct",
        }
    }

    /// Sentence placed in the prompt to steer the number of risks
    pub fn risk_count_clause(&self) -> &'static str {
        match self {
            TemplateStyle::LongGranular => "Generate a longer list of risks (20-30).",
            TemplateStyle::ShortSuccinct => "Generate a shorter list of risks (<10).",
        }
    }
}

impl fmt::Display for TemplateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown template style '{0}'. Must be 'long' or 'short'")]
pub struct StyleParseError(pub String);

impl FromStr for TemplateStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "long" | "long & granular" => Ok(TemplateStyle::LongGranular),
            "short" | "short & succinct" => Ok(TemplateStyle::ShortSuccinct),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_style_is_short() {
        assert_eq!(TemplateStyle::default(), TemplateStyle::ShortSuccinct);
    }

    #[test]
    fn test_style_parses_wire_names_and_labels() {
        assert_eq!("long".parse(), Ok(TemplateStyle::LongGranular));
        assert_eq!("Short & Succinct".parse(), Ok(TemplateStyle::ShortSuccinct));
        assert_eq!(" LONG ".parse(), Ok(TemplateStyle::LongGranular));
    }

    #[test]
    fn test_style_serde_uses_wire_names() {
        let json = serde_json::to_string(&TemplateStyle::LongGranular).unwrap();
        assert_eq!(json, "\"long\"");

        let style: TemplateStyle = serde_json::from_str("\"Short & Succinct\"").unwrap();
        assert_eq!(style, TemplateStyle::ShortSuccinct);
    }

    #[test]
    fn test_clauses_are_distinct() {
        assert_ne!(
            TemplateStyle::LongGranular.risk_count_clause(),
            TemplateStyle::ShortSuccinct.risk_count_clause()
        );
    }

    #[test]
    fn test_template_columns_header() {
        assert_eq!(
            TEMPLATE_COLUMNS.join(", "),
            "Risk category, Risk, Control, Mitigation, Relevant Vendor Info/Docs, Reference, Risk Explainer"
        );
    }

    proptest! {
        #[test]
        fn unknown_styles_are_rejected(s in "[a-z]{1,12}".prop_filter(
            "Must not be a style name",
            |s| !matches!(s.as_str(), "long" | "short")
        )) {
            prop_assert!(s.parse::<TemplateStyle>().is_err());
        }
    }
}
