//! Template rendering
//!
//! The completion reply is only *expected* to be CSV. We make one strict
//! parse attempt with a single header row; the raw text is always kept so it
//! can be shown (and downloaded) exactly as received.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::TemplateParseError;

/// Content type used for downloads
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// A successfully parsed template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Render as an HTML table, escaping every cell
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"risk-template\">\n<thead><tr>");
        for header in &self.headers {
            html.push_str("<th>");
            html.push_str(&html_escape::encode_text(header));
            html.push_str("</th>");
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str("<td>");
                html.push_str(&html_escape::encode_text(cell));
                html.push_str("</td>");
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

/// Outcome of trying to read a template as CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    Parsed(ParsedTable),
    Unparsed { error: String },
}

/// A template ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTemplate {
    pub file_name: String,
    pub raw_text: String,
    pub outcome: RenderOutcome,
}

impl RenderedTemplate {
    pub fn is_parsed(&self) -> bool {
        matches!(self.outcome, RenderOutcome::Parsed(_))
    }

    pub fn table(&self) -> Option<&ParsedTable> {
        match &self.outcome {
            RenderOutcome::Parsed(table) => Some(table),
            RenderOutcome::Unparsed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RenderOutcome::Parsed(_) => None,
            RenderOutcome::Unparsed { error } => Some(error),
        }
    }

    /// Downloadable content: only offered when the template parsed
    pub fn download(&self) -> Option<Download<'_>> {
        self.is_parsed().then(|| Download {
            file_name: &self.file_name,
            content_type: CSV_CONTENT_TYPE,
            body: &self.raw_text,
        })
    }
}

/// File offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Download<'a> {
    pub file_name: &'a str,
    pub content_type: &'static str,
    pub body: &'a str,
}

/// Parse template text as CSV with exactly one header row.
///
/// Records must all have the header's field count. Fields are kept as-is.
pub fn parse_template(text: &str) -> Result<ParsedTable, TemplateParseError> {
    if text.trim().is_empty() {
        return Err(TemplateParseError::MissingHeader);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(TemplateParseError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ParsedTable { headers, rows })
}

/// Try to parse `raw_text` and package it for display under `file_name`
pub fn render_template(raw_text: String, file_name: &str) -> RenderedTemplate {
    let outcome = match parse_template(&raw_text) {
        Ok(table) => {
            debug!(
                "Parsed template: {} columns, {} rows",
                table.column_count(),
                table.row_count()
            );
            RenderOutcome::Parsed(table)
        }
        Err(e) => {
            warn!("Template did not parse as CSV: {}", e);
            RenderOutcome::Unparsed {
                error: e.to_string(),
            }
        }
    };

    RenderedTemplate {
        file_name: file_name.to_string(),
        raw_text,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const TEMPLATE: &str = "Risk category,Risk,Control,Mitigation,Relevant Vendor Info/Docs,Reference,Risk Explainer
Data,Training data leak,DLP,Mask PII,Vendor DPA,GDPR Art. 5,\"Customer data could end up in the model, e.g. emails\"
Security,Prompt injection,Input filtering,Red-team tests,Vendor security whitepaper,NIST AI RMF,Users can trick the bot
";

    #[test]
    fn test_parse_well_formed_template() {
        let table = parse_template(TEMPLATE).unwrap();

        assert_eq!(
            table.headers,
            vec![
                "Risk category",
                "Risk",
                "Control",
                "Mitigation",
                "Relevant Vendor Info/Docs",
                "Reference",
                "Risk Explainer"
            ]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0][6],
            "Customer data could end up in the model, e.g. emails"
        );
    }

    #[test]
    fn test_header_only_yields_zero_rows() {
        let table = parse_template("a,b,c").unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_fields_are_not_trimmed() {
        let table = parse_template("Risk category, Risk\nData, Leak\n").unwrap();
        assert_eq!(table.headers, vec!["Risk category", " Risk"]);
        assert_eq!(table.rows, vec![vec!["Data".to_string(), " Leak".to_string()]]);
    }

    #[test]
    fn test_any_shape_is_accepted() {
        // No schema check: two columns with unrelated names still parse
        let table = parse_template("foo,bar\n1,2\n").unwrap();
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_inconsistent_columns_fail() {
        let err = parse_template("a,b\n1,2\n3,4,5\n").unwrap_err();
        match err {
            TemplateParseError::Csv(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_has_no_header() {
        assert_eq!(parse_template(""), Err(TemplateParseError::MissingHeader));
        assert_eq!(parse_template("  \n\n"), Err(TemplateParseError::MissingHeader));
    }

    #[test]
    fn test_render_success_exposes_download() {
        let rendered = render_template(TEMPLATE.to_string(), "risk_template.csv");

        assert!(rendered.is_parsed());
        let download = rendered.download().unwrap();
        assert_eq!(download.file_name, "risk_template.csv");
        assert_eq!(download.content_type, "text/csv");
        assert_eq!(download.body, TEMPLATE);
    }

    #[test]
    fn test_render_failure_keeps_raw_text() {
        let raw = "Error in response: {\"error\":\"quota\"}\nsecond,line,here".to_string();
        let rendered = render_template(raw.clone(), "risk_template.csv");

        assert!(!rendered.is_parsed());
        assert!(rendered.error().is_some());
        assert!(rendered.download().is_none());
        assert_eq!(rendered.raw_text, raw);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let rendered = render_template("a\n1\n".to_string(), "x.csv");
        let json = serde_json::to_value(&rendered.outcome).unwrap();
        assert_eq!(json["status"], "parsed");
        assert_eq!(json["headers"][0], "a");

        let rendered = render_template("a\n1,2\n".to_string(), "x.csv");
        let json = serde_json::to_value(&rendered.outcome).unwrap();
        assert_eq!(json["status"], "unparsed");
        assert!(json["error"].is_string());
    }

    #[test]
    fn test_html_escapes_cells() {
        let table = parse_template("Risk,Note\nXSS,<script>alert(1)</script>\n").unwrap();
        let html = table.to_html();

        assert!(html.contains("<th>Risk</th>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    fn csv_table() -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
        (1usize..8).prop_flat_map(|columns| {
            (
                prop::collection::vec("[A-Za-z][A-Za-z ]{0,10}", columns),
                prop::collection::vec(
                    prop::collection::vec("[A-Za-z0-9][A-Za-z0-9 ./]{0,12}", columns),
                    0..20,
                ),
            )
        })
    }

    fn to_csv(headers: &[String], rows: &[Vec<String>]) -> String {
        let mut text = headers.join(",");
        text.push('\n');
        for row in rows {
            text.push_str(&row.join(","));
            text.push('\n');
        }
        text
    }

    proptest! {
        /// Property: K data rows parse to exactly K rows with headers in order
        #[test]
        fn well_formed_csv_parses_all_rows((headers, rows) in csv_table()) {
            let text = to_csv(&headers, &rows);
            let rendered = render_template(text.clone(), "risk_template.csv");

            let table = rendered.table().expect("should parse");
            prop_assert_eq!(&table.headers, &headers);
            prop_assert_eq!(table.row_count(), rows.len());
            prop_assert_eq!(&table.rows, &rows);
            prop_assert_eq!(rendered.download().map(|d| d.body), Some(text.as_str()));
        }

        /// Property: an extra field in any row fails the parse and leaves the text untouched
        #[test]
        fn ragged_csv_is_unparsed(
            (headers, mut rows) in csv_table(),
            extra in "[a-z]{1,5}",
            at in any::<prop::sample::Index>(),
        ) {
            rows.push(headers.clone());
            let idx = at.index(rows.len());
            rows[idx].push(extra);

            let text = to_csv(&headers, &rows);
            let rendered = render_template(text.clone(), "risk_template.csv");

            prop_assert!(!rendered.is_parsed());
            prop_assert_eq!(rendered.raw_text, text);
        }
    }
}
