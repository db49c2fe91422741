pub mod types;

pub use types::{
    RiskProfile, StyleParseError, TemplateStyle, UploadedDocument, RISK_TEMPLATE_FILE,
    TEMPLATE_COLUMNS, UPDATED_RISK_TEMPLATE_FILE,
};
