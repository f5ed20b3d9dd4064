//! Import options configuration.

use crate::model::Locale;

/// Workbook name used when none is given.
pub const DEFAULT_WORKBOOK_NAME: &str = "Untitled";

/// Options for importing a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Display name of the produced workbook
    pub name: String,

    /// Locale tag of the produced workbook
    pub locale: Locale,

    /// Keep sheets whose state is hidden or veryHidden
    pub include_hidden_sheets: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_WORKBOOK_NAME.to_string(),
            locale: Locale::default(),
            include_hidden_sheets: true,
        }
    }
}

impl ImportOptions {
    /// Create default import options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workbook name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Keep or skip hidden sheets.
    pub fn with_hidden_sheets(mut self, include: bool) -> Self {
        self.include_hidden_sheets = include;
        self
    }
}
