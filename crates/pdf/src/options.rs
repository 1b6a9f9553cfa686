use crate::layout::Orientation;
use serde::{Deserialize, Serialize};

/// Output name used when none is given
pub const DEFAULT_OUTPUT_NAME: &str = "financial-report";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Page width and height in points for the orientation
    pub fn dimensions(self, orientation: Orientation) -> (f32, f32) {
        let (short, long) = match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
        };
        match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

/// Report rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub title: String,
    pub page_size: PageSize,
    /// Page margin in points
    pub margin: f32,
    /// File name (without `.pdf`) used when the user leaves it blank
    pub output_name: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Financial Report".to_string(),
            page_size: PageSize::A4,
            margin: 14.0,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

impl ReportOptions {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The `.pdf` file name for a user-supplied name.
    ///
    /// Blank names fall back to `output_name`; a trailing `.pdf` is not
    /// doubled.
    pub fn pdf_filename(&self, name: &str) -> String {
        let name = name.trim();
        let name = if name.is_empty() {
            self.output_name.as_str()
        } else {
            name
        };
        if name.to_ascii_lowercase().ends_with(".pdf") {
            name.to_string()
        } else {
            format!("{name}.pdf")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReportOptions::default();
        assert_eq!(options.title, "Financial Report");
        assert_eq!(options.pdf_filename(""), "financial-report.pdf");
    }

    #[test]
    fn test_pdf_filename() {
        let options = ReportOptions::default();
        assert_eq!(options.pdf_filename("march"), "march.pdf");
        assert_eq!(options.pdf_filename("march.PDF"), "march.PDF");
        assert_eq!(options.pdf_filename("  "), "financial-report.pdf");
    }

    #[test]
    fn test_partial_json() {
        let options: ReportOptions = serde_json::from_str(r#"{"page_size":"letter"}"#).unwrap();
        assert_eq!(options.page_size, PageSize::Letter);
        assert_eq!(options.margin, 14.0);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let (w, h) = PageSize::A4.dimensions(Orientation::Landscape);
        assert!(w > h);
    }
}
