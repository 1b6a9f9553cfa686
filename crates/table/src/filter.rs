//! Column filters.
//!
//! A list of [`FilterSpec`]s is combined with logical AND. Text operators
//! compare lowercased display strings; `greater`/`less` require both the cell
//! and the filter value to parse as numbers and fail closed otherwise.

use crate::cell::{try_parse_number, CellValue};
use crate::table::{Row, Table, TableView};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison applied by a single filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Contains,
    Equals,
    Greater,
    Less,
    StartsWith,
    EndsWith,
    /// An operator name this build does not know. Rows always pass it.
    Unrecognized(String),
}

impl FilterOperator {
    /// Every known operator with its display label, in menu order
    pub const ALL: [(FilterOperator, &'static str); 6] = [
        (FilterOperator::Contains, "Contains"),
        (FilterOperator::Equals, "Equals"),
        (FilterOperator::Greater, "Greater Than"),
        (FilterOperator::Less, "Less Than"),
        (FilterOperator::StartsWith, "Starts With"),
        (FilterOperator::EndsWith, "Ends With"),
    ];

    /// Canonical name (`contains`, `startsWith`, ...)
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::Greater => "greater",
            FilterOperator::Less => "less",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Unrecognized(name) => name,
        }
    }
}

impl FromStr for FilterOperator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "contains" => FilterOperator::Contains,
            "equals" => FilterOperator::Equals,
            "greater" => FilterOperator::Greater,
            "less" => FilterOperator::Less,
            "startsWith" => FilterOperator::StartsWith,
            "endsWith" => FilterOperator::EndsWith,
            other => FilterOperator::Unrecognized(other.to_string()),
        })
    }
}

impl From<String> for FilterOperator {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicate: column, operator and comparison value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterSpec {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// The filter a freshly added filter row starts with: first column,
    /// `contains`, empty value.
    pub fn initial(headers: &[String]) -> Self {
        Self::new(
            headers.first().cloned().unwrap_or_default(),
            FilterOperator::Contains,
            "",
        )
    }

    /// Whether a row satisfies this filter
    pub fn matches(&self, headers: &[String], row: &Row) -> bool {
        if !headers.iter().any(|h| *h == self.column) {
            return false;
        }

        let empty = CellValue::empty();
        let cell = row.get(&self.column).unwrap_or(&empty);
        let needle = self.value.to_lowercase();

        match &self.operator {
            FilterOperator::Contains => cell.folded().contains(&needle),
            FilterOperator::Equals => cell.folded() == needle,
            FilterOperator::StartsWith => cell.folded().starts_with(&needle),
            FilterOperator::EndsWith => cell.folded().ends_with(&needle),
            FilterOperator::Greater => match (cell.as_number(), try_parse_number(&self.value)) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            FilterOperator::Less => match (cell.as_number(), try_parse_number(&self.value)) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
            FilterOperator::Unrecognized(_) => true,
        }
    }
}

/// Whether a row satisfies every filter in the list
pub fn row_matches(headers: &[String], row: &Row, filters: &[FilterSpec]) -> bool {
    filters.iter().all(|f| f.matches(headers, row))
}

/// Select the rows of a table that satisfy every filter, preserving order
pub fn apply<'a>(table: &'a Table, filters: &[FilterSpec]) -> TableView<'a> {
    let view = TableView::full(table).filter(filters);
    tracing::debug!(
        filters = filters.len(),
        kept = view.len(),
        total = table.row_count(),
        "Applied filters"
    );
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_rows(
            vec!["description", "amount", "category"],
            vec![
                vec![CellValue::from("Grocery Store"), CellValue::from(42.5), CellValue::from("Food")],
                vec![CellValue::from("Bus pass"), CellValue::from("30"), CellValue::from("Transport")],
                vec![CellValue::from("Cafe"), CellValue::from("n/a"), CellValue::from("food")],
            ],
        )
    }

    fn kept(filters: &[FilterSpec]) -> Vec<usize> {
        let table = table();
        apply(&table, filters).indices().to_vec()
    }

    #[test]
    fn test_empty_filter_list_keeps_all() {
        assert_eq!(kept(&[]), vec![0, 1, 2]);
    }

    #[test]
    fn test_text_operators_ignore_case() {
        let eq = FilterSpec::new("category", FilterOperator::Equals, "FOOD");
        assert_eq!(kept(&[eq]), vec![0, 2]);

        let contains = FilterSpec::new("description", FilterOperator::Contains, "store");
        assert_eq!(kept(&[contains]), vec![0]);

        let starts = FilterSpec::new("description", FilterOperator::StartsWith, "bu");
        assert_eq!(kept(&[starts]), vec![1]);

        let ends = FilterSpec::new("description", FilterOperator::EndsWith, "FE");
        assert_eq!(kept(&[ends]), vec![2]);
    }

    #[test]
    fn test_numeric_operators_fail_closed() {
        let greater = FilterSpec::new("amount", FilterOperator::Greater, "35");
        assert_eq!(kept(&[greater]), vec![0]);

        let less = FilterSpec::new("amount", FilterOperator::Less, "35");
        assert_eq!(kept(&[less]), vec![1]);

        let bad_value = FilterSpec::new("amount", FilterOperator::Less, "lots");
        assert!(kept(&[bad_value]).is_empty());
    }

    #[test]
    fn test_filters_are_anded() {
        let filters = [
            FilterSpec::new("category", FilterOperator::Equals, "food"),
            FilterSpec::new("amount", FilterOperator::Greater, "0"),
        ];
        assert_eq!(kept(&filters), vec![0]);
    }

    #[test]
    fn test_unknown_column_never_matches() {
        let f = FilterSpec::new("vendor", FilterOperator::Contains, "");
        assert!(kept(&[f]).is_empty());
    }

    #[test]
    fn test_unrecognized_operator_passes() {
        let op: FilterOperator = "regex".parse().unwrap();
        assert_eq!(op, FilterOperator::Unrecognized("regex".to_string()));
        let f = FilterSpec::new("category", op, "zzz");
        assert_eq!(kept(&[f]), vec![0, 1, 2]);
    }

    #[test]
    fn test_operator_serde_names() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"column":"a","operator":"startsWith","value":"x"}"#).unwrap();
        assert_eq!(spec.operator, FilterOperator::StartsWith);
        assert_eq!(
            serde_json::to_string(&FilterOperator::EndsWith).unwrap(),
            r#""endsWith""#
        );
    }

    #[test]
    fn test_initial_filter() {
        let headers = vec!["date".to_string(), "amount".to_string()];
        let f = FilterSpec::initial(&headers);
        assert_eq!(f.column, "date");
        assert_eq!(f.operator, FilterOperator::Contains);
        assert!(f.value.is_empty());
    }
}
