//! Table module for finreport
//!
//! Holds the in-memory row model decoded from a spreadsheet and the pure
//! filter and sort engines that derive displayed views from it.
//!
//! # Examples
//!
//! ## Filtering and sorting a table
//!
//! ```
//! use finreport_table::{CellValue, FilterOperator, FilterSpec, SortSpec, Table};
//!
//! let table = Table::from_rows(
//!     vec!["description", "amount", "category"],
//!     vec![
//!         vec![CellValue::from("Groceries"), CellValue::from(82.1), CellValue::from("Food")],
//!         vec![CellValue::from("Bus"), CellValue::from(2.5), CellValue::from("Transport")],
//!         vec![CellValue::from("Bakery"), CellValue::from(6), CellValue::from("Food")],
//!     ],
//! );
//!
//! let food = [FilterSpec::new("category", FilterOperator::Equals, "food")];
//! let view = table.view().filter(&food).sort(&SortSpec::ascending("amount"));
//!
//! let names: Vec<String> = view.rows().map(|r| r["description"].as_text()).collect();
//! assert_eq!(names, ["Bakery", "Groceries"]);
//! ```
//!
//! ## Loading a spreadsheet
//!
//! ```no_run
//! use finreport_table::Table;
//!
//! let table = Table::from_spreadsheet("expenses.xlsx").unwrap();
//! ```

mod cell;
mod decode;
mod error;
pub mod filter;
pub mod sort;
mod table;

/// Re-export cell value type and numeric coercion.
pub use cell::{try_parse_number, CellValue};
/// Re-export the worksheet range conversion.
pub use decode::table_from_range;
/// Re-export table error types.
pub use error::{Result, TableError};
/// Re-export filter types.
pub use filter::{FilterOperator, FilterSpec};
/// Re-export sort types.
pub use sort::{compare_cells, SortDirection, SortSpec};
/// Re-export table types.
pub use table::{Row, Table, TableView};
