use crate::cell::CellValue;
use crate::error::{Result, TableError};
use crate::filter::{self, FilterSpec};
use crate::sort::{self, SortSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One record of column name → value pairs, in header order.
pub type Row = IndexMap<String, CellValue>;

/// Headers plus an ordered sequence of rows.
///
/// Every row carries exactly the table's headers as keys; cells that were
/// missing on ingest hold an empty text value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given headers.
    ///
    /// Duplicate or blank header names are made unique.
    #[must_use]
    pub fn new<H: Into<String>>(headers: Vec<H>) -> Self {
        Self {
            headers: unique_headers(headers.into_iter().map(Into::into)),
            rows: Vec::new(),
        }
    }

    /// Create a table from positional rows.
    ///
    /// Cells beyond the header count are dropped; short rows are padded with
    /// empty values.
    ///
    /// # Example
    /// ```
    /// use finreport_table::{CellValue, Table};
    ///
    /// let table = Table::from_rows(
    ///     vec!["description", "amount"],
    ///     vec![
    ///         vec![CellValue::from("Lunch"), CellValue::from(12.5)],
    ///         vec![CellValue::from("Taxi")],
    ///     ],
    /// );
    ///
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.get(1, "amount").unwrap(), &CellValue::empty());
    /// ```
    #[must_use]
    pub fn from_rows<H, T>(headers: Vec<H>, rows: Vec<Vec<T>>) -> Self
    where
        H: Into<String>,
        T: Into<CellValue>,
    {
        let mut table = Self::new(headers);
        for row in rows {
            let mut cells = row.into_iter().map(Into::into);
            let record = table
                .headers
                .iter()
                .map(|h| (h.clone(), cells.next().unwrap_or_default()))
                .collect();
            table.rows.push(record);
        }
        table
    }

    /// Create a table from keyed records.
    ///
    /// Keys that are not headers are discarded; absent headers default to an
    /// empty value.
    #[must_use]
    pub fn from_records<H: Into<String>>(headers: Vec<H>, records: Vec<Row>) -> Self {
        let mut table = Self::new(headers);
        for mut record in records {
            let row = table
                .headers
                .iter()
                .map(|h| (h.clone(), record.swap_remove(h).unwrap_or_default()))
                .collect();
            if !record.is_empty() {
                tracing::debug!("Dropping {} cells without a matching header", record.len());
            }
            table.rows.push(row);
        }
        table
    }

    /// Column names in display order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows in insertion order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(TableError::RowIndexOutOfBounds {
            index,
            count: self.rows.len(),
        })
    }

    /// Get a cell by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Result<&CellValue> {
        self.check_column(column)?;
        let row = self.row(row)?;
        row.get(column).ok_or_else(|| TableError::ColumnNotFound {
            name: column.to_string(),
        })
    }

    /// Set a cell by row index and column name
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, column: &str, value: T) -> Result<()> {
        self.check_column(column)?;
        let count = self.rows.len();
        let record = self
            .rows
            .get_mut(row)
            .ok_or(TableError::RowIndexOutOfBounds { index: row, count })?;
        record.insert(column.to_string(), value.into());
        Ok(())
    }

    /// Append a row with every cell empty, returning its index
    pub fn row_append_empty(&mut self) -> usize {
        let row = self
            .headers
            .iter()
            .map(|h| (h.clone(), CellValue::empty()))
            .collect();
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Delete a row, returning it
    pub fn row_delete(&mut self, index: usize) -> Result<Row> {
        if index >= self.rows.len() {
            return Err(TableError::RowIndexOutOfBounds {
                index,
                count: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Get every value of a column, in row order
    pub fn column_by_name(&self, name: &str) -> Result<Vec<&CellValue>> {
        self.check_column(name)?;
        Ok(self.rows.iter().filter_map(|row| row.get(name)).collect())
    }

    /// Distinct, non-empty display values of a column.
    ///
    /// Values are ordered numerically when both sides parse as numbers and
    /// alphabetically otherwise.
    pub fn unique_values(&self, name: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let values: Vec<CellValue> = self
            .column_by_name(name)?
            .into_iter()
            .filter(|cell| !cell.is_empty())
            .filter(|cell| seen.insert(cell.as_text()))
            .cloned()
            .collect();

        let sorted = sort::stable_sort_by(values, |a, b| sort::compare_cells(a, b));
        Ok(sorted.iter().map(CellValue::as_text).collect())
    }

    /// A view over every row in insertion order
    pub fn view(&self) -> TableView<'_> {
        TableView::full(self)
    }

    fn check_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(TableError::ColumnNotFound {
                name: name.to_string(),
            })
        }
    }
}

/// An ordered, shallow selection of a table's rows.
///
/// Filtering and sorting produce views; the underlying rows are never
/// copied or reordered.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> TableView<'a> {
    /// A view of all rows in insertion order
    pub fn full(table: &'a Table) -> Self {
        Self {
            table,
            indices: (0..table.row_count()).collect(),
        }
    }

    pub(crate) fn from_indices(table: &'a Table, indices: Vec<usize>) -> Self {
        Self { table, indices }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn headers(&self) -> &'a [String] {
        self.table.headers()
    }

    /// Positions of the selected rows in the underlying table
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Selected rows in view order
    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let rows = self.table.rows();
        self.indices.iter().map(move |&i| &rows[i])
    }

    /// Selected rows paired with their table positions
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Row)> + '_ {
        let rows = self.table.rows();
        self.indices.iter().map(move |&i| (i, &rows[i]))
    }

    /// Keep only the rows matching every filter
    #[must_use]
    pub fn filter(self, filters: &[FilterSpec]) -> Self {
        let headers = self.table.headers();
        let rows = self.table.rows();
        let indices = self
            .indices
            .into_iter()
            .filter(|&i| filter::row_matches(headers, &rows[i], filters))
            .collect();
        Self::from_indices(self.table, indices)
    }

    /// Order the rows by the sort spec
    #[must_use]
    pub fn sort(self, spec: &SortSpec) -> Self {
        sort::apply(self, spec)
    }

    /// Owned copy of the selected rows, in view order
    #[must_use]
    pub fn to_table(&self) -> Table {
        Table {
            headers: self.table.headers.clone(),
            rows: self.rows().cloned().collect(),
        }
    }
}

/// Make header names unique and non-blank.
///
/// Blank names become `__EMPTY`; repeats gain `_1`, `_2`, … suffixes.
pub(crate) fn unique_headers(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for name in names {
        let base = if name.trim().is_empty() {
            "__EMPTY".to_string()
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
