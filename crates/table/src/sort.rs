//! Single-column, numeric-aware, stable sorting.

use crate::cell::CellValue;
use crate::table::TableView;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction; `None` keeps insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
    #[default]
    None,
}

impl SortDirection {
    /// Next state after a column header click.
    ///
    /// Clicking the active column cycles ascending → descending → none;
    /// clicking any other column starts at ascending.
    #[must_use]
    pub fn next(self, clicked_same_column: bool) -> Self {
        if !clicked_same_column {
            return SortDirection::Ascending;
        }
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
            SortDirection::None => SortDirection::Ascending,
        }
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Descending)
    }

    /// True when applying this spec leaves rows in their original order
    pub fn is_passthrough(&self) -> bool {
        self.column.is_empty() || self.direction == SortDirection::None
    }

    /// The sort after the user clicks `column`
    #[must_use]
    pub fn toggled(&self, column: &str) -> Self {
        let same = !self.column.is_empty() && self.column == column;
        let direction = self.direction.next(same);
        Self::new(column, direction)
    }
}

/// Compare two cells: numerically when both parse, otherwise as lowercased
/// strings.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.folded().cmp(&b.folded()),
    }
}

/// Order a view's rows by `spec`.
///
/// Passthrough specs return the view unchanged. Ties keep their relative
/// order in both directions.
pub fn apply<'a>(view: TableView<'a>, spec: &SortSpec) -> TableView<'a> {
    if spec.is_passthrough() {
        return view;
    }

    let table = view.table();
    let rows = table.rows();
    let empty = CellValue::empty();
    let cell = |i: usize| rows[i].get(&spec.column).unwrap_or(&empty);
    let descending = spec.direction == SortDirection::Descending;

    let indices = stable_sort_by(view.indices().to_vec(), |&a, &b| {
        let ord = compare_cells(cell(a), cell(b));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    tracing::debug!(column = %spec.column, direction = ?spec.direction, rows = indices.len(), "Sorted rows");
    TableView::from_indices(table, indices)
}

/// Stable merge sort.
///
/// Must not panic when `compare` is intransitive, as [`compare_cells`] is on
/// mixed numeric/text columns.
pub(crate) fn stable_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort(items, &mut compare)
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let mut left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    // Already ordered across the seam: keep as is so re-sorting is a no-op
    let in_order = match (left.last(), right.first()) {
        (Some(last), Some(first)) => compare(first, last) != Ordering::Less,
        _ => true,
    };
    if in_order {
        left.extend(right);
        return left;
    }

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged
}
