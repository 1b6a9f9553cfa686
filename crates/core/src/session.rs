//! The report session: one loaded spreadsheet plus the filters, sort and
//! output settings applied to it.
//!
//! Upload and generation run on blocking tasks. Only one of them may be in
//! flight at a time; a second trigger fails with [`SessionError::Busy`]
//! instead of queueing.

use crate::error::{SessionError, SessionResult};
use crate::notification::Notification;
use finreport_pdf::{ReportOptions, ReportRenderer};
use finreport_table::{CellValue, FilterOperator, FilterSpec, Row, SortSpec, Table, TableView};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// File name suffixes accepted by [`Session::upload`]
pub const ACCEPTED_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

/// Progress values reported while a spreadsheet is loaded and rendered
pub mod progress {
    pub const IDLE: u8 = 0;
    pub const STARTED: u8 = 25;
    pub const DECODED: u8 = 50;
    pub const DONE: u8 = 100;
}

type ProgressListener = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Clone, Default)]
struct Progress {
    value: Arc<AtomicU8>,
    listener: Option<ProgressListener>,
}

impl Progress {
    fn set(&self, value: u8) {
        self.value.store(value, Ordering::SeqCst);
        if let Some(listener) = &self.listener {
            listener(value);
        }
    }

    fn get(&self) -> u8 {
        self.value.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("value", &self.get())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

/// Holds the busy flag for one operation; releasing it also resets progress.
struct BusyGuard {
    busy: Arc<AtomicBool>,
    progress: Progress,
}

impl BusyGuard {
    fn acquire(busy: &Arc<AtomicBool>, progress: &Progress) -> SessionResult<Self> {
        if busy.swap(true, Ordering::SeqCst) {
            tracing::warn!("Session busy, rejecting operation");
            return Err(SessionError::Busy);
        }
        Ok(Self {
            busy: Arc::clone(busy),
            progress: progress.clone(),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.progress.set(progress::IDLE);
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Change to one field of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    /// Switch column; the value is cleared
    Column(String),
    Operator(FilterOperator),
    Value(String),
}

/// A report written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub path: PathBuf,
    pub page_count: usize,
    pub row_count: usize,
}

#[derive(Debug, Default)]
pub struct Session {
    options: ReportOptions,
    renderer: ReportRenderer,
    table: Option<Table>,
    source: Option<PathBuf>,
    filters: Vec<FilterSpec>,
    sort: SortSpec,
    output_name: String,
    busy: Arc<AtomicBool>,
    progress: Progress,
}

/// Whether `path` has a spreadsheet file name
pub fn is_accepted_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
}

fn check_file_type(path: &Path) -> SessionResult<()> {
    if is_accepted_file(path) {
        Ok(())
    } else {
        Err(SessionError::InvalidFileType {
            name: path.display().to_string(),
        })
    }
}

fn generated(report: &GeneratedReport) -> Notification {
    Notification::success(
        "Success!",
        format!("Your PDF report has been generated: {}", report.path.display()),
    )
}

impl Session {
    pub fn new(options: ReportOptions) -> Self {
        Self {
            renderer: ReportRenderer::new(options.clone()),
            options,
            ..Self::default()
        }
    }

    /// Use `renderer` for report generation, e.g. to pin the timestamp
    #[must_use]
    pub fn with_renderer(mut self, renderer: ReportRenderer) -> Self {
        self.options = renderer.options().clone();
        self.renderer = renderer;
        self
    }

    /// Call `listener` with every progress change
    #[must_use]
    pub fn on_progress(mut self, listener: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.progress.listener = Some(Arc::new(listener));
        self
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        self.table.as_ref().map(Table::headers).unwrap_or_default()
    }

    // ---- Upload / generate ----

    /// Load a spreadsheet, reporting the outcome as a notification.
    pub async fn upload(&mut self, path: impl AsRef<Path>) -> Notification {
        match self.try_upload(path.as_ref()).await {
            Ok(rows) => Notification::success("File loaded", format!("{rows} rows ready for filtering")),
            Err(err) => {
                tracing::error!(error = %err, path = %path.as_ref().display(), "Upload failed");
                Notification::from(&err)
            }
        }
    }

    /// Load a spreadsheet, returning the number of rows read.
    ///
    /// On success the new table replaces the old one and filters and sort
    /// are cleared. On failure the session is left as it was.
    pub async fn try_upload(&mut self, path: &Path) -> SessionResult<usize> {
        check_file_type(path)?;
        let _guard = BusyGuard::acquire(&self.busy, &self.progress)?;
        self.load(path).await
    }

    /// Render the current view into `out_dir`, reporting the outcome as a
    /// notification.
    pub async fn generate(&self, out_dir: impl AsRef<Path>) -> Notification {
        match self.try_generate(out_dir.as_ref()).await {
            Ok(report) => generated(&report),
            Err(err) => {
                tracing::error!(error = %err, "Report generation failed");
                Notification::from(&err)
            }
        }
    }

    /// Render the current view and write `<output name>.pdf` into `out_dir`.
    ///
    /// The file is only written once rendering has fully succeeded.
    pub async fn try_generate(&self, out_dir: &Path) -> SessionResult<GeneratedReport> {
        let _guard = BusyGuard::acquire(&self.busy, &self.progress)?;
        self.progress.set(progress::DECODED);
        self.write_report(out_dir).await
    }

    /// Upload then generate as one operation, reporting the outcome as a
    /// notification.
    pub async fn process(&mut self, path: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Notification {
        match self.try_process(path.as_ref(), out_dir.as_ref()).await {
            Ok(report) => generated(&report),
            Err(err) => {
                tracing::error!(error = %err, path = %path.as_ref().display(), "Processing failed");
                Notification::from(&err)
            }
        }
    }

    /// Load `path` and render it unfiltered into `out_dir`.
    ///
    /// Progress moves through 25, 50 and 100 and returns to 0 when done.
    pub async fn try_process(&mut self, path: &Path, out_dir: &Path) -> SessionResult<GeneratedReport> {
        check_file_type(path)?;
        let _guard = BusyGuard::acquire(&self.busy, &self.progress)?;
        self.load(path).await?;
        self.write_report(out_dir).await
    }

    async fn load(&mut self, path: &Path) -> SessionResult<usize> {
        self.progress.set(progress::STARTED);
        let owned = path.to_path_buf();
        let table = tokio::task::spawn_blocking(move || Table::from_spreadsheet(&owned))
            .await?
            .map_err(SessionError::DecodeFailure)?;
        self.progress.set(progress::DECODED);

        let rows = table.row_count();
        tracing::info!(path = %path.display(), rows, columns = table.col_count(), "Loaded spreadsheet");
        self.table = Some(table);
        self.source = Some(path.to_path_buf());
        self.filters.clear();
        self.sort = SortSpec::default();
        Ok(rows)
    }

    async fn write_report(&self, out_dir: &Path) -> SessionResult<GeneratedReport> {
        let snapshot = self.view().ok_or(SessionError::NoData)?.to_table();
        let row_count = snapshot.row_count();

        let renderer = self.renderer.clone();
        let name = self.output_name.clone();
        let report = tokio::task::spawn_blocking(move || renderer.render(&snapshot.view(), &name))
            .await??;

        let path = out_dir.join(&report.filename);
        tokio::fs::write(&path, &report.bytes).await?;
        self.progress.set(progress::DONE);

        tracing::info!(path = %path.display(), pages = report.page_count, "Wrote report");
        Ok(GeneratedReport {
            path,
            page_count: report.page_count,
            row_count,
        })
    }

    // ---- View ----

    /// Rows after filtering then sorting; `None` before the first upload
    pub fn view(&self) -> Option<TableView<'_>> {
        self.table
            .as_ref()
            .map(|table| table.view().filter(&self.filters).sort(&self.sort))
    }

    /// Distinct values of `column` for the filter value picker
    pub fn unique_values(&self, column: &str) -> SessionResult<Vec<String>> {
        let table = self.table.as_ref().ok_or(SessionError::NoData)?;
        Ok(table.unique_values(column)?)
    }

    // ---- Filters ----

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    /// Append a filter on the first column; returns its index
    pub fn add_filter(&mut self) -> usize {
        self.filters.push(FilterSpec::initial(self.headers()));
        self.filters.len() - 1
    }

    /// Append a fully specified filter; returns its index
    pub fn push_filter(&mut self, filter: FilterSpec) -> usize {
        self.filters.push(filter);
        self.filters.len() - 1
    }

    pub fn remove_filter(&mut self, index: usize) -> Option<FilterSpec> {
        (index < self.filters.len()).then(|| self.filters.remove(index))
    }

    /// Apply `update` to the filter at `index`; false when there is none
    pub fn update_filter(&mut self, index: usize, update: FilterUpdate) -> bool {
        let Some(filter) = self.filters.get_mut(index) else {
            return false;
        };
        match update {
            FilterUpdate::Column(column) => {
                filter.column = column;
                filter.value.clear();
            }
            FilterUpdate::Operator(operator) => filter.operator = operator,
            FilterUpdate::Value(value) => filter.value = value,
        }
        true
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    // ---- Sort ----

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Column header click: cycles the sort state for `column`
    pub fn toggle_sort(&mut self, column: &str) -> &SortSpec {
        self.sort = self.sort.toggled(column);
        &self.sort
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn clear_sort(&mut self) {
        self.sort = SortSpec::default();
    }

    // ---- Edits ----

    fn table_mut(&mut self) -> SessionResult<&mut Table> {
        self.table.as_mut().ok_or(SessionError::NoData)
    }

    /// Overwrite one cell; `row` is a table position
    pub fn edit_cell(&mut self, row: usize, column: &str, value: impl Into<CellValue>) -> SessionResult<()> {
        self.table_mut()?.set(row, column, value)?;
        Ok(())
    }

    /// Append a row of empty cells; returns its table position
    pub fn add_row(&mut self) -> SessionResult<usize> {
        Ok(self.table_mut()?.row_append_empty())
    }

    pub fn delete_row(&mut self, row: usize) -> SessionResult<Row> {
        Ok(self.table_mut()?.row_delete(row)?)
    }

    // ---- Output ----

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Set the report file name; blank restores the default
    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.output_name = name.into().trim().to_string();
    }

    /// File name the next report will be written under
    pub fn output_filename(&self) -> String {
        self.options.pdf_filename(&self.output_name)
    }
}
