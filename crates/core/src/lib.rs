//! # finreport-core
//!
//! The report session that ties spreadsheet loading, filtering, sorting and
//! PDF generation together.
//!
//! This crate provides:
//! - [`Session`], the operation boundary used by front ends
//! - [`Notification`], the user-facing outcome of an upload or generation
//! - [`SessionError`]

/// Error types and result aliases.
pub mod error;
/// User-facing operation outcomes.
pub mod notification;
/// The report session.
pub mod session;

pub use error::{SessionError, SessionResult};
pub use notification::{Notification, NotificationKind};
pub use session::{is_accepted_file, progress, FilterUpdate, GeneratedReport, Session, ACCEPTED_EXTENSIONS};

pub use finreport_pdf::{PageSize, ReportOptions, ReportRenderer};
pub use finreport_table::{CellValue, FilterOperator, FilterSpec, SortDirection, SortSpec, Table};
