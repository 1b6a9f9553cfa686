use finreport_core::{
    progress, CellValue, FilterOperator, FilterSpec, FilterUpdate, NotificationKind, ReportOptions,
    Session, SessionError, SortDirection,
};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

fn write_ledger(path: &Path, rows: usize) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "date").unwrap();
    sheet.write_string(0, 1, "description").unwrap();
    sheet.write_string(0, 2, "amount").unwrap();
    for i in 0..rows {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, format!("2024-03-{:02}", i % 28 + 1)).unwrap();
        sheet.write_string(row, 1, format!("Entry {i}")).unwrap();
        sheet.write_number(row, 2, (i % 10) as f64 * 5.0).unwrap();
    }
    workbook.save(path).unwrap();
}

fn ledger_file(rows: usize) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.xlsx");
    write_ledger(&path, rows);
    (dir, path)
}

async fn loaded_session(rows: usize) -> (TempDir, Session) {
    let (dir, path) = ledger_file(rows);
    let mut session = Session::new(ReportOptions::default());
    session.try_upload(&path).await.unwrap();
    (dir, session)
}

// ===== Upload =====

#[tokio::test]
async fn test_upload_rejects_wrong_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    let mut session = Session::default();
    let notification = session.upload(&path).await;

    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.title, "Invalid file type");
    assert!(session.table().is_none());
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_extension_check_is_case_sensitive() {
    let mut session = Session::default();
    let err = session.try_upload(Path::new("LEDGER.XLSX")).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidFileType { .. }));
}

#[tokio::test]
async fn test_upload_success() {
    let (_dir, path) = ledger_file(4);
    let mut session = Session::default();
    let notification = session.upload(&path).await;

    assert!(notification.is_success(), "{notification}");
    assert_eq!(session.headers(), ["date", "description", "amount"]);
    assert_eq!(session.view().unwrap().len(), 4);
    assert_eq!(session.source(), Some(path.as_path()));
    assert_eq!(session.progress(), progress::IDLE);
}

#[tokio::test]
async fn test_failed_upload_keeps_previous_table() {
    let (dir, mut session) = loaded_session(3).await;
    let broken = dir.path().join("broken.xlsx");
    std::fs::write(&broken, b"not a workbook").unwrap();

    let notification = session.upload(&broken).await;

    assert_eq!(notification.title, "Error");
    assert!(notification.detail.is_some());
    assert_eq!(session.table().unwrap().row_count(), 3);
    assert!(!session.is_busy());
    assert_eq!(session.progress(), progress::IDLE);
}

#[tokio::test]
async fn test_upload_resets_filters_and_sort() {
    let (_dir, mut session) = loaded_session(3).await;
    session.add_filter();
    session.toggle_sort("amount");

    let (_other, path) = ledger_file(2);
    session.try_upload(&path).await.unwrap();

    assert!(session.filters().is_empty());
    assert_eq!(session.sort().direction, SortDirection::None);
}

// ===== Generate =====

#[tokio::test]
async fn test_generate_without_data() {
    let out = tempdir().unwrap();
    let session = Session::default();
    let notification = session.generate(out.path()).await;

    assert_eq!(notification.title, "No data");
    assert!(std::fs::read_dir(out.path()).unwrap().next().is_none());
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_generate_writes_default_name() {
    let (_dir, session) = loaded_session(5).await;
    let out = tempdir().unwrap();

    let report = session.try_generate(out.path()).await.unwrap();

    assert_eq!(report.path, out.path().join("financial-report.pdf"));
    assert_eq!(report.row_count, 5);
    let doc = lopdf::Document::load(&report.path).unwrap();
    assert_eq!(doc.get_pages().len(), report.page_count);
}

#[tokio::test]
async fn test_generate_uses_output_name_and_view() {
    let (_dir, mut session) = loaded_session(20).await;
    session.push_filter(FilterSpec::new("amount", FilterOperator::Greater, "20"));
    session.set_output_name("march");
    let out = tempdir().unwrap();

    let notification = session.generate(out.path()).await;
    assert!(notification.is_success(), "{notification}");
    assert!(out.path().join("march.pdf").exists());

    let report = session.try_generate(out.path()).await.unwrap();
    assert_eq!(report.row_count, session.view().unwrap().len());
    assert_eq!(report.row_count, 10);
}

#[tokio::test]
async fn test_failed_generate_writes_nothing() {
    let (dir, session) = loaded_session(2).await;
    let missing = dir.path().join("no-such-dir");

    let err = session.try_generate(&missing).await.unwrap_err();

    assert!(matches!(err, SessionError::Io(_)));
    assert!(!missing.exists());
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_concurrent_generate_is_rejected() {
    let (_dir, session) = loaded_session(500).await;
    let out = tempdir().unwrap();

    let (first, second) = tokio::join!(
        session.try_generate(out.path()),
        session.try_generate(out.path())
    );

    let busy = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(SessionError::Busy)))
        .count();
    assert_eq!(busy, 1);
    assert!(first.is_ok() || second.is_ok());
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_process_progress_sequence() {
    let (_dir, path) = ledger_file(3);
    let out = tempdir().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut session =
        Session::default().on_progress(move |value| recorder.lock().unwrap().push(value));

    let notification = session.process(&path, out.path()).await;

    assert_eq!(notification.title, "Success!");
    assert_eq!(*seen.lock().unwrap(), vec![25, 50, 100, 0]);
    assert!(out.path().join("financial-report.pdf").exists());
}

#[tokio::test]
async fn test_progress_resets_after_failure() {
    let dir = tempdir().unwrap();
    let broken = dir.path().join("broken.xls");
    std::fs::write(&broken, b"garbage").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut session =
        Session::default().on_progress(move |value| recorder.lock().unwrap().push(value));

    let err = session.try_process(&broken, dir.path()).await.unwrap_err();

    assert!(matches!(err, SessionError::DecodeFailure(_)));
    assert_eq!(*seen.lock().unwrap(), vec![25, 0]);
}

// ===== Filters, sort and edits =====

#[tokio::test]
async fn test_filter_editing() {
    let (_dir, mut session) = loaded_session(10).await;

    let index = session.add_filter();
    assert_eq!(
        session.filters()[index],
        FilterSpec::new("date", FilterOperator::Contains, "")
    );

    assert!(session.update_filter(index, FilterUpdate::Value("2024-03-0".to_string())));
    assert_eq!(session.view().unwrap().len(), 9);

    assert!(session.update_filter(index, FilterUpdate::Column("description".to_string())));
    assert_eq!(session.filters()[index].value, "");
    assert!(!session.update_filter(7, FilterUpdate::Value("x".to_string())));

    session.update_filter(index, FilterUpdate::Operator(FilterOperator::EndsWith));
    session.update_filter(index, FilterUpdate::Value("9".to_string()));
    assert_eq!(session.view().unwrap().len(), 1);

    assert!(session.remove_filter(index).is_some());
    assert!(session.remove_filter(index).is_none());
    assert_eq!(session.view().unwrap().len(), 10);
}

#[tokio::test]
async fn test_sort_toggle_cycle() {
    let (_dir, mut session) = loaded_session(4).await;

    assert_eq!(session.toggle_sort("amount").direction, SortDirection::Ascending);
    let amounts: Vec<String> = session
        .view()
        .unwrap()
        .rows()
        .map(|r| r["amount"].as_text())
        .collect();
    assert_eq!(amounts, ["0", "5", "10", "15"]);

    assert_eq!(session.toggle_sort("amount").direction, SortDirection::Descending);
    assert_eq!(session.toggle_sort("amount").direction, SortDirection::None);
    assert_eq!(session.view().unwrap().indices(), [0, 1, 2, 3]);

    session.toggle_sort("amount");
    session.clear_sort();
    assert!(session.sort().is_passthrough());
}

#[tokio::test]
async fn test_edits_use_table_positions() {
    let (_dir, mut session) = loaded_session(3).await;
    session.toggle_sort("amount");
    session.toggle_sort("amount");

    let (position, _) = session.view().unwrap().iter().next().unwrap();
    assert_eq!(position, 2);

    session.edit_cell(position, "amount", 99.0).unwrap();
    assert_eq!(
        session.table().unwrap().get(2, "amount").unwrap(),
        &CellValue::Number(99.0)
    );

    let added = session.add_row().unwrap();
    assert_eq!(added, 3);
    assert!(session.table().unwrap().row(added).unwrap().values().all(CellValue::is_empty));

    session.delete_row(0).unwrap();
    assert_eq!(session.table().unwrap().row_count(), 3);
    assert!(session.delete_row(10).is_err());
    assert!(matches!(
        session.edit_cell(0, "missing", "x"),
        Err(SessionError::Table(_))
    ));
}

#[tokio::test]
async fn test_edits_without_data() {
    let mut session = Session::default();
    assert!(matches!(session.add_row(), Err(SessionError::NoData)));
    assert!(matches!(session.unique_values("amount"), Err(SessionError::NoData)));
}

#[tokio::test]
async fn test_unique_values_and_output_name() {
    let (_dir, mut session) = loaded_session(12).await;
    let values = session.unique_values("amount").unwrap();
    assert_eq!(values.first().map(String::as_str), Some("0"));
    assert_eq!(values.last().map(String::as_str), Some("45"));
    assert_eq!(values.len(), 10);

    session.set_output_name("  ");
    assert_eq!(session.output_filename(), "financial-report.pdf");
    session.set_output_name("q1.pdf");
    assert_eq!(session.output_filename(), "q1.pdf");
}
