//! Integration test: full runs against a local stand-in for Sheets and Drive.
//!
//! The sheet has four data rows (3..=6): a Drive share link, a HYPERLINK
//! formula to a missing file, a row with no identifier and a bare filename
//! that Drive search does not know.

mod common;

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use common::api_server::{ApiServer, Request, Response};
use patti_core::auth::AccessToken;
use patti_core::config::{ApiConfig, PattiConfig, ThrottleConfig};
use patti_core::pipeline::{DownloadOutcome, RowReport, SkipReason};
use patti_core::report::RunReport;
use patti_core::session::{self, RunOptions};
use serde_json::json;
use tempfile::tempdir;

const PDF: &[u8] = b"%PDF-1.4 patto 42\n%%EOF\n";
const TOKEN: &str = "test-token";

/// Which variant of the Sheets stand-in to serve.
#[derive(Clone, Copy, PartialEq)]
enum SheetMode {
    Normal,
    LinkRangeFails,
    IdColumnForbidden,
    NoRows,
}

fn start_server(mode: SheetMode) -> ApiServer {
    let mut server = ApiServer::bind();
    let missing = server.url("/web/missing.pdf");
    server.serve(move |req: &Request| route(req, mode, &missing));
    server
}

fn route(req: &Request, mode: SheetMode, missing_url: &str) -> Response {
    let path = req.path();
    if let Some(rest) = path.strip_prefix("/sheets/spreadsheets/SID") {
        if rest.starts_with("/values/") {
            if mode == SheetMode::IdColumnForbidden {
                return Response::status(403);
            }
            if mode == SheetMode::NoRows {
                return Response::json(json!({ "range": "'Foglio1'!A3:A", "majorDimension": "COLUMNS" }));
            }
            return Response::json(json!({
                "range": "'Foglio1'!A3:A6",
                "majorDimension": "COLUMNS",
                "values": [["42", "43", "", "44"]]
            }));
        }
        if req.query().contains("includeGridData=true") {
            if mode == SheetMode::LinkRangeFails {
                return Response::status(500);
            }
            let formula = format!("=HYPERLINK(\"{}\",\"scheda\")", missing_url);
            return Response::json(json!({
                "sheets": [{"data": [{"rowData": [
                    {"values": [{
                        "formattedValue": "apri",
                        "hyperlink": "https://drive.google.com/file/d/ABC123/view?usp=sharing"
                    }]},
                    {"values": [{
                        "formattedValue": "scheda",
                        "userEnteredValue": {"formulaValue": formula}
                    }]},
                    {"values": [{"formattedValue": "https://drive.google.com/file/d/ORPHAN/view"}]},
                    {"values": [{"formattedValue": "report.pdf"}]}
                ]}]}]
            }));
        }
        return Response::json(json!({
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Indice"}},
                {"properties": {"sheetId": 1234, "title": "Foglio1"}}
            ]
        }));
    }
    if path == "/drive/files" {
        return Response::json(json!({ "files": [] }));
    }
    if path == "/drive/files/ABC123" && req.query().contains("alt=media") {
        if req.authorization.as_deref() != Some("Bearer test-token") {
            return Response::status(401);
        }
        return Response::ok(PDF.to_vec());
    }
    Response::status(404)
}

fn config(server: &ApiServer, out: &Path) -> PattiConfig {
    PattiConfig {
        spreadsheet_id: Some("SID".to_string()),
        sheet_name: Some("Foglio1".to_string()),
        output_dir: out.to_path_buf(),
        api: Some(ApiConfig {
            sheets_base: server.url("/sheets"),
            drive_base: server.url("/drive"),
        }),
        throttle: Some(ThrottleConfig { search_delay_ms: 0 }),
        ..PattiConfig::default()
    }
}

fn run(cfg: &PattiConfig) -> (RunReport, Vec<RowReport>) {
    let token = AccessToken::new(TOKEN);
    let mut rows = Vec::new();
    let report = session::run(cfg, &token, RunOptions::default(), &mut |r: &RowReport| {
        rows.push(r.clone())
    })
    .unwrap();
    (report, rows)
}

#[test]
fn mixed_sheet_downloads_only_the_drive_row() {
    let server = start_server(SheetMode::Normal);
    let out = tempdir().unwrap();
    let cfg = config(&server, out.path());

    let (report, rows) = run(&cfg);

    assert_eq!(
        report,
        RunReport {
            succeeded: 1,
            skipped: 1,
            failed: 2
        }
    );
    assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![3, 4, 5, 6]);

    // Row 3: Drive share link.
    let saved = out.path().join("patto_42.pdf");
    assert_eq!(
        rows[0].outcome,
        DownloadOutcome::Success {
            path: saved.clone(),
            bytes: PDF.len() as u64
        }
    );
    assert_eq!(fs::read(&saved).unwrap(), PDF);

    // Row 4: formula link to a 404 leaves nothing behind.
    match &rows[1].outcome {
        DownloadOutcome::Failed(cause) => assert!(cause.contains("404"), "cause: {}", cause),
        other => panic!("row 4: expected failure, got {:?}", other),
    }
    assert!(!out.path().join("patto_43.pdf").exists());
    assert!(!out.path().join("patto_43.pdf.part").exists());
    let direct = server.requests_to("/web/");
    assert_eq!(direct.len(), 1);
    assert!(direct[0].authorization.is_none());

    // Row 5: no identifier, no calls for its link.
    assert_eq!(rows[2].outcome, DownloadOutcome::Skipped(SkipReason::EmptyId));
    assert!(server.requests_to("/drive/files/ORPHAN").is_empty());

    // Row 6: bare filename, search finds nothing.
    match &rows[3].outcome {
        DownloadOutcome::Failed(cause) => assert!(cause.contains("report.pdf"), "cause: {}", cause),
        other => panic!("row 6: expected failure, got {:?}", other),
    }
    let searches = server.requests_to("/drive/files");
    assert!(searches.iter().any(|r| r.path() == "/drive/files"));
    assert!(!out.path().join("patto_44.pdf").exists());

    let names: Vec<_> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["patto_42.pdf"]);
}

#[test]
fn sheets_are_read_once_per_run() {
    let server = start_server(SheetMode::Normal);
    let out = tempdir().unwrap();
    run(&config(&server, out.path()));

    assert_eq!(server.requests_to("/sheets/spreadsheets/SID/values/").len(), 1);
    let grid_reads = server
        .requests()
        .into_iter()
        .filter(|r| r.query().contains("includeGridData=true"))
        .count();
    assert_eq!(grid_reads, 1);
    assert!(server
        .requests_to("/sheets/")
        .iter()
        .all(|r| r.authorization.as_deref() == Some("Bearer test-token")));
}

#[test]
fn failed_search_does_not_wait() {
    let server = start_server(SheetMode::Normal);
    let out = tempdir().unwrap();
    let mut cfg = config(&server, out.path());
    cfg.throttle = Some(ThrottleConfig {
        search_delay_ms: 5_000,
    });

    let start = Instant::now();
    run(&cfg);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn rerun_rewrites_identical_bytes() {
    let server = start_server(SheetMode::Normal);
    let out = tempdir().unwrap();
    let cfg = config(&server, out.path());

    run(&cfg);
    let first = fs::read(out.path().join("patto_42.pdf")).unwrap();
    let (report, _) = run(&cfg);
    let second = fs::read(out.path().join("patto_42.pdf")).unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(first, second);
}

#[test]
fn skip_existing_makes_no_drive_download() {
    let server = start_server(SheetMode::Normal);
    let out = tempdir().unwrap();
    fs::write(out.path().join("patto_42.pdf"), b"kept").unwrap();
    let mut cfg = config(&server, out.path());
    cfg.skip_existing = true;

    let (_, rows) = run(&cfg);

    assert_eq!(rows[0].outcome, DownloadOutcome::Skipped(SkipReason::Exists));
    assert!(server.requests_to("/drive/files/ABC123").is_empty());
    assert_eq!(fs::read(out.path().join("patto_42.pdf")).unwrap(), b"kept");
}

#[test]
fn failed_link_range_degrades_to_no_links() {
    let server = start_server(SheetMode::LinkRangeFails);
    let out = tempdir().unwrap();
    let (report, rows) = run(&config(&server, out.path()));

    assert_eq!(report.skipped, 4);
    assert_eq!(rows[0].outcome, DownloadOutcome::Skipped(SkipReason::NoLink));
    assert_eq!(rows[2].outcome, DownloadOutcome::Skipped(SkipReason::EmptyId));
    assert!(server.requests_to("/drive/").is_empty());
    assert!(server.requests_to("/web/").is_empty());
}

#[test]
fn unreadable_id_column_aborts_the_run() {
    let server = start_server(SheetMode::IdColumnForbidden);
    let out = tempdir().unwrap();
    let token = AccessToken::new(TOKEN);
    let err = session::run(
        &config(&server, out.path()),
        &token,
        RunOptions::default(),
        &mut |_: &RowReport| {},
    )
    .unwrap_err();

    assert!(format!("{:#}", err).contains("403"), "error: {:#}", err);
    assert!(server.requests_to("/drive/").is_empty());
}

#[test]
fn sheet_gid_resolves_to_title() {
    let server = start_server(SheetMode::Normal);
    let out = tempdir().unwrap();
    let mut cfg = config(&server, out.path());
    cfg.sheet_name = None;
    cfg.sheet_gid = Some(1234);

    let (report, _) = run(&cfg);

    assert_eq!(report.total(), 4);
    let values = server.requests_to("/sheets/spreadsheets/SID/values/");
    assert!(values[0].path().contains("Foglio1"), "{}", values[0].target);
}

#[test]
fn limit_stops_after_n_rows() {
    let server = start_server(SheetMode::Normal);
    let out = tempdir().unwrap();
    let token = AccessToken::new(TOKEN);
    let mut seen = Vec::new();
    let report = session::run(
        &config(&server, out.path()),
        &token,
        RunOptions { limit: Some(2) },
        &mut |r: &RowReport| seen.push(r.row),
    )
    .unwrap();

    assert_eq!(seen, vec![3, 4]);
    assert_eq!(report.total(), 2);
    let grid = server
        .requests()
        .into_iter()
        .find(|r| r.query().contains("includeGridData=true"))
        .unwrap();
    // ranges='Foglio1'!AF3:AF4, form-encoded
    assert!(grid.query().contains("AF3%3AAF4"), "{}", grid.query());
}

#[test]
fn empty_sheet_still_creates_output_dir() {
    let server = start_server(SheetMode::NoRows);
    let scratch = tempdir().unwrap();
    let out = scratch.path().join("patti");
    let (report, rows) = run(&config(&server, &out));

    assert!(out.is_dir());
    assert_eq!(report.total(), 0);
    assert!(rows.is_empty());
    assert!(server
        .requests()
        .iter()
        .all(|r| !r.query().contains("includeGridData=true")));
}
