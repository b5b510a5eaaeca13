// tests/collect_drives.rs
//
// Drive traversal: ordering, guards, and the optional download step.

use std::path::PathBuf;

use axum::{http::StatusCode, routing::get, Router};
use sharepoint_content_export::collect::{
    collect_drive_files, FailurePolicy, SweepOptions, TextAccumulator,
};
use sharepoint_content_export::config::SiteRef;
use sharepoint_content_export::download::{DownloadTarget, FileDownloader};
use sharepoint_content_export::graph::{Drive, DriveItem, InMemoryGraph, Site};
use sharepoint_content_export::SweepError;

fn docs_site() -> SiteRef {
    SiteRef::new("contoso.sharepoint.com", "/sites/Docs")
}

fn file(id: &str, name: &str) -> DriveItem {
    DriveItem::file(id, name, Some(format!("https://dl.test/{id}").as_str()))
}

/// root: a.txt, F1, z.txt / F1: b.txt, F2 / F2: c.txt, F3 / F3: d.txt
fn nested_graph() -> InMemoryGraph {
    InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("root", "root"))
        .with_children(
            "d1",
            "root",
            vec![file("a", "a.txt"), DriveItem::folder("f1", "F1"), file("z", "z.txt")],
        )
        .with_children("d1", "f1", vec![file("b", "b.txt"), DriveItem::folder("f2", "F2")])
        .with_children("d1", "f2", vec![file("c", "c.txt"), DriveItem::folder("f3", "F3")])
        .with_children("d1", "f3", vec![file("d", "d.txt")])
}

fn file_names(acc: &TextAccumulator) -> Vec<String> {
    acc.lines()
        .iter()
        .filter_map(|l| l.strip_prefix("File Name: ").map(str::to_string))
        .collect()
}

#[tokio::test]
async fn empty_site_list_produces_no_lines() {
    let mut acc = TextAccumulator::new();
    let report = collect_drive_files(&InMemoryGraph::new(), &[], &SweepOptions::default(), &mut acc)
        .await
        .unwrap();
    assert!(acc.is_empty());
    assert_eq!(report.files, 0);
}

#[tokio::test]
async fn empty_drive_root_emits_no_file_lines() {
    let graph = InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("root", "root"));
    let mut acc = TextAccumulator::new();

    let report = collect_drive_files(&graph, &[docs_site()], &SweepOptions::default(), &mut acc)
        .await
        .unwrap();

    assert_eq!(acc.lines(), &["Site: Docs".to_string()]);
    assert_eq!(report.drives, 1);
    assert_eq!(report.files, 0);
}

#[tokio::test]
async fn nested_folders_are_walked_depth_first_pre_order() {
    let graph = nested_graph();
    let mut acc = TextAccumulator::new();

    let report = collect_drive_files(&graph, &[docs_site()], &SweepOptions::default(), &mut acc)
        .await
        .unwrap();

    assert_eq!(file_names(&acc), vec!["a.txt", "b.txt", "c.txt", "d.txt", "z.txt"]);
    assert_eq!(report.files, 5);
    assert_eq!(report.folders, 3);

    // Exactly one name + URL pair per file, adjacent.
    let lines = &acc.lines()[1..];
    assert_eq!(lines.len(), 10);
    for pair in lines.chunks(2) {
        let name = pair[0].strip_prefix("File Name: ").expect("name line");
        let id = name.trim_end_matches(".txt");
        assert_eq!(pair[1], format!("Download URL: https://dl.test/{id}"));
    }
}

#[tokio::test]
async fn files_without_download_url_and_other_items_are_skipped() {
    let mut package = DriveItem::folder("pkg", "Notebook");
    package.folder = None;
    let graph = InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("root", "root"))
        .with_children(
            "d1",
            "root",
            vec![
                DriveItem::file("x", "no-url.docx", None),
                package,
                file("y", "kept.docx"),
            ],
        );
    let mut acc = TextAccumulator::new();

    collect_drive_files(&graph, &[docs_site()], &SweepOptions::default(), &mut acc)
        .await
        .unwrap();

    assert_eq!(file_names(&acc), vec!["kept.docx"]);
}

#[tokio::test]
async fn drives_are_walked_in_listing_order() {
    let graph = InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("r1", "root"))
        .with_drive("s1", Drive::new("d2", "Archive"), DriveItem::folder("r2", "root"))
        .with_children("d1", "r1", vec![file("one", "one.txt")])
        .with_children("d2", "r2", vec![file("two", "two.txt")]);
    let mut acc = TextAccumulator::new();

    collect_drive_files(&graph, &[docs_site()], &SweepOptions::default(), &mut acc)
        .await
        .unwrap();

    assert_eq!(file_names(&acc), vec!["one.txt", "two.txt"]);
}

#[tokio::test]
async fn depth_cap_stops_runaway_nesting() {
    let options = SweepOptions {
        max_depth: 2,
        ..SweepOptions::default()
    };
    let mut acc = TextAccumulator::new();

    let err = collect_drive_files(&nested_graph(), &[docs_site()], &options, &mut acc)
        .await
        .expect_err("F3 sits at depth 3");

    assert!(
        matches!(err, SweepError::DepthExceeded { ref drive_id, max_depth: 2 } if drive_id == "d1"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn folder_listed_inside_itself_is_reported_as_cycle() {
    let graph = InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("root", "root"))
        .with_children("d1", "root", vec![DriveItem::folder("loop", "Loop")])
        .with_children("d1", "loop", vec![DriveItem::folder("loop", "Loop")]);
    let mut acc = TextAccumulator::new();

    let err = collect_drive_files(&graph, &[docs_site()], &SweepOptions::default(), &mut acc)
        .await
        .expect_err("cycle");

    assert!(
        matches!(err, SweepError::Cycle { ref item_id, .. } if item_id == "loop"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn isolate_policy_keeps_other_sites_when_one_drive_is_malformed() {
    let other = SiteRef::new("contoso.sharepoint.com", "/sites/Other");
    let graph = InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("root", "root"))
        .with_children("d1", "root", vec![DriveItem::folder("root", "again")])
        .with_site(&other, Site::new("s2", "Other"))
        .with_drive("s2", Drive::new("d2", "Documents"), DriveItem::folder("r2", "root"))
        .with_children("d2", "r2", vec![file("ok", "ok.txt")]);
    let options = SweepOptions {
        failure_policy: FailurePolicy::Isolate,
        ..SweepOptions::default()
    };
    let mut acc = TextAccumulator::new();

    let report = collect_drive_files(&graph, &[docs_site(), other], &options, &mut acc)
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(file_names(&acc), vec!["ok.txt"]);
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn enabled_downloads_are_noted_and_failures_do_not_abort() {
    let base = serve(
        Router::new()
            .route("/good", get(|| async { "file body" }))
            .route("/gone", get(|| async { (StatusCode::NOT_FOUND, "expired") })),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();

    let graph = InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("root", "root"))
        .with_children(
            "d1",
            "root",
            vec![
                DriveItem::file("g", "good.txt", Some(format!("{base}/good").as_str())),
                DriveItem::file("x", "gone.txt", Some(format!("{base}/gone").as_str())),
            ],
        );
    let options = SweepOptions {
        downloads: Some(DownloadTarget {
            downloader: FileDownloader::from_client(reqwest::Client::new()),
            dir: dir.path().to_path_buf(),
        }),
        ..SweepOptions::default()
    };
    let mut acc = TextAccumulator::new();

    let report = collect_drive_files(&graph, &[docs_site()], &options, &mut acc)
        .await
        .expect("download errors never abort");

    let drive_dir: PathBuf = dir.path().join("contoso.sharepoint.com/sites/Docs/Documents");
    let saved = drive_dir.join("good.txt");
    assert_eq!(std::fs::read_to_string(&saved).unwrap(), "file body");
    assert!(!drive_dir.join("gone.txt").exists());
    assert_eq!(report.downloads_ok, 1);
    assert_eq!(report.downloads_failed, 1);

    let lines = acc.lines();
    assert_eq!(lines[3], format!("Downloaded to: {}", saved.display()));
    assert!(lines[6].starts_with("Error downloading gone.txt: "), "{}", lines[6]);
    assert!(lines[6].contains("404"));
}

#[tokio::test]
async fn same_named_files_in_different_folders_and_drives_do_not_overwrite() {
    let base = serve(
        Router::new()
            .route("/a", get(|| async { "from folder A" }))
            .route("/b", get(|| async { "from folder B" }))
            .route("/c", get(|| async { "from archive" })),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();

    let graph = InMemoryGraph::new()
        .with_site(&docs_site(), Site::new("s1", "Docs"))
        .with_drive("s1", Drive::new("d1", "Documents"), DriveItem::folder("r1", "root"))
        .with_drive("s1", Drive::new("d2", "Archive"), DriveItem::folder("r2", "root"))
        .with_children(
            "d1",
            "r1",
            vec![DriveItem::folder("fa", "A"), DriveItem::folder("fb", "B")],
        )
        .with_children(
            "d1",
            "fa",
            vec![DriveItem::file("a", "report.docx", Some(format!("{base}/a").as_str()))],
        )
        .with_children(
            "d1",
            "fb",
            vec![DriveItem::file("b", "report.docx", Some(format!("{base}/b").as_str()))],
        )
        .with_children(
            "d2",
            "r2",
            vec![DriveItem::file("c", "report.docx", Some(format!("{base}/c").as_str()))],
        );
    let options = SweepOptions {
        downloads: Some(DownloadTarget {
            downloader: FileDownloader::from_client(reqwest::Client::new()),
            dir: dir.path().to_path_buf(),
        }),
        ..SweepOptions::default()
    };
    let mut acc = TextAccumulator::new();

    let report = collect_drive_files(&graph, &[docs_site()], &options, &mut acc)
        .await
        .unwrap();
    assert_eq!(report.downloads_ok, 3);

    let site_dir = dir.path().join("contoso.sharepoint.com/sites/Docs");
    let read = |rel: &str| std::fs::read_to_string(site_dir.join(rel)).unwrap();
    assert_eq!(read("Documents/A/report.docx"), "from folder A");
    assert_eq!(read("Documents/B/report.docx"), "from folder B");
    assert_eq!(read("Archive/report.docx"), "from archive");

    let saved: Vec<&String> = acc
        .lines()
        .iter()
        .filter(|l| l.starts_with("Downloaded to: "))
        .collect();
    assert_eq!(saved.len(), 3);
}
