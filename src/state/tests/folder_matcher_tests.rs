//! Tests for folder analysis and navigation.

use std::path::Path;
use std::sync::Arc;

use super::MockBackend;
use crate::state::{
    AnalysisOutcome, AnalysisStage, CancellationToken, FolderError, FolderMatcher,
    NO_MATCHES_NOTICE, match_folders,
};

fn matcher_for(a: &str, b: &str) -> FolderMatcher {
    let mut matcher = FolderMatcher::new();
    matcher.set_folder_a(a);
    matcher.set_folder_b(b);
    matcher
}

#[test]
fn test_matches_shared_names_in_order() {
    let backend = MockBackend::new()
        .with_folder("/a", &["c.png", "a.png", "b.png"])
        .with_folder("/b", &["b.png", "c.png", "d.png"]);
    let mut matcher = matcher_for("/a", "/b");

    let outcome = matcher.analyze(&backend).unwrap();

    assert_eq!(outcome, AnalysisOutcome::Matched(2));
    let names: Vec<_> = matcher.matches().iter().map(|m| m.file_name.as_str()).collect();
    assert_eq!(names, ["b.png", "c.png"]);
    assert!(matcher.is_analyzed());
    assert!(!matcher.is_loading());
    assert_eq!(matcher.current_index(), 0);
    assert_eq!(matcher.progress(), 100);
    assert_eq!(matcher.error(), None);

    let first = &matcher.matches()[0];
    assert_eq!(first.file_a.path, Path::new("/a/b.png"));
    assert_eq!(first.file_b.path, Path::new("/b/b.png"));
    assert!(!first.file_a.is_loaded());
    assert_eq!(first.file_a.width, 0);
}

#[test]
fn test_no_matches_sets_notice_not_error() {
    let backend = MockBackend::new()
        .with_folder("/a", &["x.png"])
        .with_folder("/b", &["y.png"]);
    let mut matcher = matcher_for("/a", "/b");

    let outcome = matcher.analyze(&backend).unwrap();

    assert_eq!(outcome, AnalysisOutcome::NoMatches);
    assert!(matcher.is_analyzed());
    assert!(matcher.is_empty());
    assert_eq!(matcher.notice(), Some(NO_MATCHES_NOTICE));
    assert_eq!(matcher.error(), None);
}

#[test]
fn test_missing_selection() {
    let backend = MockBackend::new();
    let mut matcher = FolderMatcher::new();
    matcher.set_folder_a("/a");

    let result = matcher.analyze(&backend);

    assert!(matches!(result, Err(FolderError::MissingFolderSelection)));
    assert_eq!(matcher.error(), Some("Please select two folders"));
    assert!(!matcher.is_loading());
}

#[test]
fn test_scan_failure_reports_error() {
    let backend = MockBackend::new()
        .with_folder("/a", &["x.png"])
        .with_failing_scan("/b");
    let mut matcher = matcher_for("/a", "/b");

    let result = matcher.analyze(&backend);

    assert!(matches!(result, Err(FolderError::Scan(_))));
    assert!(!matcher.is_analyzed());
    assert!(!matcher.is_loading());
    let error = matcher.error().unwrap();
    assert!(error.starts_with("Failed to analyze folders: "), "{}", error);
}

#[test]
fn test_cancel_during_scan_is_silent() {
    let token = CancellationToken::new();
    let backend = MockBackend::new()
        .with_folder("/a", &["x.png", "y.png"])
        .with_folder("/b", &["x.png", "y.png"])
        .cancel_when_scanning("/b", token.clone());
    let mut matcher = matcher_for("/a", "/b");

    let outcome = matcher.analyze_with(&backend, token).unwrap();

    assert_eq!(outcome, AnalysisOutcome::Cancelled);
    assert!(!matcher.is_analyzed());
    assert!(!matcher.is_loading());
    assert!(matcher.is_empty());
    assert_eq!(matcher.error(), None);
    assert_eq!(matcher.notice(), None);
    assert_eq!(matcher.progress(), 0);
}

#[test]
fn test_progress_stages_are_monotonic() {
    let backend = MockBackend::new()
        .with_folder("/a", &["x.png"])
        .with_folder("/b", &["x.png"]);
    let mut stages = Vec::new();

    match_folders(
        &backend,
        Path::new("/a"),
        Path::new("/b"),
        &CancellationToken::new(),
        |stage| stages.push(stage),
    )
    .unwrap();

    assert_eq!(
        stages,
        [
            AnalysisStage::Starting,
            AnalysisStage::ScanningFolderA,
            AnalysisStage::ScanningFolderB,
            AnalysisStage::Matching,
            AnalysisStage::Sorting,
        ]
    );
    assert!(stages.windows(2).all(|w| w[0].percent() < w[1].percent()));
}

#[test]
fn test_large_folders_match_across_batches() {
    let names: Vec<String> = (0..2500).map(|i| format!("img_{:05}.png", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let backend = MockBackend::new()
        .with_folder("/a", &refs)
        .with_folder("/b", &refs[1000..]);
    let mut matcher = matcher_for("/a", "/b");

    assert_eq!(matcher.analyze(&backend).unwrap(), AnalysisOutcome::Matched(1500));
    assert_eq!(matcher.matches()[0].file_name, "img_01000.png");
}

#[test]
fn test_navigation_clamps() {
    let backend = MockBackend::new()
        .with_folder("/a", &["1.png", "2.png", "3.png"])
        .with_folder("/b", &["1.png", "2.png", "3.png"]);
    let mut matcher = matcher_for("/a", "/b");
    matcher.analyze(&backend).unwrap();

    matcher.previous();
    assert_eq!(matcher.current_index(), 0);

    matcher.go_to(10);
    assert_eq!(matcher.current_index(), 2);
    assert_eq!(matcher.progress_label(), "3 / 3");

    matcher.next();
    assert_eq!(matcher.current_index(), 2);

    matcher.go_to(-4);
    assert_eq!(matcher.current_index(), 0);
    assert_eq!(matcher.current_match().unwrap().file_name, "1.png");
}

#[test]
fn test_navigation_on_empty_list() {
    let mut matcher = FolderMatcher::new();
    matcher.next();
    matcher.go_to(5);
    assert_eq!(matcher.current_index(), 0);
    assert!(matcher.current_match().is_none());
    assert_eq!(matcher.progress_label(), "0 / 0");
}

#[test]
fn test_changing_folder_resets_matches() {
    let backend = MockBackend::new()
        .with_folder("/a", &["1.png", "2.png"])
        .with_folder("/b", &["1.png", "2.png"])
        .with_folder("/c", &["1.png"]);
    let mut matcher = matcher_for("/a", "/b");
    matcher.analyze(&backend).unwrap();
    matcher.next();

    matcher.set_folder_b("/c");

    assert!(matcher.is_empty());
    assert!(!matcher.is_analyzed());
    assert_eq!(matcher.current_index(), 0);
}

#[test]
fn test_clear_and_reset() {
    let backend = MockBackend::new()
        .with_folder("/a", &["1.png"])
        .with_folder("/b", &["1.png"]);
    let mut matcher = matcher_for("/a", "/b");
    matcher.analyze(&backend).unwrap();

    matcher.reset_analysis();
    assert!(matcher.is_empty());
    assert!(matcher.folder_a().is_some());

    matcher.clear_folders();
    assert!(matcher.folder_a().is_none());
    assert!(matcher.folder_b().is_none());
}

#[test]
fn test_background_analysis() {
    let backend = Arc::new(
        MockBackend::new()
            .with_folder("/a", &["p.png", "q.png"])
            .with_folder("/b", &["q.png", "p.png"]),
    );
    let mut matcher = matcher_for("/a", "/b");

    matcher.start_analysis(backend).unwrap();
    assert!(matcher.is_loading());

    let outcome = matcher.wait_for_analysis().unwrap().unwrap();

    assert_eq!(outcome, AnalysisOutcome::Matched(2));
    assert!(!matcher.is_analysis_running());
    assert!(!matcher.is_loading());
    assert_eq!(matcher.matches()[0].file_name, "p.png");
    assert!(matcher.poll_analysis().is_none());
}

#[test]
fn test_cancel_background_analysis() {
    let backend = Arc::new(
        MockBackend::new()
            .with_folder("/a", &["p.png"])
            .with_folder("/b", &["p.png"]),
    );
    let mut matcher = matcher_for("/a", "/b");
    matcher.start_analysis(backend).unwrap();

    matcher.cancel();

    assert!(!matcher.is_loading());
    assert!(!matcher.is_analysis_running());
    assert!(!matcher.is_analyzed());
    assert_eq!(matcher.error(), None);
}

#[test]
fn test_changing_folder_stops_background_analysis() {
    let backend = Arc::new(
        MockBackend::new()
            .with_folder("/a", &["p.png", "q.png"])
            .with_folder("/b", &["p.png", "q.png"])
            .with_folder("/c", &["q.png"]),
    );
    let mut matcher = matcher_for("/a", "/b");
    matcher.start_analysis(backend.clone()).unwrap();

    matcher.set_folder_b("/c");

    assert!(!matcher.is_analysis_running());
    assert!(!matcher.is_loading());
    assert!(matcher.wait_for_analysis().is_none());
    assert!(matcher.poll_analysis().is_none());
    assert!(!matcher.is_analyzed());
    assert!(matcher.is_empty());

    assert_eq!(matcher.analyze(backend.as_ref()).unwrap(), AnalysisOutcome::Matched(1));
    assert_eq!(matcher.matches()[0].file_b.path, Path::new("/c/q.png"));
}

#[test]
fn test_inline_analysis_replaces_background_run() {
    let backend = Arc::new(
        MockBackend::new()
            .with_folder("/a", &["p.png", "q.png"])
            .with_folder("/b", &["p.png", "q.png"]),
    );
    let mut matcher = matcher_for("/a", "/b");
    matcher.start_analysis(backend.clone()).unwrap();

    matcher.reset_analysis();
    assert!(!matcher.is_analysis_running());

    matcher.start_analysis(backend.clone()).unwrap();
    assert_eq!(matcher.analyze(backend.as_ref()).unwrap(), AnalysisOutcome::Matched(2));
    assert!(matcher.wait_for_analysis().is_none());
    assert!(matcher.is_analyzed());
    assert_eq!(matcher.len(), 2);
}
