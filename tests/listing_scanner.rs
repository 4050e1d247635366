mod common;

use common::{FakeBoard, FakeJob};
use job_apply_agent::error::DomError;
use job_apply_agent::workflow::ListingScanner;

fn jobs(ids: &[&str]) -> Vec<FakeJob> {
    ids.iter()
        .map(|id| FakeJob::new(id, "Frontend Developer", "Acme"))
        .collect()
}

async fn drain(scanner: &mut ListingScanner, board: &FakeBoard) -> Vec<String> {
    let mut seen = Vec::new();
    while let Some(scanned) = scanner.next_posting(board).await.unwrap() {
        seen.push(scanned.posting.id);
    }
    seen
}

#[tokio::test]
async fn test_scans_every_page() {
    let board = FakeBoard::with_pages(vec![jobs(&["1", "2"]), jobs(&["3"])]);
    let mut scanner = ListingScanner::new(10);

    assert_eq!(drain(&mut scanner, &board).await, vec!["1", "2", "3"]);
    assert_eq!(board.state().current_page, 1);
}

#[tokio::test]
async fn test_reports_page_and_subtitle_fields() {
    let board = FakeBoard::with_pages(vec![jobs(&["1"]), jobs(&["2"])]);
    let mut scanner = ListingScanner::new(10);

    let first = scanner.next_posting(&board).await.unwrap().unwrap();
    assert_eq!(first.page, Some(1));
    assert_eq!(first.posting.company, "Acme");
    assert_eq!(first.posting.location, "Berlin, Germany");

    let second = scanner.next_posting(&board).await.unwrap().unwrap();
    assert_eq!(second.page, Some(2));
    assert_eq!(second.index, 0);
}

#[tokio::test]
async fn test_stops_when_target_reached() {
    let board = FakeBoard::with_pages(vec![jobs(&["1", "2", "3"])]);
    let mut scanner = ListingScanner::new(1);

    assert!(scanner.next_posting(&board).await.unwrap().is_some());
    scanner.record_processed();
    assert!(scanner.target_reached());
    assert!(scanner.next_posting(&board).await.unwrap().is_none());
}

#[tokio::test]
async fn test_stale_card_is_retried_once() {
    let board = FakeBoard::with_pages(vec![jobs(&["1", "2"])]);
    board.state().stale_reads.insert((0, 0), 1);
    let mut scanner = ListingScanner::new(10);

    assert_eq!(drain(&mut scanner, &board).await, vec!["1", "2"]);
    assert_eq!(scanner.stale_events(), 1);
}

#[tokio::test]
async fn test_card_stale_twice_is_skipped() {
    let board = FakeBoard::with_pages(vec![jobs(&["1", "2"])]);
    board.state().stale_reads.insert((0, 0), 2);
    let mut scanner = ListingScanner::new(10);

    assert_eq!(drain(&mut scanner, &board).await, vec!["2"]);
    assert_eq!(scanner.stale_events(), 2);
}

#[tokio::test]
async fn test_empty_listing_ends_immediately() {
    let board = FakeBoard::with_pages(Vec::new());
    let mut scanner = ListingScanner::new(10);

    assert!(drain(&mut scanner, &board).await.is_empty());
}

#[tokio::test]
async fn test_stale_open_is_retried_once() {
    let board = FakeBoard::with_pages(vec![jobs(&["1", "2"])]);
    board.state().stale_opens.insert((0, 0), 1);
    let mut scanner = ListingScanner::new(10);

    let scanned = scanner.next_posting(&board).await.unwrap().unwrap();
    scanner.open(&board, &scanned).await.unwrap();

    assert_eq!(board.state().opened_ids, vec!["1".to_string()]);
    assert_eq!(scanner.stale_events(), 1);
}

#[tokio::test]
async fn test_stale_open_twice_fails() {
    let board = FakeBoard::with_pages(vec![jobs(&["1", "2"])]);
    board.state().stale_opens.insert((0, 0), 2);
    let mut scanner = ListingScanner::new(10);

    let scanned = scanner.next_posting(&board).await.unwrap().unwrap();
    let err = scanner.open(&board, &scanned).await.unwrap_err();

    assert!(err.is_stale());
    assert!(board.state().opened_ids.is_empty());
}

#[tokio::test]
async fn test_stale_open_does_not_click_replaced_card() {
    let board = FakeBoard::with_pages(vec![jobs(&["1", "2"])]);
    {
        let mut state = board.state();
        state.stale_opens.insert((0, 0), 1);
        state.replaced_on_stale_open = Some(FakeJob::new("99", "Backend Developer", "Globex"));
    }
    let mut scanner = ListingScanner::new(10);

    let scanned = scanner.next_posting(&board).await.unwrap().unwrap();
    let err = scanner.open(&board, &scanned).await.unwrap_err();

    assert!(matches!(err, DomError::Stale(_)));
    assert!(board.state().opened_ids.is_empty());
}
