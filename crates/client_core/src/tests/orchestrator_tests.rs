use shared::domain::{CompanyId, SortField};

use super::*;

fn company(id: i64, name: &str) -> CompanySummary {
    CompanySummary {
        id: CompanyId(id),
        name: name.to_string(),
        city: "Ankara".to_string(),
        sector_name: "Software".to_string(),
        average_rating: 4.0,
        review_count: 3,
    }
}

fn page_of(names: &[&str], total_count: u64) -> CompanyPage {
    CompanyPage {
        items: names
            .iter()
            .enumerate()
            .map(|(idx, name)| company(idx as i64 + 1, name))
            .collect(),
        total_count,
    }
}

#[test]
fn starts_idle_with_single_page() {
    let orchestrator = FetchOrchestrator::new();
    assert_eq!(orchestrator.state(), FetchState::Idle);
    assert!(!orchestrator.is_loading());
    assert_eq!(
        orchestrator.pagination(),
        Pagination {
            page: 1,
            total_pages: 1,
            has_previous: false,
            has_next: false,
        }
    );
}

#[test]
fn success_applies_params_and_results_together() {
    let mut orchestrator = FetchOrchestrator::new();
    let params = QueryParams::default().with_company_name("Acme");
    let ticket = orchestrator.begin(params.clone());
    assert_eq!(orchestrator.state(), FetchState::Loading);

    let outcome = orchestrator.settle(ticket, Ok(page_of(&["Acme"], 1)));
    assert!(matches!(outcome, SettleOutcome::Applied));
    assert_eq!(orchestrator.displayed_params(), Some(&params));
    assert_eq!(orchestrator.results().map(|r| r.items.len()), Some(1));
    assert!(matches!(orchestrator.state(), FetchState::Settled(_)));
}

#[test]
fn stale_response_is_discarded_after_newer_one_settles() {
    let mut orchestrator = FetchOrchestrator::new();
    let a = QueryParams::default().with_company_name("A");
    let b = QueryParams::default().with_company_name("B");

    let ticket_a = orchestrator.begin(a);
    let ticket_b = orchestrator.begin(b.clone());
    assert!(ticket_b.seq() > ticket_a.seq());

    assert!(matches!(
        orchestrator.settle(ticket_b, Ok(page_of(&["B"], 1))),
        SettleOutcome::Applied
    ));
    assert!(matches!(
        orchestrator.settle(ticket_a, Ok(page_of(&["A1", "A2"], 2))),
        SettleOutcome::Discarded
    ));

    assert_eq!(orchestrator.displayed_params(), Some(&b));
    assert_eq!(
        orchestrator.results().map(|r| r.items[0].name.clone()),
        Some("B".to_string())
    );
    assert!(!orchestrator.is_loading());
}

#[test]
fn stale_response_arriving_first_does_not_end_loading() {
    let mut orchestrator = FetchOrchestrator::new();
    let ticket_a = orchestrator.begin(QueryParams::default().with_company_name("A"));
    let ticket_b = orchestrator.begin(QueryParams::default().with_company_name("B"));

    assert!(matches!(
        orchestrator.settle(ticket_a, Ok(page_of(&["A"], 1))),
        SettleOutcome::Discarded
    ));
    assert!(orchestrator.is_loading());
    assert_eq!(orchestrator.results(), None);

    orchestrator.settle(ticket_b, Ok(page_of(&["B"], 1)));
    assert!(!orchestrator.is_loading());
}

#[test]
fn failure_keeps_previous_display() {
    let mut orchestrator = FetchOrchestrator::new();
    let first = QueryParams::default();
    let ticket = orchestrator.begin(first.clone());
    orchestrator.settle(ticket, Ok(page_of(&["Acme", "Beta"], 2)));

    let ticket = orchestrator.begin(first.with_sort_field(SortField::Rating));
    let outcome = orchestrator.settle(
        ticket,
        Err(ClientError::Status {
            status: 502,
            message: None,
        }),
    );
    assert!(matches!(outcome, SettleOutcome::Failed(_)));
    assert_eq!(orchestrator.displayed_params(), Some(&first));
    assert_eq!(orchestrator.results().map(|r| r.total_count), Some(2));
    assert!(matches!(orchestrator.state(), FetchState::Settled(_)));
}

#[test]
fn first_fetch_failing_returns_to_idle() {
    let mut orchestrator = FetchOrchestrator::new();
    let ticket = orchestrator.begin(QueryParams::default());
    orchestrator.settle(
        ticket,
        Err(ClientError::InvalidResponse("truncated".to_string())),
    );
    assert_eq!(orchestrator.state(), FetchState::Idle);
}

#[test]
fn out_of_range_page_asks_for_follow_up_then_clamps() {
    let mut orchestrator = FetchOrchestrator::new();
    let ticket = orchestrator.begin(QueryParams::default().with_page(4));

    match orchestrator.settle(ticket, Ok(page_of(&[], 20))) {
        SettleOutcome::OutOfRange { last_page } => assert_eq!(last_page, 3),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(orchestrator.is_loading());
    assert_eq!(orchestrator.results(), None);

    let follow_up = orchestrator.begin_follow_up(QueryParams::default().with_page(3));
    orchestrator.settle(follow_up, Ok(page_of(&["Last"], 20)));
    assert_eq!(orchestrator.displayed_params().map(|p| p.page), Some(3));
    assert_eq!(
        orchestrator.pagination(),
        Pagination {
            page: 3,
            total_pages: 3,
            has_previous: true,
            has_next: false,
        }
    );
}

#[test]
fn follow_up_that_is_still_out_of_range_is_clamped_in_place() {
    let mut orchestrator = FetchOrchestrator::new();
    let follow_up = orchestrator.begin_follow_up(QueryParams::default().with_page(3));
    let outcome = orchestrator.settle(follow_up, Ok(page_of(&[], 5)));
    assert!(matches!(outcome, SettleOutcome::Applied));
    assert_eq!(orchestrator.displayed_params().map(|p| p.page), Some(1));
}

#[test]
fn empty_listing_has_one_page_and_no_navigation() {
    let mut orchestrator = FetchOrchestrator::new();
    let ticket = orchestrator.begin(QueryParams::default());
    orchestrator.settle(ticket, Ok(page_of(&[], 0)));
    let pagination = orchestrator.pagination();
    assert_eq!(pagination.total_pages, 1);
    assert!(!pagination.has_next);
    assert!(!pagination.has_previous);
}
