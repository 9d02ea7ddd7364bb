//! Sequencing of listing fetches and application of their results.
//!
//! Fetches are not cancelled when a newer one starts. Each fetch instead
//! carries the sequence number it was started with, and only the most
//! recently started fetch may change what is displayed; anything older that
//! completes later is dropped on arrival.

use shared::{domain::CompanySummary, protocol::CompanyPage};
use tracing::{debug, info};

use crate::{
    error::ClientError,
    query::{clamp_page, total_pages, QueryParams},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub items: Vec<CompanySummary>,
    pub total_count: u64,
}

impl From<CompanyPage> for ResultSet {
    fn from(page: CompanyPage) -> Self {
        Self {
            items: page.items,
            total_count: page.total_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchState<'a> {
    Idle,
    Loading,
    Settled(&'a ResultSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagination {
    fn for_page(page: u32, total_count: u64) -> Self {
        let total_pages = total_pages(total_count);
        let page = clamp_page(page, total_count);
        Self {
            page,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }
}

/// Proof that a fetch was started, handed back on settle.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    seq: u64,
    params: QueryParams,
    allow_redirect: bool,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Inputs the fetch was started with, `page` included.
    pub fn params(&self) -> &QueryParams {
        &self.params
    }
}

#[derive(Debug)]
pub enum SettleOutcome {
    /// Results and inputs are now displayed together.
    Applied,
    /// The requested page lies past the last page of the answer. Nothing
    /// was applied; the fetch is still pending until a follow-up for
    /// `last_page` settles.
    OutOfRange { last_page: u32 },
    /// A newer fetch was started after this one; the answer was dropped.
    Discarded,
    /// The fetch failed; whatever was displayed before stays displayed.
    Failed(ClientError),
}

#[derive(Debug, Clone, PartialEq)]
struct Displayed {
    params: QueryParams,
    results: ResultSet,
}

#[derive(Debug, Default)]
pub struct FetchOrchestrator {
    latest_seq: u64,
    pending: Option<u64>,
    displayed: Option<Displayed>,
}

impl FetchOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, params: QueryParams) -> FetchTicket {
        self.start(params, true)
    }

    /// Starts the re-fetch for the last page after an `OutOfRange` settle.
    /// Its own answer is clamped and applied rather than redirected again,
    /// so a listing that keeps shrinking cannot bounce forever.
    pub fn begin_follow_up(&mut self, params: QueryParams) -> FetchTicket {
        self.start(params, false)
    }

    fn start(&mut self, params: QueryParams, allow_redirect: bool) -> FetchTicket {
        self.latest_seq += 1;
        self.pending = Some(self.latest_seq);
        debug!(seq = self.latest_seq, page = params.page, "companies: fetch started");
        FetchTicket {
            seq: self.latest_seq,
            params,
            allow_redirect,
        }
    }

    pub fn settle(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<CompanyPage, ClientError>,
    ) -> SettleOutcome {
        if ticket.seq != self.latest_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "companies: dropping stale response"
            );
            return SettleOutcome::Discarded;
        }

        let page = match outcome {
            Ok(page) => page,
            Err(err) => {
                self.pending = None;
                return SettleOutcome::Failed(err);
            }
        };

        let requested = ticket.params.page;
        let clamped = clamp_page(requested, page.total_count);
        if clamped != requested && ticket.allow_redirect {
            info!(
                requested,
                last_page = clamped,
                "companies: requested page is past the end"
            );
            return SettleOutcome::OutOfRange { last_page: clamped };
        }

        info!(
            seq = ticket.seq,
            page = clamped,
            total_count = page.total_count,
            items = page.items.len(),
            "companies: settled"
        );
        self.pending = None;
        self.displayed = Some(Displayed {
            params: ticket.params.with_page(clamped),
            results: page.into(),
        });
        SettleOutcome::Applied
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn state(&self) -> FetchState<'_> {
        match (&self.pending, &self.displayed) {
            (Some(_), _) => FetchState::Loading,
            (None, Some(displayed)) => FetchState::Settled(&displayed.results),
            (None, None) => FetchState::Idle,
        }
    }

    /// Inputs of the results on screen. Lags behind the latest request
    /// while it is loading, and stays put when it fails.
    pub fn displayed_params(&self) -> Option<&QueryParams> {
        self.displayed.as_ref().map(|displayed| &displayed.params)
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.displayed.as_ref().map(|displayed| &displayed.results)
    }

    pub fn pagination(&self) -> Pagination {
        match &self.displayed {
            Some(displayed) => {
                Pagination::for_page(displayed.params.page, displayed.results.total_count)
            }
            None => Pagination::for_page(1, 0),
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
