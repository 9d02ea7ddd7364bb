//! Company listing controller: turns listing events into fetches and keeps
//! the address bar in step with what is displayed.

use std::sync::Arc;

use shared::domain::{CompanyId, Sector, SectorId, SortField};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    navigation::{Navigator, Route, COMPANIES_PATH},
    orchestrator::{FetchOrchestrator, FetchTicket, Pagination, ResultSet, SettleOutcome},
    query::{clamp_page, QueryParams},
    request::build_request,
    session::SessionStore,
    url_sync::{from_query, to_query},
    CompanyDirectory, Notifier, SectorDirectory,
};

pub struct ListDependencies {
    pub companies: Arc<dyn CompanyDirectory>,
    pub sectors: Arc<dyn SectorDirectory>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Values of the filter form at the moment it is submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterForm {
    pub company_name: String,
    pub sector_id: Option<SectorId>,
    pub min_rating: f64,
}

impl FilterForm {
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            company_name: params.company_name.clone().unwrap_or_default(),
            sector_id: params.sector_id,
            min_rating: params.min_average_rating,
        }
    }
}

/// Everything a view needs to render the listing, read in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    /// Current inputs, including ones whose fetch is loading or has failed.
    pub params: QueryParams,
    /// Inputs of the results on screen.
    pub displayed: Option<QueryParams>,
    pub results: Option<ResultSet>,
    pub loading: bool,
    pub pagination: Pagination,
    pub sectors: Vec<Sector>,
}

struct ListState {
    params: QueryParams,
    orchestrator: FetchOrchestrator,
    sectors: Option<Vec<Sector>>,
}

pub struct ListController {
    deps: ListDependencies,
    state: Mutex<ListState>,
}

impl ListController {
    /// `initial_query` is the query string of the address the listing was
    /// opened with; an empty string opens it with default inputs.
    pub fn new(deps: ListDependencies, initial_query: &str) -> Self {
        let params = from_query(initial_query);
        debug!(?params, "companies: seeded from address");
        Self {
            deps,
            state: Mutex::new(ListState {
                params,
                orchestrator: FetchOrchestrator::new(),
                sectors: None,
            }),
        }
    }

    pub async fn mount(&self) {
        self.load_sectors().await;
        let ticket = {
            let mut state = self.state.lock().await;
            let params = state.params.clone();
            state.orchestrator.begin(params)
        };
        self.run(ticket).await;
    }

    pub async fn submit(&self, form: FilterForm) {
        self.transition(|params| {
            params
                .with_company_name(&form.company_name)
                .with_sector(form.sector_id)
                .with_min_rating(form.min_rating)
                .with_page(1)
        })
        .await;
    }

    pub async fn apply_sort(&self, field: SortField) {
        self.transition(|params| params.with_sort_field(field).with_page(1))
            .await;
    }

    pub async fn toggle_sort_direction(&self) {
        self.transition(|params| params.toggle_sort_direction().with_page(1))
            .await;
    }

    pub async fn reset(&self) {
        self.transition(QueryParams::reset).await;
    }

    /// Moves to `page`, clamped to the pages of the displayed results.
    /// Paging starts from what is on screen, so after a failed fetch the
    /// attempted page can be retried. Asking for the page already shown does
    /// nothing, which also covers an empty listing where the only page is 1.
    pub async fn go_to_page(&self, page: u32) {
        let ticket = {
            let mut state = self.state.lock().await;
            let base = state
                .orchestrator
                .displayed_params()
                .unwrap_or(&state.params)
                .clone();
            let target = match state.orchestrator.results() {
                Some(results) => clamp_page(page, results.total_count),
                None => page.max(1),
            };
            if target == base.page {
                debug!(page = target, "companies: already on requested page");
                return;
            }
            let params = base.with_page(target);
            state.params = params.clone();
            state.orchestrator.begin(params)
        };
        self.run(ticket).await;
    }

    pub async fn next_page(&self) {
        let page = self.displayed_page().await.saturating_add(1);
        self.go_to_page(page).await;
    }

    pub async fn previous_page(&self) {
        let page = self.displayed_page().await.saturating_sub(1).max(1);
        self.go_to_page(page).await;
    }

    async fn displayed_page(&self) -> u32 {
        let state = self.state.lock().await;
        state
            .orchestrator
            .displayed_params()
            .map_or(state.params.page, |params| params.page)
    }

    /// Opens the reviews of `company_id`, or the login view when nobody is
    /// signed in. Returns the route that was navigated to.
    pub fn view_reviews(&self, company_id: CompanyId) -> Route {
        let route = if self.deps.session.token().is_some() {
            Route::Reviews { company_id }
        } else {
            info!(company_id = company_id.0, "companies: sign-in required for reviews");
            Route::Login
        };
        self.deps.navigator.push_route(route);
        route
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let state = self.state.lock().await;
        ListSnapshot {
            params: state.params.clone(),
            displayed: state.orchestrator.displayed_params().cloned(),
            results: state.orchestrator.results().cloned(),
            loading: state.orchestrator.is_loading(),
            pagination: state.orchestrator.pagination(),
            sectors: state.sectors.clone().unwrap_or_default(),
        }
    }

    async fn load_sectors(&self) {
        if self.state.lock().await.sectors.is_some() {
            return;
        }
        let sectors = match self.deps.sectors.fetch_sectors().await {
            Ok(sectors) => sectors,
            Err(err) => {
                warn!("companies: could not load sectors: {err}");
                Vec::new()
            }
        };
        self.state.lock().await.sectors = Some(sectors);
    }

    async fn transition(&self, change: impl FnOnce(&QueryParams) -> QueryParams) {
        let ticket = {
            let mut state = self.state.lock().await;
            let params = change(&state.params);
            state.params = params.clone();
            state.orchestrator.begin(params)
        };
        self.run(ticket).await;
    }

    /// Fetches for `ticket` and applies the answer. The state lock is not
    /// held across the fetch, so newer events can start newer fetches while
    /// this one is outstanding.
    async fn run(&self, mut ticket: FetchTicket) {
        loop {
            let request = build_request(ticket.params(), ticket.params().page);
            let outcome = self.deps.companies.filter_companies(request).await;

            let mut state = self.state.lock().await;
            match state.orchestrator.settle(ticket, outcome) {
                SettleOutcome::Applied => {
                    if let Some(displayed) = state.orchestrator.displayed_params().cloned() {
                        self.deps
                            .navigator
                            .replace(COMPANIES_PATH, Some(to_query(&displayed, displayed.page)));
                        state.params = displayed;
                    }
                    return;
                }
                SettleOutcome::OutOfRange { last_page } => {
                    let params = state.params.with_page(last_page);
                    state.params = params.clone();
                    ticket = state.orchestrator.begin_follow_up(params);
                }
                SettleOutcome::Discarded => return,
                SettleOutcome::Failed(err) => {
                    self.deps.notifier.fetch_failed(&err);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
