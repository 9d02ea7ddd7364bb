//! Routes of the front-end and the history collaborator that moves between them.

use std::sync::{Mutex, PoisonError};

use shared::domain::CompanyId;
use tracing::debug;
use url::form_urlencoded;

pub const HOME_PATH: &str = "/";
pub const COMPANIES_PATH: &str = "/companies";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const REVIEWS_PATH: &str = "/reviews-temp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Companies,
    Login,
    Register,
    Reviews { company_id: CompanyId },
    NotFound,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => HOME_PATH,
            Route::Companies => COMPANIES_PATH,
            Route::Login => LOGIN_PATH,
            Route::Register => REGISTER_PATH,
            Route::Reviews { .. } => REVIEWS_PATH,
            Route::NotFound => "/404",
        }
    }

    pub fn query(&self) -> Option<String> {
        match self {
            Route::Reviews { company_id } => Some(
                form_urlencoded::Serializer::new(String::new())
                    .append_pair("companyId", &company_id.to_string())
                    .finish(),
            ),
            _ => None,
        }
    }

    /// Resolves a path plus optional query string. A reviews link without a
    /// usable `companyId` has nowhere to go and resolves to `NotFound`.
    pub fn parse(path: &str, query: Option<&str>) -> Route {
        let path = match path.trim_end_matches('/') {
            "" => HOME_PATH,
            trimmed => trimmed,
        };
        match path {
            HOME_PATH => Route::Home,
            COMPANIES_PATH => Route::Companies,
            LOGIN_PATH => Route::Login,
            REGISTER_PATH => Route::Register,
            REVIEWS_PATH => query
                .and_then(|query| {
                    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
                        .find(|(key, _)| key == "companyId")
                        .and_then(|(_, value)| value.parse::<i64>().ok())
                })
                .map(|id| Route::Reviews {
                    company_id: CompanyId(id),
                })
                .unwrap_or(Route::NotFound),
            _ => Route::NotFound,
        }
    }
}

/// History collaborator. `replace` rewrites the current entry (used for
/// every listing refresh so back does not step through each query), `push`
/// adds one (used for moving to another view).
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str, query: Option<String>);
    fn replace(&self, path: &str, query: Option<String>);
    fn current_path(&self) -> String;

    fn push_route(&self, route: Route) {
        self.push(route.path(), route.query());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub path: String,
    pub query: Option<String>,
}

impl HistoryEntry {
    pub fn location(&self) -> String {
        match self.query.as_deref() {
            Some(query) if !query.is_empty() => format!("{}?{query}", self.path),
            _ => self.path.clone(),
        }
    }

    pub fn route(&self) -> Route {
        Route::parse(&self.path, self.query.as_deref())
    }
}

/// In-process history stack.
#[derive(Debug)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryNavigator {
    pub fn new(path: &str, query: Option<String>) -> Self {
        Self {
            entries: Mutex::new(vec![HistoryEntry {
                path: path.to_string(),
                query,
            }]),
        }
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current(&self) -> Option<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(HOME_PATH, None)
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, path: &str, query: Option<String>) {
        debug!(path, query = query.as_deref().unwrap_or(""), "history: push");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HistoryEntry {
                path: path.to_string(),
                query,
            });
    }

    fn replace(&self, path: &str, query: Option<String>) {
        debug!(path, query = query.as_deref().unwrap_or(""), "history: replace");
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = HistoryEntry {
            path: path.to_string(),
            query,
        };
        match entries.last_mut() {
            Some(last) => *last = entry,
            None => entries.push(entry),
        }
    }

    fn current_path(&self) -> String {
        self.current()
            .map(|entry| entry.path)
            .unwrap_or_else(|| HOME_PATH.to_string())
    }
}
