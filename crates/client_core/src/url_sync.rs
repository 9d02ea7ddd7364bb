//! Address-bar encoding of the listing inputs.
//!
//! `to_query` writes the query string the listing replaces the current
//! history entry with after every settled fetch; `from_query` reads a deep
//! link back when the listing mounts. Decoding never fails: a field that is
//! missing, malformed or out of range falls back to its default on its own.

use shared::domain::{SectorId, SortField};
use url::form_urlencoded;

use crate::query::{normalize_rating, QueryParams, MAX_RATING, MIN_RATING, PAGE_SIZE};

pub const PAGE: &str = "page";
pub const PAGE_SIZE_KEY: &str = "pageSize";
pub const SORT_BY: &str = "sortBy";
pub const SORT_ORDER: &str = "sortOrder";
pub const NAME: &str = "name";
pub const SECTOR_ID: &str = "sectorId";
pub const MIN_SCORE: &str = "minScore";

pub fn to_query(params: &QueryParams, page: u32) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair(PAGE, &page.max(1).to_string())
        .append_pair(PAGE_SIZE_KEY, &PAGE_SIZE.to_string())
        .append_pair(SORT_BY, params.sort_field.as_str())
        .append_pair(SORT_ORDER, params.sort_order());
    if let Some(name) = params.company_name.as_deref().filter(|name| !name.is_empty()) {
        serializer.append_pair(NAME, name);
    }
    if let Some(sector_id) = params.sector_id {
        serializer.append_pair(SECTOR_ID, &sector_id.to_string());
    }
    serializer.append_pair(MIN_SCORE, &params.min_average_rating.to_string());
    serializer.finish()
}

/// Fields recovered from a deep link. `None` means absent or unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialParams {
    pub page: Option<u32>,
    pub sort_field: Option<SortField>,
    pub sort_descending: Option<bool>,
    pub company_name: Option<String>,
    pub sector_id: Option<SectorId>,
    pub min_average_rating: Option<f64>,
}

impl PartialParams {
    pub fn resolve(self) -> QueryParams {
        let defaults = QueryParams::default();
        QueryParams {
            company_name: self.company_name.or(defaults.company_name),
            sector_id: self.sector_id.or(defaults.sector_id),
            min_average_rating: self
                .min_average_rating
                .unwrap_or(defaults.min_average_rating),
            sort_field: self.sort_field.unwrap_or(defaults.sort_field),
            sort_descending: self.sort_descending.unwrap_or(defaults.sort_descending),
            page: self.page.unwrap_or(defaults.page),
        }
    }
}

pub fn parse_query(query: &str) -> PartialParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut partial = PartialParams::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PAGE => {
                if let Some(page) = value.trim().parse::<u32>().ok().filter(|page| *page >= 1) {
                    partial.page = Some(page);
                }
            }
            SORT_BY => {
                if let Some(field) = SortField::parse(value.trim()) {
                    partial.sort_field = Some(field);
                }
            }
            SORT_ORDER => match value.trim() {
                "asc" => partial.sort_descending = Some(false),
                "desc" => partial.sort_descending = Some(true),
                _ => {}
            },
            NAME => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    partial.company_name = Some(trimmed.to_string());
                }
            }
            SECTOR_ID => {
                if let Ok(id) = value.trim().parse::<i64>() {
                    partial.sector_id = Some(SectorId(id));
                }
            }
            MIN_SCORE => {
                if let Some(score) = value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|score| (MIN_RATING..=MAX_RATING).contains(score))
                {
                    partial.min_average_rating = Some(normalize_rating(score));
                }
            }
            // pageSize is fixed; anything else is not ours.
            _ => {}
        }
    }

    partial
}

pub fn from_query(query: &str) -> QueryParams {
    parse_query(query).resolve()
}

#[cfg(test)]
#[path = "tests/url_sync_tests.rs"]
mod tests;
