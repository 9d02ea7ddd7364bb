//! Filter, sort and pagination inputs of the company listing.

use shared::domain::{SectorId, SortField};

/// Companies per page. The API and the address bar both carry it, nothing edits it.
pub const PAGE_SIZE: u32 = 9;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// The complete set of inputs for one listing request.
///
/// Every mutator returns a fresh value; nothing is patched in place, so a
/// value that has been handed to a request or to the address bar never
/// changes underneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub company_name: Option<String>,
    pub sector_id: Option<SectorId>,
    pub min_average_rating: f64,
    pub sort_field: SortField,
    pub sort_descending: bool,
    pub page: u32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            company_name: None,
            sector_id: None,
            min_average_rating: MIN_RATING,
            sort_field: SortField::Name,
            sort_descending: false,
            page: 1,
        }
    }
}

impl QueryParams {
    pub fn with_company_name(&self, name: &str) -> Self {
        let trimmed = name.trim();
        Self {
            company_name: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..self.clone()
        }
    }

    pub fn with_sector(&self, sector_id: Option<SectorId>) -> Self {
        Self {
            sector_id,
            ..self.clone()
        }
    }

    pub fn with_min_rating(&self, rating: f64) -> Self {
        Self {
            min_average_rating: normalize_rating(rating),
            ..self.clone()
        }
    }

    pub fn with_sort_field(&self, sort_field: SortField) -> Self {
        Self {
            sort_field,
            ..self.clone()
        }
    }

    pub fn toggle_sort_direction(&self) -> Self {
        Self {
            sort_descending: !self.sort_descending,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn reset(&self) -> Self {
        Self::default()
    }

    pub fn sort_order(&self) -> &'static str {
        if self.sort_descending {
            "desc"
        } else {
            "asc"
        }
    }
}

/// Clamps into `[0, 5]` and snaps to the 0.1 grid of the rating slider.
/// NaN has no meaningful position on the slider and maps to the minimum.
pub fn normalize_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        return MIN_RATING;
    }
    let clamped = rating.clamp(MIN_RATING, MAX_RATING);
    (clamped * 10.0).round() / 10.0
}

/// Number of pages for `total_count` results. Never zero: an empty listing
/// still renders as page 1 of 1.
pub fn total_pages(total_count: u64) -> u32 {
    let pages = total_count.div_ceil(u64::from(PAGE_SIZE)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

pub fn clamp_page(page: u32, total_count: u64) -> u32 {
    page.clamp(1, total_pages(total_count))
}
