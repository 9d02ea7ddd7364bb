use shared::protocol::CompanyFilterRequest;

use crate::query::{QueryParams, MAX_RATING, PAGE_SIZE};

/// Maps listing inputs onto the `POST /Company/filter` body.
///
/// `page` is passed separately so filter changes can ask for page 1 while
/// pagination keeps the rest of the inputs as they are.
pub fn build_request(params: &QueryParams, page: u32) -> CompanyFilterRequest {
    CompanyFilterRequest {
        name: params.company_name.clone().filter(|name| !name.is_empty()),
        sector_id: params.sector_id,
        min_average_rating: params.min_average_rating,
        // The listing has no upper-bound control; the API still expects the field.
        max_average_rating: MAX_RATING,
        sort_by: params.sort_field,
        sort_desc: params.sort_descending,
        page: page.max(1),
        page_size: PAGE_SIZE,
    }
}
