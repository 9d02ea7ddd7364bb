use serde::{Deserialize, Serialize};

use crate::domain::{CompanySummary, SectorId, SortField};

pub mod endpoints {
    pub const AUTH_LOGIN: &str = "/Auth/login";
    pub const AUTH_LOGOUT: &str = "/Auth/logout";
    pub const AUTH_REGISTER: &str = "/Auth/register";
    pub const COMPANY_FILTER: &str = "/Company/filter";
    pub const SECTORS: &str = "/Sector";
}

/// Body of `POST /Company/filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilterRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_id: Option<SectorId>,
    pub min_average_rating: f64,
    pub max_average_rating: f64,
    pub sort_by: SortField,
    pub sort_desc: bool,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPage {
    #[serde(default)]
    pub items: Vec<CompanySummary>,
    #[serde(default)]
    pub total_count: u64,
}

/// Every API response is wrapped in this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Query string of `POST /Auth/login`; the credentials travel as params, not as a body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginQuery {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub fullname: String,
    pub phone: String,
}
