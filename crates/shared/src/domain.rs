use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CompanyId);
id_newtype!(SectorId);

/// Column the company listing is ordered by. Serialized with the exact
/// spelling the API and the address bar use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    Name,
    Rating,
    ReviewCount,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Name, SortField::Rating, SortField::ReviewCount];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Rating => "Rating",
            SortField::ReviewCount => "ReviewCount",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == raw)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: CompanyId,
    pub name: String,
    pub city: String,
    pub sector_name: String,
    pub average_rating: f64,
    pub review_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub name: String,
}
