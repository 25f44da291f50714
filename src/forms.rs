use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::models::MovieFilter;

/// Review submission payload. Validation failures are dropped silently by
/// the handler, so the bounds here are the whole contract.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewForm {
    /// Missing fields deserialize to "" so they fail validation instead of
    /// rejecting the request body outright.
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default)]
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 5000))]
    pub text: String,

    #[serde(default, deserialize_with = "empty_to_none")]
    pub parent: Option<i32>,
}

/// Star vote payload.
#[derive(Debug, Deserialize)]
pub struct RatingForm {
    pub star: i32,
    pub movie: i32,
}

/// Repeated `year` / `genre` query parameters on the filter endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub year: Vec<i32>,
    #[serde(default)]
    pub genre: Vec<i32>,
}

impl From<FilterParams> for MovieFilter {
    fn from(params: FilterParams) -> Self {
        Self { years: params.year, genres: params.genre }
    }
}

/// The reply widget submits `parent=""` when no parent is picked.
fn empty_to_none<'de, D>(de: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
