//! Request bodies and query strings.

use chrono::NaiveDate;
use serde::Deserialize;

use super::error::ApiError;
use crate::habit::types::{DateRange, Frequency, HabitPatch};

fn parse_frequency(raw: &str) -> Result<Frequency, ApiError> {
    raw.parse().map_err(ApiError::validation)
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: Option<String>,
    pub frequency: Option<String>,
}

impl CreateHabitRequest {
    /// Required fields, with `frequency` parsed. Name trimming happens in the store.
    pub fn validate(self) -> Result<(String, Frequency), ApiError> {
        let name = self
            .name
            .ok_or_else(|| ApiError::validation("name is required"))?;
        let frequency = self
            .frequency
            .as_deref()
            .ok_or_else(|| ApiError::validation("frequency is required"))
            .and_then(parse_frequency)?;
        Ok((name, frequency))
    }
}

/// PATCH body. Streak counters are not owner-editable, so any field outside
/// this set (including `currentStreak` and `longestStreak`) is rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    pub frequency: Option<String>,
    pub is_active: Option<bool>,
}

impl TryFrom<UpdateHabitRequest> for HabitPatch {
    type Error = ApiError;

    fn try_from(req: UpdateHabitRequest) -> Result<Self, Self::Error> {
        Ok(HabitPatch {
            name: req.name,
            frequency: req.frequency.as_deref().map(parse_frequency).transpose()?,
            is_active: req.is_active,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInRequest {
    #[serde(alias = "notes")]
    pub note: Option<String>,
}

impl CheckInRequest {
    /// Parse a possibly empty body.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::validation(format!("invalid check-in body: {e}")))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    /// Both bounds or neither.
    pub fn into_range(self) -> Result<Option<DateRange>, ApiError> {
        match (self.start, self.end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => DateRange::new(start, end)
                .map(Some)
                .map_err(ApiError::validation),
            _ => Err(ApiError::validation(
                "start and end must be given together",
            )),
        }
    }
}
