use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateEventInput {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub max_seats: u32,
    pub price: i64,
    #[serde(default)]
    pub is_virtual: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub max_seats: Option<u32>,
    pub price: Option<i64>,
    pub is_virtual: Option<bool>,
}

impl UpdateEventInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.max_seats.is_none()
            && self.price.is_none()
            && self.is_virtual.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct EventFilter {
    pub is_virtual: Option<bool>,
    /// Only events on or after this date.
    pub from: Option<NaiveDate>,
}
