#![allow(dead_code)]

use cadence::api::{self, AppState};
use cadence::db;
use cadence::habit::{Calendar, HabitService};
use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use mockable::Clock;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_in_memory().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Settable clock. Starts at noon UTC on the given day.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn at(day: NaiveDate) -> Arc<Self> {
        Arc::new(Self(Mutex::new(noon(day))))
    }

    /// Move to noon UTC on `day`.
    pub fn set_day(&self, day: NaiveDate) {
        *self.0.lock().expect("clock mutex") = noon(day);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().expect("clock mutex") = now;
    }

    pub fn advance_days(&self, days: i64) {
        *self.0.lock().expect("clock mutex") += TimeDelta::days(days);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

fn noon(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

/// A service over `conn` whose "today" is driven by `clock`, in UTC.
pub fn service_with(conn: Connection, clock: Arc<MutableClock>) -> HabitService {
    HabitService::new(
        Arc::new(Mutex::new(conn)),
        Calendar::new(chrono_tz::UTC, clock),
    )
}

/// In-memory service starting on `day`.
pub fn test_service(day: NaiveDate) -> (HabitService, Arc<MutableClock>) {
    let clock = MutableClock::at(day);
    (service_with(test_db(), Arc::clone(&clock)), clock)
}

pub const AUTH_HEADER: &str = "x-user-id";

/// A running server on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub clock: Arc<MutableClock>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start(day: NaiveDate) -> Self {
        let (habits, clock) = test_service(day);
        let state = AppState::new(habits, AUTH_HEADER).unwrap();
        let app = api::router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

        Self {
            base_url: format!("http://{addr}"),
            clock,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn get(&self, user: &str, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).header(AUTH_HEADER, user)
    }

    pub fn post(&self, user: &str, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).header(AUTH_HEADER, user)
    }

    pub fn patch(&self, user: &str, path: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).header(AUTH_HEADER, user)
    }

    pub fn delete(&self, user: &str, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).header(AUTH_HEADER, user)
    }
}
