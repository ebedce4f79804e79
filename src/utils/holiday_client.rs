use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::model::holiday::PublicHoliday;

#[derive(Debug, Error)]
pub enum HolidayError {
    #[error("holiday request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("holiday API answered {status} for {year}/{country}")]
    Status {
        status: StatusCode,
        year: i32,
        country: String,
    },
}

#[async_trait]
pub trait HolidayProvider: Send + Sync {
    async fn public_holidays(&self, year: i32, country: &str) -> Result<Vec<PublicHoliday>, HolidayError>;
}

/// Client for the Nager.Date public holiday API.
pub struct NagerClient {
    http_client: Client,
    base_url: String,
}

impl NagerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HolidayError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, year: i32, country: &str) -> String {
        format!("{}/PublicHolidays/{}/{}", self.base_url, year, country)
    }
}

#[async_trait]
impl HolidayProvider for NagerClient {
    async fn public_holidays(&self, year: i32, country: &str) -> Result<Vec<PublicHoliday>, HolidayError> {
        let response = self.http_client.get(self.url(year, country)).send().await?;
        let status = response.status();

        // unknown country/year combinations come back empty
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(HolidayError::Status {
                status,
                year,
                country: country.to_string(),
            });
        }

        let holidays = response.json::<Vec<PublicHoliday>>().await?;
        tracing::debug!(year, country, count = holidays.len(), "Fetched public holidays");
        Ok(holidays)
    }
}
