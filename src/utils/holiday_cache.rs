use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use moka::future::Cache;
use thiserror::Error;

use crate::model::holiday::PublicHoliday;
use crate::utils::holiday_client::{HolidayError, HolidayProvider};

/// Widest span `in_range` accepts, two years.
pub const MAX_RANGE_DAYS: i64 = 731;

#[derive(Debug, Default)]
pub struct HolidayLookup {
    pub by_date: HashMap<NaiveDate, PublicHoliday>,
    /// Years whose holidays could not be loaded; retry later.
    pub unavailable_years: Vec<i32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start_date cannot be after end_date")]
    Inverted,
    #[error("date range spans {days} days, at most two years allowed")]
    TooWide { days: i64 },
    #[error("public holidays unavailable for {years:?}")]
    Unavailable { years: Vec<i32> },
}

/// Public holidays per `(year, country)`.
///
/// Entries are never evicted. Concurrent loads of the same key share one
/// fetch, and a failed fetch is not cached so the next caller retries.
#[derive(Clone)]
pub struct HolidayCache {
    provider: Arc<dyn HolidayProvider>,
    years: Cache<(i32, String), Arc<Vec<PublicHoliday>>>,
}

impl HolidayCache {
    pub fn new(provider: Arc<dyn HolidayProvider>) -> Self {
        Self {
            provider,
            years: Cache::builder().build(),
        }
    }

    pub async fn try_holidays(
        &self,
        year: i32,
        country: &str,
    ) -> Result<Arc<Vec<PublicHoliday>>, Arc<HolidayError>> {
        let country = country.to_uppercase();
        let provider = self.provider.clone();
        let key = (year, country.clone());

        self.years
            .try_get_with(key, async move {
                provider.public_holidays(year, &country).await.map(Arc::new)
            })
            .await
    }

    /// Loads every listed year and merges them into one date-keyed map.
    /// Years the provider could not serve are reported, never treated as holiday-free.
    pub async fn holiday_map(&self, years: &[i32], country: &str) -> HolidayLookup {
        let loads = years
            .iter()
            .map(|&year| async move { (year, self.try_holidays(year, country).await) });

        let mut lookup = HolidayLookup::default();
        for (year, loaded) in futures::future::join_all(loads).await {
            match loaded {
                Ok(holidays) => {
                    for holiday in holidays.iter() {
                        lookup.by_date.entry(holiday.date).or_insert_with(|| holiday.clone());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, year, country, "Public holidays unavailable");
                    lookup.unavailable_years.push(year);
                }
            }
        }
        lookup
    }

    /// Holidays within `[from, to]`, at most `MAX_RANGE_DAYS` apart.
    pub async fn in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        country: &str,
    ) -> Result<Vec<PublicHoliday>, RangeError> {
        if to < from {
            return Err(RangeError::Inverted);
        }
        let days = (to - from).num_days();
        if days > MAX_RANGE_DAYS {
            return Err(RangeError::TooWide { days });
        }

        let years: Vec<i32> = (from.year()..=to.year()).collect();
        let lookup = self.holiday_map(&years, country).await;
        if !lookup.unavailable_years.is_empty() {
            return Err(RangeError::Unavailable {
                years: lookup.unavailable_years,
            });
        }

        let mut found: Vec<PublicHoliday> = lookup
            .by_date
            .into_values()
            .filter(|h| from <= h.date && h.date <= to)
            .collect();
        found.sort_by_key(|h| h.date);
        Ok(found)
    }

    pub fn is_loaded(&self, year: i32, country: &str) -> bool {
        self.years.contains_key(&(year, country.to_uppercase()))
    }

    pub async fn invalidate(&self, year: i32, country: &str) {
        self.years.invalidate(&(year, country.to_uppercase())).await;
    }
}
