//! # Availability Queries
//!
//! Read-side projections behind the public booking calendar.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{
    errors::{ClinicError, ClinicResult},
    models::slot::{LocationFilter, Slot},
    store::Store,
};

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn parse(value: &str) -> ClinicResult<Self> {
        let invalid = || ClinicError::Validation(format!("mes must be YYYY-MM, got '{}'", value));

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(Self { year, month })
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// `[start, end)` of the month in the given timezone, as UTC instants.
    pub fn bounds(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (local_midnight(self.first_day(), tz), local_midnight(self.next().first_day(), tz))
    }
}

/// First instant of a local day. Days that start inside a DST gap begin at the
/// first valid local time.
fn local_midnight(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let mut probe = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    for _ in 0..4 {
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return dt.with_timezone(&Utc);
        }
        probe += chrono::Duration::minutes(30);
    }
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Open slots from `now` on, ascending by datetime.
pub async fn open_slots(
    store: &dyn Store,
    location: &LocationFilter,
    now: DateTime<Utc>,
) -> ClinicResult<Vec<Slot>> {
    store.find_open(location, now, None).await
}

/// Distinct local dates in the month that still have an open, future slot.
pub async fn available_days_in_month(
    store: &dyn Store,
    month: YearMonth,
    location: &LocationFilter,
    tz: Tz,
    now: DateTime<Utc>,
) -> ClinicResult<BTreeSet<NaiveDate>> {
    let (start, end) = month.bounds(tz);
    if end <= now {
        return Ok(BTreeSet::new());
    }

    let slots = store.find_open(location, start.max(now), Some(end)).await?;

    Ok(slots
        .iter()
        .map(|slot| slot.datetime.with_timezone(&tz).date_naive())
        .filter(|day| day.year() == month.year && day.month() == month.month)
        .collect())
}
