//! Analysis window resolution

use crate::app::models::Epoch;
use crate::{Error, Result};
use chrono::{DateTime, Months, Utc};
use tracing::debug;

/// Pick the window datums are computed over
///
/// An explicit epoch is used as-is unless it is longer than `max_years`, in
/// which case only its most recent `max_years` are kept. Without an epoch the
/// window is the `max_years` calendar years ending at `now`.
pub fn resolve_window(epoch: Option<&Epoch>, max_years: u32, now: DateTime<Utc>) -> Result<Epoch> {
    match epoch {
        Some(epoch) => {
            epoch.validate()?;
            let earliest = years_before(epoch.end, max_years)?;
            if epoch.start < earliest {
                debug!(
                    "Clamping epoch {} .. {} to the last {} years",
                    epoch.start, epoch.end, max_years
                );
                Ok(Epoch {
                    start: earliest,
                    end: epoch.end,
                })
            } else {
                Ok(*epoch)
            }
        }
        None => Ok(Epoch {
            start: years_before(now, max_years)?,
            end: now,
        }),
    }
}

fn years_before(end: DateTime<Utc>, years: u32) -> Result<DateTime<Utc>> {
    end.checked_sub_months(Months::new(years.saturating_mul(12)))
        .ok_or_else(|| {
            Error::invalid_epoch(format!("cannot go back {years} years from {end}"))
        })
}
