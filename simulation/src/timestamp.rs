use std::time::SystemTime;

use crate::TimeError;

const SECONDS_PER_DAY: u64 = 86_400;

pub struct Timestamp;

impl Timestamp {
    /// Returns the current timestamp in seconds since UNIX epoch.
    ///
    /// # Errors
    /// Returns `TimeError::SystemTimeBeforeEpoch` if system time is before UNIX epoch.
    pub fn try_now() -> Result<u64, TimeError> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|_| TimeError::SystemTimeBeforeEpoch)
    }

    /// Today's UTC date as `YYYY-MM-DD`.
    pub fn try_today() -> Result<String, TimeError> {
        Ok(Self::date_string(Self::try_now()?))
    }

    /// Formats the UTC date containing `seconds` (since UNIX epoch) as
    /// `YYYY-MM-DD`.
    pub fn date_string(seconds: u64) -> String {
        let (year, month, day) = civil_from_days((seconds / SECONDS_PER_DAY) as i64);
        format!("{:04}-{:02}-{:02}", year, month, day)
    }
}

// Proleptic Gregorian calendar, days counted from 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
