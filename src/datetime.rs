//! Calendar time model and its register encoding.
//!
//! The DS3231 keeps the current time in 7 consecutive registers:
//! seconds, minutes, hours, day of week, date, month (with the century bit)
//! and a two digit year. [`Time`] is the caller-facing value and
//! [`DS3231DateTime`] the register image; conversions between the two are
//! validated on the way in and total on the way out.
//!
//! # Epoch
//!
//! Years are stored as an offset from [`BASE_YEAR`] (2000). Offsets of 100
//! and more set the century bit and store `offset - 100`, so the supported
//! range is 2000 through 2199. The chip treats year register `00` as a leap
//! year, which is only correct with a 2000 epoch.
//!
//! # Hour format
//!
//! `is_pm: None` selects the 24-hour format. `Some(pm)` selects the 12-hour
//! format, with `pm` stored in bit 5 of the hours register.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bcd::{bcd2hex, hex2bcd};
use crate::registers::{Date, Day, Hours, Minutes, Month, Seconds, TimeRepresentation, Year};

/// First year representable by the year register and century bit.
pub const BASE_YEAR: u16 = 2000;

/// Last year representable by the year register and century bit.
pub const MAX_YEAR: u16 = BASE_YEAR + 199;

/// A civil calendar time as kept by the DS3231.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    /// Absolute year (2000-2199)
    pub year: u16,
    /// Month (1-12)
    pub month: u8,
    /// Date of month (1-31)
    pub date: u8,
    /// Day of week (1-7), numbering is up to the caller
    pub day: u8,
    /// Hours (0-23 for 24-hour, 1-12 for 12-hour)
    pub hours: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Seconds (0-59)
    pub seconds: u8,
    /// PM flag for 12-hour mode (None for 24-hour, Some(true/false) for 12-hour)
    pub is_pm: Option<bool>,
}

impl Time {
    /// The hour format this time is expressed in.
    #[must_use]
    pub fn time_representation(&self) -> TimeRepresentation {
        match self.is_pm {
            None => TimeRepresentation::TwentyFourHour,
            Some(_) => TimeRepresentation::TwelveHour,
        }
    }

    /// Checks every field against the range the registers can hold.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range, checked in the order
    /// year, month, day of week, date, hours, minutes, seconds.
    pub fn validate(&self) -> Result<(), DS3231DateTimeError> {
        if self.year < BASE_YEAR {
            error!("ds3231: year can't be less than {}", BASE_YEAR);
            return Err(DS3231DateTimeError::YearNotAfter1999);
        }
        if self.year > MAX_YEAR {
            error!("ds3231: year can't be over {}", MAX_YEAR);
            return Err(DS3231DateTimeError::YearNotBefore2200);
        }
        if self.month == 0 || self.month > 12 {
            error!("ds3231: month can't be zero or over than 12");
            return Err(DS3231DateTimeError::InvalidMonth);
        }
        if self.day == 0 || self.day > 7 {
            error!("ds3231: week can't be zero or over than 7");
            return Err(DS3231DateTimeError::InvalidDayOfWeek);
        }
        if self.date == 0 || self.date > 31 {
            error!("ds3231: date can't be zero or over than 31");
            return Err(DS3231DateTimeError::InvalidDateOfMonth);
        }
        validate_clock(self.hours, self.minutes, Some(self.seconds), self.is_pm)
    }

    /// Builds a [`Time`] from a chrono date and time.
    ///
    /// The day of week is numbered from Sunday = 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is outside 2000-2199.
    pub fn from_datetime(
        datetime: &NaiveDateTime,
        time_representation: TimeRepresentation,
    ) -> Result<Self, DS3231DateTimeError> {
        let year = u16::try_from(datetime.year()).map_err(|_| {
            error!("ds3231: year {} is out of range", datetime.year());
            DS3231DateTimeError::YearNotAfter1999
        })?;
        // chrono keeps every component well inside u8
        let narrow = |v: u32| u8::try_from(v).map_err(|_| DS3231DateTimeError::InvalidDateTime);
        let hour = narrow(datetime.hour())?;
        let (hours, is_pm) = match time_representation {
            TimeRepresentation::TwentyFourHour => (hour, None),
            TimeRepresentation::TwelveHour => match hour {
                0 => (12, Some(false)),              // 12 AM
                1..=11 => (hour, Some(false)),       // 1-11 AM
                12 => (12, Some(true)),              // 12 PM
                _ => (hour - 12, Some(true)),        // 1-11 PM
            },
        };
        let time = Time {
            year,
            month: narrow(datetime.month())?,
            date: narrow(datetime.day())?,
            day: narrow(datetime.weekday().num_days_from_sunday() + 1)?,
            hours,
            minutes: narrow(datetime.minute())?,
            seconds: narrow(datetime.second())?,
            is_pm,
        };
        time.validate()?;
        Ok(time)
    }

    /// Converts to a chrono date and time.
    ///
    /// The day of week is not consulted; chrono derives it from the date.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is out of range or the date does not
    /// exist in the calendar (e.g. February 30th).
    pub fn to_datetime(&self) -> Result<NaiveDateTime, DS3231DateTimeError> {
        self.validate()?;
        let hours = match self.is_pm {
            None => self.hours,
            Some(false) if self.hours == 12 => 0, // 12 AM = 0:xx
            Some(false) => self.hours,            // 1-11 AM = 1-11:xx
            Some(true) if self.hours == 12 => 12, // 12 PM = 12:xx
            Some(true) => self.hours + 12,        // 1-11 PM = 13-23:xx
        };
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.date),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(hours),
                u32::from(self.minutes),
                u32::from(self.seconds),
            )
        })
        .ok_or(DS3231DateTimeError::InvalidDateTime)
    }
}

/// Validates the clock part shared by [`Time`] and the alarms.
///
/// `seconds` is `None` for alarm 2, which has no seconds register.
pub(crate) fn validate_clock(
    hours: u8,
    minutes: u8,
    seconds: Option<u8>,
    is_pm: Option<bool>,
) -> Result<(), DS3231DateTimeError> {
    match is_pm {
        None if hours > 23 => {
            error!("ds3231: hour can't be over than 23");
            return Err(DS3231DateTimeError::InvalidHour);
        }
        Some(_) if hours == 0 || hours > 12 => {
            error!("ds3231: hour can't be over than 12 or less 1");
            return Err(DS3231DateTimeError::InvalidHour);
        }
        _ => {}
    }
    if minutes > 59 {
        error!("ds3231: minute can't be over than 59");
        return Err(DS3231DateTimeError::InvalidMinute);
    }
    if seconds.is_some_and(|s| s > 59) {
        error!("ds3231: second can't be over than 59");
        return Err(DS3231DateTimeError::InvalidSecond);
    }
    Ok(())
}

/// Packs an already validated hour into the hours register layout.
pub(crate) fn encode_hours(hours: u8, is_pm: Option<bool>) -> Hours {
    let mut value = Hours::default();
    match is_pm {
        None => {
            value.set_time_representation(TimeRepresentation::TwentyFourHour);
            value.set_bcd_hours_24(hex2bcd(hours));
        }
        Some(pm) => {
            value.set_time_representation(TimeRepresentation::TwelveHour);
            value.set_pm_or_twenty_hours(pm);
            value.set_bcd_hours_12(hex2bcd(hours));
        }
    }
    value
}

/// Unpacks the hours register layout into an hour and its meridiem.
pub(crate) fn decode_hours(hours: Hours) -> (u8, Option<bool>) {
    match hours.time_representation() {
        TimeRepresentation::TwentyFourHour => (bcd2hex(hours.bcd_hours_24()), None),
        TimeRepresentation::TwelveHour => (
            bcd2hex(hours.bcd_hours_12()),
            Some(hours.pm_or_twenty_hours()),
        ),
    }
}

/// Register image of the DS3231 date and time.
///
/// This struct models the 7 date/time registers of the DS3231, using
/// strongly-typed bitfield wrappers for each field.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DS3231DateTime {
    pub(crate) seconds: Seconds,
    pub(crate) minutes: Minutes,
    pub(crate) hours: Hours,
    pub(crate) day: Day,
    pub(crate) date: Date,
    pub(crate) month: Month,
    pub(crate) year: Year,
}

impl DS3231DateTime {
    /// Validates `time` and packs it into register form.
    pub(crate) fn from_time(time: &Time) -> Result<Self, DS3231DateTimeError> {
        time.validate()?;

        let mut seconds = Seconds::default();
        seconds.set_bcd_seconds(hex2bcd(time.seconds));
        let mut minutes = Minutes::default();
        minutes.set_bcd_minutes(hex2bcd(time.minutes));
        let hours = encode_hours(time.hours, time.is_pm);
        let mut day = Day::default();
        day.set_day(time.day);
        let mut date = Date::default();
        date.set_bcd_date(hex2bcd(time.date));

        // validate() bounds the year to BASE_YEAR..=MAX_YEAR, so this fits
        let mut offset = u8::try_from(time.year - BASE_YEAR)
            .map_err(|_| DS3231DateTimeError::YearNotBefore2200)?;
        let mut month = Month::default();
        month.set_bcd_month(hex2bcd(time.month));
        if offset >= 100 {
            offset -= 100;
            month.set_century(true);
        }
        let mut year = Year::default();
        year.set_bcd_year(hex2bcd(offset));

        let raw = DS3231DateTime {
            seconds,
            minutes,
            hours,
            day,
            date,
            month,
            year,
        };
        debug!("ds3231: encoded time {:?}", raw);
        Ok(raw)
    }

    /// Unpacks the registers. No validation: whatever the chip holds is
    /// reported as is.
    pub(crate) fn into_time(self) -> Time {
        let (hours, is_pm) = decode_hours(self.hours);
        let century = if self.month.century() { 100 } else { 0 };
        Time {
            year: BASE_YEAR + u16::from(bcd2hex(self.year.bcd_year())) + century,
            month: bcd2hex(self.month.bcd_month()),
            date: bcd2hex(self.date.bcd_date()),
            day: self.day.day(),
            hours,
            minutes: bcd2hex(self.minutes.bcd_minutes()),
            seconds: bcd2hex(self.seconds.bcd_seconds()),
            is_pm,
        }
    }
}

impl From<[u8; 7]> for DS3231DateTime {
    fn from(data: [u8; 7]) -> Self {
        DS3231DateTime {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            day: Day(data[3]),
            date: Date(data[4]),
            month: Month(data[5]),
            year: Year(data[6]),
        }
    }
}

impl From<&DS3231DateTime> for [u8; 7] {
    fn from(dt: &DS3231DateTime) -> [u8; 7] {
        [
            dt.seconds.0,
            dt.minutes.0,
            dt.hours.0,
            dt.day.0,
            dt.date.0,
            dt.month.0,
            dt.year.0,
        ]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DS3231DateTime {
    fn format(&self, f: defmt::Formatter) {
        let raw: [u8; 7] = self.into();
        defmt::write!(f, "DS3231DateTime({=[u8]:#x})", raw);
    }
}

/// Errors that can occur during DS3231 date/time conversion or validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS3231DateTimeError {
    /// The date/time is not representable (e.g. not a calendar date)
    InvalidDateTime,
    /// The year is not before 2200 (DS3231 only supports years < 2200)
    YearNotBefore2200,
    /// The year is not after 1999 (DS3231 only supports years >= 2000)
    YearNotAfter1999,
    /// Month must be 1-12
    InvalidMonth,
    /// Day of week must be 1-7
    InvalidDayOfWeek,
    /// Date of month must be 1-31
    InvalidDateOfMonth,
    /// Hours must be 0-23 (24-hour) or 1-12 (12-hour)
    InvalidHour,
    /// Minutes must be 0-59
    InvalidMinute,
    /// Seconds must be 0-59
    InvalidSecond,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_24h() -> Time {
        // Thursday 2024-03-14 15:30:00
        Time {
            year: 2024,
            month: 3,
            date: 14,
            day: 5,
            hours: 15,
            minutes: 30,
            seconds: 0,
            is_pm: None,
        }
    }

    #[test]
    fn test_encode_24h() {
        let raw = DS3231DateTime::from_time(&time_24h()).unwrap();
        let data: [u8; 7] = (&raw).into();
        assert_eq!(data, [0x00, 0x30, 0x15, 0x05, 0x14, 0x03, 0x24]);
    }

    #[test]
    fn test_encode_12h_pm() {
        let time = Time {
            hours: 11,
            minutes: 59,
            seconds: 50,
            is_pm: Some(true),
            ..time_24h()
        };
        let raw = DS3231DateTime::from_time(&time).unwrap();
        let data: [u8; 7] = (&raw).into();
        // bit 6 = 12h, bit 5 = PM
        assert_eq!(data[2], 0x71);
        assert_eq!(data[1], 0x59);
        assert_eq!(data[0], 0x50);
    }

    #[test]
    fn test_decode_24h() {
        let raw = DS3231DateTime::from([0x45, 0x07, 0x23, 0x01, 0x31, 0x12, 0x99]);
        let time = raw.into_time();
        assert_eq!(
            time,
            Time {
                year: 2099,
                month: 12,
                date: 31,
                day: 1,
                hours: 23,
                minutes: 7,
                seconds: 45,
                is_pm: None,
            }
        );
    }

    #[test]
    fn test_decode_12h() {
        let raw = DS3231DateTime::from([0x00, 0x00, 0x52, 0x02, 0x01, 0x01, 0x00]);
        let time = raw.into_time();
        assert_eq!(time.hours, 12);
        assert_eq!(time.is_pm, Some(false));
        assert_eq!(time.time_representation(), TimeRepresentation::TwelveHour);
    }

    #[test]
    fn test_century_flag() {
        let time = Time {
            year: 2100,
            month: 1,
            date: 1,
            ..time_24h()
        };
        let raw = DS3231DateTime::from_time(&time).unwrap();
        assert!(raw.month.century());
        assert_eq!(raw.year.bcd_year(), 0x00);
        assert_eq!(raw.into_time(), time);

        let time = Time {
            year: 2099,
            ..time_24h()
        };
        let raw = DS3231DateTime::from_time(&time).unwrap();
        assert!(!raw.month.century());
        assert_eq!(raw.year.bcd_year(), 0x99);
        assert_eq!(raw.into_time(), time);
    }

    #[test]
    fn test_last_supported_year() {
        let time = Time {
            year: MAX_YEAR,
            ..time_24h()
        };
        let raw = DS3231DateTime::from_time(&time).unwrap();
        let data: [u8; 7] = (&raw).into();
        assert_eq!(data[5], 0x83);
        assert_eq!(data[6], 0x99);
        assert_eq!(raw.into_time().year, 2199);
    }

    #[test]
    fn test_year_out_of_range() {
        let early = Time {
            year: 1999,
            ..time_24h()
        };
        assert_eq!(
            early.validate(),
            Err(DS3231DateTimeError::YearNotAfter1999)
        );
        let late = Time {
            year: 2200,
            ..time_24h()
        };
        assert_eq!(late.validate(), Err(DS3231DateTimeError::YearNotBefore2200));
    }

    #[test]
    fn test_field_validation() {
        let base = time_24h();
        let cases = [
            (Time { month: 0, ..base }, DS3231DateTimeError::InvalidMonth),
            (Time { month: 13, ..base }, DS3231DateTimeError::InvalidMonth),
            (Time { day: 0, ..base }, DS3231DateTimeError::InvalidDayOfWeek),
            (Time { day: 8, ..base }, DS3231DateTimeError::InvalidDayOfWeek),
            (Time { date: 0, ..base }, DS3231DateTimeError::InvalidDateOfMonth),
            (Time { date: 32, ..base }, DS3231DateTimeError::InvalidDateOfMonth),
            (Time { hours: 24, ..base }, DS3231DateTimeError::InvalidHour),
            (Time { minutes: 60, ..base }, DS3231DateTimeError::InvalidMinute),
            (Time { seconds: 60, ..base }, DS3231DateTimeError::InvalidSecond),
        ];
        for (time, expected) in cases {
            assert_eq!(time.validate(), Err(expected), "{:?}", time);
        }
    }

    #[test]
    fn test_twelve_hour_bounds() {
        let base = Time {
            is_pm: Some(false),
            hours: 1,
            ..time_24h()
        };
        assert!(base.validate().is_ok());
        assert!(Time { hours: 12, ..base }.validate().is_ok());
        assert_eq!(
            Time { hours: 0, ..base }.validate(),
            Err(DS3231DateTimeError::InvalidHour)
        );
        assert_eq!(
            Time { hours: 13, ..base }.validate(),
            Err(DS3231DateTimeError::InvalidHour)
        );
    }

    #[test]
    fn test_from_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let time = Time::from_datetime(&dt, TimeRepresentation::TwentyFourHour).unwrap();
        assert_eq!(time, time_24h());

        let time = Time::from_datetime(&dt, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(time.hours, 3);
        assert_eq!(time.is_pm, Some(true));
    }

    #[test]
    fn test_from_datetime_twelve_hour_edges() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let time = Time::from_datetime(&midnight, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!((time.hours, time.is_pm), (12, Some(false)));

        let noon = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let time = Time::from_datetime(&noon, TimeRepresentation::TwelveHour).unwrap();
        assert_eq!((time.hours, time.is_pm), (12, Some(true)));
        assert_eq!(time.to_datetime().unwrap(), noon);
    }

    #[test]
    fn test_from_datetime_out_of_range() {
        let dt = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(
            Time::from_datetime(&dt, TimeRepresentation::TwentyFourHour),
            Err(DS3231DateTimeError::YearNotAfter1999)
        );
        let dt = NaiveDate::from_ymd_opt(2200, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            Time::from_datetime(&dt, TimeRepresentation::TwentyFourHour),
            Err(DS3231DateTimeError::YearNotBefore2200)
        );
    }

    #[test]
    fn test_to_datetime() {
        let dt = time_24h().to_datetime().unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.hour(), 15);

        let pm = Time {
            hours: 3,
            is_pm: Some(true),
            ..time_24h()
        };
        assert_eq!(pm.to_datetime().unwrap(), dt);
    }

    #[test]
    fn test_to_datetime_rejects_impossible_date() {
        let time = Time {
            month: 2,
            date: 30,
            ..time_24h()
        };
        assert_eq!(
            time.to_datetime(),
            Err(DS3231DateTimeError::InvalidDateTime)
        );
    }

    #[test]
    fn test_leap_day_round_trip() {
        let time = Time {
            year: 2024,
            month: 2,
            date: 29,
            ..time_24h()
        };
        let raw = DS3231DateTime::from_time(&time).unwrap();
        assert_eq!(raw.into_time(), time);
        assert!(time.to_datetime().is_ok());
    }
}
