//! Alarm slots of the DS3231.
//!
//! The chip has two comparators. Alarm 1 compares seconds, minutes, hours
//! and a day field; alarm 2 has no seconds register and fires at 00 seconds.
//! Bit 7 of every alarm register is a don't-care mask for that field and
//! bit 6 of the day register (DY/DT) selects day of week over date of month.
//!
//! Rather than exposing the mask bits, each slot has a small mode type:
//!
//! ## Alarm 1
//! - `OnceASecond` - every second
//! - `SecondMatch` - when seconds match
//! - `MinuteSecondMatch` - when minutes:seconds match
//! - `HourMinuteSecondMatch` - when hours:minutes:seconds match (daily)
//! - `DateHourMinuteSecondMatch` - at a time on a date of month
//! - `WeekHourMinuteSecondMatch` - at a time on a day of week
//!
//! ## Alarm 2
//! - `OnceAMinute` - every minute at 00 seconds
//! - `MinuteMatch` - when minutes match
//! - `HourMinuteMatch` - when hours:minutes match (daily)
//! - `DateHourMinuteMatch` - at a time on a date of month
//! - `WeekHourMinuteMatch` - at a time on a day of week
//!
//! The numeric value of a mode carries one mask bit per stored field in
//! bits 0-3 and the DY/DT selector in bit 4.

use crate::bcd::{bcd2hex, hex2bcd};
use crate::datetime::{decode_hours, encode_hours, validate_clock, DS3231DateTimeError};
use crate::registers::{AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, DayDateSelect, Hours};

/// Bit layout shared by both slots, in alarm 1 order.
const MASK_SECONDS: u8 = 0x01;
const MASK_MINUTES: u8 = 0x02;
const MASK_HOURS: u8 = 0x04;
const MASK_DAY: u8 = 0x08;
const SELECT_DAY: u8 = 0x10;

/// Error type for alarm encode and decode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// A time field is out of range
    DateTime(DS3231DateTimeError),
    /// The registers hold a mask combination that is not a known mode
    InvalidMode(u8),
}

impl From<DS3231DateTimeError> for AlarmError {
    fn from(e: DS3231DateTimeError) -> Self {
        AlarmError::DateTime(e)
    }
}

/// Partial time an alarm matches against.
///
/// Only the fields the mode matches on are significant. Of `date` and `day`,
/// the one the mode does not select reads back as zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    /// Date of month (1-31) for date modes
    pub date: u8,
    /// Day of week (1-7) for week modes
    pub day: u8,
    /// Hours (0-23 for 24-hour, 1-12 for 12-hour)
    pub hours: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Seconds (0-59), alarm 1 only
    pub seconds: u8,
    /// PM flag for 12-hour mode (None for 24-hour, Some(true/false) for 12-hour)
    pub is_pm: Option<bool>,
}

/// Match modes of alarm 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm1Mode {
    /// Alarm once per second
    OnceASecond = 0x0F,
    /// Alarm when seconds match
    SecondMatch = 0x0E,
    /// Alarm when minutes and seconds match
    MinuteSecondMatch = 0x0C,
    /// Alarm when hours, minutes and seconds match
    HourMinuteSecondMatch = 0x08,
    /// Alarm when date, hours, minutes and seconds match
    DateHourMinuteSecondMatch = 0x00,
    /// Alarm when day of week, hours, minutes and seconds match
    WeekHourMinuteSecondMatch = 0x10,
}

impl Alarm1Mode {
    /// Mask bits A1M1-A1M4 in bits 0-3, DY/DT in bit 4.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

impl From<Alarm1Mode> for u8 {
    fn from(v: Alarm1Mode) -> Self {
        v.bits()
    }
}

impl TryFrom<u8> for Alarm1Mode {
    type Error = AlarmError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0x0F => Ok(Alarm1Mode::OnceASecond),
            0x0E => Ok(Alarm1Mode::SecondMatch),
            0x0C => Ok(Alarm1Mode::MinuteSecondMatch),
            0x08 => Ok(Alarm1Mode::HourMinuteSecondMatch),
            0x00 => Ok(Alarm1Mode::DateHourMinuteSecondMatch),
            0x10 => Ok(Alarm1Mode::WeekHourMinuteSecondMatch),
            _ => Err(AlarmError::InvalidMode(bits)),
        }
    }
}

/// Match modes of alarm 2.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm2Mode {
    /// Alarm once per minute (00 seconds of every minute)
    OnceAMinute = 0x07,
    /// Alarm when minutes match
    MinuteMatch = 0x06,
    /// Alarm when hours and minutes match
    HourMinuteMatch = 0x04,
    /// Alarm when date, hours and minutes match
    DateHourMinuteMatch = 0x00,
    /// Alarm when day of week, hours and minutes match
    WeekHourMinuteMatch = 0x10,
}

impl Alarm2Mode {
    /// Mask bits A2M2-A2M4 in bits 0-2, DY/DT in bit 4.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    // alarm 2 has no seconds mask, its fields start one bit higher
    const fn widen(bits: u8) -> u8 {
        ((bits & 0x07) << 1) | (bits & SELECT_DAY)
    }

    const fn narrow(bits: u8) -> u8 {
        ((bits >> 1) & 0x07) | (bits & SELECT_DAY)
    }
}

impl From<Alarm2Mode> for u8 {
    fn from(v: Alarm2Mode) -> Self {
        v.bits()
    }
}

impl TryFrom<u8> for Alarm2Mode {
    type Error = AlarmError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0x07 => Ok(Alarm2Mode::OnceAMinute),
            0x06 => Ok(Alarm2Mode::MinuteMatch),
            0x04 => Ok(Alarm2Mode::HourMinuteMatch),
            0x00 => Ok(Alarm2Mode::DateHourMinuteMatch),
            0x10 => Ok(Alarm2Mode::WeekHourMinuteMatch),
            _ => Err(AlarmError::InvalidMode(bits)),
        }
    }
}

/// Register image of alarm 1 (0x07-0x0A).
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DS3231Alarm1 {
    seconds: AlarmSeconds,
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm1 {
    /// Validates `time` for `mode` and packs both into the registers.
    pub(crate) fn from_mode(time: &AlarmTime, mode: Alarm1Mode) -> Result<Self, AlarmError> {
        let bits = mode.bits();
        validate_clock(time.hours, time.minutes, Some(time.seconds), time.is_pm)?;
        validate_day_date(time, bits)?;

        let mut seconds = AlarmSeconds::default();
        seconds.set_alarm_mask1(bits & MASK_SECONDS != 0);
        seconds.set_bcd_seconds(hex2bcd(time.seconds));
        let (minutes, hours, day_date) = encode_fields(time, bits);
        Ok(Self {
            seconds,
            minutes,
            hours,
            day_date,
        })
    }

    /// Rebuilds the partial time and the mode from the registers.
    pub(crate) fn to_mode(self) -> Result<(AlarmTime, Alarm1Mode), AlarmError> {
        let (mut time, mut bits) = decode_fields(self.minutes, self.hours, self.day_date);
        if self.seconds.alarm_mask1() {
            bits |= MASK_SECONDS;
        }
        time.seconds = bcd2hex(self.seconds.bcd_seconds());
        let mode = Alarm1Mode::try_from(bits).inspect_err(|_| {
            error!("ds3231: alarm1 mask bits {} are not a mode", bits);
        })?;
        Ok((time, mode))
    }
}

impl From<[u8; 4]> for DS3231Alarm1 {
    fn from(data: [u8; 4]) -> Self {
        Self {
            seconds: AlarmSeconds(data[0]),
            minutes: AlarmMinutes(data[1]),
            hours: AlarmHours(data[2]),
            day_date: AlarmDayDate(data[3]),
        }
    }
}

impl From<&DS3231Alarm1> for [u8; 4] {
    fn from(alarm: &DS3231Alarm1) -> [u8; 4] {
        [
            alarm.seconds.0,
            alarm.minutes.0,
            alarm.hours.0,
            alarm.day_date.0,
        ]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DS3231Alarm1 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DS3231Alarm1 {{ ");
        defmt::write!(f, "seconds: {}, ", self.seconds);
        defmt::write!(f, "minutes: {}, ", self.minutes);
        defmt::write!(f, "hours: {}, ", self.hours);
        defmt::write!(f, "day_date: {} ", self.day_date);
        defmt::write!(f, "}}");
    }
}

/// Register image of alarm 2 (0x0B-0x0D).
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DS3231Alarm2 {
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm2 {
    /// Validates `time` for `mode` and packs both into the registers.
    /// `time.seconds` is ignored.
    pub(crate) fn from_mode(time: &AlarmTime, mode: Alarm2Mode) -> Result<Self, AlarmError> {
        let bits = Alarm2Mode::widen(mode.bits());
        validate_clock(time.hours, time.minutes, None, time.is_pm)?;
        validate_day_date(time, bits)?;

        let (minutes, hours, day_date) = encode_fields(time, bits);
        Ok(Self {
            minutes,
            hours,
            day_date,
        })
    }

    /// Rebuilds the partial time and the mode from the registers. Seconds
    /// always read as zero.
    pub(crate) fn to_mode(self) -> Result<(AlarmTime, Alarm2Mode), AlarmError> {
        let (time, bits) = decode_fields(self.minutes, self.hours, self.day_date);
        let bits = Alarm2Mode::narrow(bits);
        let mode = Alarm2Mode::try_from(bits).inspect_err(|_| {
            error!("ds3231: alarm2 mask bits {} are not a mode", bits);
        })?;
        Ok((time, mode))
    }
}

impl From<[u8; 3]> for DS3231Alarm2 {
    fn from(data: [u8; 3]) -> Self {
        Self {
            minutes: AlarmMinutes(data[0]),
            hours: AlarmHours(data[1]),
            day_date: AlarmDayDate(data[2]),
        }
    }
}

impl From<&DS3231Alarm2> for [u8; 3] {
    fn from(alarm: &DS3231Alarm2) -> [u8; 3] {
        [alarm.minutes.0, alarm.hours.0, alarm.day_date.0]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DS3231Alarm2 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DS3231Alarm2 {{ ");
        defmt::write!(f, "minutes: {}, ", self.minutes);
        defmt::write!(f, "hours: {}, ", self.hours);
        defmt::write!(f, "day_date: {} ", self.day_date);
        defmt::write!(f, "}}");
    }
}

/// Checks the day field the mode matches on. `bits` is in alarm 1 layout.
fn validate_day_date(time: &AlarmTime, bits: u8) -> Result<(), AlarmError> {
    if bits & MASK_DAY != 0 {
        return Ok(());
    }
    if bits & SELECT_DAY != 0 {
        if time.day == 0 || time.day > 7 {
            error!("ds3231: week can't be zero or over than 7");
            return Err(DS3231DateTimeError::InvalidDayOfWeek.into());
        }
    } else if time.date == 0 || time.date > 31 {
        error!("ds3231: date can't be zero or over than 31");
        return Err(DS3231DateTimeError::InvalidDateOfMonth.into());
    }
    Ok(())
}

/// Packs the minute, hour and day registers common to both slots.
fn encode_fields(time: &AlarmTime, bits: u8) -> (AlarmMinutes, AlarmHours, AlarmDayDate) {
    let mut minutes = AlarmMinutes::default();
    minutes.set_alarm_mask2(bits & MASK_MINUTES != 0);
    minutes.set_bcd_minutes(hex2bcd(time.minutes));

    let mut hours = AlarmHours::from(u8::from(encode_hours(time.hours, time.is_pm)));
    hours.set_alarm_mask3(bits & MASK_HOURS != 0);

    let mut day_date = AlarmDayDate::default();
    if bits & MASK_DAY != 0 {
        day_date.set_alarm_mask4(true);
    } else if bits & SELECT_DAY != 0 {
        day_date.set_day_date_select(DayDateSelect::Day);
        day_date.set_day(time.day);
    } else {
        day_date.set_day_date_select(DayDateSelect::Date);
        day_date.set_bcd_date(hex2bcd(time.date));
    }
    (minutes, hours, day_date)
}

/// Unpacks the minute, hour and day registers. Returns the mask bits in
/// alarm 1 layout; DY/DT only counts while the day mask is clear.
fn decode_fields(
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
) -> (AlarmTime, u8) {
    let mut bits = 0;
    if minutes.alarm_mask2() {
        bits |= MASK_MINUTES;
    }
    if hours.alarm_mask3() {
        bits |= MASK_HOURS;
    }

    let (date, day) = if day_date.alarm_mask4() {
        bits |= MASK_DAY;
        (0, 0)
    } else {
        match day_date.day_date_select() {
            DayDateSelect::Day => {
                bits |= SELECT_DAY;
                (0, day_date.day())
            }
            DayDateSelect::Date => (bcd2hex(day_date.bcd_date()), 0),
        }
    };

    let (hour, is_pm) = decode_hours(Hours::from(u8::from(hours) & 0x7F));
    let time = AlarmTime {
        date,
        day,
        hours: hour,
        minutes: bcd2hex(minutes.bcd_minutes()),
        seconds: 0,
        is_pm,
    };
    (time, bits)
}
