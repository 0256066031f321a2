//! Register definitions and bitfield structures for the DS3231 RTC.
//!
//! The DS3231 exposes 19 single-byte registers at 0x00-0x12. Calendar and
//! alarm registers carry packed BCD values next to a few control bits; the
//! bitfields below expose the BCD value as a whole (see [`crate::bcd`]) and
//! the control bits as typed accessors.

use bitfield::bitfield;

/// Number of registers in the device map.
pub const REGISTER_COUNT: usize = 19;

/// Register addresses for the DS3231 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x02,
    /// Day of week register (1-7)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12) with century bit
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Alarm 1 seconds register
    Alarm1Seconds = 0x07,
    /// Alarm 1 minutes register
    Alarm1Minutes = 0x08,
    /// Alarm 1 hours register
    Alarm1Hours = 0x09,
    /// Alarm 1 day/date register
    Alarm1DayDate = 0x0A,
    /// Alarm 2 minutes register
    Alarm2Minutes = 0x0B,
    /// Alarm 2 hours register
    Alarm2Hours = 0x0C,
    /// Alarm 2 day/date register
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Control/Status register
    ControlStatus = 0x0F,
    /// Aging offset register
    AgingOffset = 0x10,
    /// Temperature MSB register
    MSBTemp = 0x11,
    /// Temperature LSB register
    LSBTemp = 0x12,
}

impl From<RegAddr> for u8 {
    fn from(v: RegAddr) -> Self {
        v as u8
    }
}

/// Hour format stored in bit 6 of the hours registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    /// Only the lowest bit is significant.
    fn from(v: u8) -> Self {
        match v & 0x01 {
            0 => TimeRepresentation::TwentyFourHour,
            _ => TimeRepresentation::TwelveHour,
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Oscillator control (EOSC).
///
/// The hardware bit is active low: a set bit stops the oscillator while the
/// device runs from the battery.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator is enabled
    Enabled = 0,
    /// Oscillator is disabled
    Disabled = 1,
}
impl From<u8> for Oscillator {
    /// Only the lowest bit is significant.
    fn from(v: u8) -> Self {
        match v & 0x01 {
            0 => Oscillator::Enabled,
            _ => Oscillator::Disabled,
        }
    }
}
impl From<Oscillator> for u8 {
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}
impl From<bool> for Oscillator {
    fn from(enable: bool) -> Self {
        if enable {
            Oscillator::Enabled
        } else {
            Oscillator::Disabled
        }
    }
}

/// Function of the INT/SQW pin (INTCN).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Output square wave on INT/SQW pin
    SquareWave = 0,
    /// Output interrupt signal on INT/SQW pin
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    /// Only the lowest bit is significant.
    fn from(v: u8) -> Self {
        match v & 0x01 {
            0 => InterruptControl::SquareWave,
            _ => InterruptControl::Interrupt,
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Square wave output frequency (RS2:RS1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz square wave output
    Hz1 = 0b00,
    /// 1.024 kHz square wave output
    Hz1024 = 0b01,
    /// 4.096 kHz square wave output
    Hz4096 = 0b10,
    /// 8.192 kHz square wave output
    Hz8192 = 0b11,
}
impl From<u8> for SquareWaveFrequency {
    /// Only the two lowest bits are significant.
    fn from(v: u8) -> Self {
        match v & 0b11 {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz1024,
            0b10 => SquareWaveFrequency::Hz4096,
            _ => SquareWaveFrequency::Hz8192,
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

/// Day/Date select for alarm registers (DY/DT bit).
///
/// This controls whether the alarm day/date register matches against
/// the day of the week or the date of the month.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayDateSelect {
    /// Match against date of the month (1-31)
    Date = 0,
    /// Match against day of the week (1-7)
    Day = 1,
}
impl From<u8> for DayDateSelect {
    /// Only the lowest bit is significant.
    fn from(v: u8) -> Self {
        match v & 0x01 {
            0 => DayDateSelect::Date,
            _ => DayDateSelect::Day,
        }
    }
}
impl From<DayDateSelect> for u8 {
    fn from(v: DayDateSelect) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type, plus a raw defmt representation.
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
        #[cfg(feature = "defmt")]
        impl defmt::Format for $typ {
            fn format(&self, f: defmt::Formatter) {
                defmt::write!(f, "{}({=u8:#x})", stringify!($typ), self.0);
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// BCD seconds
    pub bcd_seconds, set_bcd_seconds: 6, 0;
}
from_register_u8!(Seconds);

bitfield! {
    /// Minutes register (0-59).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// BCD minutes
    pub bcd_minutes, set_bcd_minutes: 6, 0;
}
from_register_u8!(Minutes);

bitfield! {
    /// Hours register with format selection.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Time representation format (12/24 hour)
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// PM flag (12-hour) or 20-hour bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5;
    /// BCD hours in 24-hour format (includes the 20-hour bit)
    pub bcd_hours_24, set_bcd_hours_24: 5, 0;
    /// BCD hours in 12-hour format
    pub bcd_hours_12, set_bcd_hours_12: 4, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Day of week register (1-7).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Day(u8);
    impl Debug;
    /// Day of week (1-7)
    pub day, set_day: 2, 0;
}
from_register_u8!(Day);

bitfield! {
    /// Date register (1-31).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Date(u8);
    impl Debug;
    /// BCD date
    pub bcd_date, set_bcd_date: 5, 0;
}
from_register_u8!(Date);

bitfield! {
    /// Month register (1-12) with century flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Century flag, set once the year offset passes 99
    pub century, set_century: 7;
    /// BCD month
    pub bcd_month, set_bcd_month: 4, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Year register (0-99).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Year(u8);
    impl Debug;
    /// BCD year offset
    pub bcd_year, set_bcd_year: 7, 0;
}
from_register_u8!(Year);

bitfield! {
    /// Control register for device configuration.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// Oscillator enable/disable control (active low)
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    /// Enable square wave output on battery power
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// Force temperature conversion
    pub convert_temperature, set_convert_temperature: 5;
    /// Square wave output frequency selection
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// INT/SQW pin function control
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// Enable alarm 2 interrupt
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// Enable alarm 1 interrupt
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

bitfield! {
    /// Status register for device state and flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator stop flag
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// Enable 32kHz output
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// Device busy flag (temperature conversion in progress)
    pub busy, set_busy: 2;
    /// Alarm 2 triggered flag
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 triggered flag
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

bitfield! {
    /// Aging offset register for oscillator adjustment.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AgingOffset(u8);
    impl Debug;
    /// Aging offset value (-128 to +127)
    pub i8, aging_offset, set_aging_offset: 7, 0;
}
from_register_u8!(AgingOffset);

bitfield! {
    /// Temperature register (integer part).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Temperature(u8);
    impl Debug;
    /// Temperature value (-128 to +127)
    pub i8, temperature, set_temperature: 7, 0;
}
from_register_u8!(Temperature);

bitfield! {
    /// Temperature fraction register (quarter degrees in the top two bits).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TemperatureFraction(u8);
    impl Debug;
    /// Quarter degrees (0-3)
    pub temperature_fraction, set_temperature_fraction: 7, 6;
}
from_register_u8!(TemperatureFraction);

// Alarm register types with mask bits and special control bits

bitfield! {
    /// Alarm Seconds register with mask bit (only used by Alarm 1).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// Alarm mask bit 1 (A1M1)
    pub alarm_mask1, set_alarm_mask1: 7;
    /// BCD seconds
    pub bcd_seconds, set_bcd_seconds: 6, 0;
}
from_register_u8!(AlarmSeconds);

bitfield! {
    /// Alarm Minutes register with mask bit (used by both Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// Alarm mask bit 2 (A1M2/A2M2)
    pub alarm_mask2, set_alarm_mask2: 7;
    /// BCD minutes
    pub bcd_minutes, set_bcd_minutes: 6, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Alarm Hours register with mask bit and time format control.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Alarm mask bit 3 (A1M3/A2M3)
    pub alarm_mask3, set_alarm_mask3: 7;
    /// Time representation format (12/24 hour)
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// PM flag (12-hour) or 20-hour bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5;
    /// BCD hours in 24-hour format (includes the 20-hour bit)
    pub bcd_hours_24, set_bcd_hours_24: 5, 0;
    /// BCD hours in 12-hour format
    pub bcd_hours_12, set_bcd_hours_12: 4, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Alarm Day/Date register with mask bit and DY/DT control.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// Alarm mask bit 4 (A1M4/A2M4)
    pub alarm_mask4, set_alarm_mask4: 7;
    /// Day/Date select (1=day of week, 0=date of month)
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    /// BCD date of month when DY/DT=0
    pub bcd_date, set_bcd_date: 5, 0;
    /// Day of week when DY/DT=1
    pub day, set_day: 3, 0;
}
from_register_u8!(AlarmDayDate);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_conversions_only_use_low_bits() {
        assert_eq!(DayDateSelect::from(0), DayDateSelect::Date);
        assert_eq!(DayDateSelect::from(1), DayDateSelect::Day);
        assert_eq!(DayDateSelect::from(2), DayDateSelect::Date);
        assert_eq!(TimeRepresentation::from(3), TimeRepresentation::TwelveHour);
        assert_eq!(Oscillator::from(0xFE), Oscillator::Enabled);
        assert_eq!(InterruptControl::from(0x11), InterruptControl::Interrupt);
        assert_eq!(SquareWaveFrequency::from(0b110), SquareWaveFrequency::Hz4096);
        assert_eq!(u8::from(SquareWaveFrequency::Hz8192), 0b11);
    }

    #[test]
    fn test_oscillator_from_enable_flag() {
        assert_eq!(Oscillator::from(true), Oscillator::Enabled);
        assert_eq!(Oscillator::from(false), Oscillator::Disabled);
    }

    #[test]
    fn test_hours_register_conversions() {
        // 23h in 24-hour mode: the 20-hour bit doubles as the PM bit position
        let hours = Hours::from(0x23);
        assert_eq!(
            hours.time_representation(),
            TimeRepresentation::TwentyFourHour
        );
        assert!(hours.pm_or_twenty_hours());
        assert_eq!(hours.bcd_hours_24(), 0x23);
        assert_eq!(hours.bcd_hours_12(), 0x03);

        // 12 PM in 12-hour mode
        let hours = Hours::from(0x72);
        assert_eq!(hours.time_representation(), TimeRepresentation::TwelveHour);
        assert!(hours.pm_or_twenty_hours());
        assert_eq!(hours.bcd_hours_12(), 0x12);

        // 8 AM in 12-hour mode
        let hours = Hours::from(0x48);
        assert_eq!(hours.time_representation(), TimeRepresentation::TwelveHour);
        assert!(!hours.pm_or_twenty_hours());
        assert_eq!(hours.bcd_hours_12(), 0x08);
    }

    #[test]
    fn test_month_register_conversions() {
        let month = Month::from(0x12);
        assert!(!month.century());
        assert_eq!(month.bcd_month(), 0x12);

        let month = Month::from(0x81);
        assert!(month.century());
        assert_eq!(month.bcd_month(), 0x01);
        assert_eq!(u8::from(month), 0x81);

        let mut month = Month::default();
        month.set_bcd_month(0x09);
        month.set_century(true);
        assert_eq!(u8::from(month), 0x89);
    }

    #[test]
    fn test_control_register_conversions() {
        let control = Control::from(0xFF);
        assert_eq!(control.oscillator_enable(), Oscillator::Disabled);
        assert!(control.battery_backed_square_wave());
        assert!(control.convert_temperature());
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        assert_eq!(control.interrupt_control(), InterruptControl::Interrupt);
        assert!(control.alarm2_interrupt_enable());
        assert!(control.alarm1_interrupt_enable());

        // power-on default: INTCN set, RS2:RS1 = 8.192kHz
        let control = Control::from(0x1C);
        assert_eq!(control.oscillator_enable(), Oscillator::Enabled);
        assert!(!control.battery_backed_square_wave());
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        assert_eq!(control.interrupt_control(), InterruptControl::Interrupt);
        assert!(!control.alarm1_interrupt_enable());

        let mut control = Control::default();
        control.set_oscillator_enable(Oscillator::Disabled);
        control.set_interrupt_control(InterruptControl::Interrupt);
        assert_eq!(u8::from(control), 0x84);
    }

    #[test]
    fn test_status_register_conversions() {
        let status = Status::from(0x8F);
        assert!(status.oscillator_stop_flag());
        assert!(status.enable_32khz_output());
        assert!(status.busy());
        assert!(status.alarm2_flag());
        assert!(status.alarm1_flag());

        let status = Status::from(0x88);
        assert!(status.oscillator_stop_flag());
        assert!(status.enable_32khz_output());
        assert!(!status.busy());
        assert!(!status.alarm2_flag());
        assert!(!status.alarm1_flag());
    }

    #[test]
    fn test_signed_registers() {
        assert_eq!(AgingOffset::from(0xF6).aging_offset(), -10);
        assert_eq!(AgingOffset::from(0x7F).aging_offset(), 127);
        assert_eq!(AgingOffset::from(0x80).aging_offset(), -128);
        assert_eq!(Temperature::from(0x19).temperature(), 25);
        assert_eq!(Temperature::from(0xF6).temperature(), -10);
        assert_eq!(TemperatureFraction::from(0xC0).temperature_fraction(), 0b11);
        assert_eq!(TemperatureFraction::from(0x55).temperature_fraction(), 0b01);
    }

    #[test]
    fn test_alarm_day_date_register() {
        // DY/DT set: weekday 5, day mask clear
        let day_date = AlarmDayDate::from(0x45);
        assert!(!day_date.alarm_mask4());
        assert_eq!(day_date.day_date_select(), DayDateSelect::Day);
        assert_eq!(day_date.day(), 5);

        // DY/DT clear: date 31, day mask set
        let day_date = AlarmDayDate::from(0xB1);
        assert!(day_date.alarm_mask4());
        assert_eq!(day_date.day_date_select(), DayDateSelect::Date);
        assert_eq!(day_date.bcd_date(), 0x31);
    }

    #[test]
    fn test_alarm_hours_register() {
        let mut hours = AlarmHours::default();
        hours.set_alarm_mask3(true);
        hours.set_time_representation(TimeRepresentation::TwelveHour);
        hours.set_pm_or_twenty_hours(true);
        hours.set_bcd_hours_12(0x11);
        assert_eq!(u8::from(hours), 0xF1);
        assert_eq!(AlarmHours::from(0xF1), hours);
    }
}
