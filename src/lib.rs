//! # DS3231 Real-Time Clock driver
//!
//! A `no_std` driver for the Maxim DS3231 RTC with temperature compensated
//! crystal oscillator. The driver translates a typed time, alarm and
//! configuration model into the chip's BCD and bitfield register layout and
//! back.
//!
//! All register traffic goes through a [`Bus`]. [`I2cBus`] adapts any
//! `embedded-hal` I2C implementation; platforms that need to power or claim
//! their bus implement [`Bus`] directly.
//!
//! ## Features
//!
//! - `log`: diagnostics through the `log` crate
//! - `defmt`: diagnostics through `defmt`, plus `defmt::Format` on all types
//!
//! ## Example
//!
//! ```rust,ignore
//! use ds3231::{Alarm, DS3231, I2cBus, Time};
//!
//! fn on_alarm(alarm: Alarm) {
//!     // ...
//! }
//!
//! let mut rtc = DS3231::new(I2cBus::new(i2c), delay);
//! rtc.link_alarm_callback(on_alarm);
//! rtc.init()?;
//!
//! rtc.set_time(&Time {
//!     year: 2024,
//!     month: 3,
//!     date: 14,
//!     day: 5,
//!     hours: 15,
//!     minutes: 30,
//!     seconds: 0,
//!     is_pm: None,
//! })?;
//! let now = rtc.get_time()?;
//! ```
//!
//! ## Status codes
//!
//! Every [`DS3231Error`] maps to a small integer through
//! [`DS3231Error::code`]: 1 for bus failures, 2 for a missing argument, 3
//! for a handle that is not initialized (or not linked) and 4 for invalid
//! time or alarm data.

#![no_std]

#[macro_use]
mod fmt;

pub mod aging;
pub mod alarm;
pub mod bcd;
pub mod bus;
pub mod datetime;
pub mod registers;
pub mod temperature;

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use paste::paste;

pub use aging::{aging_offset_convert_to_data, aging_offset_convert_to_register};
pub use alarm::{Alarm1Mode, Alarm2Mode, AlarmError, AlarmTime};
pub use bus::{Bus, I2cBus};
pub use datetime::{DS3231DateTimeError, Time, BASE_YEAR, MAX_YEAR};
pub use registers::{
    Control, DayDateSelect, InterruptControl, Oscillator, RegAddr, SquareWaveFrequency, Status,
    TimeRepresentation,
};
pub use temperature::Temperature;

use alarm::{DS3231Alarm1, DS3231Alarm2};
use datetime::DS3231DateTime;
use registers::AgingOffset;

/// 7-bit I2C address of the DS3231.
pub const DEVICE_ADDRESS: u8 = 0x68;

/// Interval between busy polls while a temperature conversion runs.
pub const TEMPERATURE_POLL_INTERVAL_MS: u32 = 10;

/// Busy polls before a temperature conversion is given up.
pub const TEMPERATURE_POLL_LIMIT: u32 = 500;

/// Identifies one of the two alarm slots.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm {
    /// Alarm 1, seconds resolution
    Alarm1 = 0,
    /// Alarm 2, minutes resolution
    Alarm2 = 1,
}

/// Control register settings applied together by [`DS3231::configure`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Oscillator state while running from the battery
    pub oscillator_enable: Oscillator,
    /// INT/SQW pin function
    pub interrupt_control: InterruptControl,
    /// Keep the square wave running on battery power
    pub battery_backed_square_wave: bool,
    /// Square wave frequency
    pub square_wave_frequency: SquareWaveFrequency,
}

impl Default for Config {
    /// The power-on state of the control register.
    fn default() -> Self {
        Self {
            oscillator_enable: Oscillator::Enabled,
            interrupt_control: InterruptControl::Interrupt,
            battery_backed_square_wave: false,
            square_wave_frequency: SquareWaveFrequency::Hz8192,
        }
    }
}

/// Static description of the chip and driver.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Info {
    pub chip_name: &'static str,
    pub manufacturer_name: &'static str,
    pub interface: &'static str,
    pub supply_voltage_min_v: f32,
    pub supply_voltage_max_v: f32,
    pub max_current_ma: f32,
    pub temperature_min: f32,
    pub temperature_max: f32,
    pub driver_version: u32,
}

/// Returns the chip and driver description.
#[must_use]
pub const fn info() -> Info {
    Info {
        chip_name: "Maxim Integrated DS3231",
        manufacturer_name: "Maxim Integrated",
        interface: "IIC",
        supply_voltage_min_v: 2.3,
        supply_voltage_max_v: 5.5,
        max_current_ma: 0.65,
        temperature_min: -40.0,
        temperature_max: 85.0,
        driver_version: 2000,
    }
}

/// Errors returned by the driver.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS3231Error<E> {
    /// Bus transaction failed
    Bus(E),
    /// Temperature conversion did not finish in time
    ConversionTimeout,
    /// A required argument was empty
    MissingArgument,
    /// `init` was called before the alarm callback was linked
    NotLinked,
    /// The handle is not initialized
    NotInitialized,
    /// Invalid time
    DateTime(DS3231DateTimeError),
    /// Invalid alarm
    Alarm(AlarmError),
}

impl<E> DS3231Error<E> {
    /// Integer status code of this error.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            DS3231Error::Bus(_) | DS3231Error::ConversionTimeout => 1,
            DS3231Error::MissingArgument => 2,
            DS3231Error::NotLinked | DS3231Error::NotInitialized => 3,
            DS3231Error::DateTime(_) | DS3231Error::Alarm(_) => 4,
        }
    }
}

impl<E> From<DS3231DateTimeError> for DS3231Error<E> {
    fn from(e: DS3231DateTimeError) -> Self {
        DS3231Error::DateTime(e)
    }
}

impl<E> From<AlarmError> for DS3231Error<E> {
    fn from(e: AlarmError) -> Self {
        DS3231Error::Alarm(e)
    }
}

/// DS3231 Real-Time Clock driver.
///
/// Owns the bus and a delay provider. Apart from [`DS3231::init`] and
/// [`DS3231::link_alarm_callback`], every operation fails with
/// [`DS3231Error::NotInitialized`] before touching the bus until `init` has
/// succeeded.
///
/// Read-modify-write operations assume nothing else writes the same register
/// in between; callers sharing a handle must serialize access.
pub struct DS3231<B: Bus, D: DelayNs> {
    bus: B,
    delay: D,
    alarm_callback: Option<fn(Alarm)>,
    initialized: bool,
}

impl<B: Bus, D: DelayNs> DS3231<B, D> {
    /// Creates a new, uninitialized driver.
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            alarm_callback: None,
            initialized: false,
        }
    }

    /// Sets the function [`DS3231::irq_handler`] reports fired alarms to.
    pub fn link_alarm_callback(&mut self, callback: fn(Alarm)) {
        self.alarm_callback = Some(callback);
    }

    /// Whether [`DS3231::init`] has succeeded and [`DS3231::deinit`] has not
    /// been called since.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Opens the bus and clears a stale oscillator stop flag.
    ///
    /// Calling `init` on an initialized handle does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::NotLinked`] without touching the bus if no alarm
    /// callback is linked, or [`DS3231Error::Bus`] if the bus cannot be opened
    /// or the status register cannot be updated. In the latter case the bus is
    /// closed again.
    pub fn init(&mut self) -> Result<(), DS3231Error<B::Error>> {
        if self.initialized {
            debug!("ds3231: already initialized");
            return Ok(());
        }
        if self.alarm_callback.is_none() {
            error!("ds3231: alarm_callback is null");
            return Err(DS3231Error::NotLinked);
        }
        self.bus.open().map_err(|e| {
            error!("ds3231: iic init failed");
            DS3231Error::Bus(e)
        })?;

        let cleared = self.status().and_then(|mut status| {
            status.set_oscillator_stop_flag(false);
            self.set_status(status)
        });
        if let Err(e) = cleared {
            error!("ds3231: clear oscillator stop flag failed");
            if self.bus.close().is_err() {
                error!("ds3231: iic deinit failed");
            }
            return Err(e);
        }

        self.initialized = true;
        Ok(())
    }

    /// Closes the bus and marks the handle uninitialized.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::NotInitialized`] if the handle is not initialized
    /// or [`DS3231Error::Bus`] if the bus fails to close.
    pub fn deinit(&mut self) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.bus.close().map_err(|e| {
            error!("ds3231: iic deinit failed");
            DS3231Error::Bus(e)
        })?;
        self.initialized = false;
        Ok(())
    }

    /// Consumes the driver and returns the bus and delay.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Reads the status register once and reports every fired alarm to the
    /// linked callback, alarm 2 first.
    ///
    /// The alarm flags are left set; acknowledge them with
    /// [`DS3231::alarm_clear`].
    pub fn irq_handler(&mut self) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let status = self.status()?;
        if let Some(callback) = self.alarm_callback {
            if status.alarm2_flag() {
                callback(Alarm::Alarm2);
            }
            if status.alarm1_flag() {
                callback(Alarm::Alarm1);
            }
        }
        Ok(())
    }

    /// Sets the current time.
    ///
    /// The time is validated before any register is written. The seven
    /// registers are then written one at a time; if one write fails the
    /// earlier ones are not rolled back.
    pub fn set_time(&mut self, time: &Time) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let raw = DS3231DateTime::from_time(time)?;
        let data: [u8; 7] = (&raw).into();
        for (register, value) in (RegAddr::Seconds as u8..).zip(data) {
            self.write_register(register, value)?;
        }
        debug!("ds3231: time set to {:?}", time);
        Ok(())
    }

    /// Reads the current time in one burst.
    pub fn get_time(&mut self) -> Result<Time, DS3231Error<B::Error>> {
        self.check_initialized()?;
        let mut data = [0; 7];
        self.read_registers(RegAddr::Seconds as u8, &mut data)?;
        Ok(DS3231DateTime::from(data).into_time())
    }

    /// Reads the current time as a chrono date and time.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::DateTime`] if the registers do not hold a valid
    /// calendar date.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<B::Error>> {
        let time = self.get_time()?;
        Ok(time.to_datetime()?)
    }

    /// Sets the current time from a chrono date and time, stored in the given
    /// hour format. The day of week is numbered from Sunday = 1.
    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
        time_representation: TimeRepresentation,
    ) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let time = Time::from_datetime(datetime, time_representation)?;
        self.set_time(&time)
    }

    /// Programs alarm 1.
    pub fn set_alarm1(
        &mut self,
        time: &AlarmTime,
        mode: Alarm1Mode,
    ) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let alarm = DS3231Alarm1::from_mode(time, mode)?;
        let data: [u8; 4] = (&alarm).into();
        for (register, value) in (RegAddr::Alarm1Seconds as u8..).zip(data) {
            self.write_register(register, value)?;
        }
        debug!("ds3231: alarm1 {:?} {:?}", mode, time);
        Ok(())
    }

    /// Reads back alarm 1.
    pub fn get_alarm1(&mut self) -> Result<(AlarmTime, Alarm1Mode), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let mut data = [0; 4];
        self.read_registers(RegAddr::Alarm1Seconds as u8, &mut data)?;
        Ok(DS3231Alarm1::from(data).to_mode()?)
    }

    /// Programs alarm 2. `time.seconds` is ignored.
    pub fn set_alarm2(
        &mut self,
        time: &AlarmTime,
        mode: Alarm2Mode,
    ) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let alarm = DS3231Alarm2::from_mode(time, mode)?;
        let data: [u8; 3] = (&alarm).into();
        for (register, value) in (RegAddr::Alarm2Minutes as u8..).zip(data) {
            self.write_register(register, value)?;
        }
        debug!("ds3231: alarm2 {:?} {:?}", mode, time);
        Ok(())
    }

    /// Reads back alarm 2. Seconds always read as zero.
    pub fn get_alarm2(&mut self) -> Result<(AlarmTime, Alarm2Mode), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let mut data = [0; 3];
        self.read_registers(RegAddr::Alarm2Minutes as u8, &mut data)?;
        Ok(DS3231Alarm2::from(data).to_mode()?)
    }

    /// Clears the fired flag of an alarm.
    pub fn alarm_clear(&mut self, alarm: Alarm) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_status(|status| match alarm {
            Alarm::Alarm1 => status.set_alarm1_flag(false),
            Alarm::Alarm2 => status.set_alarm2_flag(false),
        })
    }

    /// Enables or disables the interrupt of an alarm.
    pub fn set_alarm_interrupt(
        &mut self,
        alarm: Alarm,
        enable: bool,
    ) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_control(|control| match alarm {
            Alarm::Alarm1 => control.set_alarm1_interrupt_enable(enable),
            Alarm::Alarm2 => control.set_alarm2_interrupt_enable(enable),
        })
    }

    /// Returns whether the interrupt for `alarm` is enabled.
    pub fn get_alarm_interrupt(&mut self, alarm: Alarm) -> Result<bool, DS3231Error<B::Error>> {
        self.check_initialized()?;
        let control = self.control()?;
        Ok(match alarm {
            Alarm::Alarm1 => control.alarm1_interrupt_enable(),
            Alarm::Alarm2 => control.alarm2_interrupt_enable(),
        })
    }

    /// Starts or stops the oscillator while on battery power.
    ///
    /// `true` runs the oscillator; the EOSC bit itself is active low.
    pub fn set_oscillator(&mut self, enable: bool) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_control(|control| control.set_oscillator_enable(Oscillator::from(enable)))
    }

    /// Returns whether the oscillator runs on battery power.
    pub fn get_oscillator(&mut self) -> Result<bool, DS3231Error<B::Error>> {
        self.check_initialized()?;
        Ok(self.control()?.oscillator_enable() == Oscillator::Enabled)
    }

    /// Selects the INT/SQW pin function.
    pub fn set_pin(&mut self, pin: InterruptControl) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_control(|control| control.set_interrupt_control(pin))
    }

    /// Returns the INT/SQW pin function.
    pub fn get_pin(&mut self) -> Result<InterruptControl, DS3231Error<B::Error>> {
        self.check_initialized()?;
        Ok(self.control()?.interrupt_control())
    }

    /// Keeps the square wave running on battery power (BBSQW).
    pub fn set_square_wave(&mut self, enable: bool) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_control(|control| control.set_battery_backed_square_wave(enable))
    }

    /// Returns whether the square wave keeps running on battery power.
    pub fn get_square_wave(&mut self) -> Result<bool, DS3231Error<B::Error>> {
        self.check_initialized()?;
        Ok(self.control()?.battery_backed_square_wave())
    }

    /// Selects the square wave output frequency.
    pub fn set_square_wave_frequency(
        &mut self,
        frequency: SquareWaveFrequency,
    ) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_control(|control| control.set_square_wave_frequency(frequency))
    }

    /// Returns the square wave output frequency.
    pub fn get_square_wave_frequency(
        &mut self,
    ) -> Result<SquareWaveFrequency, DS3231Error<B::Error>> {
        self.check_initialized()?;
        Ok(self.control()?.square_wave_frequency())
    }

    /// Enables or disables the 32kHz output pin.
    pub fn set_32khz_output(&mut self, enable: bool) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_status(|status| status.set_enable_32khz_output(enable))
    }

    /// Returns whether the 32kHz output pin is enabled.
    pub fn get_32khz_output(&mut self) -> Result<bool, DS3231Error<B::Error>> {
        self.check_initialized()?;
        Ok(self.status()?.enable_32khz_output())
    }

    /// Applies `config` to the control register in one read-modify-write.
    /// Alarm interrupt enables and the convert bit are left as they are.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_control(|control| {
            control.set_oscillator_enable(config.oscillator_enable);
            control.set_battery_backed_square_wave(config.battery_backed_square_wave);
            control.set_square_wave_frequency(config.square_wave_frequency);
            control.set_interrupt_control(config.interrupt_control);
        })
    }

    /// Forces a temperature conversion and reads the result.
    ///
    /// Polls the busy flag every [`TEMPERATURE_POLL_INTERVAL_MS`] for at most
    /// [`TEMPERATURE_POLL_LIMIT`] polls.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::ConversionTimeout`] if the chip stays busy.
    pub fn get_temperature(&mut self) -> Result<Temperature, DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.modify_control(|control| control.set_convert_temperature(true))?;

        let mut busy = true;
        for _ in 0..TEMPERATURE_POLL_LIMIT {
            self.delay.delay_ms(TEMPERATURE_POLL_INTERVAL_MS);
            if !self.status()?.busy() {
                busy = false;
                break;
            }
        }
        if busy {
            error!("ds3231: read temperature timeout");
            return Err(DS3231Error::ConversionTimeout);
        }

        let mut data = [0; 2];
        self.read_registers(RegAddr::MSBTemp as u8, &mut data)?;
        let temperature = Temperature::from(data);
        debug!("ds3231: temperature {:?}", temperature);
        Ok(temperature)
    }

    /// Reads the status register.
    pub fn get_status(&mut self) -> Result<Status, DS3231Error<B::Error>> {
        self.check_initialized()?;
        self.status()
    }

    /// Writes the raw aging offset. See [`aging_offset_convert_to_register`].
    pub fn set_aging_offset(&mut self, offset: i8) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        let mut value = AgingOffset::default();
        value.set_aging_offset(offset);
        self.set_aging(value)
    }

    /// Reads the raw aging offset. See [`aging_offset_convert_to_data`].
    pub fn get_aging_offset(&mut self) -> Result<i8, DS3231Error<B::Error>> {
        self.check_initialized()?;
        Ok(self.aging()?.aging_offset())
    }

    /// Writes `data` to consecutive registers starting at `register`.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::MissingArgument`] if `data` is empty.
    pub fn set_reg(&mut self, register: u8, data: &[u8]) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        if data.is_empty() {
            error!("ds3231: buf is null");
            return Err(DS3231Error::MissingArgument);
        }
        self.bus
            .write(DEVICE_ADDRESS, register, data)
            .map_err(|e| {
                error!("ds3231: write register {} failed", register);
                DS3231Error::Bus(e)
            })
    }

    /// Fills `buffer` from consecutive registers starting at `register`.
    ///
    /// # Errors
    ///
    /// Returns [`DS3231Error::MissingArgument`] if `buffer` is empty.
    pub fn get_reg(
        &mut self,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<B::Error>> {
        self.check_initialized()?;
        if buffer.is_empty() {
            error!("ds3231: buf is null");
            return Err(DS3231Error::MissingArgument);
        }
        self.read_registers(register, buffer)
    }

    fn check_initialized(&self) -> Result<(), DS3231Error<B::Error>> {
        if self.initialized {
            Ok(())
        } else {
            error!("ds3231: handle is not initialized");
            Err(DS3231Error::NotInitialized)
        }
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), DS3231Error<B::Error>> {
        self.bus
            .write(DEVICE_ADDRESS, register, &[value])
            .map_err(|e| {
                error!("ds3231: write register {} failed", register);
                DS3231Error::Bus(e)
            })
    }

    fn read_registers(
        &mut self,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<B::Error>> {
        self.bus
            .read(DEVICE_ADDRESS, register, buffer)
            .map_err(|e| {
                error!("ds3231: read register {} failed", register);
                DS3231Error::Bus(e)
            })
    }

    fn modify_control<F: FnOnce(&mut Control)>(
        &mut self,
        f: F,
    ) -> Result<(), DS3231Error<B::Error>> {
        let mut control = self.control()?;
        f(&mut control);
        self.set_control(control)
    }

    fn modify_status<F: FnOnce(&mut Status)>(
        &mut self,
        f: F,
    ) -> Result<(), DS3231Error<B::Error>> {
        let mut status = self.status()?;
        f(&mut status);
        self.set_status(status)
    }
}

// Single register access, no initialization check
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<B: Bus, D: DelayNs> DS3231<B, D> {
            $(
                paste! {
                    fn $name(&mut self) -> Result<$typ, DS3231Error<B::Error>> {
                        let mut data = [0];
                        self.read_registers($regaddr as u8, &mut data)?;
                        Ok(<$typ>::from(data[0]))
                    }

                    fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<B::Error>> {
                        self.write_register($regaddr as u8, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (control, RegAddr::Control, Control),
    (status, RegAddr::ControlStatus, Status),
    (aging, RegAddr::AgingOffset, AgingOffset)
);
