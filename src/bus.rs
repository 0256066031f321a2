//! Register bus transport.
//!
//! The driver never talks to hardware directly. Everything goes through a
//! [`Bus`]: open and close the underlying transport, and read or write a run of
//! registers starting at a register address on a 7-bit device address.
//!
//! [`I2cBus`] adapts any `embedded-hal` I2C implementation. Platforms that need
//! to bring a bus up and down (power a level shifter, claim a shared
//! peripheral) implement [`Bus`] themselves.

use embedded_hal::i2c::{I2c, Operation};

use crate::registers::REGISTER_COUNT;

/// Byte-oriented register transport used by [`crate::DS3231`].
pub trait Bus {
    /// Transport error. The driver does not interpret it.
    type Error: core::fmt::Debug;

    /// Brings the transport up. Called once from [`crate::DS3231::init`].
    fn open(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Releases the transport. Called from [`crate::DS3231::deinit`].
    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Writes `data` to consecutive registers starting at `register`.
    fn write(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fills `buffer` from consecutive registers starting at `register`.
    fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// [`Bus`] over an `embedded-hal` I2C bus.
pub struct I2cBus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> I2cBus<I2C> {
    /// Wraps an I2C bus.
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Returns the wrapped I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Mutable access to the wrapped I2C bus.
    pub fn inner_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }
}

impl<I2C: I2c> Bus for I2cBus<I2C> {
    type Error = I2C::Error;

    fn write(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        // the register pointer and the payload go out in one write frame
        let mut frame = [0u8; REGISTER_COUNT + 1];
        let Some(payload) = frame.get_mut(1..=data.len()) else {
            return self.i2c.transaction(
                address,
                &mut [Operation::Write(&[register]), Operation::Write(data)],
            );
        };
        payload.copy_from_slice(data);
        frame[0] = register;
        self.i2c.write(address, &frame[..=data.len()])
    }

    fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(address, &[register], buffer)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;

    #[test]
    fn test_write_prefixes_register() {
        let mock = I2cMock::new(&[I2cTrans::write(DEVICE_ADDRESS, vec![0x0E, 0x1C, 0x00])]);
        let mut bus = I2cBus::new(mock);
        bus.write(DEVICE_ADDRESS, 0x0E, &[0x1C, 0x00]).unwrap();
        bus.release().done();
    }

    #[test]
    fn test_read_sets_register_pointer() {
        let mock = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![0x11],
            vec![0x19, 0x40],
        )]);
        let mut bus = I2cBus::new(mock);
        let mut buffer = [0u8; 2];
        bus.read(DEVICE_ADDRESS, 0x11, &mut buffer).unwrap();
        assert_eq!(buffer, [0x19, 0x40]);
        bus.release().done();
    }

    #[test]
    fn test_open_and_close_are_noops() {
        let expectations: [I2cTrans; 0] = [];
        let mock = I2cMock::new(&expectations);
        let mut bus = I2cBus::new(mock);
        bus.open().unwrap();
        bus.close().unwrap();
        bus.release().done();
    }

    #[test]
    fn test_errors_pass_through() {
        let mock = I2cMock::new(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x0F, 0x00]).with_error(ErrorKind::Other)
        ]);
        let mut bus = I2cBus::new(mock);
        assert_eq!(
            bus.write(DEVICE_ADDRESS, 0x0F, &[0x00]),
            Err(ErrorKind::Other)
        );
        bus.release().done();
    }
}
