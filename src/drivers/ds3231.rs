//! DS3231 real-time clock driver.
//!
//! Generic over any `embedded_hal::i2c::I2c` bus.  Time lives in seven
//! BCD registers starting at 0x00; the driver always writes 24-hour mode
//! and reads either mode back.
//!
//! ```text
//!  0x00 sec │ 0x01 min │ 0x02 hour │ 0x03 wday │ 0x04 date │ 0x05 month/century │ 0x06 year
//!  0x0E control (bit 7 EOSC) │ 0x0F status (bit 7 OSF)
//! ```
//!
//! OSF set means the oscillator stopped at some point (battery flat or
//! removed), so the stored time is garbage until someone sets it.

use embedded_hal::i2c::{Error as _, I2c};
use log::{info, warn};

use crate::app::ports::ClockPort;
use crate::clock::DateTime;
use crate::error::{Error, Result};

const REG_SECONDS: u8 = 0x00;
const REG_CONTROL: u8 = 0x0E;
const REG_STATUS: u8 = 0x0F;

const STATUS_OSF: u8 = 0x80;
const CONTROL_EOSC: u8 = 0x80;
const HOUR_12H: u8 = 0x40;
const HOUR_PM: u8 = 0x20;
const MONTH_CENTURY: u8 = 0x80;

fn bcd_to_bin(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

fn bin_to_bcd(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

pub struct Ds3231<I2C> {
    i2c: I2C,
    address: u8,
    last_good: DateTime,
    faulted: bool,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            last_good: DateTime::DEFAULT,
            faulted: false,
        }
    }

    /// Probe the chip and recover from power loss.
    ///
    /// If the oscillator-stop flag is set, the clock is re-seeded with
    /// `seed` and the flag cleared.  Returns whether that happened.
    /// `ClockUnavailable` means nothing answered on the bus.
    pub fn init(&mut self, seed: DateTime) -> Result<bool> {
        let control = self.read_reg(REG_CONTROL)?;
        if control & CONTROL_EOSC != 0 {
            self.write_reg(REG_CONTROL, control & !CONTROL_EOSC)?;
        }

        let lost = self.lost_power()?;
        if lost {
            warn!("RTC lost power, seeding {}", seed);
            self.write(&seed)?;
            let status = self.read_reg(REG_STATUS)?;
            self.write_reg(REG_STATUS, status & !STATUS_OSF)?;
        }

        self.last_good = self.read()?;
        info!("RTC online at {}", self.last_good);
        Ok(lost)
    }

    pub fn lost_power(&mut self) -> Result<bool> {
        Ok(self.read_reg(REG_STATUS)? & STATUS_OSF != 0)
    }

    /// Read the time registers.  A decoded date that cannot exist is
    /// reported as `InvalidDate`.
    pub fn read(&mut self) -> Result<DateTime> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(self.address, &[REG_SECONDS], &mut regs)
            .map_err(|e| bus_error("read", e))?;

        let hour_reg = regs[2];
        let hour = if hour_reg & HOUR_12H != 0 {
            let h12 = bcd_to_bin(hour_reg & 0x1F) % 12;
            if hour_reg & HOUR_PM != 0 { h12 + 12 } else { h12 }
        } else {
            bcd_to_bin(hour_reg & 0x3F)
        };
        let century = if regs[5] & MONTH_CENTURY != 0 { 100 } else { 0 };

        let dt = DateTime {
            year: 2000 + century + bcd_to_bin(regs[6]) as u16,
            month: bcd_to_bin(regs[5] & 0x1F),
            day: bcd_to_bin(regs[4] & 0x3F),
            hour,
            minute: bcd_to_bin(regs[1] & 0x7F),
            second: bcd_to_bin(regs[0] & 0x7F),
        };
        if dt.is_valid() { Ok(dt) } else { Err(Error::InvalidDate) }
    }

    /// Write all seven time registers in one transaction, 24-hour mode.
    pub fn write(&mut self, dt: &DateTime) -> Result<()> {
        if !dt.is_valid() {
            return Err(Error::InvalidDate);
        }
        let frame = [
            REG_SECONDS,
            bin_to_bcd(dt.second),
            bin_to_bcd(dt.minute),
            bin_to_bcd(dt.hour),
            dt.weekday() + 1,
            bin_to_bcd(dt.day),
            bin_to_bcd(dt.month),
            bin_to_bcd((dt.year - 2000) as u8),
        ];
        self.i2c
            .write(self.address, &frame)
            .map_err(|e| bus_error("write", e))
    }

    /// Hand the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [0u8];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|e| bus_error("read", e))?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|e| bus_error("write", e))
    }
}

fn bus_error(op: &str, e: impl embedded_hal::i2c::Error) -> Error {
    log::debug!("RTC {} failed: {:?}", op, e.kind());
    Error::ClockUnavailable
}

impl<I2C: I2c> ClockPort for Ds3231<I2C> {
    /// Last good reading if the bus or the chip misbehaves.
    fn now(&mut self) -> DateTime {
        match self.read() {
            Ok(dt) => {
                if self.faulted {
                    info!("RTC reads recovered");
                    self.faulted = false;
                }
                self.last_good = dt;
                dt
            }
            Err(e) => {
                if !self.faulted {
                    warn!("RTC read failed ({}), holding {}", e, self.last_good);
                    self.faulted = true;
                }
                self.last_good
            }
        }
    }

    fn adjust(&mut self, dt: DateTime) -> Result<()> {
        self.write(&dt)?;
        self.last_good = dt;
        info!("RTC set to {}", dt);
        Ok(())
    }
}
