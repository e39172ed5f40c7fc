//! LCD display adapter.
//!
//! Implements [`DisplaySink`] on top of the HD44780 driver: every paint
//! is rendered to a 20x4 [`Frame`] and only the rows that differ from
//! the previous frame go out on the bus.  A failed row write is logged
//! once per outage and retried on the next paint.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::DisplaySink;
use crate::display::{self, Frame, Paint};
use crate::drivers::lcd::Lcd;

pub struct LcdDisplay<I2C, D> {
    lcd: Lcd<I2C, D>,
    shown: Frame,
    /// A previous write failed; the panel content is unknown.
    faulted: bool,
}

impl<I2C: I2c, D: DelayNs> LcdDisplay<I2C, D> {
    /// Wrap an initialised panel.
    pub fn new(lcd: Lcd<I2C, D>) -> Self {
        Self {
            lcd,
            shown: Frame::default(),
            faulted: false,
        }
    }

    /// The frame currently believed to be on the panel.
    pub fn shown(&self) -> &Frame {
        &self.shown
    }

    pub fn release(self) -> Lcd<I2C, D> {
        self.lcd
    }
}

impl<I2C: I2c, D: DelayNs> DisplaySink for LcdDisplay<I2C, D> {
    fn paint(&mut self, paint: &Paint) {
        let frame = display::render(paint);
        for (i, row) in frame.rows.iter().enumerate() {
            if !self.faulted && self.shown.rows[i] == *row {
                continue;
            }
            if let Err(e) = self.lcd.write_row(i as u8, row) {
                if !self.faulted {
                    warn!("LCD write failed: {:?}", embedded_hal::i2c::Error::kind(&e));
                }
                self.faulted = true;
                return;
            }
            self.shown.rows[i] = row.clone();
        }
        if self.faulted {
            info!("LCD writes recovered");
            self.faulted = false;
        }
    }
}
