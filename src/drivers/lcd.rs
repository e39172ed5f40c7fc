//! HD44780 character LCD behind a PCF8574 I2C backpack.
//!
//! The backpack exposes eight GPIO bits; the usual wiring is:
//!
//! ```text
//!  P7 P6 P5 P4 │ P3        │ P2 │ P1 │ P0
//!  D7 D6 D5 D4 │ backlight │ EN │ RW │ RS
//! ```
//!
//! so the controller runs in 4-bit mode and every byte goes out as two
//! strobed nibbles.  RW is tied low: the driver never reads busy flags
//! and relies on datasheet delays instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start address of each row on a 20x4 panel.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

pub struct Lcd<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    cols: u8,
    backlight: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8, cols: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            cols,
            backlight: BACKLIGHT,
        }
    }

    /// Power-on reset into 4-bit mode, display on, cleared.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.delay.delay_ms(50);
        self.expander(0)?;

        // Three 8-bit "function set" nibbles, then switch to 4-bit.
        self.nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INC)
    }

    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(2_000);
        Ok(())
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), I2C::Error> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.expander(0)
    }

    /// Move the cursor.  Rows past the last wrap to row 0.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), I2C::Error> {
        let offset = ROW_OFFSETS[row as usize % ROW_OFFSETS.len()];
        self.command(CMD_SET_DDRAM | (offset + col.min(self.cols - 1)))
    }

    /// Write text at the cursor.  Non-ASCII characters show as `?`.
    pub fn write_str(&mut self, text: &str) -> Result<(), I2C::Error> {
        for c in text.chars() {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.data(byte)?;
        }
        Ok(())
    }

    /// Overwrite a whole row, padding with spaces so stale text is erased.
    pub fn write_row(&mut self, row: u8, text: &str) -> Result<(), I2C::Error> {
        self.set_cursor(0, row)?;
        let mut written = 0u8;
        for c in text.chars().take(self.cols as usize) {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.data(byte)?;
            written += 1;
        }
        for _ in written..self.cols {
            self.data(b' ')?;
        }
        Ok(())
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    // ── Internal ──────────────────────────────────────────────

    fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.byte(cmd, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), I2C::Error> {
        self.byte(byte, RS)
    }

    fn byte(&mut self, value: u8, mode: u8) -> Result<(), I2C::Error> {
        self.nibble(value >> 4, mode)?;
        self.nibble(value & 0x0F, mode)?;
        self.delay.delay_us(50);
        Ok(())
    }

    /// Strobe one nibble: EN high, then EN low.
    fn nibble(&mut self, nibble: u8, mode: u8) -> Result<(), I2C::Error> {
        let bits = (nibble << 4) | mode;
        self.expander(bits | EN)?;
        self.delay.delay_us(1);
        self.expander(bits)
    }

    fn expander(&mut self, bits: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[bits | self.backlight])
    }
}
