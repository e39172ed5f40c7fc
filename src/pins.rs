//! GPIO / peripheral pin assignments for the feeder controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_SELECT_GPIO: i32 = 4;
pub const BUTTON_UP_GPIO: i32 = 5;
pub const BUTTON_DOWN_GPIO: i32 = 6;
pub const BUTTON_CONFIRM_GPIO: i32 = 7;

/// Indexed by `ButtonId as usize`.
pub const BUTTON_GPIOS: [i32; 4] = [
    BUTTON_SELECT_GPIO,
    BUTTON_UP_GPIO,
    BUTTON_DOWN_GPIO,
    BUTTON_CONFIRM_GPIO,
];

// ---------------------------------------------------------------------------
// Feed relays (4-channel module, HIGH = energised)
// ---------------------------------------------------------------------------

pub const RELAY_1_GPIO: i32 = 10;
pub const RELAY_2_GPIO: i32 = 11;
pub const RELAY_3_GPIO: i32 = 12;
pub const RELAY_4_GPIO: i32 = 13;

/// Bit `n` of a relay mask selects `RELAY_GPIOS[n]`.
pub const RELAY_GPIOS: [i32; 4] = [RELAY_1_GPIO, RELAY_2_GPIO, RELAY_3_GPIO, RELAY_4_GPIO];

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Status LED, lit while feeding.
pub const STATUS_LED_GPIO: i32 = 2;
/// Active piezo buzzer (HIGH = sounding).
pub const BUZZER_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// I2C buses
// ---------------------------------------------------------------------------

/// I2C0: DS3231 real-time clock.
pub const RTC_SDA_GPIO: i32 = 8;
pub const RTC_SCL_GPIO: i32 = 9;
/// 7-bit DS3231 address (fixed in silicon).
pub const RTC_I2C_ADDR: u8 = 0x68;

/// I2C1: 20x4 character LCD behind a PCF8574 backpack.
pub const LCD_SDA_GPIO: i32 = 17;
pub const LCD_SCL_GPIO: i32 = 18;
/// 7-bit PCF8574 address with A0..A2 strapped high.
pub const LCD_I2C_ADDR: u8 = 0x27;
