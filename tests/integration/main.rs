//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the whole [`AppService`]
//! through mock adapters: buttons are pin levels, the wall clock and
//! the tick counter move only when a test advances them.  All tests run
//! on the host with no real hardware required.
//!
//! [`AppService`]: fishfeeder::app::service::AppService

mod console_tests;
mod feeding_flow_tests;
mod mock_hw;
mod navigator_tests;
