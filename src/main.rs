#![no_std]
#![no_main]

#[cfg(all(feature = "button-profile", feature = "wake-profile"))]
compile_error!("enable at most one of `button-profile` and `wake-profile`");

mod app;

use esp_backtrace as _;

#[esp_hal::main]
fn main() -> ! {
    app::run()
}
