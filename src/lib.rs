#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod cadence;
pub mod cell;
pub mod drivers;
pub mod fault;
pub mod tasks;

pub use cadence::{Band, BlinkPolicy};
pub use cell::{LockError, ReadingCell, SharedCell};
pub use fault::{Fault, RunState, Supervisor};
pub use tasks::*;

use embassy_time::Duration;

/// How often the acquisition task asks the sensor for a new value
pub const SENSOR_PERIOD: Duration = Duration::from_millis(1000);

/// How often the presentation task redraws the display
pub const DISPLAY_PERIOD: Duration = Duration::from_millis(1000);

/// Upper bound on waiting for the reading cell. Critical sections are a single copy, so running
/// past this means the lock itself is broken.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Toggle interval of the fault indication pattern. Shorter than every blink cadence, so a fault
/// never looks like bright light.
pub const FAULT_TOGGLE: Duration = Duration::from_millis(100);

/// Number of visible characters on one display line
pub const DISPLAY_COLUMNS: usize = 16;

/// Ambient light intensity in lux, as reported by the sensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading(pub u32);

impl Reading {
    /// The value the cell holds before the first successful acquisition
    pub const ZERO: Reading = Reading(0);

    pub const fn lux(self) -> u32 {
        self.0
    }
}

impl From<u32> for Reading {
    fn from(lux: u32) -> Self {
        Reading(lux)
    }
}

impl ufmt::uDisplay for Reading {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        ufmt::uDisplay::fmt(&self.0, f)
    }
}
