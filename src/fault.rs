//! Run state and fatal fault handling.
//!
//! A fatal fault is never cleared. Once a task escalates one, every task leaves normal operation at
//! its next suspension point and the indicator output switches to the fault pattern until reset.

use crate::FAULT_TOGGLE;
use embedded_hal::digital::StatefulOutputPin;
use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicU8, Ordering};

/// Fatal conditions. Each one stops normal operation for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Fault {
    /// The reading cell's lock could not be taken
    CellLock = 1,
    /// The light sensor did not come up
    SensorBringUp = 2,
    /// The display did not come up
    DisplayBringUp = 3,
    /// A task could not be started
    Spawn = 4,
    /// The I2C bus could not be configured
    BusBringUp = 5,
}

impl Fault {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Fault::CellLock),
            2 => Some(Fault::SensorBringUp),
            3 => Some(Fault::DisplayBringUp),
            4 => Some(Fault::Spawn),
            5 => Some(Fault::BusBringUp),
            _ => None,
        }
    }
}

/// What the tasks should be doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    Running,
    /// Orderly stop requested. Tasks return at their next suspension point.
    Stopping,
    /// A fatal fault happened. Tasks leave normal operation and the indicator shows the fault.
    Faulted(Fault),
}

const RUNNING: u8 = 0;
const STOPPING: u8 = 0xFF;

/// Shared run state, observed by every task at its suspension point.
///
/// ```ignore
/// static SUPERVISOR: Supervisor = Supervisor::new();
///
/// // In a task that hits a fatal condition:
/// SUPERVISOR.escalate(Fault::CellLock);
///
/// // At every suspension point:
/// if !SUPERVISOR.is_running() {
///     return;
/// }
/// ```
pub struct Supervisor {
    state: AtomicU8,
}

impl Supervisor {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
        }
    }

    pub fn state(&self) -> RunState {
        match self.state.load(Ordering::Acquire) {
            RUNNING => RunState::Running,
            STOPPING => RunState::Stopping,
            code => match Fault::from_u8(code) {
                Some(fault) => RunState::Faulted(fault),
                None => RunState::Stopping,
            },
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    /// The fault that stopped the system, if any
    pub fn fault(&self) -> Option<Fault> {
        match self.state() {
            RunState::Faulted(fault) => Some(fault),
            _ => None,
        }
    }

    /// Ask all tasks to return. Has no effect once a fault is latched.
    pub fn request_stop(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Latch a fatal fault. The first fault wins and is never cleared; a fault also overrides a
    /// pending stop request.
    pub fn escalate(&self, fault: Fault) {
        let code = fault as u8;
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current != RUNNING && current != STOPPING {
                warn!("SUPERVISOR: {} ignored, already faulted", fault);
                return;
            }
            match self
                .state
                .compare_exchange(current, code, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    error!("SUPERVISOR: fatal fault {}", fault);
                    return;
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Blink the fault pattern on `pin` forever: one toggle every [`FAULT_TOGGLE`].
///
/// This is the terminal state of the firmware after a fatal fault. It never returns, and it does
/// not look at the supervisor, so nothing can bring the system back to normal operation.
pub async fn indicate<P, D>(pin: &mut P, delay: &mut D) -> !
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    error!("FAULT: entering fault indication");
    loop {
        let _ = pin.toggle();
        delay.delay_ms(FAULT_TOGGLE.as_millis() as u32).await;
    }
}
