use super::{Resume, idle};
use crate::{Band, BlinkPolicy, Fault, ReadingCell, RunState, Supervisor, fault};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use embedded_hal::digital::StatefulOutputPin;
use embedded_hal_async::delay::DelayNs;

/// Blinks an output faster the brighter it is.
///
/// Each cycle toggles the output once and then waits one cadence, so the visible blink period is
/// twice the cadence. The indicator also owns the fault display: once the system is faulted it
/// switches to the fault pattern for good.
pub struct Indicator<'a, M: RawMutex, P> {
    cell: &'a ReadingCell<M>,
    pin: P,
    policy: BlinkPolicy,
    band: Option<Band>,
}

impl<'a, M: RawMutex, P: StatefulOutputPin> Indicator<'a, M, P> {
    pub fn new(cell: &'a ReadingCell<M>, pin: P) -> Self {
        Self {
            cell,
            pin,
            policy: BlinkPolicy::DEFAULT,
            band: None,
        }
    }

    pub fn with_policy(mut self, policy: BlinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &BlinkPolicy {
        &self.policy
    }

    pub fn pin(&mut self) -> &mut P {
        &mut self.pin
    }

    /// Read, decide and toggle once. Returns how long to wait before the next toggle.
    pub async fn step(&mut self) -> Result<Duration, Fault> {
        let reading = self.cell.read().await.map_err(|_| Fault::CellLock)?;
        let band = self.policy.band(reading);
        if self.band != Some(band) {
            debug!("INDICATOR: {} lux, now in band {}", reading.lux(), band);
            self.band = Some(band);
        }
        let _ = self.pin.toggle();
        Ok(self.policy.interval(band))
    }

    /// Blink until the supervisor leaves the running state.
    ///
    /// Returns after an orderly stop. After a fault, whether seen here or escalated by another
    /// task, it never returns and blinks the fault pattern instead.
    pub async fn run<D: DelayNs>(&mut self, mut delay: D, supervisor: &Supervisor) {
        info!("INDICATOR: Task started");
        loop {
            let cadence = match self.step().await {
                Ok(cadence) => cadence,
                Err(fault) => {
                    supervisor.escalate(fault);
                    break;
                }
            };
            if idle(&mut delay, cadence, supervisor).await == Resume::Stop {
                break;
            }
        }

        match supervisor.state() {
            RunState::Faulted(_) => fault::indicate(&mut self.pin, &mut delay).await,
            _ => info!("INDICATOR: Task stopped"),
        }
    }
}
