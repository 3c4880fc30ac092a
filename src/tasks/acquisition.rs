use super::{Resume, idle};
use crate::{Fault, Reading, ReadingCell, SENSOR_PERIOD, Supervisor, drivers::LightSensor};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

/// Result of one acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Publish {
    /// The sensor answered and the cell now holds this reading
    Fresh(Reading),
    /// The sensor failed; the cell still holds the previous reading
    Skipped,
}

/// The only writer of the reading cell.
///
/// A failed sensor read leaves the cell alone, so readers keep seeing the last good value. Nothing
/// marks that value as stale.
pub struct Acquisition<'a, M: RawMutex, S> {
    cell: &'a ReadingCell<M>,
    sensor: S,
    period: Duration,
}

impl<'a, M: RawMutex, S: LightSensor> Acquisition<'a, M, S> {
    pub fn new(cell: &'a ReadingCell<M>, sensor: S) -> Self {
        Self {
            cell,
            sensor,
            period: SENSOR_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn sensor(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Ask the sensor once and publish the result if there is one.
    ///
    /// The lock is only taken after the sensor has answered, so bus traffic never happens inside the
    /// critical section.
    pub async fn acquire(&mut self) -> Result<Publish, Fault> {
        match self.sensor.read_lux().await {
            Ok(reading) => {
                self.cell.write(reading).await.map_err(|_| Fault::CellLock)?;
                debug!("ACQUISITION: published {} lux", reading.lux());
                Ok(Publish::Fresh(reading))
            }
            Err(_) => {
                warn!("ACQUISITION: sensor read failed, keeping last reading");
                Ok(Publish::Skipped)
            }
        }
    }

    /// Acquire every period until the supervisor leaves the running state.
    ///
    /// A lock failure is escalated to the supervisor and ends the task.
    pub async fn run<D: DelayNs>(&mut self, mut delay: D, supervisor: &Supervisor) -> Result<(), Fault> {
        info!(
            "ACQUISITION: Task started, period {} ms",
            self.period.as_millis()
        );
        loop {
            if let Err(fault) = self.acquire().await {
                supervisor.escalate(fault);
                return Err(fault);
            }
            if idle(&mut delay, self.period, supervisor).await == Resume::Stop {
                info!("ACQUISITION: Task stopped");
                return supervisor.fault().map_or(Ok(()), Err);
            }
        }
    }
}
