use super::{Resume, idle};
use crate::{
    DISPLAY_COLUMNS, DISPLAY_PERIOD, Fault, Reading, ReadingCell, Supervisor,
    drivers::LineDisplay,
};
use core::convert::Infallible;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use ufmt::uWrite;

/// One display line. The capacity is the display width, so a line can never overflow the glass.
pub type DisplayLine = heapless::String<DISPLAY_COLUMNS>;

/// Writes into a [`DisplayLine`] and silently drops whatever doesn't fit
struct Truncating<'a>(&'a mut DisplayLine);

impl uWrite for Truncating<'_> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// The text shown for a reading, e.g. `Light: 420 lux`. Long values are cut at the display width.
pub fn format_line(reading: Reading) -> DisplayLine {
    let mut line = DisplayLine::new();
    let mut sink = Truncating(&mut line);
    let _ = ufmt::uwrite!(sink, "Light: {} lux", reading);
    line
}

/// Shows the latest reading on the display
pub struct Presentation<'a, M: RawMutex, D> {
    cell: &'a ReadingCell<M>,
    display: D,
    period: Duration,
}

impl<'a, M: RawMutex, D: LineDisplay> Presentation<'a, M, D> {
    pub fn new(cell: &'a ReadingCell<M>, display: D) -> Self {
        Self {
            cell,
            display,
            period: DISPLAY_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn display(&mut self) -> &mut D {
        &mut self.display
    }

    /// Copy the reading out of the cell, then draw it. The lock is released before any display I/O.
    pub async fn refresh(&mut self) -> Result<DisplayLine, Fault> {
        let reading = self.cell.read().await.map_err(|_| Fault::CellLock)?;
        let line = format_line(reading);
        self.display.clear().await;
        self.display.set_cursor(0, 0).await;
        self.display.print(&line).await;
        Ok(line)
    }

    /// Refresh every period until the supervisor leaves the running state
    pub async fn run<T: DelayNs>(&mut self, mut delay: T, supervisor: &Supervisor) -> Result<(), Fault> {
        info!(
            "PRESENTATION: Task started, period {} ms",
            self.period.as_millis()
        );
        loop {
            match self.refresh().await {
                Ok(line) => trace!("PRESENTATION: showing {}", line.as_str()),
                Err(fault) => {
                    supervisor.escalate(fault);
                    return Err(fault);
                }
            }
            if idle(&mut delay, self.period, supervisor).await == Resume::Stop {
                info!("PRESENTATION: Task stopped");
                return supervisor.fault().map_or(Ok(()), Err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typical_reading() {
        assert_eq!(format_line(Reading(420)).as_str(), "Light: 420 lux");
        assert_eq!(format_line(Reading(0)).as_str(), "Light: 0 lux");
    }

    #[test]
    fn five_digits_fit_exactly() {
        let line = format_line(Reading(12_345));
        assert_eq!(line.as_str(), "Light: 12345 lux");
        assert_eq!(line.len(), DISPLAY_COLUMNS);
    }

    #[test]
    fn long_readings_are_cut_at_the_display_width() {
        assert_eq!(format_line(Reading(123_456)).as_str(), "Light: 123456 lu");
        assert_eq!(format_line(Reading(u32::MAX)).as_str(), "Light: 429496729");
    }

    #[test]
    fn never_exceeds_display_width() {
        let samples = (0..32)
            .map(|shift| 1u32 << shift)
            .chain([9, 99, 999, 9_999, 99_999, 999_999, u32::MAX]);
        for lux in samples {
            let line = format_line(Reading(lux));
            assert!(line.len() <= DISPLAY_COLUMNS, "{} lux overflowed", lux);
            assert!(line.starts_with("Light: "));
        }
    }
}
