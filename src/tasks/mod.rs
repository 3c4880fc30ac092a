pub mod acquisition;
pub mod indicator;
pub mod presentation;

pub use acquisition::{Acquisition, Publish};
pub use indicator::Indicator;
pub use presentation::{DisplayLine, Presentation, format_line};

use crate::fault::Supervisor;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

/// What a task does once its suspension point is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resume {
    Continue,
    Stop,
}

/// The one suspension point of every task loop. The supervisor is checked on both sides of the
/// delay, so a stop or fault is noticed without waiting out another period.
pub(crate) async fn idle<D: DelayNs>(
    delay: &mut D,
    period: Duration,
    supervisor: &Supervisor,
) -> Resume {
    if !supervisor.is_running() {
        return Resume::Stop;
    }
    let ms = period.as_millis().min(u32::MAX as u64) as u32;
    delay.delay_ms(ms).await;
    if supervisor.is_running() {
        Resume::Continue
    } else {
        Resume::Stop
    }
}
