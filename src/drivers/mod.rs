//! Peripheral contracts used by the tasks, plus the drivers that fulfil them on the board.
#![allow(async_fn_in_trait)]

pub mod panel;
pub mod tsl2561;

use crate::Reading;

/// Something that can measure ambient light.
///
/// Failures are expected to be transient; the acquisition task simply tries again next period.
pub trait LightSensor {
    type Error;

    async fn read_lux(&mut self) -> Result<Reading, Self::Error>;
}

impl<T: LightSensor + ?Sized> LightSensor for &mut T {
    type Error = T::Error;

    async fn read_lux(&mut self) -> Result<Reading, Self::Error> {
        T::read_lux(self).await
    }
}

/// A character display addressed by row and column.
///
/// All calls are fire-and-forget. There is no atomicity across calls, so a viewer may briefly see a
/// cleared screen between `clear` and `print`.
pub trait LineDisplay {
    async fn clear(&mut self);

    async fn set_cursor(&mut self, row: u8, col: u8);

    /// Print `text` starting at the cursor
    async fn print(&mut self, text: &str);
}

impl<T: LineDisplay + ?Sized> LineDisplay for &mut T {
    async fn clear(&mut self) {
        T::clear(self).await
    }

    async fn set_cursor(&mut self, row: u8, col: u8) {
        T::set_cursor(self, row, col).await
    }

    async fn print(&mut self, text: &str) {
        T::print(self, text).await
    }
}
