#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::future::Future;
use std::rc::Rc;
use std::task::Poll;

use embassy_futures::yield_now;
use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use embedded_hal_async::delay::DelayNs;
use lux_monitor::{Reading, Supervisor, drivers::LightSensor, drivers::LineDisplay};

// ---------------------------------------------------------------------------
// Virtual time
// ---------------------------------------------------------------------------

/// A delay that doesn't wait. It records every requested sleep and yields once, so other futures
/// in the same `join`/`select` get a turn. Clones share the same record.
#[derive(Clone)]
pub struct VirtualDelay<'a> {
    sleeps: Rc<RefCell<Vec<u32>>>,
    stop: Option<(usize, &'a Supervisor)>,
}

impl VirtualDelay<'static> {
    pub fn new() -> Self {
        Self {
            sleeps: Rc::new(RefCell::new(Vec::new())),
            stop: None,
        }
    }
}

impl<'a> VirtualDelay<'a> {
    /// Request a stop from `supervisor` once `count` sleeps have been taken
    pub fn stop_after<'b>(self, count: usize, supervisor: &'b Supervisor) -> VirtualDelay<'b> {
        VirtualDelay {
            sleeps: self.sleeps,
            stop: Some((count, supervisor)),
        }
    }

    /// Every sleep requested so far, in milliseconds
    pub fn sleeps(&self) -> Vec<u32> {
        self.sleeps.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.sleeps.borrow().len()
    }

    /// Total virtual time slept, in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.sleeps.borrow().iter().map(|&ms| ms as u64).sum()
    }

    fn record(&mut self, ms: u32) {
        let count = {
            let mut sleeps = self.sleeps.borrow_mut();
            sleeps.push(ms);
            sleeps.len()
        };
        if let Some((limit, supervisor)) = self.stop {
            if count >= limit {
                supervisor.request_stop();
            }
        }
    }
}

impl DelayNs for VirtualDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(ns / 1_000_000);
        yield_now().await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(ms);
        yield_now().await;
    }
}

/// Resolves once `condition` holds. Relies on the other futures in the same `select` to keep
/// waking the task, which the virtual delay does on every sleep.
pub fn until(condition: impl Fn() -> bool) -> impl Future<Output = ()> {
    std::future::poll_fn(move |_| {
        if condition() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    })
}

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault;

/// Answers from a script, then fails forever
pub struct ScriptedSensor {
    script: VecDeque<Result<u32, SensorFault>>,
    pub calls: usize,
}

impl ScriptedSensor {
    pub fn new(script: impl IntoIterator<Item = Result<u32, SensorFault>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            calls: 0,
        }
    }
}

impl LightSensor for ScriptedSensor {
    type Error = SensorFault;

    async fn read_lux(&mut self) -> Result<Reading, Self::Error> {
        self.calls += 1;
        self.script.pop_front().unwrap_or(Err(SensorFault)).map(Reading)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Clear,
    Cursor(u8, u8),
    Print(String),
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub calls: Vec<DisplayCall>,
}

impl RecordingDisplay {
    /// Everything that was printed, in order
    pub fn printed(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DisplayCall::Print(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl LineDisplay for RecordingDisplay {
    async fn clear(&mut self) {
        self.calls.push(DisplayCall::Clear);
    }

    async fn set_cursor(&mut self, row: u8, col: u8) {
        self.calls.push(DisplayCall::Cursor(row, col));
    }

    async fn print(&mut self, text: &str) {
        self.calls.push(DisplayCall::Print(text.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Output pin
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakePin {
    pub high: bool,
    pub toggles: usize,
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for FakePin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.toggles += 1;
        self.high = !self.high;
        Ok(())
    }
}
