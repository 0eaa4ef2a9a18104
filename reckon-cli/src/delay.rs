//! Async delay backed by the embassy time driver

use embassy_time::Timer;
use embedded_hal_async::delay::DelayNs;

/// [`DelayNs`] over [`Timer`]; suspends only the calling task
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerDelay;

impl DelayNs for TimerDelay {
    async fn delay_ns(&mut self, ns: u32) {
        Timer::after_nanos(ns.into()).await
    }

    async fn delay_us(&mut self, us: u32) {
        Timer::after_micros(us.into()).await
    }

    async fn delay_ms(&mut self, ms: u32) {
        Timer::after_millis(ms.into()).await
    }
}
