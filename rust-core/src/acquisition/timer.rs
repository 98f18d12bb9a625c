//! Periodic tick source for hosted builds
//!
//! Stands in for the MCU repeating timer: a dedicated thread calls
//! `SampleTicker::on_tick` once per sample period on a fixed deadline
//! schedule. Ticks while the sampler is disarmed are no-ops.

use super::input::AnalogInput;
use super::sampler::{SampleTicker, TickOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Background thread driving a `SampleTicker`
pub struct TickThread {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickThread {
    /// Start ticking every `period`
    pub fn spawn<A>(mut ticker: SampleTicker<A>, period: Duration) -> std::io::Result<Self>
    where
        A: AnalogInput + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let handle = std::thread::Builder::new()
            .name("sample-timer".into())
            .spawn(move || {
                let mut deadline = Instant::now() + period;

                while thread_running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }

                    if ticker.on_tick() == TickOutcome::Completed {
                        log::trace!("Acquisition cycle complete");
                    }

                    deadline += period;
                    // Fell more than a period behind: resynchronize instead of bursting
                    let now = Instant::now();
                    if now > deadline + period {
                        deadline = now + period;
                    }
                }
            })?;

        log::info!("Sample timer started ({:?} period)", period);

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TickThread {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::input::VoltageScale;
    use crate::acquisition::sampler::Sampler;

    #[test]
    fn test_thread_fills_a_cycle() {
        let scale = VoltageScale::new(3.3, 4095, None);
        let (mut sampler, ticker) = Sampler::new(|| 2048u16, scale, 32);
        let mut timer = TickThread::spawn(ticker, Duration::from_micros(200)).unwrap();

        sampler.start().unwrap();
        let give_up = Instant::now() + Duration::from_secs(5);
        while !sampler.is_complete() && Instant::now() < give_up {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(sampler.is_complete());

        let mut samples = [0.0; 32];
        sampler.take_samples(&mut samples).unwrap();
        assert!(samples.iter().all(|v| (v - 1.65).abs() < 1e-3));

        timer.stop();
        assert!(!timer.is_running());
    }
}
