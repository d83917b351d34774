//! The background clock that keeps the scanline moving while the host is idle.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
        mpsc,
    },
    thread::JoinHandle,
    time::Duration,
};

/// Animation counter shared between the ticker thread and the render thread.
///
/// Purely cosmetic, so relaxed ordering is enough.
#[derive(Debug, Default)]
pub struct ScanlinePhase(AtomicU32);

impl ScanlinePhase {
    /// Move one step forward. Returns the new tick count.
    pub fn advance(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Ticks so far.
    pub fn ticks(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// The row currently lit, for a target `height` rows tall.
    pub fn row(&self, height: u32) -> u32 {
        if height == 0 {
            0
        } else {
            self.ticks() % height
        }
    }
}

/// What the ticker calls: typically "please wake up and render another frame".
pub type RedrawCallback = Box<dyn Fn() + Send + 'static>;

/// A thread that advances a [`ScanlinePhase`] and calls a [`RedrawCallback`] at a fixed rate.
///
/// Never touches graphics state. Stops when [`Self::stop`] is called or when dropped.
pub struct Ticker {
    stop_tx: Option<mpsc::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// # Errors
    /// If the OS refuses to spawn the thread.
    pub fn spawn(
        interval: Duration,
        phase: Arc<ScanlinePhase>,
        callback: RedrawCallback,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let join_handle = std::thread::Builder::new()
            .name("crt_ticker".to_owned())
            .spawn(move || {
                log::debug!("CRT ticker started ({interval:?} interval)");
                // Sleeps on the channel so `stop` wakes us immediately.
                while let Err(mpsc::RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                    phase.advance();
                    callback();
                }
                log::debug!("CRT ticker stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            join_handle: Some(join_handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the thread and wait for it to finish. Calling this more than once is fine.
    pub fn stop(&mut self) {
        // Hanging up the channel is the stop signal:
        self.stop_tx = None;

        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.thread().id() == std::thread::current().id() {
                // Stopped from inside the callback: the loop exits on its own.
                return;
            }
            if join_handle.join().is_err() {
                log::warn!("CRT ticker callback panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::AtomicUsize,
        time::{Duration, Instant},
    };

    #[test]
    fn phase_wraps_at_height() {
        let phase = ScanlinePhase::default();
        let height = 7;
        for n in 1..=50 {
            phase.advance();
            assert_eq!(phase.row(height), n % height);
        }
        assert_eq!(phase.ticks(), 50);
        assert_eq!(phase.row(0), 0);
    }

    #[test]
    fn ticks_until_stopped() {
        let phase = Arc::new(ScanlinePhase::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut ticker = {
            let calls = calls.clone();
            Ticker::spawn(
                Duration::from_millis(1),
                phase.clone(),
                Box::new(move || {
                    calls.fetch_add(1, Ordering::Relaxed);
                }),
            )
            .unwrap()
        };
        assert!(ticker.is_running());

        let deadline = Instant::now() + Duration::from_secs(10);
        while calls.load(Ordering::Relaxed) < 3 {
            assert!(Instant::now() < deadline, "ticker never fired");
            std::thread::sleep(Duration::from_millis(1));
        }

        ticker.stop();
        assert!(!ticker.is_running());

        // Every tick advances the phase before calling back:
        let after_stop = calls.load(Ordering::Relaxed);
        assert_eq!(phase.ticks() as usize, after_stop);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::Relaxed), after_stop, "ticked after stop");

        ticker.stop();
    }

    #[test]
    fn stop_does_not_wait_out_the_interval() {
        let mut ticker = Ticker::spawn(
            Duration::from_secs(3600),
            Arc::default(),
            Box::new(|| {}),
        )
        .unwrap();

        let start = Instant::now();
        ticker.stop();
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn dropping_stops_the_thread() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let calls = calls.clone();
            Ticker::spawn(
                Duration::from_millis(1),
                Arc::default(),
                Box::new(move || {
                    calls.fetch_add(1, Ordering::Relaxed);
                }),
            )
            .unwrap()
        };
        drop(ticker);

        let after_drop = calls.load(Ordering::Relaxed);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::Relaxed), after_drop);
    }
}
