//! Background session poller. A worker thread fetches the canonical session
//! list on the configured interval and hands `(ticket, result)` pairs to the
//! owning thread, which applies them through the store's sequencer so a slow
//! response can never overwrite a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, channel};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::model::SessionsResponse;
use crate::remote::RemoteClient;

pub struct PollEvent {
    pub ticket: u64,
    pub result: Result<SessionsResponse>,
}

pub struct SessionPoller {
    rx: Receiver<PollEvent>,
    interval_ms: Arc<AtomicU64>,
    refresh_now: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl SessionPoller {
    pub fn spawn(remote: RemoteClient, interval_ms: u64) -> Self {
        let (tx, rx) = channel();
        let interval = Arc::new(AtomicU64::new(interval_ms));
        let refresh_now = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));

        let thread_interval = interval.clone();
        let thread_refresh = refresh_now.clone();
        let thread_stop = stop.clone();
        thread::spawn(move || {
            let mut ticket: u64 = 0;
            loop {
                if thread_stop.load(Ordering::Relaxed) {
                    break;
                }

                // The ticket is taken before the request goes out; ordering
                // is by issue time, not arrival time.
                ticket += 1;
                let result = remote.list_sessions();
                if tx.send(PollEvent { ticket, result }).is_err() {
                    break;
                }

                // Sleep in short slices so interval changes, manual refresh
                // requests, and shutdown all take effect promptly.
                let mut slept = 0;
                loop {
                    if thread_stop.load(Ordering::Relaxed) {
                        return;
                    }
                    if thread_refresh.swap(false, Ordering::Relaxed) {
                        break;
                    }
                    let target = thread_interval.load(Ordering::Relaxed);
                    if slept >= target {
                        break;
                    }
                    let slice = (target - slept).min(100);
                    thread::sleep(Duration::from_millis(slice));
                    slept += slice;
                }
            }
        });

        SessionPoller {
            rx,
            interval_ms: interval,
            refresh_now,
            stop,
        }
    }

    /// Non-blocking drain of everything the worker has produced so far.
    pub fn drain(&self) -> Vec<PollEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn set_interval_ms(&self, interval_ms: u64) {
        self.interval_ms.store(interval_ms, Ordering::Relaxed);
    }

    /// Asks the worker to fetch on its next wakeup instead of waiting out
    /// the interval (used right after session create/kill).
    pub fn request_refresh(&self) {
        self.refresh_now.store(true, Ordering::Relaxed);
    }
}

impl Drop for SessionPoller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
