use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, trace};

/// Sent to the play loop after every tick so the HUD can be redrawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick(pub u32);

/// Background round clock. The task owns the seconds counter; everyone else only reads it.
#[derive(Debug)]
pub struct Timer {
    seconds: Arc<AtomicU32>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    frozen: Option<u32>,
}

impl Timer {
    /// Spawns the clock task. Must be called from within a tokio runtime.
    pub fn start(period: Duration, ticks: mpsc::UnboundedSender<Tick>) -> Self {
        let seconds = Arc::new(AtomicU32::new(0));
        let (stop, stop_rx) = oneshot::channel();

        let task = tokio::spawn(run(period, seconds.clone(), ticks, stop_rx));
        debug!("Started round timer ticking every {:?}", period);

        Self {
            seconds,
            stop: Some(stop),
            task,
            frozen: None,
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.frozen
            .unwrap_or_else(|| self.seconds.load(Ordering::Acquire))
    }

    /// Signals the task to exit without waiting for it and freezes the reading.
    /// Calling it again, or after the task is gone, does nothing.
    pub fn stop(&mut self) -> u32 {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
            self.frozen = Some(self.seconds.load(Ordering::Acquire));
            debug!("Stopped round timer at {}s", self.elapsed());
        }
        self.elapsed()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_none()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
        self.task.abort();
    }
}

async fn run(
    period: Duration,
    seconds: Arc<AtomicU32>,
    ticks: mpsc::UnboundedSender<Tick>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = interval.tick() => {
                let now = seconds.fetch_add(1, Ordering::AcqRel) + 1;
                trace!("Timer tick {}", now);
                if ticks.send(Tick(now)).is_err() {
                    break;
                }
            }
        }
    }
}
