use std::io;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::reconciliation::Reconciler;

/// Daily forecast refresh.
#[derive(Debug, Clone)]
pub struct ForecastRunner {
    /// Local time of day to run at.
    pub daily_at: NaiveTime,
    /// Also run once right after spawning.
    pub run_on_start: bool,
    /// Upper bound on how long the loop sleeps between checks.
    pub poll: Duration,
}

impl Default for ForecastRunner {
    fn default() -> Self {
        Self {
            daily_at: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            run_on_start: false,
            poll: Duration::from_millis(250),
        }
    }
}

/// Handle for the running forecast thread (shutdown + trigger hook).
#[derive(Debug)]
pub struct ForecastRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl ForecastRunnerHandle {
    /// Request a run now. Triggers coalesce: if one is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the thread and wait for it. A run in progress finishes first.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl ForecastRunner {
    pub fn new(daily_at: NaiveTime) -> Self {
        Self {
            daily_at,
            ..Self::default()
        }
    }

    /// Spawn the runner thread. Async store calls run on `runtime`.
    pub fn spawn(&self, reconciler: Arc<Reconciler>, runtime: Handle) -> io::Result<ForecastRunnerHandle> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.clone();
        let join = thread::Builder::new()
            .name("forecast-runner".to_string())
            .spawn(move || runner_loop(cfg, shutdown_rx, trigger_rx, reconciler, runtime))?;

        Ok(ForecastRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }
}

fn runner_loop(
    cfg: ForecastRunner,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    reconciler: Arc<Reconciler>,
    runtime: Handle,
) {
    info!(daily_at = %cfg.daily_at, "forecast runner started");

    let mut next_run = next_run_after(Local::now().naive_local(), cfg.daily_at);
    let mut pending = cfg.run_on_start;

    loop {
        let now = Local::now().naive_local();
        if now >= next_run {
            pending = true;
            next_run = next_run_after(now, cfg.daily_at);
        }

        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if !pending {
            let until_next = (next_run - now).to_std().unwrap_or_default();
            match shutdown_rx.recv_timeout(until_next.min(cfg.poll)) {
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                _ => break,
            }
        }
        pending = false;

        // Shutdown has priority over a pending run.
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let today = now.date();
        match runtime.block_on(reconciler.refresh_forecasts(today)) {
            Ok(run) => info!(%today, dishes = run.dishes, points = run.points, "scheduled forecast finished"),
            Err(e) => warn!(%today, error = %e, "scheduled forecast failed"),
        }
    }

    info!("forecast runner stopped");
}

/// First time strictly after `now` whose time of day is `at`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now { today } else { today + TimeDelta::days(1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use larder_sales::{HolidayCalendar, SalesRecord};

    use crate::store::{InMemoryStore, RestaurantStore};

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn next_run_is_later_today_or_tomorrow() {
        let six = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        assert_eq!(next_run_after(at(16, 5, 59), six), at(16, 6, 0));
        assert_eq!(next_run_after(at(16, 6, 0), six), at(17, 6, 0));
        assert_eq!(next_run_after(at(16, 23, 0), six), at(17, 6, 0));
    }

    #[test]
    fn trigger_runs_forecast_and_shutdown_stops() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let today = Local::now().date_naive();
        let history: Vec<SalesRecord> = (1..=5)
            .map(|n| {
                let d = today - TimeDelta::days(n);
                SalesRecord::first_sale(d, "Soup", 4, &HolidayCalendar::default())
            })
            .collect();
        let store = Arc::new(InMemoryStore::new().with_sales(history));
        let reconciler = Arc::new(Reconciler::new(store.clone()));

        let handle = ForecastRunner::default()
            .spawn(reconciler, runtime.handle().clone())
            .unwrap();
        handle.trigger();

        let mut stored = Vec::new();
        for _ in 0..100 {
            stored = runtime.block_on(store.predictions()).unwrap();
            if !stored.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        handle.shutdown();

        assert_eq!(stored.len(), 10);
    }
}
