//! The coordinator: one task turning activity signals into serialized passes.

use core::future::{self, Future};
use core::pin::pin;

use anyhow::{Result, bail};
use host::{ActivityHub, DocumentHost, Signal, StyleSheetHost};
use log::{debug, info};
use recolor::{PassProgress, PassSummary, Recolorizer};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task;
use tokio::time::{self, Instant};

use crate::config::RecolorConfig;
use crate::scheduler::{Admission, AdmissionGate, Debouncer, Suppression};

/// Counters accumulated over the coordinator's lifetime.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CoordinatorStats {
    pub signals_received: usize,
    pub passes_admitted: usize,
    pub passes_completed: usize,
    /// Requests dropped because the page was hidden.
    pub suppressed_hidden: usize,
    /// Requests merged into an already queued pass.
    pub coalesced_while_queued: usize,
    /// Requests that had to wait behind a running pass.
    pub queued_passes: usize,
    pub last_pass: Option<PassSummary>,
}

/// What a stopped coordinator hands back.
#[derive(Debug)]
pub struct Shutdown<H> {
    pub host: H,
    pub stats: CoordinatorStats,
}

/// One wake-up of the coordinator loop.
enum Event {
    Stop,
    Signal(Option<Signal>),
    QuietPeriodOver,
    GateWake,
    Tick,
}

/// Owns the host, the engine and all scheduling state for one document
/// context. Constructed once; [`Coordinator::run`] drives it.
pub struct Coordinator<H> {
    host: H,
    hub: ActivityHub,
    signals: UnboundedReceiver<Signal>,
    signals_open: bool,
    engine: Recolorizer,
    debouncer: Debouncer,
    gate: AdmissionGate,
    stats: CoordinatorStats,
}

impl<H> Coordinator<H>
where
    H: DocumentHost + StyleSheetHost,
{
    /// Subscribe to `hub` and prepare to drive `host`.
    pub fn new(host: H, hub: ActivityHub, config: &RecolorConfig) -> Self {
        let signals = hub.subscribe();
        let mut gate = AdmissionGate::new(config.poll_interval(), config.debounce());
        gate.set_visible(host.is_visible());
        Self {
            host,
            hub,
            signals,
            signals_open: true,
            engine: Recolorizer::new(config.batch_width, config.stylesheets),
            debouncer: Debouncer::new(config.debounce()),
            gate,
            stats: CoordinatorStats::default(),
        }
    }

    pub const fn stats(&self) -> &CoordinatorStats {
        &self.stats
    }

    /// Run until `shutdown` resolves. A pass in flight is always finished
    /// before the coordinator stops.
    ///
    /// # Errors
    /// Fails only if the engine refuses a pass the gate admitted.
    pub async fn run<F>(mut self, shutdown: F) -> Result<Shutdown<H>>
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = pin!(shutdown);
        if self.gate.is_visible() {
            self.host.observe_mutations(Some(self.hub.clone()));
        }
        info!("coordinator started (visible: {})", self.gate.is_visible());

        loop {
            let ticking = self.engine.is_running();
            let quiet_until = self.debouncer.deadline();
            let gate_wake = self.gate.wake_at();

            let event = tokio::select! {
                biased;
                () = shutdown.as_mut(), if !ticking => Event::Stop,
                signal = self.signals.recv(), if self.signals_open => Event::Signal(signal),
                () = sleep_until(quiet_until) => Event::QuietPeriodOver,
                () = sleep_until(gate_wake) => Event::GateWake,
                () = task::yield_now(), if ticking => Event::Tick,
            };

            match event {
                Event::Stop => break,
                Event::Signal(Some(signal)) => self.on_signal(signal),
                Event::Signal(None) => {
                    debug!("activity channel closed");
                    self.signals_open = false;
                }
                Event::QuietPeriodOver => {
                    let now = Instant::now();
                    if self.debouncer.take_due(now) {
                        let admission = self.gate.request(now);
                        self.on_admission(admission)?;
                    }
                }
                Event::GateWake => {
                    if let Some(admission) = self.gate.on_wake(Instant::now()) {
                        self.on_admission(admission)?;
                    }
                }
                Event::Tick => self.on_tick(),
            }
        }

        self.host.observe_mutations(None);
        info!(
            "coordinator stopped after {} passes",
            self.stats.passes_completed
        );
        Ok(Shutdown {
            host: self.host,
            stats: self.stats,
        })
    }

    /// Run for the lifetime of the page.
    ///
    /// # Errors
    /// See [`Coordinator::run`].
    pub async fn run_forever(self) -> Result<Shutdown<H>> {
        self.run(future::pending()).await
    }

    fn on_signal(&mut self, signal: Signal) {
        self.stats.signals_received += 1;
        if let Some(visible) = signal.visibility() {
            self.gate.set_visible(visible);
            let observer = visible.then(|| self.hub.clone());
            self.host.observe_mutations(observer);
            debug!("visibility changed: {visible}");
        }
        self.debouncer.signal(Instant::now());
    }

    fn on_admission(&mut self, admission: Admission) -> Result<()> {
        match admission {
            Admission::Admitted => {
                if !self.engine.begin(&mut self.host) {
                    bail!("pass admitted while another pass is in flight");
                }
                self.stats.passes_admitted += 1;
            }
            Admission::Queued => {
                self.stats.queued_passes += 1;
                debug!("pass queued behind the running one");
            }
            Admission::Suppressed(Suppression::Hidden) => {
                self.stats.suppressed_hidden += 1;
                debug!("pass suppressed: page hidden");
            }
            Admission::Suppressed(Suppression::AlreadyQueued) => {
                self.stats.coalesced_while_queued += 1;
                debug!("pass coalesced into the queued one");
            }
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        if let PassProgress::Complete(summary) = self.engine.tick(&mut self.host) {
            self.gate.finish();
            self.stats.passes_completed += 1;
            self.stats.last_pass = Some(summary);
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use html::{Document, SharedDocument};
    use tokio::sync::oneshot;

    fn quick_config() -> RecolorConfig {
        RecolorConfig {
            batch_width: 2,
            ..RecolorConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_signal_admits_without_waiting() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let doc = SharedDocument::new(Document::new());
        let root = doc.borrow().root_key();
        doc.borrow_mut().append_element(root, "div", &[("color", "rgb(0, 0, 0)")])?;

        let hub = ActivityHub::new();
        let coordinator = Coordinator::new(doc.clone(), hub.clone(), &quick_config());
        let (stop, stopped) = oneshot::channel::<()>();
        let started = Instant::now();

        let driver = async {
            hub.notify(Signal::DocumentReady);
            time::sleep(Duration::from_millis(50)).await;
            let _ = stop.send(());
        };
        let (outcome, ()) = tokio::join!(
            coordinator.run(async {
                let _ = stopped.await;
            }),
            driver
        );
        let shutdown = outcome?;

        assert_eq!(shutdown.stats.passes_completed, 1);
        assert!(Instant::now() - started < Duration::from_secs(1));
        assert!(!doc.borrow().observer_connected());
        Ok(())
    }
}
