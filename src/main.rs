//! ctipop demo binary
//!
//! Wires the registry, classifier, and monitor to the simulated PBX and
//! plays through an inbound and an outbound call so the whole pipeline can
//! be watched in the logs.

use ctipop::application::CallMonitor;
use ctipop::config::Config;
use ctipop::domain::call::classifier::EventClassifier;
use ctipop::domain::call::history::CallHistory;
use ctipop::domain::call::info::CallInfo;
use ctipop::domain::call::registry::{CallRegistry, Listener};
use ctipop::infrastructure::pbx::SimPbx;
use ctipop::infrastructure::screen_pop::{LogUrlOpener, UrlTemplate};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct ConsoleListener;

impl Listener for ConsoleListener {
    fn on_call_added(&self, info: &CallInfo) {
        println!(
            "+ call {} from {} [{}]",
            info.identity,
            info.number.as_deref().unwrap_or("?"),
            info.state.as_str()
        );
    }

    fn on_call_updated(&self, info: &CallInfo) {
        println!(
            "~ call {} from {} [{}]",
            info.identity,
            info.number.as_deref().unwrap_or("?"),
            info.state.as_str()
        );
    }

    fn on_call_removed(&self, info: &CallInfo) {
        println!("- call {} [{}]", info.identity, info.state.as_str());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = Config::load();
    if config.pbx.extension.is_empty() {
        config.pbx.extension = "2001".to_string();
    }
    info!(extension = %config.pbx.extension, "ctipop starting");

    let registry = Arc::new(CallRegistry::new());
    registry.add_listener(Arc::new(ConsoleListener));

    let (event_tx, event_rx) = mpsc::channel(64);
    let pbx = Arc::new(SimPbx::new(config.pbx.extension.clone(), event_tx));
    registry.set_originator(pbx.clone());

    let history = Arc::new(CallHistory::with_file(Config::history_file()));
    let opener = Arc::new(LogUrlOpener::new(UrlTemplate::new(
        config.screen_pop.url_template.clone(),
    )));
    let classifier = EventClassifier::new(
        Some(config.pbx.extension.clone()),
        config.screen_pop.trigger,
        Arc::new(AtomicBool::new(config.screen_pop.enabled)),
    );
    let monitor = CallMonitor::new(
        registry.clone(),
        classifier,
        opener,
        history.clone(),
        Duration::from_millis(config.call_control.outbound_connect_delay_ms),
    );
    let monitor_task = tokio::spawn(monitor.run(event_rx));

    // Inbound: the caller rings, the agent picks up, talks, and hangs up.
    let inbound = pbx.incoming_call("5551234");
    tokio::time::sleep(Duration::from_millis(50)).await;
    registry.pick_call(&inbound);
    pbx.report_active(&inbound, "5551234");
    tokio::time::sleep(Duration::from_millis(200)).await;
    registry.disconnect_call(&inbound);
    pbx.end_call(&inbound);

    // Outbound: dial, let the far end answer, wait out the connect delay.
    registry.dial_call("5559999");
    tokio::time::sleep(Duration::from_millis(100)).await;
    for call in registry.snapshot() {
        pbx.report_active(&call.handle, "5559999");
    }
    tokio::time::sleep(Duration::from_millis(
        config.call_control.outbound_connect_delay_ms + 200,
    ))
    .await;
    for call in registry.snapshot() {
        registry.disconnect_call(&call.handle);
        pbx.end_call(&call.handle);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The registry holds the originator (and with it the event sender), so
    // the stream never closes on its own.
    monitor_task.abort();

    for record in history.todays_calls() {
        info!(
            number = %record.number,
            direction = ?record.direction,
            answered = record.answered,
            talk_seconds = record.talk_seconds,
            "history record"
        );
    }
    history.save()?;
    Ok(())
}
