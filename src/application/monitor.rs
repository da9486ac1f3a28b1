//! Call monitoring loop
//!
//! Consumes the vendor event stream, applies classifier decisions to the
//! registry, fires screen pops, feeds the call history, and schedules the
//! deferred CONNECTED promotion for outbound calls.

use crate::domain::call::classifier::{Decision, EventClassifier};
use crate::domain::call::event::PbxEvent;
use crate::domain::call::history::{CallHistory, HistoryDirection};
use crate::domain::call::identity::CallIdentity;
use crate::domain::call::info::{CallDirection, CallInfo, CallState};
use crate::domain::call::port::{CallHandle, UrlOpener};
use crate::domain::call::registry::{CallRegistry, Listener};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Registry listener remembering when each logical call first connected.
///
/// The registry entry may already be gone by the time ObservationEnded
/// arrives (a manual disconnect removes it), and a manual pick produces no
/// vendor event at all, so the history cannot rely on either source alone.
#[derive(Default)]
struct AnswerLog {
    connected: Mutex<HashMap<CallIdentity, DateTime<Utc>>>,
}

impl AnswerLog {
    fn note(&self, info: &CallInfo) {
        if let Some(connected_at) = info.connected_at {
            self.connected
                .lock()
                .unwrap()
                .entry(info.identity.clone())
                .or_insert(connected_at);
        }
    }

    fn take(&self, identity: &CallIdentity) -> Option<DateTime<Utc>> {
        self.connected.lock().unwrap().remove(identity)
    }
}

impl Listener for AnswerLog {
    fn on_call_added(&self, info: &CallInfo) {
        self.note(info);
    }
    fn on_call_updated(&self, info: &CallInfo) {
        self.note(info);
    }
    fn on_call_removed(&self, info: &CallInfo) {
        self.note(info);
    }
}

pub struct CallMonitor {
    registry: Arc<CallRegistry>,
    classifier: EventClassifier,
    opener: Arc<dyn UrlOpener>,
    history: Arc<CallHistory>,
    outbound_connect_delay: Duration,
    /// Open history record per logical call, closed on removal.
    open_records: HashMap<CallIdentity, Uuid>,
    answers: Arc<AnswerLog>,
}

impl CallMonitor {
    pub fn new(
        registry: Arc<CallRegistry>,
        classifier: EventClassifier,
        opener: Arc<dyn UrlOpener>,
        history: Arc<CallHistory>,
        outbound_connect_delay: Duration,
    ) -> Self {
        let answers = Arc::new(AnswerLog::default());
        registry.add_listener(answers.clone());
        Self {
            registry,
            classifier,
            opener,
            history,
            outbound_connect_delay,
            open_records: HashMap::new(),
            answers,
        }
    }

    /// Drain the event stream until the sender side closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<PbxEvent>) {
        info!("monitor: started");
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        info!("monitor: event stream closed");
    }

    pub fn handle_event(&mut self, event: PbxEvent) {
        let handle = event.handle().clone();
        let identity = CallIdentity::resolve(&handle.descriptor());
        let existing = self.registry.get(&handle);
        debug!(kind = event.kind(), identity = %identity, "monitor: event");

        match self.classifier.classify(&event, existing.as_ref()) {
            Decision::Apply {
                number,
                state,
                address,
                direction,
                pop,
                defer_connect,
            } => {
                let info = self
                    .registry
                    .add_or_update(&handle, number, state, address);

                self.open_history(&identity, info.number.as_deref(), direction);

                if let Some(number) = pop {
                    if let Err(err) = self.opener.open_url_for_number(&number) {
                        warn!(%number, %err, "monitor: screen pop failed");
                    }
                }

                if defer_connect {
                    self.schedule_connect(handle);
                }
            }
            Decision::Remove => {
                // A manual disconnect may have already emptied the registry;
                // the pre-classify snapshot still carries the talk times.
                let removed = self.registry.remove(&handle).or(existing);
                self.close_history(&identity, removed.as_ref());
            }
            Decision::Ignore => {}
        }
    }

    fn open_history(
        &mut self,
        identity: &CallIdentity,
        number: Option<&str>,
        direction: CallDirection,
    ) {
        if self.open_records.contains_key(identity) {
            return;
        }
        let direction = match direction {
            CallDirection::Inbound => HistoryDirection::Inbound,
            CallDirection::Outbound => HistoryDirection::Outbound,
        };
        let id = self
            .history
            .call_started(number.unwrap_or("unknown"), direction);
        self.open_records.insert(identity.clone(), id);
    }

    fn close_history(&mut self, identity: &CallIdentity, removed: Option<&CallInfo>) {
        let noted = self.answers.take(identity);
        if let Some(id) = self.open_records.remove(identity) {
            let connected_at = removed.and_then(|i| i.connected_at).or(noted);
            let talk_seconds = connected_at
                .map(|connected| (Utc::now() - connected).num_seconds().max(0) as u64)
                .unwrap_or(0);
            self.history
                .call_ended(id, connected_at.is_some(), talk_seconds);
        }
    }

    /// One-shot promotion: after the delay, the call is shown as connected
    /// only if it is still present and still waiting in ALERTING. A call
    /// that ended or changed state in the meantime is left alone.
    fn schedule_connect(&self, handle: CallHandle) {
        let registry = Arc::clone(&self.registry);
        let delay = self.outbound_connect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match registry.get(&handle) {
                Some(info) if info.state == CallState::Alerting => {
                    debug!(identity = %info.identity, "monitor: outbound delay elapsed, connecting");
                    registry.add_or_update(&handle, None, Some(CallState::Connected), None);
                }
                Some(info) => {
                    debug!(
                        identity = %info.identity,
                        state = info.state.as_str(),
                        "monitor: deferred connect skipped, state moved on"
                    );
                }
                None => {
                    debug!("monitor: deferred connect skipped, call gone");
                }
            }
        });
    }
}
