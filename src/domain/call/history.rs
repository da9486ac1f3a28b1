//! Call history
//!
//! A bounded, most-recent-first record list fed by the monitor in two
//! phases: a record opens when a call first appears and closes when it is
//! removed. An inbound record that closes unanswered is reclassified as
//! missed. Persistence is a JSON file under the config directory.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::shared::result::Result;

const MAX_RECORDS: usize = 1000;
const RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryDirection {
    Inbound,
    Outbound,
    Missed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub number: String,
    pub direction: HistoryDirection,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub talk_seconds: u64,
    pub answered: bool,
}

impl HistoryRecord {
    fn new(number: String, direction: HistoryDirection) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            direction,
            started_at: Utc::now(),
            ended_at: None,
            talk_seconds: 0,
            answered: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct CallHistory {
    records: Mutex<Vec<HistoryRecord>>,
    path: Option<PathBuf>,
}

impl CallHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a history backed by a JSON file, loading existing records.
    /// A missing or unreadable file starts an empty history.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match Self::load(&path) {
            Ok(records) => records,
            Err(err) => {
                warn!(path = %path.display(), %err, "history: starting empty, load failed");
                Vec::new()
            }
        };
        Self {
            records: Mutex::new(records),
            path: Some(path),
        }
    }

    fn load(path: &Path) -> Result<Vec<HistoryRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<HistoryRecord> = serde_json::from_str(&raw)
            .map_err(|e| crate::domain::shared::error::DomainError::Internal(e.to_string()))?;
        Ok(records)
    }

    /// Open a record for a call that just appeared. Newest records first.
    pub fn call_started(&self, number: &str, direction: HistoryDirection) -> Uuid {
        let record = HistoryRecord::new(number.to_string(), direction);
        let id = record.id;
        let mut records = self.records.lock().unwrap();
        records.insert(0, record);
        Self::trim(&mut records);
        debug!(%id, number, ?direction, "history: call started");
        id
    }

    /// Close a record. An unanswered inbound call becomes a missed call.
    pub fn call_ended(&self, id: Uuid, answered: bool, talk_seconds: u64) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.ended_at = Some(Utc::now());
            record.answered = answered;
            record.talk_seconds = talk_seconds;
            if record.direction == HistoryDirection::Inbound && !answered {
                record.direction = HistoryDirection::Missed;
            }
            debug!(%id, answered, talk_seconds, "history: call ended");
        }
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn todays_calls(&self) -> Vec<HistoryRecord> {
        let today = Utc::now().date_naive();
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.started_at.date_naive() == today)
            .cloned()
            .collect()
    }

    pub fn missed_calls(&self) -> Vec<HistoryRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.direction == HistoryDirection::Missed)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    /// Write the current records to the backing file, if any.
    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        let records = self.records.lock().unwrap().clone();
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| crate::domain::shared::error::DomainError::Internal(e.to_string()))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, json)?;
        debug!(path = %path.display(), count = records.len(), "history: saved");
        Ok(())
    }

    /// Drop records past the retention window and beyond the size cap.
    fn trim(records: &mut Vec<HistoryRecord>) {
        let cutoff = Utc::now() - ChronoDuration::days(RETENTION_DAYS);
        records.retain(|r| r.started_at >= cutoff);
        records.truncate(MAX_RECORDS);
    }
}
