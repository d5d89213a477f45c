use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

use crate::jump::jump_errors::JumpError;
use crate::utils::{millis_to_datetime, BBox, Observation};

/// Append-only record of every observation of a session.
/// Never read by detection: meant for export and offline debugging.
#[derive(Debug, Clone)]
pub struct Archive {
    session_id: Uuid,
    observations: Vec<Observation>,
}

#[derive(Serialize)]
struct ArchiveRecord<'a> {
    session_id: Uuid,
    observations: Vec<ArchivedObservation<'a>>,
}

#[derive(Serialize)]
struct ArchivedObservation<'a> {
    timestamp_ms: i64,
    recorded_at: DateTime<Utc>,
    bbox: &'a BBox,
}

impl Archive {
    pub fn new(_session_id: Uuid) -> Self {
        Archive {
            session_id: _session_id,
            observations: Vec::new(),
        }
    }
    pub fn get_session_id(&self) -> Uuid {
        self.session_id
    }
    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }
    /// Drops everything and starts recording another session
    pub fn restart(&mut self, session_id: Uuid) {
        self.session_id = session_id;
        self.observations.clear();
    }
    pub fn len(&self) -> usize {
        self.observations.len()
    }
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }
    /// Iterates `(timestamp, bbox)` pairs in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &BBox)> + '_ {
        self.observations.iter().map(|o| (o.timestamp_ms, &o.bbox))
    }
    /// Serializes archive as JSON into given writer
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), JumpError> {
        let record = ArchiveRecord {
            session_id: self.session_id,
            observations: self
                .observations
                .iter()
                .map(|o| ArchivedObservation {
                    timestamp_ms: o.timestamp_ms,
                    recorded_at: millis_to_datetime(o.timestamp_ms),
                    bbox: &o.bbox,
                })
                .collect(),
        };
        serde_json::to_writer(writer, &record)?;
        Ok(())
    }
    /// Writes archive as JSON file. Existing file is overwritten.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<(), JumpError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer.flush()?;
        log::debug!(
            "Archive of session {} ({} observations) dumped to {}",
            self.session_id,
            self.observations.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}
