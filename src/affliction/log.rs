//! Affliction logging
//!
//! Records every gilding transition for inspection and post-run analysis.

use bevy::prelude::*;
use serde::Serialize;
use std::path::Path;

/// A single entry in the affliction log
#[derive(Debug, Clone)]
pub struct AfflictionLogEntry {
    /// Simulated time the entry was written at
    pub timestamp: f32,
    pub event_type: AfflictionLogEventType,
    /// Entity the entry is about, if any
    pub target: Option<Entity>,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AfflictionLogEventType {
    /// Target gilded for the first time this episode
    Applied,
    /// Countdown restarted
    Refreshed,
    /// Countdown stopped while contact or a scan holds the target
    Held,
    /// Countdown started after a hold lapsed
    Armed,
    /// Gilding removed
    Removed,
    /// Cosmetic kit equipped or unequipped
    Kit,
    /// Round start/end
    RoundEvent,
}

/// Serialized form of an entry. Entities are written as their raw bits.
#[derive(Serialize)]
struct AfflictionLogRecord<'a> {
    timestamp: f32,
    event_type: AfflictionLogEventType,
    target: Option<u64>,
    message: &'a str,
}

/// The affliction log resource
#[derive(Resource, Default)]
pub struct AfflictionLog {
    /// All entries in chronological order
    pub entries: Vec<AfflictionLogEntry>,
    /// Simulated time of the current tick
    pub current_time: f32,
}

impl AfflictionLog {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_time = 0.0;
    }

    pub fn log(&mut self, event_type: AfflictionLogEventType, target: Option<Entity>, message: String) {
        self.entries.push(AfflictionLogEntry {
            timestamp: self.current_time,
            event_type,
            target,
            message,
        });
    }

    pub fn filter_by_type(&self, event_type: AfflictionLogEventType) -> Vec<&AfflictionLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn count(&self, event_type: AfflictionLogEventType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    /// Every entry about `target`, in order
    pub fn history(&self, target: Entity) -> Vec<&AfflictionLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.target == Some(target))
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&AfflictionLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Write the log as a JSON array to `path`
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let records: Vec<AfflictionLogRecord> = self
            .entries
            .iter()
            .map(|e| AfflictionLogRecord {
                timestamp: e.timestamp,
                event_type: e.event_type,
                target: e.target.map(Entity::to_bits),
                message: &e.message,
            })
            .collect();
        let contents = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, contents)?;
        info!("Saved affliction log ({} entries) to {:?}", records.len(), path);
        Ok(())
    }
}
