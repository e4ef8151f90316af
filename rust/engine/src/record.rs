//! Hand records serialized to JSONL for storage and replay.

use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cards::Card;
use crate::context::now_rfc3339;
use crate::engine::PlayerId;
use crate::player::PlayerAction;
use crate::poker::Phase;

/// One player action with the phase it happened in.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub phase: Phase,
    pub action: PlayerAction,
}

/// Complete record of one poker hand, one JSON object per line on disk.
/// The seed plus the action list reproduce the hand exactly.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Format: YYYYMMDD-NNNNNN.
    pub hand_id: String,
    /// Match randomizer seed, for deterministic replay.
    pub seed: Option<u64>,
    pub actions: Vec<ActionRecord>,
    pub board: Vec<Card>,
    pub winners: Vec<PlayerId>,
    pub pot: u32,
    #[serde(default)]
    pub showdown: bool,
    /// RFC3339 timestamp, injected at write time when absent.
    #[serde(default)]
    pub ts: Option<String>,
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Appends hand records to a JSONL file, flushing per record so a crashed
/// match loses at most the hand in flight.
pub struct RecordWriter {
    writer: BufWriter<File>,
    date: String,
    seq: u32,
}

impl RecordWriter {
    pub fn create<P: AsRef<Path>>(path: P, date: &str) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            date: date.to_string(),
            seq: 0,
        })
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(now_rfc3339());
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_ids_are_sequential_and_padded() {
        assert_eq!(format_hand_id("20260823", 1), "20260823-000001");
        assert_eq!(format_hand_id("20260823", 123456), "20260823-123456");
    }

    #[test]
    fn records_round_trip_through_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.jsonl");
        let mut writer = RecordWriter::create(&path, "20260823").unwrap();

        let record = HandRecord {
            hand_id: writer.next_id(),
            seed: Some(42),
            actions: vec![ActionRecord {
                player: 0,
                phase: Phase::Preflop,
                action: PlayerAction::Raise { amount: 300 },
            }],
            board: Vec::new(),
            winners: vec![0],
            pot: 650,
            showdown: false,
            ts: None,
        };
        writer.write(&record).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let back: HandRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(back.hand_id, "20260823-000001");
        assert_eq!(back.pot, 650);
        assert!(back.ts.is_some(), "timestamp injected at write time");
    }
}
