//! Append-only per-day log partitions.
//!
//! One JSONL file per calendar day (`audit-YYYY-MM-DD.jsonl`), rotated by
//! naming alone. Appends are atomic at the granularity of one event: the
//! serialized line is written in a single `write_all` under an exclusive
//! advisory lock, so concurrent appends from different sessions never
//! interleave within a record. Nothing is ever overwritten or deleted.

use chrono::{NaiveDate, Utc};
use cordon_core::{ContentHash, EventId, SessionId};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{AuditError, AuditResult};
use crate::event::{AuditEvent, AuditKind, EventOutcome};

/// The append-only audit log.
pub struct AuditLog {
    dir: PathBuf,
    chain_heads: RwLock<HashMap<SessionId, ContentHash>>,
}

impl AuditLog {
    /// Open (or create) an audit log rooted at `dir`.
    ///
    /// Chain heads for sessions already present in today's partition are
    /// recovered so appends continue the existing chains.
    ///
    /// # Errors
    ///
    /// Returns an io error if the directory cannot be created or today's
    /// partition cannot be read.
    pub fn open(dir: impl Into<PathBuf>) -> AuditResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let log = Self {
            dir,
            chain_heads: RwLock::new(HashMap::new()),
        };
        log.recover_chain_heads()?;
        Ok(log)
    }

    /// Path of the partition for a given date.
    #[must_use]
    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("audit-{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Append an event for a session, linking it to the session's chain.
    ///
    /// # Errors
    ///
    /// Returns an io or serialization error; on error nothing is written.
    pub fn append(&self, session_id: &SessionId, kind: AuditKind) -> AuditResult<AuditEvent> {
        let previous_hash = {
            let heads = self.chain_heads.read().unwrap_or_else(|e| {
                warn!("AuditLog read lock poisoned, recovering");
                e.into_inner()
            });
            heads.get(session_id).copied().unwrap_or_else(ContentHash::zero)
        };

        let event = AuditEvent::create(session_id.clone(), kind, previous_hash);
        let mut line =
            serde_json::to_vec(&event).map_err(|e| AuditError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let path = self.partition_path(Utc::now().date_naive());
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        FileExt::lock_exclusive(&file)?;
        let write_result = (&file).write_all(&line).and_then(|()| (&file).flush());
        let unlock_result = fs2::FileExt::unlock(&file);
        write_result?;
        unlock_result?;

        let head = event.content_hash()?;
        let mut heads = self.chain_heads.write().unwrap_or_else(|e| {
            warn!("AuditLog lock poisoned, recovering");
            e.into_inner()
        });
        heads.insert(session_id.clone(), head);

        debug!(event = %event.id, session = %session_id, "appended audit event");
        Ok(event)
    }

    /// Append the completion half for a previously evaluated command.
    ///
    /// The original record is never mutated; a second event referencing it
    /// is appended instead.
    ///
    /// # Errors
    ///
    /// Returns an io or serialization error.
    pub fn record_completion(
        &self,
        session_id: &SessionId,
        command_event: EventId,
        outcome: EventOutcome,
        duration_ms: u64,
    ) -> AuditResult<AuditEvent> {
        self.append(
            session_id,
            AuditKind::CommandCompleted {
                command_event,
                outcome,
                duration_ms,
            },
        )
    }

    /// Stream-read one partition, oldest event first.
    ///
    /// Missing partitions read as empty (a day with no activity).
    ///
    /// # Errors
    ///
    /// Returns an io error on read failure or a serialization error for a
    /// corrupt line.
    pub fn read_partition(&self, date: NaiveDate) -> AuditResult<Vec<AuditEvent>> {
        let path = self.partition_path(date);
        read_partition_file(&path)
    }

    /// All events for one session across the last `days` partitions,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns an io or serialization error.
    pub fn events_for_session(
        &self,
        session_id: &SessionId,
        days: u32,
    ) -> AuditResult<Vec<AuditEvent>> {
        let mut events = Vec::new();
        for date in recent_dates(days) {
            for event in self.read_partition(date)? {
                if event.session_id == *session_id {
                    events.push(event);
                }
            }
        }
        Ok(events)
    }

    /// Verify the per-session hash chain over the last `days` partitions.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::ChainBroken`] at the first event whose
    /// back-link does not match, or an io/serialization error.
    pub fn verify_chain(&self, session_id: &SessionId, days: u32) -> AuditResult<usize> {
        let events = self.events_for_session(session_id, days)?;
        let mut previous: Option<&AuditEvent> = None;
        for event in &events {
            let ok = match previous {
                None => event.previous_hash == ContentHash::zero(),
                Some(prev) => event.follows(prev),
            };
            if !ok {
                return Err(AuditError::ChainBroken {
                    event_id: event.id.to_string(),
                });
            }
            previous = Some(event);
        }
        Ok(events.len())
    }

    /// Stream all events over the last `days` partitions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an io or serialization error.
    pub fn events_in_window(&self, days: u32) -> AuditResult<Vec<AuditEvent>> {
        let mut events = Vec::new();
        for date in recent_dates(days) {
            events.extend(self.read_partition(date)?);
        }
        Ok(events)
    }

    /// Recover chain heads from today's partition after a restart.
    fn recover_chain_heads(&self) -> AuditResult<()> {
        let today = self.read_partition(Utc::now().date_naive())?;
        if today.is_empty() {
            return Ok(());
        }
        let mut heads = self.chain_heads.write().unwrap_or_else(|e| {
            warn!("AuditLog lock poisoned, recovering");
            e.into_inner()
        });
        for event in &today {
            heads.insert(event.session_id.clone(), event.content_hash()?);
        }
        debug!(sessions = heads.len(), "recovered audit chain heads");
        Ok(())
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

/// The last `days` calendar dates, oldest first, ending today.
fn recent_dates(days: u32) -> Vec<NaiveDate> {
    let today = Utc::now().date_naive();
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(u64::from(back))))
        .collect()
}

fn read_partition_file(path: &Path) -> AuditResult<Vec<AuditEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: AuditEvent = serde_json::from_str(&line)
            .map_err(|e| AuditError::Serialization(e.to_string()))?;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordon_core::{Decision, Tier};
    use tempfile::TempDir;

    fn evaluated(raw: &str, tier: Tier, decision: Decision) -> AuditKind {
        AuditKind::CommandEvaluated {
            tool: "shell".to_string(),
            raw_command: raw.to_string(),
            sub_commands: vec![raw.to_string()],
            tier: Some(tier),
            rule_id: Some("safe.ls".to_string()),
            category: None,
            compound_bypass: false,
            decision,
        }
    }

    #[test]
    fn test_append_and_read() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let session = SessionId::new();

        log.append(&session, evaluated("ls", Tier::ReadOnly, Decision::Allow))
            .unwrap();
        log.append(&session, evaluated("pwd", Tier::ReadOnly, Decision::Allow))
            .unwrap();

        let events = log.read_partition(Utc::now().date_naive()).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_chain_is_linked_and_verifies() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let session = SessionId::new();

        for i in 0..3 {
            log.append(
                &session,
                evaluated(&format!("cmd{i}"), Tier::ReadOnly, Decision::Allow),
            )
            .unwrap();
        }

        let count = log.verify_chain(&session, 1).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_chains_are_per_session() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let a = SessionId::new();
        let b = SessionId::new();

        let first_a = log
            .append(&a, evaluated("ls", Tier::ReadOnly, Decision::Allow))
            .unwrap();
        let first_b = log
            .append(&b, evaluated("pwd", Tier::ReadOnly, Decision::Allow))
            .unwrap();

        // Both chains start at the zero hash.
        assert_eq!(first_a.previous_hash, ContentHash::zero());
        assert_eq!(first_b.previous_hash, ContentHash::zero());

        log.verify_chain(&a, 1).unwrap();
        log.verify_chain(&b, 1).unwrap();
    }

    #[test]
    fn test_completion_is_a_second_event() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let session = SessionId::new();

        let evaluated_event = log
            .append(&session, evaluated("ls", Tier::ReadOnly, Decision::Allow))
            .unwrap();
        log.record_completion(
            &session,
            evaluated_event.id.clone(),
            EventOutcome::success(),
            42,
        )
        .unwrap();

        let events = log.events_for_session(&session, 1).unwrap();
        assert_eq!(events.len(), 2);
        match &events[1].kind {
            AuditKind::CommandCompleted {
                command_event,
                duration_ms,
                ..
            } => {
                assert_eq!(*command_event, evaluated_event.id);
                assert_eq!(*duration_ms, 42);
            },
            other => panic!("expected completion event, got {other:?}"),
        }
    }

    #[test]
    fn test_heads_recovered_after_reopen() {
        let dir = TempDir::new().unwrap();
        let session = SessionId::new();

        {
            let log = AuditLog::open(dir.path()).unwrap();
            log.append(&session, evaluated("ls", Tier::ReadOnly, Decision::Allow))
                .unwrap();
        }

        // Reopen: the chain must continue, not restart at zero.
        let log = AuditLog::open(dir.path()).unwrap();
        let second = log
            .append(&session, evaluated("pwd", Tier::ReadOnly, Decision::Allow))
            .unwrap();
        assert_ne!(second.previous_hash, ContentHash::zero());
        log.verify_chain(&session, 1).unwrap();
    }

    #[test]
    fn test_missing_partition_reads_empty() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let yesterday = Utc::now()
            .date_naive()
            .checked_sub_days(chrono::Days::new(1))
            .unwrap();
        assert!(log.read_partition(yesterday).unwrap().is_empty());
    }

    #[test]
    fn test_partition_name_contains_date() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let path = log.partition_path(date);
        assert!(path.to_string_lossy().ends_with("audit-2026-08-06.jsonl"));
    }
}
