//! # Redis
//!
//! Durable progress storage.
//!
//! Core purpose is to store and look up per-session game progress, with
//! saves that are safe against concurrent submissions for the same session
//! (duplicate network retries, multiple tabs).
//!
//! ## Requirements
//!
//! - Fast lookups by session id
//! - Small records, one per anonymous session
//! - Lost-update safety within a session: play counts are never dropped,
//!   best score stays a monotonic max, unlock/achievement lists only grow
//! - No coordination across sessions
//!
//! ## Implementation
//!
//! - One Redis hash per session: `progress:{sessionId}`
//! - `data` field holds the JSON record, `version` a change counter
//! - Saves run a Lua compare-and-set on `version`; a stale writer gets a
//!   conflict back and re-evaluates against the fresh record instead of
//!   overwriting it
//! - A missing hash counts as version 0, so first-write creation races
//!   resolve the same way

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;

use crate::progress::SessionProgress;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("progress store unavailable: {0}")]
    Unavailable(#[from] redis::RedisError),

    #[error("stored progress is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Another writer bumped the version first; reload and retry.
    Conflict,
}

pub struct VersionedProgress {
    pub version: u64,
    pub progress: SessionProgress,
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<VersionedProgress>, StoreError>;

    /// Persists the record iff the stored version still equals
    /// `expected_version` (0 for a record that does not exist yet).
    async fn save(
        &self,
        expected_version: u64,
        progress: &SessionProgress,
    ) -> Result<SaveOutcome, StoreError>;
}

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).unwrap();

    client
        .get_connection_manager_with_config(config)
        .await
        .unwrap()
}

const SAVE_SCRIPT: &str = r#"
local version = redis.call('HGET', KEYS[1], 'version')
if version == false then
    version = '0'
end
if version ~= ARGV[1] then
    return 0
end
redis.call('HSET', KEYS[1], 'version', ARGV[2], 'data', ARGV[3])
return 1
"#;

fn progress_key(session_id: &str) -> String {
    format!("progress:{session_id}")
}

pub struct RedisProgressStore {
    connection: ConnectionManager,
    save_script: Script,
}

impl RedisProgressStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            save_script: Script::new(SAVE_SCRIPT),
        }
    }
}

#[async_trait]
impl ProgressStore for RedisProgressStore {
    async fn load(&self, session_id: &str) -> Result<Option<VersionedProgress>, StoreError> {
        let mut connection = self.connection.clone();

        let (version, data): (Option<u64>, Option<String>) = redis::cmd("HMGET")
            .arg(progress_key(session_id))
            .arg("version")
            .arg("data")
            .query_async(&mut connection)
            .await?;

        match (version, data) {
            (Some(version), Some(data)) => Ok(Some(VersionedProgress {
                version,
                progress: serde_json::from_str(&data)?,
            })),
            _ => Ok(None),
        }
    }

    async fn save(
        &self,
        expected_version: u64,
        progress: &SessionProgress,
    ) -> Result<SaveOutcome, StoreError> {
        let data = serde_json::to_string(progress)?;
        let mut connection = self.connection.clone();

        let applied: i64 = self
            .save_script
            .key(progress_key(&progress.session_id))
            .arg(expected_version)
            .arg(expected_version + 1)
            .arg(data)
            .invoke_async(&mut connection)
            .await?;

        if applied == 1 {
            Ok(SaveOutcome::Saved)
        } else {
            Ok(SaveOutcome::Conflict)
        }
    }
}

/// Mutex-guarded map with the same compare-and-set contract as the Redis
/// store. Backs the test suite and redis-less local runs.
#[derive(Default)]
pub struct MemoryProgressStore {
    records: Mutex<HashMap<String, (u64, SessionProgress)>>,
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self, session_id: &str) -> Result<Option<VersionedProgress>, StoreError> {
        let records = self.records.lock().unwrap();

        Ok(records
            .get(session_id)
            .map(|(version, progress)| VersionedProgress {
                version: *version,
                progress: progress.clone(),
            }))
    }

    async fn save(
        &self,
        expected_version: u64,
        progress: &SessionProgress,
    ) -> Result<SaveOutcome, StoreError> {
        let mut records = self.records.lock().unwrap();

        let current = records
            .get(&progress.session_id)
            .map(|(version, _)| *version)
            .unwrap_or(0);

        if current != expected_version {
            return Ok(SaveOutcome::Conflict);
        }

        records.insert(
            progress.session_id.clone(),
            (expected_version + 1, progress.clone()),
        );

        Ok(SaveOutcome::Saved)
    }
}
