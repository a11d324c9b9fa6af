//! Scripted in-memory store for exercising the flush state machine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use fluent_redis_events::{Event, EventTime, Fields, FlatRecord, encode_events};
use fluent_redis_store::{Connector, HashStore, StoreError};

/// Failure injected into a specific `HSET` attempt.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Connection,
    Application,
}

/// Everything the fake store observed.
#[derive(Debug, Default)]
pub struct Ledger {
    pub connects: usize,
    pub refused_connects: usize,
    pub closes: usize,
    /// `HSET` calls, including failed ones.
    pub attempts: usize,
    /// Successful writes in order.
    pub writes: Vec<(String, Vec<Vec<u8>>)>,
    /// Current store contents.
    pub entries: HashMap<String, Vec<Vec<u8>>>,
    refuse_connect: bool,
    /// Faults keyed by 1-based attempt number.
    faults: HashMap<usize, Fault>,
}

impl Ledger {
    pub fn keys(&self) -> Vec<&str> {
        self.writes.iter().map(|(k, _)| k.as_str()).collect()
    }
}

#[derive(Clone, Default)]
pub struct ScriptedConnector {
    ledger: Arc<Mutex<Ledger>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `attempt`-th `HSET` (1-based, counted over the connector's
    /// lifetime) fail with `fault`.
    pub fn fail_attempt(&self, attempt: usize, fault: Fault) {
        self.ledger().faults.insert(attempt, fault);
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.ledger().refuse_connect = refuse;
    }

    pub fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap()
    }
}

pub struct ScriptedStore {
    ledger: Arc<Mutex<Ledger>>,
}

impl Connector for ScriptedConnector {
    type Store = ScriptedStore;

    async fn connect(&self) -> Result<ScriptedStore, StoreError> {
        let mut ledger = self.ledger();
        if ledger.refuse_connect {
            ledger.refused_connects += 1;
            return Err(StoreError::Connection("connection refused".to_owned()));
        }
        ledger.connects += 1;
        Ok(ScriptedStore {
            ledger: Arc::clone(&self.ledger),
        })
    }
}

impl HashStore for ScriptedStore {
    async fn hset(&self, key: &str, record: FlatRecord) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.attempts += 1;
        let attempt = ledger.attempts;
        match ledger.faults.remove(&attempt) {
            Some(Fault::Connection) => Err(StoreError::Connection("broken pipe".to_owned())),
            Some(Fault::Application) => Err(StoreError::Application(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_owned(),
            )),
            None => {
                let args = record.into_args();
                ledger.writes.push((key.to_owned(), args.clone()));
                ledger.entries.insert(key.to_owned(), args);
                Ok(())
            }
        }
    }

    async fn close(self) {
        self.ledger.lock().unwrap().closes += 1;
    }
}

/// An event with one `message` field.
pub fn message(seconds: u64, text: &str) -> Event {
    Event::new(EventTime::new(seconds, 0), Fields::new([("message", text)]))
}

/// Encode events into one chunk.
pub fn chunk(events: &[Event]) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_events(events, &mut buf).unwrap();
    buf
}

/// `n` events sharing the same second.
pub fn same_second(n: usize, seconds: u64) -> Vec<Event> {
    (0..n).map(|i| message(seconds, &format!("line {i}"))).collect()
}
