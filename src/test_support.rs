//! In-memory registry used by dispatcher and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::npi::Npi;
use crate::registry::{ProviderRegistry, RawBasic, RawProviderRecord};

pub enum MockReply {
    Record(RawProviderRecord),
    Delayed(Duration, RawProviderRecord),
    NotFound,
    Upstream(String),
    Panic,
}

/// Replies are keyed by NPI; unknown NPIs answer as not found.
pub struct MockRegistry {
    replies: HashMap<String, MockReply>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, npi: &str, reply: MockReply) -> Self {
        self.replies.insert(npi.to_string(), reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Delayed replies that ran to the end of their sleep.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderRegistry for MockRegistry {
    async fn fetch(&self, npi: &Npi) -> Result<RawProviderRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(npi.as_str()) {
            Some(MockReply::Record(record)) => Ok(record.clone()),
            Some(MockReply::Delayed(delay, record)) => {
                tokio::time::sleep(*delay).await;
                self.completed.fetch_add(1, Ordering::SeqCst);
                Ok(record.clone())
            }
            Some(MockReply::Upstream(reason)) => {
                Err(FetchError::upstream(npi.as_str(), reason.clone()))
            }
            Some(MockReply::Panic) => panic!("mock registry exploded for {npi}"),
            Some(MockReply::NotFound) | None => Err(FetchError::NotFound(npi.to_string())),
        }
    }
}

pub fn individual_record(first: &str, last: &str) -> RawProviderRecord {
    RawProviderRecord {
        enumeration_type: Some("NPI-1".into()),
        basic: RawBasic {
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            sex: Some("F".into()),
            last_updated: Some("2021-08-23".into()),
            ..Default::default()
        },
        ..Default::default()
    }
}
