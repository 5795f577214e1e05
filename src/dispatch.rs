use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use futures::{StreamExt, stream::FuturesUnordered};
use serde::Serialize;

use crate::constants::{LOOKUP_TIMEOUT, MAX_BATCH_SIZE};
use crate::error::{FetchError, LookupError};
use crate::npi::{DisplayRecord, Npi, normalize};
use crate::registry::ProviderRegistry;

#[derive(Debug, Clone, Copy)]
pub struct LookupConfig {
    /// Deadline applied to each registry call on its own.
    pub timeout: Duration,
    pub max_batch: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout: LOOKUP_TIMEOUT,
            max_batch: MAX_BATCH_SIZE,
        }
    }
}

/// Result for one requested NPI: a full record or an error tag, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LookupOutcome {
    Found(DisplayRecord),
    Failed(FailedLookup),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedLookup {
    pub npi: String,
    pub error: String,
}

/// Splits a comma-separated list, keeping well-formed NPIs in input order.
pub fn parse_candidates(raw: &str, max_batch: usize) -> Result<Vec<Npi>, LookupError> {
    let npis: Vec<Npi> = raw
        .split(',')
        .filter_map(Npi::parse)
        .take(max_batch)
        .collect();
    if npis.is_empty() {
        return Err(LookupError::NoValidInput);
    }
    Ok(npis)
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn ProviderRegistry>,
    config: LookupConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn ProviderRegistry>, config: LookupConfig) -> Self {
        Self { registry, config }
    }

    pub async fn lookup(&self, raw_npis: &str) -> Result<Vec<LookupOutcome>, LookupError> {
        let npis = parse_candidates(raw_npis, self.config.max_batch)?;
        tracing::info!(count = npis.len(), "Looking up NPIs");
        self.lookup_all(npis).await
    }

    /// Runs one registry lookup per NPI concurrently and returns outcomes in
    /// the order the NPIs were given.
    pub async fn lookup_all(&self, npis: Vec<Npi>) -> Result<Vec<LookupOutcome>, LookupError> {
        let total = npis.len();
        let mut in_flight = FuturesUnordered::new();
        for (idx, npi) in npis.into_iter().enumerate() {
            let registry = Arc::clone(&self.registry);
            let timeout = self.config.timeout;
            in_flight.push(tokio::spawn(async move {
                let outcome = lookup_one(registry.as_ref(), npi, timeout).await;
                (idx, outcome)
            }));
        }

        let mut slots: Vec<Option<LookupOutcome>> = vec![None; total];
        while let Some(joined) = in_flight.next().await {
            let (idx, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    // Dropping a JoinHandle detaches its task; stop the siblings explicitly.
                    for pending in in_flight.iter() {
                        pending.abort();
                    }
                    return Err(LookupError::Internal(anyhow!("NPI lookup task failed: {e}")));
                }
            };
            slots[idx] = Some(outcome);
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| LookupError::Internal(anyhow!("NPI lookup batch lost a result")))
    }
}

async fn lookup_one(
    registry: &dyn ProviderRegistry,
    npi: Npi,
    timeout: Duration,
) -> LookupOutcome {
    let fetched = match tokio::time::timeout(timeout, registry.fetch(&npi)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(npi.to_string())),
    };

    match fetched {
        Ok(raw) => LookupOutcome::Found(normalize(&npi, &raw)),
        Err(err) => {
            tracing::warn!(npi = %npi, error = %err, "NPI lookup failed");
            LookupOutcome::Failed(FailedLookup {
                npi: npi.to_string(),
                error: err.public_message().to_string(),
            })
        }
    }
}
