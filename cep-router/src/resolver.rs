//! Races the two upstream lookups for a postal code.

use crate::cep::{Cep, FetchOutcome, ProviderResult};
use crate::errors::{ResolveError, UpstreamError, UpstreamFailure};
use crate::metrics_defs::UPSTREAM_LOOKUPS;
use crate::upstream::UpstreamClient;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until};

/// Resolves a postal code against two interchangeable upstreams.
///
/// Both lookups start at call time and share one deadline. The first success
/// wins. If both fail before the deadline the result is
/// [`ResolveError::BothFailed`]; if the deadline passes first it is
/// [`ResolveError::Timeout`]. No provider is preferred over the other.
///
/// Each lookup runs in its own task and hands back exactly one value through
/// its join handle, so a branch that finishes after the race is decided never
/// blocks. Pending branches are aborted when `resolve` returns; the abort takes
/// effect at the branch's next await point.
#[derive(Clone)]
pub struct Resolver {
    upstreams: [Arc<dyn UpstreamClient>; 2],
}

impl Resolver {
    pub fn new(first: Arc<dyn UpstreamClient>, second: Arc<dyn UpstreamClient>) -> Self {
        Self {
            upstreams: [first, second],
        }
    }

    pub async fn resolve(&self, cep: &Cep, deadline: Instant) -> FetchOutcome {
        let mut join_set = JoinSet::new();
        let mut task_providers = HashMap::new();

        for upstream in &self.upstreams {
            let upstream = upstream.clone();
            let cep = cep.clone();
            let provider = upstream.name();

            let abort_handle = join_set.spawn(async move {
                let result = upstream.lookup(&cep, deadline).await;
                (provider, result)
            });
            task_providers.insert(abort_handle.id(), provider);
        }

        let total = join_set.len();
        let mut failures = Vec::with_capacity(total);

        let timeout = sleep_until(deadline);
        tokio::pin!(timeout);

        // Returning drops `join_set`, which aborts any lookup still in flight.
        loop {
            tokio::select! {
                biased;

                Some(join_result) = join_set.join_next_with_id() => {
                    let (provider, result) = match join_result {
                        Ok((_, output)) => output,
                        Err(e) => {
                            tracing::error!("Upstream task failed: {e}");
                            let provider = task_providers.get(&e.id()).copied().unwrap_or("unknown");
                            (provider, Err(UpstreamError::Transport(e.to_string())))
                        }
                    };

                    match result {
                        Ok(record) => {
                            record_lookup(provider, "success");
                            tracing::debug!(provider, %cep, "Resolved");
                            return Ok(ProviderResult { provider, record });
                        }
                        Err(error) => {
                            record_lookup(provider, "failure");
                            failures.push(UpstreamFailure { provider, error });
                        }
                    }

                    if failures.len() == total {
                        tracing::warn!(%cep, "All upstreams failed");
                        return Err(ResolveError::BothFailed { failures });
                    }
                }
                _ = &mut timeout => {
                    let failed = failures.len();
                    tracing::warn!(
                        %cep,
                        failed,
                        "Deadline reached, aborting {} pending lookups",
                        join_set.len()
                    );
                    return Err(ResolveError::Timeout { failed });
                }
            }
        }
    }
}

fn record_lookup(provider: &'static str, result: &'static str) {
    shared::counter!(UPSTREAM_LOOKUPS, "provider" => provider, "result" => result).increment(1);
}
