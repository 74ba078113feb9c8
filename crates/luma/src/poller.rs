//! Status polling for submitted generations.
//!
//! [`wait_for_generation`] turns a fire-and-forget submission into a
//! terminal result: it queries the generation until it is `completed`
//! or `failed`, sleeping between queries with the capped backoff from
//! [`PollConfig`]. The wait is bounded by [`PollConfig::max_wait`] and
//! can be cut short with a [`CancellationToken`].

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use luma_core::output_path::AssetKind;
use luma_core::polling::{next_delay, PollConfig};

use crate::error::LumaError;
use crate::messages::{Generation, GenerationState};

/// Anything that can report the current record of a generation.
#[async_trait]
pub trait GenerationSource: Send + Sync {
    async fn fetch_generation(&self, generation_id: &str) -> Result<Generation, LumaError>;
}

/// Poll a generation until it reaches a terminal state.
///
/// Returns the completed generation, or:
/// - [`LumaError::GenerationFailed`] as soon as `failed` is observed,
/// - [`LumaError::TimedOut`] when the next sleep would pass `max_wait`,
/// - [`LumaError::Cancelled`] when `cancel` fires,
/// - the query error itself once more than `max_transient_errors`
///   consecutive transient failures occur, or on any non-transient one.
pub async fn wait_for_generation<S>(
    source: &S,
    generation_id: &str,
    config: &PollConfig,
    cancel: Option<&CancellationToken>,
) -> Result<Generation, LumaError>
where
    S: GenerationSource + ?Sized,
{
    config.validate()?;

    let started = Instant::now();
    let mut delay = config.interval;
    let mut attempt = 0u32;
    let mut transient_errors = 0u32;

    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(cancelled(generation_id));
        }

        attempt += 1;
        match source.fetch_generation(generation_id).await {
            Ok(generation) => {
                transient_errors = 0;
                match generation.state {
                    GenerationState::Completed => {
                        tracing::info!(
                            generation_id,
                            attempt,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Generation completed",
                        );
                        return Ok(generation);
                    }
                    GenerationState::Failed => {
                        let reason = generation
                            .failure_reason
                            .unwrap_or_else(|| "no reason given".to_string());
                        tracing::warn!(generation_id, attempt, %reason, "Generation failed");
                        return Err(LumaError::GenerationFailed {
                            id: generation_id.to_string(),
                            reason,
                        });
                    }
                    GenerationState::Pending => {
                        tracing::debug!(
                            generation_id,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Generation pending",
                        );
                    }
                }
            }
            Err(e) if e.is_transient() && transient_errors < config.max_transient_errors => {
                transient_errors += 1;
                tracing::warn!(
                    generation_id,
                    attempt,
                    error = %e,
                    "Status query failed ({transient_errors}/{}), retrying",
                    config.max_transient_errors,
                );
            }
            Err(e) => return Err(e),
        }

        let waited = started.elapsed();
        if let Some(max_wait) = config.max_wait {
            if waited + delay > max_wait {
                tracing::warn!(
                    generation_id,
                    attempt,
                    waited_ms = waited.as_millis() as u64,
                    "Gave up waiting for generation",
                );
                return Err(LumaError::TimedOut {
                    id: generation_id.to_string(),
                    waited,
                });
            }
        }

        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return Err(cancelled(generation_id)),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => tokio::time::sleep(delay).await,
        }

        delay = next_delay(delay, config);
    }
}

/// Wait for a generation and return it with the URL of its `kind` asset.
pub async fn wait_for_asset<S>(
    source: &S,
    generation_id: &str,
    kind: AssetKind,
    config: &PollConfig,
    cancel: Option<&CancellationToken>,
) -> Result<(Generation, String), LumaError>
where
    S: GenerationSource + ?Sized,
{
    let generation = wait_for_generation(source, generation_id, config, cancel).await?;
    let url = generation
        .asset_url(kind)
        .map(str::to_string)
        .ok_or_else(|| LumaError::MissingAsset {
            id: generation_id.to_string(),
            kind,
        })?;
    Ok((generation, url))
}

fn cancelled(generation_id: &str) -> LumaError {
    tracing::info!(generation_id, "Generation wait cancelled");
    LumaError::Cancelled {
        id: generation_id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
