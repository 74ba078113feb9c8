//! Poller outcomes against a scripted status source.
//!
//! Each query pops the next scripted state; the number of queries made
//! is recorded so terminal states can be shown never to be re-queried.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use assert_matches::assert_matches;
use async_trait::async_trait;

use luma_api::messages::{Assets, Generation, GenerationState};
use luma_api::{wait_for_asset, wait_for_generation, GenerationSource, LumaError};
use luma_core::output_path::AssetKind;
use luma_core::polling::PollConfig;

struct ScriptedSource {
    states: Mutex<VecDeque<Generation>>,
    queries: AtomicUsize,
}

impl ScriptedSource {
    fn new(states: Vec<Generation>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            queries: AtomicUsize::new(0),
        }
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationSource for ScriptedSource {
    async fn fetch_generation(&self, id: &str) -> Result<Generation, LumaError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let next = self.states.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| panic!("generation {id} queried after its script ended")))
    }
}

fn pending() -> Generation {
    Generation {
        id: "gen-cat".into(),
        state: GenerationState::Pending,
        failure_reason: None,
        assets: None,
        generation_type: None,
        model: None,
        created_at: None,
    }
}

fn completed_video(url: &str) -> Generation {
    Generation {
        state: GenerationState::Completed,
        assets: Some(Assets {
            video: Some(url.into()),
            image: None,
        }),
        ..pending()
    }
}

fn failed(reason: &str) -> Generation {
    Generation {
        state: GenerationState::Failed,
        failure_reason: Some(reason.into()),
        ..pending()
    }
}

// ---------------------------------------------------------------------------
// Test: completion after pending iterations
// ---------------------------------------------------------------------------

/// A job that is pending once and completes on the second query yields its
/// video URL and no error.
#[tokio::test(start_paused = true)]
async fn completed_after_two_iterations_returns_asset_url() {
    let source = ScriptedSource::new(vec![pending(), completed_video("https://x/video.mp4")]);

    let (generation, url) = wait_for_asset(
        &source,
        "gen-cat",
        AssetKind::Video,
        &PollConfig::video(),
        None,
    )
    .await
    .expect("poll should succeed");

    assert_eq!(url, "https://x/video.mp4");
    assert_eq!(generation.state, GenerationState::Completed);
    assert_eq!(source.queries(), 2);
}

// ---------------------------------------------------------------------------
// Test: remote failure
// ---------------------------------------------------------------------------

/// A job reported failed on the first query aborts immediately with the
/// server's reason, and is never queried again.
#[tokio::test(start_paused = true)]
async fn failed_on_first_query_aborts_with_reason() {
    let source = ScriptedSource::new(vec![failed("NSFW content detected")]);

    let err = wait_for_generation(&source, "gen-cat", &PollConfig::video(), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("NSFW content detected"));
    assert_matches!(err, LumaError::GenerationFailed { ref reason, .. } if reason == "NSFW content detected");
    assert_eq!(source.queries(), 1);
}

/// A failure after several pending observations is also terminal.
#[tokio::test(start_paused = true)]
async fn failure_after_pending_is_terminal() {
    let source = ScriptedSource::new(vec![pending(), pending(), failed("model overloaded")]);

    let err = wait_for_generation(&source, "gen-cat", &PollConfig::image(), None)
        .await
        .unwrap_err();

    assert_matches!(err, LumaError::GenerationFailed { .. });
    assert_eq!(source.queries(), 3);
}

/// A fixed interval with no bound keeps polling a long job to the end.
#[tokio::test(start_paused = true)]
async fn fixed_interval_config_waits_through_long_jobs() {
    let mut states: Vec<Generation> = (0..50).map(|_| pending()).collect();
    states.push(completed_video("https://x/long.mp4"));
    let source = ScriptedSource::new(states);

    let config = PollConfig::fixed(std::time::Duration::from_secs(3));
    let generation = wait_for_generation(&source, "gen-cat", &config, None)
        .await
        .expect("fixed polling never gives up");

    assert_eq!(generation.state, GenerationState::Completed);
    assert_eq!(source.queries(), 51);
}
