//! Lifecycle tests driving the orchestrator directly against the store

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use image_gen_relay::{
    error::Result,
    generation::{
        orchestrator::Orchestrator, store::GenerationStore, GenerationRequest, GenerationStatus,
    },
    provider::{GenerationProvider, ProviderOutput},
};

/// Provider that blocks until released, so in-flight states are observable
struct GatedProvider {
    release: Arc<Semaphore>,
    result_url: String,
}

#[async_trait]
impl GenerationProvider for GatedProvider {
    async fn generate(&self, _prompt: &str, _image_urls: &[String]) -> Result<ProviderOutput> {
        let permit = self.release.acquire().await.expect("gate closed");
        permit.forget();
        Ok(ProviderOutput::Url(self.result_url.clone()))
    }
}

fn request() -> GenerationRequest {
    GenerationRequest {
        prompt: "make it blue".to_string(),
        image_urls: vec!["https://x/a.png".to_string()],
    }
}

async fn wait_for_status(
    store: &GenerationStore,
    id: &str,
    status: GenerationStatus,
) -> bool {
    for _ in 0..200 {
        if store.get(id).map(|r| r.status) == Some(status) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_submit_returns_before_generation_runs() {
    let release = Arc::new(Semaphore::new(0));
    let store = Arc::new(GenerationStore::new());
    let orchestrator = Orchestrator::new(
        store.clone(),
        Arc::new(GatedProvider {
            release: release.clone(),
            result_url: "https://cdn/out.png".to_string(),
        }),
    );

    // Provider is still blocked; submit must not wait on it
    let record = orchestrator.submit(request()).await.unwrap();
    assert_eq!(record.status, GenerationStatus::Pending);

    // Job reaches processing while the external call is in flight
    assert!(wait_for_status(&store, &record.id, GenerationStatus::Processing).await);
    let in_flight = store.get(&record.id).unwrap();
    assert!(in_flight.result_url.is_none());
    assert!(in_flight.error.is_none());
    assert!(in_flight.completed_at.is_none());

    // Release the provider and observe the terminal transition
    release.add_permits(1);
    assert!(wait_for_status(&store, &record.id, GenerationStatus::Completed).await);

    let done = store.get(&record.id).unwrap();
    assert_eq!(done.result_url.as_deref(), Some("https://cdn/out.png"));
    assert!(done.error.is_none());
    assert!(done.completed_at.is_some());
}

#[tokio::test]
async fn test_status_never_regresses_after_terminal() {
    let release = Arc::new(Semaphore::new(0));
    let store = Arc::new(GenerationStore::new());
    let orchestrator = Orchestrator::new(
        store.clone(),
        Arc::new(GatedProvider {
            release: release.clone(),
            result_url: "https://cdn/out.png".to_string(),
        }),
    );

    let record = orchestrator.submit(request()).await.unwrap();
    release.add_permits(1);
    assert!(wait_for_status(&store, &record.id, GenerationStatus::Completed).await);

    // Repeated reads keep showing the terminal state
    for _ in 0..5 {
        let read = store.get(&record.id).unwrap();
        assert_eq!(read.status, GenerationStatus::Completed);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_concurrent_submissions_are_independent() {
    let release = Arc::new(Semaphore::new(0));
    let store = Arc::new(GenerationStore::new());
    let orchestrator = Orchestrator::new(
        store.clone(),
        Arc::new(GatedProvider {
            release: release.clone(),
            result_url: "https://cdn/out.png".to_string(),
        }),
    );

    let first = orchestrator.submit(request()).await.unwrap();
    let second = orchestrator.submit(request()).await.unwrap();
    assert_ne!(first.id, second.id);

    // Release both in-flight calls
    release.add_permits(2);

    assert!(wait_for_status(&store, &first.id, GenerationStatus::Completed).await);
    assert!(wait_for_status(&store, &second.id, GenerationStatus::Completed).await);
}
