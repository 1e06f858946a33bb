//! Integration tests for the studio state machine

use reelsmith::assets::MemoryAssetStore;
use reelsmith::config::StudioConfig;
use reelsmith::credentials::StaticCredentials;
use reelsmith::error::StudioError;
use reelsmith::generation::prompts::PARSE_FAILURE_MESSAGE;
use reelsmith::generation::StudioPipeline;
use reelsmith::studio::{
    Studio, StudioSnapshot, CREDENTIAL_REMEDIATION, INITIAL_VIDEO_STATUS, VIDEO_STATUS_PHRASES,
};
use reelsmith::types::{LifecycleState, ProductDetails};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::integration::{sample_prompts, MockBackend, MockService, RecordingSleeper};

fn product() -> ProductDetails {
    ProductDetails::new("Aurora Headphones", "Matte aluminium over-ear headphones")
}

fn studio_with(service: Arc<MockService>, creds: Arc<StaticCredentials>) -> Studio {
    Studio::new(service, creds)
}

async fn wait_for_state(studio: &Studio, target: LifecycleState) {
    let mut rx = studio.subscribe();
    while rx.borrow_and_update().state != target {
        rx.changed().await.unwrap();
    }
}

#[tokio::test]
async fn test_submit_enters_generating_prompts_and_locks_inputs() {
    let service = Arc::new(MockService::new().with_prompts(Ok(sample_prompts())).gated());
    let studio = Arc::new(studio_with(
        service.clone(),
        Arc::new(StaticCredentials::new(Some("key"))),
    ));
    assert!(studio.inputs_editable());

    let handle = {
        let studio = studio.clone();
        tokio::spawn(async move { studio.submit(product()).await })
    };
    wait_for_state(&studio, LifecycleState::GeneratingPrompts).await;

    assert!(!studio.inputs_editable());
    assert_eq!(studio.snapshot().product, product());

    // Nothing else may start while the prompt stage is in flight.
    let err = studio.submit(product()).await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::InvalidTransition {
            from: LifecycleState::GeneratingPrompts,
            ..
        }
    ));
    assert!(studio.render().await.is_err());
    assert!(studio.reset().is_err());
    assert_eq!(studio.state(), LifecycleState::GeneratingPrompts);

    service.release_prompts();
    let prompts = handle.await.unwrap().unwrap();
    assert_eq!(prompts, sample_prompts());
    assert_eq!(studio.state(), LifecycleState::PromptsReady);
    assert_eq!(service.prompt_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_prompt_payload_moves_to_error_without_media_calls() {
    let backend = Arc::new(MockBackend::new());
    backend.push_text(r#"{"imagePrompt":"only half"}"#);
    let pipeline = StudioPipeline::with_sleeper(
        backend.clone(),
        Arc::new(MemoryAssetStore::new()),
        &StudioConfig::default(),
        Arc::new(RecordingSleeper::default()),
    );
    let studio = Studio::new(
        Arc::new(pipeline),
        Arc::new(StaticCredentials::new(Some("key"))),
    );

    let err = studio.submit(product()).await.unwrap_err();
    assert_eq!(err.to_string(), PARSE_FAILURE_MESSAGE);

    let snap = studio.snapshot();
    assert_eq!(snap.state, LifecycleState::Error);
    assert_eq!(snap.error.as_deref(), Some(PARSE_FAILURE_MESSAGE));
    assert!(snap.prompts.is_none());
    assert!(snap.inputs_editable());

    assert!(studio.render().await.is_err());
    assert_eq!(backend.image_requests.load(Ordering::SeqCst), 0);
    assert_eq!(backend.video_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_image_failure_is_silent_when_video_succeeds() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Err(StudioError::ImageGeneration(
                "Professional image generation failed to return data.".to_string(),
            )))
            .with_video(Ok("url-1".to_string())),
    );
    let studio = studio_with(service.clone(), Arc::new(StaticCredentials::new(Some("key"))));

    studio.submit(product()).await.unwrap();
    let media = studio.render().await.unwrap();

    assert_eq!(media.image_url, None);
    assert_eq!(media.video_url.as_deref(), Some("url-1"));
    let snap = studio.snapshot();
    assert_eq!(snap.state, LifecycleState::Completed);
    assert_eq!(snap.media, media);
    assert_eq!(snap.error, None);
    assert_eq!(service.image_calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.video_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_entity_video_error_asks_for_new_credential() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Ok("data:image/png;base64,AA==".to_string()))
            .with_video(Err(StudioError::ProviderNotFound(
                "Requested entity was not found.".to_string(),
            ))),
    );
    let creds = Arc::new(StaticCredentials::new(Some("stale")));
    let studio = studio_with(service, creds.clone());

    studio.submit(product()).await.unwrap();
    let media = studio.render().await.unwrap();

    assert!(media.video_url.is_none());
    assert!(media.image_url.is_some());
    let snap = studio.snapshot();
    assert_eq!(snap.state, LifecycleState::Completed);
    assert_eq!(snap.error.as_deref(), Some(CREDENTIAL_REMEDIATION));
    assert_eq!(
        snap.video_status.as_deref(),
        Some("Video production encountered an error.")
    );
    assert_eq!(creds.request_count(), 1);
}

#[tokio::test]
async fn test_render_requests_credential_when_none_configured() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Ok("img".to_string()))
            .with_video(Ok("vid".to_string())),
    );
    let creds = Arc::new(StaticCredentials::new(None).with_replacement("fresh"));
    let studio = studio_with(service, creds.clone());

    studio.submit(product()).await.unwrap();
    assert_eq!(creds.request_count(), 0);

    studio.render().await.unwrap();
    assert_eq!(creds.request_count(), 1);
    assert_eq!(studio.state(), LifecycleState::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_video_status_cycles_and_wraps_while_rendering() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Ok("img".to_string()))
            .with_video(Ok("vid".to_string()))
            .with_video_delay(Duration::from_secs(8 * 7 + 1)),
    );
    let studio = Arc::new(
        studio_with(service, Arc::new(StaticCredentials::new(Some("key"))))
            .with_status_interval(Duration::from_secs(8)),
    );
    studio.submit(product()).await.unwrap();

    let mut rx = studio.subscribe();
    let collector = tokio::spawn(async move {
        let mut seen: Vec<String> = Vec::new();
        loop {
            if let Some(status) = rx.borrow_and_update().video_status.clone() {
                if seen.last() != Some(&status) {
                    seen.push(status);
                }
            }
            if rx.borrow().state == LifecycleState::Completed {
                return seen;
            }
            if rx.changed().await.is_err() {
                return seen;
            }
        }
    });

    studio.render().await.unwrap();
    let seen = collector.await.unwrap();

    let mut expected = vec![INITIAL_VIDEO_STATUS.to_string()];
    expected.extend(VIDEO_STATUS_PHRASES.iter().map(|p| p.to_string()));
    expected.push(VIDEO_STATUS_PHRASES[0].to_string());
    assert_eq!(seen, expected);
}

#[tokio::test(start_paused = true)]
async fn test_image_is_visible_while_video_is_pending() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Ok("img-1".to_string()))
            .with_video(Ok("vid-1".to_string()))
            .with_video_delay(Duration::from_secs(30)),
    );
    let studio = Arc::new(studio_with(
        service,
        Arc::new(StaticCredentials::new(Some("key"))),
    ));
    studio.submit(product()).await.unwrap();

    let handle = {
        let studio = studio.clone();
        tokio::spawn(async move { studio.render().await })
    };
    tokio::time::sleep(Duration::from_secs(10)).await;

    let snap = studio.snapshot();
    assert_eq!(snap.state, LifecycleState::GeneratingMedia);
    assert_eq!(snap.media.image_url.as_deref(), Some("img-1"));
    assert_eq!(snap.media.video_url, None);

    let media = handle.await.unwrap().unwrap();
    assert_eq!(media.image_url.as_deref(), Some("img-1"));
    assert_eq!(media.video_url.as_deref(), Some("vid-1"));
    assert_eq!(studio.snapshot().media, media);
}

#[tokio::test(start_paused = true)]
async fn test_reset_and_submit_rejected_while_rendering() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Ok("img".to_string()))
            .with_video(Ok("vid".to_string()))
            .with_video_delay(Duration::from_secs(30)),
    );
    let studio = Arc::new(studio_with(
        service.clone(),
        Arc::new(StaticCredentials::new(Some("key"))),
    ));
    studio.submit(product()).await.unwrap();

    let handle = {
        let studio = studio.clone();
        tokio::spawn(async move { studio.render().await })
    };
    wait_for_state(&studio, LifecycleState::GeneratingMedia).await;
    let before = studio.snapshot();

    let err = studio.reset().unwrap_err();
    assert!(matches!(
        err,
        StudioError::InvalidTransition {
            from: LifecycleState::GeneratingMedia,
            action: "reset"
        }
    ));
    let err = studio.submit(product()).await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::InvalidTransition {
            from: LifecycleState::GeneratingMedia,
            action: "submit"
        }
    ));
    assert!(studio.render().await.is_err());
    assert_eq!(studio.snapshot(), before);
    assert_eq!(service.prompt_calls.load(Ordering::SeqCst), 1);

    handle.await.unwrap().unwrap();
    assert_eq!(studio.state(), LifecycleState::Completed);
}

#[tokio::test]
async fn test_reset_after_completed_and_error_is_idempotent() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Ok("img".to_string()))
            .with_video(Ok("vid".to_string()))
            .with_prompts(Err(StudioError::PromptGeneration("offline".to_string()))),
    );
    let studio = studio_with(service, Arc::new(StaticCredentials::new(Some("key"))));

    studio.submit(product()).await.unwrap();
    studio.render().await.unwrap();
    assert_eq!(studio.state(), LifecycleState::Completed);

    studio.reset().unwrap();
    assert_eq!(studio.snapshot(), StudioSnapshot::default());
    studio.reset().unwrap();
    assert_eq!(studio.snapshot(), StudioSnapshot::default());

    studio.submit(product()).await.unwrap_err();
    assert_eq!(studio.state(), LifecycleState::Error);
    assert_eq!(studio.snapshot().error.as_deref(), Some("offline"));

    studio.reset().unwrap();
    studio.reset().unwrap();
    let snap = studio.snapshot();
    assert_eq!(snap, StudioSnapshot::default());
    assert!(snap.inputs_editable());
}

#[tokio::test]
async fn test_resubmit_from_error_starts_a_fresh_cycle() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Err(StudioError::PromptGeneration("offline".to_string())))
            .with_prompts(Ok(sample_prompts())),
    );
    let studio = studio_with(service, Arc::new(StaticCredentials::new(Some("key"))));

    studio.submit(product()).await.unwrap_err();
    assert_eq!(studio.state(), LifecycleState::Error);

    studio.submit(product()).await.unwrap();
    let snap = studio.snapshot();
    assert_eq!(snap.state, LifecycleState::PromptsReady);
    assert_eq!(snap.error, None);
    assert_eq!(snap.prompts, Some(sample_prompts()));
}

#[tokio::test]
async fn test_submit_after_completed_requires_reset() {
    let service = Arc::new(
        MockService::new()
            .with_prompts(Ok(sample_prompts()))
            .with_image(Ok("img".to_string()))
            .with_video(Ok("vid".to_string())),
    );
    let studio = studio_with(service, Arc::new(StaticCredentials::new(Some("key"))));
    studio.submit(product()).await.unwrap();
    studio.render().await.unwrap();

    let err = studio.submit(product()).await.unwrap_err();
    assert!(matches!(
        err,
        StudioError::InvalidTransition {
            from: LifecycleState::Completed,
            action: "submit"
        }
    ));
}

#[tokio::test]
async fn test_blank_product_is_rejected_without_state_change() {
    let service = Arc::new(MockService::new());
    let studio = studio_with(service.clone(), Arc::new(StaticCredentials::new(Some("key"))));

    for bad in [
        ProductDetails::new("", "desc"),
        ProductDetails::new("name", "   "),
    ] {
        let err = studio.submit(bad).await.unwrap_err();
        assert!(matches!(err, StudioError::InvalidInput(_)));
    }
    assert_eq!(studio.snapshot(), StudioSnapshot::default());
    assert_eq!(service.prompt_calls.load(Ordering::SeqCst), 0);
}
