// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests against mock services and an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fabrica_core::{ArtifactStore, GenerationRequest, OutputKind};
use fabrica_image::ImageClient;
use fabrica_mesh::{MeshClient, MeshSettings};
use fabrica_pipeline::Pipeline;
use fabrica_prompt::PromptClient;
use fabrica_test_utils::MemoryStore;

struct Harness {
    prompt_server: MockServer,
    image_server: MockServer,
    mesh_server: MockServer,
    store: Arc<MemoryStore>,
    pipeline: Pipeline,
}

async fn harness() -> Harness {
    let prompt_server = MockServer::start().await;
    let image_server = MockServer::start().await;
    let mesh_server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let pipeline = build_pipeline(&prompt_server, &image_server, &mesh_server, store.clone());
    Harness {
        prompt_server,
        image_server,
        mesh_server,
        store,
        pipeline,
    }
}

fn build_pipeline(
    prompt_server: &MockServer,
    image_server: &MockServer,
    mesh_server: &MockServer,
    store: Arc<dyn ArtifactStore>,
) -> Pipeline {
    let prompt = PromptClient::new(prompt_server.uri(), Duration::from_secs(5)).unwrap();
    let image = ImageClient::new(image_server.uri(), Duration::from_secs(5)).unwrap();
    let mesh = MeshClient::new(MeshSettings {
        base_url: format!("{}/predictions", mesh_server.uri()),
        api_key: Some("test-key".into()),
        poll_interval: Duration::from_millis(10),
        poll_timeout: Duration::from_millis(100),
        ..MeshSettings::default()
    })
    .unwrap();

    Pipeline::new(prompt, image, mesh, store, Duration::from_secs(3600))
}

async fn mount_expansion(server: &MockServer, expanded_prompt: &str) {
    Mock::given(method("POST"))
        .and(path("/expand-prompt/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expanded_prompt": expanded_prompt,
            "style_keywords": ["sci-fi"],
        })))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, bytes: Vec<u8>) {
    Mock::given(method("POST"))
        .and(path("/generate-image/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(bytes),
        )
        .mount(server)
        .await;
}

/// Mounts a mesh submit that succeeds immediately, plus the artifact file.
async fn mount_mesh_success(server: &MockServer) {
    let model_url = format!("{}/files/model.glb", server.uri());
    Mock::given(method("POST"))
        .and(path("/predictions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "status": "succeeded",
            "output": {"url": model_url},
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/model.glb"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"glb-bytes".to_vec()))
        .mount(server)
        .await;
}

fn parsed(report: &fabrica_pipeline::RunReport) -> serde_json::Value {
    serde_json::from_str(&report.metadata_json).expect("metadata must be valid JSON")
}

#[tokio::test]
async fn prompt_expansion_failure_is_fatal_and_short_circuits() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/expand-prompt/"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "LLM unavailable"})),
        )
        .mount(&h.prompt_server)
        .await;

    // Neither downstream service may be called.
    Mock::given(method("POST"))
        .and(path("/generate-image/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.image_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predictions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.mesh_server)
        .await;

    let request = GenerationRequest::new("laser sword", OutputKind::Image);
    let err = h.pipeline.run(&request).await.unwrap_err();

    assert!(err.to_string().contains("LLM unavailable"));
    assert!(h.store.is_empty(), "nothing may be persisted on fatal expansion failure");
}

#[tokio::test]
async fn image_run_end_to_end() {
    let h = harness().await;
    mount_expansion(&h.prompt_server, "a glowing laser sword, cinematic").await;

    // The image service must receive the expanded prompt, not the raw one.
    Mock::given(method("POST"))
        .and(path("/generate-image/"))
        .and(body_json(json!({"prompt": "a glowing laser sword, cinematic"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
        )
        .expect(1)
        .mount(&h.image_server)
        .await;

    let request = GenerationRequest::new("laser sword", OutputKind::Image);
    let report = h.pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert_eq!(doc["_user_prompt"], "laser sword");
    assert_eq!(doc["_selected_output_type"], "Image");

    let expected_image_key = format!("images/{}.png", report.asset_id);
    assert_eq!(doc["image_s3_key"], expected_image_key.as_str());
    assert_eq!(report.image_key.as_deref(), Some(expected_image_key.as_str()));
    assert!(report.model_key.is_none());
    assert!(report.errors_joined().is_none());

    // Both the image and the metadata document landed in the store.
    let image = h.store.object(&expected_image_key).unwrap();
    assert_eq!(image.content_type, "image/png");
    let metadata_key = format!("metadata/{}.json", report.asset_id);
    let stored = h.store.object(&metadata_key).unwrap();
    assert_eq!(stored.content_type, "application/json");
    assert_eq!(stored.bytes, report.metadata_json.as_bytes());
}

#[tokio::test]
async fn image_generation_failure_is_recorded_not_fatal() {
    let h = harness().await;
    mount_expansion(&h.prompt_server, "expanded").await;

    Mock::given(method("POST"))
        .and(path("/generate-image/"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "model loading"})))
        .mount(&h.image_server)
        .await;

    let request = GenerationRequest::new("laser sword", OutputKind::Image);
    let report = h.pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert!(doc.get("image_s3_key").is_none());
    assert!(
        doc["image_generation_error"]
            .as_str()
            .unwrap()
            .contains("model loading")
    );
    assert!(report.image_key.is_none());
    assert_eq!(report.errors.len(), 1);

    // The metadata document was still persisted.
    assert_eq!(h.store.list("metadata/").await.unwrap().len(), 1);
}

#[tokio::test]
async fn model_run_end_to_end() {
    let h = harness().await;
    mount_expansion(&h.prompt_server, "a sturdy shield, ornate").await;
    mount_image(&h.image_server, vec![1, 2, 3]).await;
    mount_mesh_success(&h.mesh_server).await;

    let request = GenerationRequest::new("shield", OutputKind::Model);
    let report = h.pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert_eq!(doc["_selected_output_type"], "3D Model");
    assert_eq!(
        doc["intermediate_image_s3_key"],
        format!("images/{}.png", report.asset_id).as_str()
    );
    let expected_model_key = format!("models/{}.glb", report.asset_id);
    assert_eq!(doc["model_s3_key"], expected_model_key.as_str());
    assert_eq!(report.model_key.as_deref(), Some(expected_model_key.as_str()));
    assert!(report.errors_joined().is_none());

    let model = h.store.object(&expected_model_key).unwrap();
    assert_eq!(model.bytes, b"glb-bytes");
    assert_eq!(model.content_type, "model/gltf-binary");
}

#[tokio::test]
async fn model_run_with_failed_job_keeps_intermediate_image() {
    let h = harness().await;
    mount_expansion(&h.prompt_server, "a sturdy shield").await;
    mount_image(&h.image_server, vec![1, 2, 3]).await;

    Mock::given(method("POST"))
        .and(path("/predictions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-9",
            "status": "failed",
            "output": null,
            "error": "mesh exploded",
        })))
        .mount(&h.mesh_server)
        .await;

    let request = GenerationRequest::new("shield", OutputKind::Model);
    let report = h.pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert!(doc.get("intermediate_image_s3_key").is_some());
    assert!(doc.get("model_s3_key").is_none());
    assert!(
        doc["model_generation_error"]
            .as_str()
            .unwrap()
            .contains("mesh exploded")
    );
    assert!(report.model_key.is_none());
    assert!(report.errors_joined().unwrap().contains("mesh exploded"));
}

#[tokio::test]
async fn runs_get_distinct_asset_ids_and_never_overwrite() {
    let h = harness().await;
    mount_expansion(&h.prompt_server, "expanded").await;
    mount_image(&h.image_server, vec![1]).await;

    let request = GenerationRequest::new("laser sword", OutputKind::Image);
    let first = h.pipeline.run(&request).await.unwrap();
    let second = h.pipeline.run(&request).await.unwrap();

    assert_ne!(first.asset_id, second.asset_id);
    // Two images and two metadata documents; nothing overwritten.
    assert_eq!(h.store.list("images/").await.unwrap().len(), 2);
    assert_eq!(h.store.list("metadata/").await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_output_kind_is_recorded_without_generation() {
    let h = harness().await;
    mount_expansion(&h.prompt_server, "expanded").await;

    Mock::given(method("POST"))
        .and(path("/generate-image/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.image_server)
        .await;

    let request = GenerationRequest::new("laser sword", OutputKind::Other("hologram".into()));
    let report = h.pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert_eq!(doc["output_type_error"], "unknown output type: hologram");
    assert!(report.errors_joined().unwrap().contains("unknown output type"));
    assert_eq!(h.store.list("metadata/").await.unwrap().len(), 1);
}

#[tokio::test]
async fn caller_supplied_image_reference_skips_intermediate_generation() {
    let h = harness().await;
    mount_expansion(&h.prompt_server, "a sturdy shield").await;
    mount_mesh_success(&h.mesh_server).await;

    Mock::given(method("POST"))
        .and(path("/generate-image/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.image_server)
        .await;

    let mut request = GenerationRequest::new("shield", OutputKind::Model);
    request.input_image_reference = Some("http://existing/shield.png".into());
    let report = h.pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert!(doc.get("intermediate_image_s3_key").is_none());
    assert!(report.model_key.is_some());
}

#[tokio::test]
async fn non_object_expansion_is_kept_under_expansion_field() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/expand-prompt/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("just a caption")))
        .mount(&h.prompt_server)
        .await;
    mount_image(&h.image_server, vec![1]).await;

    let request = GenerationRequest::new("laser sword", OutputKind::Image);
    let report = h.pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert_eq!(doc["expansion"], "just a caption");
    assert_eq!(doc["_user_prompt"], "laser sword");
}

#[tokio::test]
async fn unconfigured_store_makes_metadata_persistence_fatal() {
    let prompt_server = MockServer::start().await;
    let image_server = MockServer::start().await;
    let mesh_server = MockServer::start().await;
    mount_expansion(&prompt_server, "expanded").await;
    mount_image(&image_server, vec![1]).await;

    let pipeline = build_pipeline(
        &prompt_server,
        &image_server,
        &mesh_server,
        Arc::new(fabrica_store::DisabledStore),
    );

    let request = GenerationRequest::new("laser sword", OutputKind::Image);
    let err = pipeline.run(&request).await.unwrap_err();
    assert!(matches!(err, fabrica_core::FabricaError::StoreUnavailable));
}

#[tokio::test]
async fn empty_prompt_is_rejected_before_any_call() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/expand-prompt/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.prompt_server)
        .await;

    let request = GenerationRequest::new("   ", OutputKind::Image);
    let err = h.pipeline.run(&request).await.unwrap_err();
    assert!(matches!(err, fabrica_core::FabricaError::Config(_)));
}

/// Store double whose model uploads fail, for exercising the
/// upload-failure annotation path.
struct ModelUploadsFail(MemoryStore);

#[async_trait::async_trait]
impl ArtifactStore for ModelUploadsFail {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), fabrica_core::FabricaError> {
        if key.starts_with("models/") {
            return Err(fabrica_core::FabricaError::Store {
                message: "quota exceeded".into(),
                source: None,
            });
        }
        self.0.put(key, bytes, content_type).await
    }

    async fn presign_get(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<String, fabrica_core::FabricaError> {
        self.0.presign_get(key, ttl).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, fabrica_core::FabricaError> {
        self.0.list(prefix).await
    }

    async fn get_json(&self, key: &str) -> Result<serde_json::Value, fabrica_core::FabricaError> {
        self.0.get_json(key).await
    }
}

#[tokio::test]
async fn model_upload_failure_is_recorded_not_fatal() {
    let prompt_server = MockServer::start().await;
    let image_server = MockServer::start().await;
    let mesh_server = MockServer::start().await;
    mount_expansion(&prompt_server, "a sturdy shield").await;
    mount_image(&image_server, vec![1]).await;
    mount_mesh_success(&mesh_server).await;

    let pipeline = build_pipeline(
        &prompt_server,
        &image_server,
        &mesh_server,
        Arc::new(ModelUploadsFail(MemoryStore::new())),
    );

    let request = GenerationRequest::new("shield", OutputKind::Model);
    let report = pipeline.run(&request).await.unwrap();

    let doc = parsed(&report);
    assert!(doc.get("model_s3_key").is_none());
    assert!(doc["model_s3_error"].as_str().unwrap().contains("quota exceeded"));
    assert!(report.model_key.is_none());
    // The metadata document itself still persisted.
    assert!(report.errors_joined().unwrap().contains("quota exceeded"));
}
