//! JSON requests routed through `dispatch`.

mod common;

use common::{completed_video, context, context_without_service, pending, FakeService};
use luma_nodes::{dispatch, NodeError, NodeRequest};

#[tokio::test(start_paused = true)]
async fn text_to_video_request_returns_json_output() {
    let out_dir = tempfile::tempdir().unwrap();
    let url = "https://cdn.example/gen-cat.mp4";
    let service = FakeService::new(
        "gen-cat",
        vec![pending("gen-cat"), completed_video("gen-cat", url)],
    );
    let ctx = context(service, out_dir.path());

    let request =
        NodeRequest::from_json(r#"{"node":"text_to_video","prompt":"a cat","save":false}"#)
            .unwrap();
    let output = dispatch(&ctx, request).await.unwrap();

    assert_eq!(
        output,
        serde_json::json!({ "video_url": url, "generation_id": "gen-cat" })
    );
}

#[tokio::test]
async fn reference_nodes_need_no_credentials() {
    let out_dir = tempfile::tempdir().unwrap();
    let ctx = context_without_service(out_dir.path());

    let request = NodeRequest::from_json(
        r#"{"node":"reference","image_url":"https://x/a.png","weight":0.5}"#,
    )
    .unwrap();
    let output = dispatch(&ctx, request).await.unwrap();
    assert_eq!(
        output,
        serde_json::json!([{ "url": "https://x/a.png", "weight": 0.5 }])
    );

    let request = NodeRequest::from_json(
        r#"{"node":"character_reference","image_url_1":"https://x/face.png"}"#,
    )
    .unwrap();
    let output = dispatch(&ctx, request).await.unwrap();
    assert_eq!(
        output,
        serde_json::json!({ "identity0": { "images": ["https://x/face.png"] } })
    );
}

#[tokio::test]
async fn concat_request_accepts_reference_outputs() {
    let out_dir = tempfile::tempdir().unwrap();
    let ctx = context_without_service(out_dir.path());

    let request = NodeRequest::from_json(
        r#"{
            "node": "concat_references",
            "ref_1": [{ "url": "https://x/1.png", "weight": 0.85 }],
            "ref_2": [{ "url": "https://x/2.png", "weight": 0.4 }]
        }"#,
    )
    .unwrap();
    let output = dispatch(&ctx, request).await.unwrap();
    assert_eq!(output.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn preview_request_echoes_url() {
    let out_dir = tempfile::tempdir().unwrap();
    let ctx = context_without_service(out_dir.path());

    let request =
        NodeRequest::from_json(r#"{"node":"preview_video","video_url":"https://x/v.mp4"}"#)
            .unwrap();
    let output = dispatch(&ctx, request).await.unwrap();
    assert_eq!(output, serde_json::json!({ "video_url": "https://x/v.mp4" }));
}

#[tokio::test]
async fn client_request_without_key_fails() {
    let out_dir = tempfile::tempdir().unwrap();
    let ctx = context_without_service(out_dir.path());

    let request = NodeRequest::from_json(r#"{"node":"client","api_key":""}"#).unwrap();
    let err = dispatch(&ctx, request).await.unwrap_err();
    assert!(matches!(err, NodeError::MissingApiKey));
}

#[tokio::test]
async fn client_request_with_key_reports_endpoint() {
    let out_dir = tempfile::tempdir().unwrap();
    let ctx = context_without_service(out_dir.path());

    let request = NodeRequest::from_json(r#"{"node":"client","api_key":"abc"}"#).unwrap();
    let output = dispatch(&ctx, request).await.unwrap();
    assert_eq!(
        output,
        serde_json::json!({ "base_url": "https://api.lumalabs.ai/dream-machine/v1" })
    );
}

#[test]
fn oversized_character_reference_is_rejected_at_parse() {
    let err = NodeRequest::from_json(
        r#"{
            "node": "image_generation",
            "prompt": "p",
            "save": false,
            "character_ref": { "identity0": { "images": ["a", "b", "c", "d", "e"] } }
        }"#,
    )
    .unwrap_err();

    assert!(matches!(err, NodeError::Request(_)));
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(err.to_string().contains("At most 4 character images"));
}

#[test]
fn blank_image_reference_url_is_rejected_at_parse() {
    let err = NodeRequest::from_json(
        r#"{
            "node": "image_generation",
            "prompt": "p",
            "image_refs": [{ "url": "", "weight": 0.5 }]
        }"#,
    )
    .unwrap_err();

    assert!(err.to_string().contains("Image URL must not be empty"));
}

#[tokio::test]
async fn valid_character_reference_reaches_the_service() {
    let out_dir = tempfile::tempdir().unwrap();
    let url = "https://cdn.example/gen-img.jpg";
    let service = FakeService::new("gen-img", vec![common::completed_image("gen-img", url)])
        .with_asset(url, common::jpeg(4, 4));
    let ctx = context(service, out_dir.path());

    let request = NodeRequest::from_json(
        r#"{
            "node": "image_generation",
            "prompt": "p",
            "save": false,
            "character_ref": { "identity0": { "images": ["https://x/face.png"] } }
        }"#,
    )
    .unwrap();
    dispatch(&ctx, request).await.unwrap();

    let calls = ctx.service().unwrap().calls();
    assert!(matches!(
        &calls[0],
        common::Call::CreateImage(req)
            if req.character_ref.as_ref().unwrap().identity0.images == ["https://x/face.png"]
    ));
}
