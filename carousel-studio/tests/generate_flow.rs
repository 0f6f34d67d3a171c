//! End-to-end tests for the generate flow: fetch a template, generate rows,
//! fill missing media from search, render, edit and export.

use std::collections::BTreeMap;

use carousel_core::{EngineConfig, PlaceholderRenderer, Size};
use carousel_studio::{build_deck, export_deck, fill_media, EditScript, StudioClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEMPLATE: &str = r#"<div style="width: 1080px; height: 1350px">
<img src="{{media}}" style="width: 400px; height: 300px">
<h1>{{title}}</h1>
<p>{{subtitle}}</p>
</div>"#;

async fn mock_service() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/templates/bold"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "html": TEMPLATE })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/carousels/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Launch day", "subtitle": "Nova ships", "image": "https://img.test/hero.jpg"},
            {"title": "Built for speed", "subtitle": "Under 10ms", "keyword": "race car"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/search"))
        .and(query_param("q", "race car"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"url": "https://img.test/race.jpg"}, {"url": "https://img.test/other.jpg"}]
        })))
        .mount(&server)
        .await;

    server
}

// ============================================================================
// Generate, edit, export
// ============================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_generated_deck_is_edited_and_exported() {
    let server = mock_service().await;
    let client = StudioClient::new(server.uri()).expect("client");

    let template = client.fetch_template("bold").await.expect("template");
    let mut rows = client
        .generate_carousel("launch", "bold")
        .await
        .expect("rows");
    let filled = fill_media(&mut rows, &client).await.expect("search");
    assert_eq!(filled, 1);
    assert_eq!(rows[1].media.as_deref(), Some("https://img.test/race.jpg"));

    let script = EditScript::from_json_str(
        r#"{
            "media_sizes": {
                "https://img.test/hero.jpg": {"width": 800, "height": 400},
                "https://img.test/race.jpg": {"width": 800, "height": 400}
            },
            "ops": [
                {"op": "text", "slide": 1, "kind": "subtitle", "value": "Under 5ms"},
                {"op": "drag", "slide": 0, "from": {"x": 200, "y": 100}, "to": {"x": 150, "y": 100}}
            ]
        }"#,
    )
    .expect("script parses");

    let mut editor = build_deck(
        EngineConfig {
            cover_epsilon: 0.0,
            ..EngineConfig::default()
        },
        &[template],
        &rows,
        PlaceholderRenderer,
        &script.media_sizes,
    )
    .expect("deck builds");
    let report = script.apply(&mut editor).expect("script applies");
    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 0);

    let dir = tempfile::tempdir().expect("temp dir");
    let paths = export_deck(&editor, dir.path()).expect("export");
    assert_eq!(paths.len(), 2);

    let first = std::fs::read_to_string(&paths[0]).expect("slide 1");
    assert!(first.contains("https://img.test/hero.jpg"));
    assert!(first.contains("object-position: 75% 50%"));
    assert!(!first.contains("data-cs-selected"));

    let second = std::fs::read_to_string(&paths[1]).expect("slide 2");
    assert!(second.contains("Under 5ms"));
    assert!(!second.contains("Under 10ms"));
    assert!(second.contains("https://img.test/race.jpg"));
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn test_missing_template_fails_cleanly() {
    let server = mock_service().await;
    let client = StudioClient::new(server.uri()).expect("client");
    assert!(client.fetch_template("unknown").await.is_err());
}

#[test]
fn test_empty_script_changes_nothing() {
    let rows = vec![carousel_core::SlideContent::new("Only", "Slide")];
    let mut editor = build_deck(
        EngineConfig::default(),
        &[TEMPLATE.to_string()],
        &rows,
        PlaceholderRenderer,
        &BTreeMap::<String, Size>::new(),
    )
    .expect("deck builds");
    let before = editor.download_all();
    let report = EditScript::default().apply(&mut editor).expect("applies");
    assert_eq!(report.applied, 0);
    assert_eq!(editor.download_all(), before);
}
