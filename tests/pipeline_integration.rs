//! Integration tests for stream rendering, deadlines and configuration files

use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use tabstop_parsers::{Language, ParserRegistry};
use tabstop_render::{
    init_logging, ConfigLoader, CursorContext, DialectStyle, Go, GoKind, GoStyle, MatchOption, PredictedToken,
    Prediction, RenderConfig, RenderError, Renderer, ReplaceRange, Snippet, Token,
};
use tempfile::TempDir;

const BUFFER: &str = "package main\n\nfunc main() {\n\tfoo := bar(butterfly, bee,)\n}\n";

fn go_prediction(lits: &[&str], probability: f32) -> Prediction<GoKind> {
    let tokens = lits
        .iter()
        .map(|l| PredictedToken::new(GoKind::classify(l), *l, probability))
        .collect();
    Prediction::new(tokens, "")
}

fn cursor_context() -> CursorContext<GoKind> {
    let cursor = BUFFER.find(",)").unwrap() + 1;
    let line = BUFFER.find("foo").unwrap();
    let mut tokens = Vec::new();
    let mut offset = line;
    for lit in ["foo", ":=", "bar", "(", "butterfly", ",", "bee", ","] {
        let start = offset + BUFFER[offset..].find(lit).unwrap();
        tokens.push(Token::new(GoKind::classify(lit), lit, start, start + lit.len()));
        offset = start + lit.len();
    }
    CursorContext::find(BUFFER, &tokens, cursor)
}

#[tokio::test]
async fn test_stream_keeps_completions_before_error() {
    init_logging("debug");
    let renderer = Renderer::new(Go, GoStyle::default(), ParserRegistry::new());
    let context = cursor_context();

    let items: Vec<anyhow::Result<Prediction<GoKind>>> = vec![
        Ok(go_prediction(&["ladybug", ",", "locust"], 0.9)),
        // rejected: closes a bracket it never opened
        Ok(go_prediction(&["ladybug", ")", ")"], 0.5)),
        Ok(go_prediction(&["ladybug", ",", "locust"], 0.4)),
        Ok(go_prediction(&["moth"], 0.3)),
        Err(anyhow::anyhow!("prediction service closed the stream")),
        Ok(go_prediction(&["wasp"], 0.2)),
    ];
    let (completions, err) = renderer
        .render_stream(BUFFER, &context, stream::iter(items))
        .await;

    let texts: Vec<_> = completions.iter().map(|c| c.snippet.text.as_str()).collect();
    assert_eq!(texts, vec![" ladybug, locust", " moth"]);
    let err = err.expect("stream error is returned");
    assert!(err.to_string().contains("closed the stream"));
}

#[tokio::test]
async fn test_concurrent_renders_share_registry() {
    let registry = ParserRegistry::with_capacity(2);
    let renderer = Arc::new(Renderer::new(Go, GoStyle::default(), registry.clone()));
    let context = cursor_context();

    let mut handles = Vec::new();
    for word in ["ant", "bee", "cricket", "dragonfly"] {
        let renderer = renderer.clone();
        let context = context.clone();
        handles.push(tokio::spawn(async move {
            renderer
                .render_with_deadline(
                    BUFFER.to_string(),
                    context,
                    go_prediction(&[word], 1.0),
                    Duration::from_secs(5),
                )
                .await
        }));
    }

    for (handle, word) in handles.into_iter().zip(["ant", "bee", "cricket", "dragonfly"]) {
        let completion = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(completion.snippet.text, format!(" {}", word));
    }
    assert!(registry.pool(Language::Go).idle_count() <= 2);
}

#[tokio::test]
async fn test_deadline_reports_elapsed_budget() {
    let result = tabstop_render::run_with_deadline(Duration::from_millis(5), || {
        std::thread::sleep(Duration::from_millis(100));
        Ok(Snippet::plain("late"))
    })
    .await;
    assert!(matches!(result, Err(RenderError::DeadlineExceeded { millis: 5 })));
}

#[tokio::test]
async fn test_format_with_deadline_rejects_bad_range() {
    let renderer = Arc::new(Renderer::new(Go, GoStyle::default(), ParserRegistry::new()));
    let result = renderer
        .format_with_deadline(
            BUFFER.to_string(),
            ReplaceRange::new(BUFFER.len(), BUFFER.len() + 1),
            Snippet::plain("x"),
            MatchOption::MatchEnd,
            Duration::from_secs(5),
        )
        .await;
    assert!(matches!(result, Err(RenderError::InvalidReplaceRange { .. })));
}

#[test]
fn test_style_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabstop.yaml");
    std::fs::write(&path, "go:\n  space_after_comma: false\ndeadline_ms: 50\n").unwrap();

    let config: RenderConfig = ConfigLoader::load_from_yaml(&path).unwrap();
    assert_eq!(config.deadline_ms, 50);
    let DialectStyle::Go(style) = config.style_for(Language::Go) else {
        panic!("expected a Go style");
    };

    let renderer = Renderer::new(Go, style, ParserRegistry::with_capacity(config.max_parsers));
    let completion = renderer
        .render(BUFFER, &cursor_context(), &go_prediction(&["ladybug", ",", "locust"], 1.0))
        .unwrap()
        .unwrap();
    assert_eq!(completion.snippet.text, "ladybug,locust");
}

#[test]
fn test_config_round_trips_through_json() {
    let config = RenderConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabstop.json");
    std::fs::write(&path, json).unwrap();
    let loaded = ConfigLoader::load_from_json(&path).unwrap();
    assert_eq!(loaded.python, config.python);
    assert_eq!(
        ConfigLoader::default_for_language(Language::Python),
        DialectStyle::Python(config.python)
    );
}
