//! The shipped deployment profiles load and resolve as documented.

use std::path::PathBuf;

use rewrite_proxy::config::{load_config, OutputMode};
use rewrite_proxy::lifecycle::startup;
use rewrite_proxy::Resolution;

fn profile(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join(name)
}

#[test]
fn test_development_profile_uses_env_then_fallback() {
    let config = load_config(&profile("development.toml")).unwrap();
    assert_eq!(config.output, OutputMode::Standalone);

    let fallback = startup::prepare(config.clone(), |_| None).unwrap();
    assert_eq!(
        fallback.resolver.resolve("/api/health").destination(),
        Some("http://localhost:8000/api/health")
    );

    let from_env = startup::prepare(config, |key| {
        (key == "NEXT_PUBLIC_BACKEND_URL").then(|| "https://backend.example.com".to_string())
    })
    .unwrap();
    assert_eq!(
        from_env.resolver.resolve("/api/v1/items").destination(),
        Some("https://backend.example.com/api/v1/items")
    );
    assert_eq!(from_env.resolver.resolve("/favicon.ico"), Resolution::NoMatch);
}

#[test]
fn test_production_profile_ignores_env() {
    let config = load_config(&profile("production.toml")).unwrap();
    assert_eq!(config.output, OutputMode::Default);

    let prepared = startup::prepare(config, |_| Some("http://localhost:8000".to_string())).unwrap();
    assert_eq!(
        prepared.resolver.resolve("/api/todos?done=true").destination(),
        Some("https://todo-app-api-jade.vercel.app/api/todos?done=true")
    );
}
