//! Command-line interface.

use std::fmt::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ProxyConfig;
use crate::routing::{Resolution, RewriteResolver};

#[derive(Parser, Debug)]
#[command(name = "rewrite-proxy", version)]
#[command(about = "Front proxy that rewrites /api/* requests to a backend origin", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML). Built-in defaults when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the proxy (default)
    Serve {
        /// Override `listener.bind_address`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Validate the configuration and print the active rewrite table
    Check,
    /// Resolve a request path without starting the server
    Resolve {
        /// Request path, e.g. `/api/users/42?x=1`
        path: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { bind: None })
    }
}

/// The active rewrite table, as printed by `check`.
pub fn render_check(config: &ProxyConfig, resolver: &RewriteResolver) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "output:  {}", config.output);
    let _ = writeln!(out, "origin:  {}", resolver.origin());
    for rule in resolver.rules() {
        let _ = writeln!(
            out,
            "rule:    {} {} -> {}",
            rule.name(),
            rule.source(),
            rule.destination()
        );
    }
    if let Some(origin) = &config.passthrough.origin {
        let _ = writeln!(out, "passthrough: {origin}");
    }
    out.push_str("configuration OK\n");
    out
}

/// One resolution, as printed by `resolve`.
pub fn render_resolution(resolution: &Resolution, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(resolution);
    }
    Ok(match resolution {
        Resolution::Rewrite { destination, .. } => destination.clone(),
        Resolution::NoMatch => "no match".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendOrigin, RewriteRuleConfig};

    fn resolver(origin: &str) -> RewriteResolver {
        let origin = BackendOrigin::parse(origin).unwrap();
        RewriteResolver::new(&[RewriteRuleConfig::api()], origin).unwrap()
    }

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["rewrite-proxy"]);
        assert_eq!(cli.command(), Command::Serve { bind: None });
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_resolve_args() {
        let cli = Cli::parse_from([
            "rewrite-proxy",
            "resolve",
            "/api/users/42?x=1",
            "--json",
            "--config",
            "config/production.toml",
        ]);
        assert_eq!(
            cli.command(),
            Command::Resolve {
                path: "/api/users/42?x=1".into(),
                json: true
            }
        );
        assert_eq!(cli.config, Some(PathBuf::from("config/production.toml")));
    }

    #[test]
    fn test_serve_bind_override() {
        let cli = Cli::parse_from(["rewrite-proxy", "serve", "--bind", "127.0.0.1:4000"]);
        assert_eq!(
            cli.command(),
            Command::Serve {
                bind: Some("127.0.0.1:4000".into())
            }
        );
    }

    #[test]
    fn test_render_resolution_plain() {
        let resolver = resolver("http://localhost:8000");
        assert_eq!(
            render_resolution(&resolver.resolve("/api/users/42?x=1"), false).unwrap(),
            "http://localhost:8000/api/users/42?x=1"
        );
        assert_eq!(
            render_resolution(&resolver.resolve("/favicon.ico"), false).unwrap(),
            "no match"
        );
    }

    #[test]
    fn test_render_resolution_json() {
        let resolver = resolver("https://backend.example.com");
        let out = render_resolution(&resolver.resolve("/api/v1/items"), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["outcome"], "rewrite");
        assert_eq!(value["rule"], "api");
        assert_eq!(value["destination"], "https://backend.example.com/api/v1/items");

        let out = render_resolution(&resolver.resolve("/favicon.ico"), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["outcome"], "no_match");
    }

    #[test]
    fn test_render_check() {
        let mut config = ProxyConfig::default();
        config.passthrough.origin = Some("http://127.0.0.1:3001".into());
        config.rewrites.push(RewriteRuleConfig {
            name: Some("pinned".into()),
            source: "/v2/:rest*".into(),
            destination: "https://todo-api.example.app/api/v2/:rest*".into(),
        });
        let origin = BackendOrigin::parse("http://localhost:8000").unwrap();
        let resolver = RewriteResolver::new(&config.rewrites, origin).unwrap();

        let out = render_check(&config, &resolver);
        assert_eq!(
            out,
            "output:  default\n\
             origin:  http://localhost:8000\n\
             rule:    api /api/:path* -> {origin}/api/:path*\n\
             rule:    pinned /v2/:rest* -> https://todo-api.example.app/api/v2/:rest*\n\
             passthrough: http://127.0.0.1:3001\n\
             configuration OK\n"
        );
    }
}
