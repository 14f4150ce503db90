//! Mentormate server binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite message store
//! 3. Build the generation and synthesis HTTP adapters
//! 4. Wire the turn orchestrator and token registry
//! 5. Start the axum REST API server

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mentormate_api::{AppState, TokenStore};
use mentormate_core::config::MentormateConfig;
use mentormate_storage::{Database, MessageRepository};
use mentormate_turn::{HttpGenerationClient, HttpSynthesisClient, TurnOrchestrator};
use uuid::Uuid;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Resolve the config file path (MENTORMATE_CONFIG env, or
/// ~/.mentormate/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("MENTORMATE_CONFIG") {
        return PathBuf::from(p);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".mentormate").join("config.toml");
    }
    PathBuf::from("config.toml")
}

/// Read an API key from the environment variable named in config.
///
/// A missing key is logged, not fatal: the adapter will fail per-turn with
/// an upstream error instead of preventing startup.
fn api_key_from_env(var: &str) -> String {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!(var, "API key environment variable not set");
            String::new()
        }
    }
}

/// Load persisted dev credentials, or issue and save a fresh pair.
///
/// The file holds `<owner-uuid> <token>` so the same identity survives
/// restarts. This stands in for the external auth collaborator.
fn load_or_issue_dev_credentials(tokens: &TokenStore, path: &Path) -> (Uuid, String) {
    if let Ok(contents) = std::fs::read_to_string(path) {
        let mut parts = contents.split_whitespace();
        if let (Some(owner), Some(token)) = (parts.next(), parts.next()) {
            if let Ok(owner_id) = Uuid::parse_str(owner) {
                tokens.insert(token.to_string(), owner_id);
                tracing::info!("Dev credentials loaded from {}", path.display());
                return (owner_id, token.to_string());
            }
        }
    }

    let owner_id = Uuid::new_v4();
    let token = tokens.issue(owner_id);

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = std::fs::write(path, format!("{} {}\n", owner_id, token)) {
        tracing::warn!(error = %e, "Failed to save dev credentials to {}", path.display());
    } else {
        // Restrict credentials file to owner-only access.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
        }
        tracing::info!("Dev credentials saved to {}", path.display());
    }

    (owner_id, token)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Mentormate v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let config = MentormateConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let db_path = data_dir.join("mentormate.db");
    let db = Database::new(&db_path)?;
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let repository = MessageRepository::new(Arc::new(db));

    // Outbound adapters.
    let generation_key = api_key_from_env(&config.generation.api_key_env);
    let generation = HttpGenerationClient::new(&config.generation, generation_key)?;

    let synthesis_key = api_key_from_env(&config.synthesis.api_key_env);
    let synthesis = HttpSynthesisClient::new(&config.synthesis, synthesis_key)?;

    // Turn pipeline.
    let orchestrator =
        TurnOrchestrator::new(repository, Arc::new(generation), Arc::new(synthesis));

    // Auth: persist a dev identity so the API is usable standalone.
    let tokens = TokenStore::new();
    let (owner_id, token) =
        load_or_issue_dev_credentials(&tokens, &data_dir.join("dev_credentials"));
    tracing::info!(owner = %owner_id, "Dev API token: {}", token);

    // === API server ===

    let port = std::env::var("MENTORMATE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(config.general.port);

    let state = AppState::new(orchestrator, tokens, port);
    let addr = format!("127.0.0.1:{}", port);

    let router = mentormate_api::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind — is another instance running?");
            tracing::error!("Try: MENTORMATE_PORT={} cargo run -p mentormate-app", port + 1);
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_dir_expands_home() {
        std::env::set_var("HOME", "/home/tester");
        let dir = resolve_data_dir("~/.mentormate/data");
        assert_eq!(dir, PathBuf::from("/home/tester/.mentormate/data"));
    }

    #[test]
    fn test_resolve_data_dir_absolute_passthrough() {
        let dir = resolve_data_dir("/var/lib/mentormate");
        assert_eq!(dir, PathBuf::from("/var/lib/mentormate"));
    }

    #[test]
    fn test_dev_credentials_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev_credentials");

        let tokens = TokenStore::new();
        let (owner, token) = load_or_issue_dev_credentials(&tokens, &path);
        assert_eq!(tokens.resolve(&token), Some(owner));

        // A second load reuses the same identity.
        let tokens2 = TokenStore::new();
        let (owner2, token2) = load_or_issue_dev_credentials(&tokens2, &path);
        assert_eq!(owner2, owner);
        assert_eq!(token2, token);
        assert_eq!(tokens2.resolve(&token2), Some(owner));
    }

    #[test]
    fn test_dev_credentials_corrupt_file_reissues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev_credentials");
        std::fs::write(&path, "not-a-uuid sometoken").unwrap();

        let tokens = TokenStore::new();
        let (owner, token) = load_or_issue_dev_credentials(&tokens, &path);
        assert_eq!(tokens.resolve(&token), Some(owner));
    }
}
