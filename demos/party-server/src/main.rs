use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sketchroom::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Sketchroom party server: rooms for drawing-and-guessing games.
#[derive(Debug, Parser)]
#[command(name = "party-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON server configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON word bank (`{"Category": ["word", ...]}`) replacing the built-in one
    #[arg(long)]
    words: Option<PathBuf>,

    /// Listen address, overriding the config file
    #[arg(long, env = "SKETCHROOM_BIND")]
    bind: Option<String>,
}

fn load_config(args: &Args) -> Result<ServerConfig, SketchroomError> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind = bind.clone();
    }
    Ok(config)
}

fn load_words(args: &Args) -> Result<Arc<dyn WordProvider>, SketchroomError> {
    let bank = match &args.words {
        Some(path) => WordBank::from_json(&std::fs::read_to_string(path)?)?,
        None => WordBank::builtin(),
    };
    tracing::info!(words = bank.len(), "word bank loaded");
    Ok(Arc::new(bank))
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sketchroom=debug")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let words = load_words(&args)?;

    let server = SketchroomServer::builder()
        .config(config)
        .words(words)
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr()?, "party server listening");

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("party-server").chain(raw.iter().copied()))
    }

    #[test]
    fn test_args_empty_has_no_paths() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.config, None);
        assert_eq!(parsed.words, None);
    }

    #[test]
    fn test_args_reads_both_paths() {
        let parsed = args(&["--words", "w.json", "--config=c.json"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("c.json")));
        assert_eq!(parsed.words, Some(PathBuf::from("w.json")));
    }

    #[test]
    fn test_args_missing_value_errors() {
        assert!(args(&["--config"]).is_err());
    }

    #[test]
    fn test_args_unknown_flag_errors() {
        assert!(args(&["--port", "1"]).is_err());
    }

    #[test]
    fn test_load_config_bind_flag_overrides_default() {
        let parsed = args(&["--bind", "0.0.0.0:9001"]).unwrap();
        let config = load_config(&parsed).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9001");
    }

    #[test]
    fn test_args_help_is_available() {
        let err = args(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
