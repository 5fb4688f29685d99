use anyhow::{bail, Context};
use regdomain_core::{logging, Config};
use regdomain_radio::{
    spawn_event_loop, CountryCode, CountryCodeConfig, CountryCodeController, CountryCodeHandle,
    InterfaceError, ManagedInterface, StaticRegistry,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const NODE_PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    protocol_version: u32,
}

/// Interface that only logs the code it is given
struct LoggingInterface {
    name: String,
}

impl ManagedInterface for LoggingInterface {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_country_code(&self, code: &CountryCode) -> Result<(), InterfaceError> {
        info!(interface = %self.name, country_code = %code, "Applying country code");
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Ready(bool),
    Country(String),
    Dump,
    Quit,
}

fn parse_command(line: &str) -> anyhow::Result<Command> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let command = match parts.as_slice() {
        ["ready", "on"] => Command::Ready(true),
        ["ready", "off"] => Command::Ready(false),
        ["country"] => Command::Country(String::new()),
        ["country", code] => Command::Country(code.to_string()),
        ["dump"] => Command::Dump,
        ["quit"] => Command::Quit,
        _ => bail!("unrecognised command: {line:?}"),
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--version-json") {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            protocol_version: NODE_PROTOCOL_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let config = match parse_config_path(&args)? {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default_config(),
    };
    logging::init_from_config(&config.logging);

    let registry = Arc::new(StaticRegistry::new());
    for name in &config.interfaces {
        registry.add(Arc::new(LoggingInterface { name: name.clone() }));
    }

    let controller = Arc::new(CountryCodeController::new(
        CountryCodeConfig::from(&config.regulatory),
        registry,
    )?);
    let (handle, task) = spawn_event_loop(controller);

    info!(interfaces = ?config.interfaces, "regdomain-node started");
    run_commands(&handle).await?;

    drop(handle);
    task.await?;
    Ok(())
}

async fn run_commands(handle: &CountryCodeHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Ready(ready)) => handle.set_ready_for_change(ready).await?,
            Ok(Command::Country(code)) => handle.set_country_code(code).await?,
            Ok(Command::Dump) => {
                let snapshot = handle.dump().await?;
                println!("{}", serde_json::to_string(&snapshot)?);
            }
            Ok(Command::Quit) => break,
            Err(e) => warn!(error = %e, "Ignoring input"),
        }
    }
    Ok(())
}

fn parse_config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            if let Some(path) = args_iter.next() {
                return Ok(Some(PathBuf::from(path)));
            }
            bail!("--config was provided without a path");
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("ready on").unwrap(), Command::Ready(true));
        assert_eq!(parse_command("ready off").unwrap(), Command::Ready(false));
        assert_eq!(
            parse_command("country jp").unwrap(),
            Command::Country("jp".to_string())
        );
        assert_eq!(parse_command("country").unwrap(), Command::Country(String::new()));
        assert_eq!(parse_command("dump").unwrap(), Command::Dump);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert!(parse_command("ready maybe").is_err());
        assert!(parse_command("reboot").is_err());
        assert!(parse_command("dump x").is_err());
    }

    #[test]
    fn test_parse_command_rejects_trailing_tokens() {
        assert!(parse_command("country jp extra").is_err());
        assert!(parse_command("ready on extra").is_err());
        assert!(parse_command("quit now").is_err());
    }

    #[test]
    fn test_parse_config_path() {
        let args = vec!["regdomain-node".to_string()];
        assert_eq!(parse_config_path(&args).unwrap(), None);

        let args = vec![
            "regdomain-node".to_string(),
            "--config".to_string(),
            "/etc/regdomain.toml".to_string(),
        ];
        assert_eq!(
            parse_config_path(&args).unwrap(),
            Some(PathBuf::from("/etc/regdomain.toml"))
        );

        let args = vec!["regdomain-node".to_string(), "--config".to_string()];
        assert!(parse_config_path(&args).is_err());
    }
}
