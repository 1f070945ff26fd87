use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use grblbridge::{
    backup_message, create_backup, init_logging, read_program, BridgeObserver, Catalog, Config,
    ConsoleObserver, Language, MessageKey,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "grblbridge",
    version,
    about = "Grbl 1.1 emulation over TCP that captures streamed G-code to a program file"
)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Program file receiving the streamed G-code
    #[arg(long)]
    program_file: Option<PathBuf>,

    /// Communication log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Message language (en, de)
    #[arg(long)]
    lang: Option<Language>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Accept a Grbl client and capture its program (default)
    Serve,
    /// Copy the current program file to a timestamped backup
    Backup,
    /// Print the current program file
    Show,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => match Config::default_path() {
                Ok(path) => Config::load_or_default(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                Err(_) => Config::default(),
            },
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(program_file) = &self.program_file {
            config.capture.program_file = program_file.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.capture.log_file = log_file.clone();
        }
        if let Some(lang) = self.lang {
            config.ui.language = lang;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::new(config.ui.language);
    let observer: Arc<dyn BridgeObserver> =
        Arc::new(ConsoleObserver::new(std::io::stdout().is_terminal()));

    println!("{}", catalog.text(MessageKey::Title));
    let handle = grblbridge::start(config.bridge_config(), observer).await?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    println!("{}", catalog.text(MessageKey::Quitting));
    handle.shutdown().await?;
    Ok(())
}

fn backup(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::new(config.ui.language);
    let result = create_backup(&config.capture.program_file, &config.capture.backup_dir);
    let message = backup_message(&result, &catalog);

    match result {
        Ok(_) => {
            println!("{}", message);
            Ok(())
        }
        Err(_) => Err(anyhow!(message)),
    }
}

fn show(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::new(config.ui.language);
    match read_program(&config.capture.program_file) {
        Ok(program) => {
            print!("{}", program);
            Ok(())
        }
        Err(e) if e.is_capture_error() => {
            tracing::debug!("{}", e);
            Err(anyhow!(catalog.text(MessageKey::NoProgramFile)))
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    tracing::debug!(
        "grblbridge {} (built {}) on {}",
        grblbridge::VERSION,
        grblbridge::BUILD_DATE,
        config.server.bind_addr()
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Backup => backup(&config),
        Command::Show => show(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "grblbridge",
            "--config",
            "/nonexistent/bridge.toml",
            "--port",
            "2323",
            "--lang",
            "de",
            "show",
        ]);
        assert_eq!(cli.port, Some(2323));
        assert_eq!(cli.lang, Some(Language::De));
        assert_eq!(cli.command, Some(Command::Show));
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["grblbridge", "--host", "127.0.0.1"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
