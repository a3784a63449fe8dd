//! `orcamento` command-line quote generator

mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use orcamento::{output_file_name, ErrorKind, QuoteConfig, QuoteError, QuoteRecord, QuoteRenderer};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "orcamento")]
#[command(about = "Generate repair-order quotes as PDF")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a quote from a JSON form payload
    Render(RenderArgs),
    /// Print the default configuration as JSON
    Config,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Payload file, or '-' for stdin
    payload: String,
    /// Directory for generated quotes
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,
    /// Exact output file, overriding --output-dir
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Configuration JSON; unset fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    if let Err(e) = logging::init_logging() {
        eprintln!("{e:#}");
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => render(&args),
        Commands::Config => match print_config() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Render and report the outcome as JSON on stdout
fn render(args: &RenderArgs) -> ExitCode {
    let result = generate(args);
    println!("{}", outcome(&result));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "quote generation failed");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn generate(args: &RenderArgs) -> std::result::Result<PathBuf, QuoteError> {
    let payload = read_payload(&args.payload)?;
    let record = QuoteRecord::from_json(&payload)?;

    let config = match &args.config {
        Some(path) => QuoteConfig::from_json_file(path)?,
        None => QuoteConfig::default(),
    };

    let path = match &args.output {
        Some(path) => path.clone(),
        None => {
            std::fs::create_dir_all(&args.output_dir)?;
            args.output_dir
                .join(output_file_name(record.order_id.as_deref(), unix_timestamp()))
        }
    };

    QuoteRenderer::new(config)?.generate_document(&record, &path)?;
    info!(path = %path.display(), "quote ready");
    Ok(path)
}

fn read_payload(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut payload = String::new();
        std::io::stdin().read_to_string(&mut payload)?;
        Ok(payload)
    } else {
        std::fs::read_to_string(Path::new(source))
    }
}

/// JSON result line for a generation attempt
fn outcome(result: &std::result::Result<PathBuf, QuoteError>) -> Value {
    match result {
        Ok(path) => json!({ "success": true, "file": path.display().to_string() }),
        Err(e) => json!({ "success": false, "error": e.user_message() }),
    }
}

/// Process status: 2 for a locked destination, 1 for anything else
fn exit_status(err: &QuoteError) -> u8 {
    match err.kind() {
        ErrorKind::OutputLocked => 2,
        _ => 1,
    }
}

fn print_config() -> Result<()> {
    let json = QuoteConfig::default()
        .to_json_pretty()
        .context("failed to serialize the default configuration")?;
    println!("{json}");
    Ok(())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render_args(payload: &Path, output_dir: &Path) -> RenderArgs {
        RenderArgs {
            payload: payload.display().to_string(),
            output_dir: output_dir.to_path_buf(),
            output: None,
            config: None,
        }
    }

    #[test]
    fn test_render_defaults() {
        let cli = Cli::try_parse_from(["orcamento", "render", "pedido.json"]).unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.payload, "pedido.json");
        assert_eq!(args.output_dir, PathBuf::from("data"));
        assert!(args.output.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_generate_names_file_after_order() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("pedido.json");
        std::fs::write(
            &payload,
            r#"{"os": "77", "pecas": {"Tela": 350}, "mao_obra": {"Troca": 80}}"#,
        )
        .unwrap();
        let output_dir = dir.path().join("data");

        let path = generate(&render_args(&payload, &output_dir)).unwrap();

        assert_eq!(path.parent(), Some(output_dir.as_path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("orcamento_77_"));
        assert!(name.ends_with(".pdf"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn test_explicit_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("pedido.json");
        std::fs::write(&payload, "{}").unwrap();

        let mut args = render_args(&payload, dir.path());
        args.output = Some(dir.path().join("saida.pdf"));
        let path = generate(&args).unwrap();

        assert_eq!(path, dir.path().join("saida.pdf"));
        assert_eq!(
            outcome(&Ok(path.clone())),
            json!({ "success": true, "file": path.display().to_string() })
        );
    }

    #[test]
    fn test_failures_report_user_message() {
        let dir = tempfile::tempdir().unwrap();
        let args = render_args(&dir.path().join("ausente.json"), dir.path());

        let result = generate(&args);
        let err = result.as_ref().unwrap_err();
        assert_eq!(exit_status(err), 1);

        let report = outcome(&result);
        assert_eq!(report["success"], json!(false));
        assert!(report["error"]
            .as_str()
            .unwrap()
            .starts_with("Falha ao gerar o PDF: "));
    }

    #[test]
    fn test_locked_output_exits_with_two() {
        let err = QuoteError::OutputLocked(PathBuf::from("aberto.pdf"));
        assert_eq!(exit_status(&err), 2);
        assert_eq!(
            outcome(&Err(err)),
            json!({
                "success": false,
                "error": "O arquivo PDF está ocupado. Feche-o e tente novamente."
            })
        );
    }
}
