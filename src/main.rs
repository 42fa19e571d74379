//! tcw-import - enter cold-water temperatures for building-management nodes

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tcw_import::{
    CredentialRecord, TcwClient, TcwError, TcwResult, Temperature, TemperatureInput,
    TemperatureRow,
    exchange::spreadsheet::{default_export_file_name, export_temperatures, import_temperatures},
    input_filter,
};
use tracing_subscriber::EnvFilter;

/// Cold-water temperature import
#[derive(Parser)]
#[command(name = "tcw-import", version, about)]
struct Cli {
    /// Encrypted credentials file
    #[arg(long, env = "TCW_CREDENTIALS", global = true)]
    credentials: Option<PathBuf>,

    /// Accept self-signed server certificates
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check and save server credentials
    Settings {
        /// Server base URL, e.g. https://bms.example.com
        #[arg(long)]
        server: String,

        #[arg(long)]
        login: String,

        #[arg(long)]
        password: String,
    },

    /// List source labels known to the server
    Sources,

    /// Push temperatures to every node carrying the source label
    Push {
        /// Temperature for a source (SOURCE=VALUE), repeatable
        #[arg(long = "value", value_name = "SOURCE=VALUE")]
        values: Vec<String>,

        /// Read temperatures from an xlsx file
        #[arg(long = "from", value_name = "FILE")]
        from: Option<PathBuf>,
    },

    /// Write all sources and entered temperatures to an xlsx file
    Export {
        /// Output file (default: temperature_data_<timestamp>.xlsx)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Temperature for a source (SOURCE=VALUE), repeatable
        #[arg(long = "value", value_name = "SOURCE=VALUE")]
        values: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_missing_credentials() {
                eprintln!(
                    "Run `tcw-import settings --server <URL> --login <LOGIN> --password <PASSWORD>` first."
                );
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> TcwResult<String> {
    let mut builder = TcwClient::builder().accept_invalid_certs(cli.insecure);
    if let Some(path) = cli.credentials {
        builder = builder.credentials_path(path);
    }
    let client = builder.build().await?;

    match cli.command {
        Commands::Settings {
            server,
            login,
            password,
        } => {
            check_field("login", &login, input_filter::is_valid_login_input)?;
            check_field("password", &password, input_filter::is_valid_password_input)?;
            let record = CredentialRecord::new(login, password, server.trim());
            client.save_credentials(record).await?;
            Ok(format!(
                "Settings saved to {}",
                client.credentials_path().display()
            ))
        }
        Commands::Sources => {
            let sources = client.list_sources().await?;
            if sources.is_empty() {
                return Ok("No sources found".to_string());
            }
            for source in &sources {
                println!("{}", source);
            }
            Ok(format!("{} sources", sources.len()))
        }
        Commands::Push { values, from } => {
            let inputs = collect_inputs(&values, from.as_deref())?;
            let pushed = client.submit(&inputs).await?;
            Ok(format!("Temperatures pushed to {} nodes", pushed))
        }
        Commands::Export { output, values } => {
            let entered = parse_values(&values)?;
            let rows = export_rows(client.list_sources().await?, entered)?;
            let output = output
                .unwrap_or_else(|| PathBuf::from(default_export_file_name(chrono::Local::now())));
            let written = export_temperatures(&rows, &output)?;
            Ok(format!("Exported {} rows to {}", rows.len(), written.display()))
        }
    }
}

/// `--value` pairs first, then the rows of the `--from` workbook.
fn collect_inputs(values: &[String], from: Option<&Path>) -> TcwResult<Vec<TemperatureInput>> {
    let mut inputs = parse_values(values)?;
    if let Some(path) = from {
        inputs.extend(import_temperatures(path)?);
    }
    if inputs.is_empty() {
        return Err(TcwError::InvalidInput(
            "No temperatures given; use --value or --from".to_string(),
        ));
    }
    Ok(inputs)
}

/// One row per known source. An empty source list means the server could not
/// be read, so nothing is exported.
fn export_rows(
    sources: Vec<String>,
    entered: Vec<TemperatureInput>,
) -> TcwResult<Vec<TemperatureRow>> {
    if sources.is_empty() {
        return Err(TcwError::InvalidInput(
            "No sources to export; check the server connection".to_string(),
        ));
    }
    let entered: HashMap<String, f64> = entered
        .into_iter()
        .map(|input| (input.source, input.temperature.value()))
        .collect();
    Ok(sources
        .into_iter()
        .map(|source| {
            let temperature = entered.get(&source).copied();
            TemperatureRow::new(source, temperature)
        })
        .collect())
}

fn check_field(field: &str, value: &str, is_valid: fn(&str) -> bool) -> TcwResult<()> {
    if is_valid(value) {
        Ok(())
    } else {
        Err(TcwError::InvalidInput(format!(
            "{} may contain only letters and digits",
            field
        )))
    }
}

/// Parses `SOURCE=VALUE` pairs; the last `=` separates the value.
fn parse_values(values: &[String]) -> TcwResult<Vec<TemperatureInput>> {
    values
        .iter()
        .map(|pair| {
            let (source, value) = pair.rsplit_once('=').ok_or_else(|| {
                TcwError::InvalidInput(format!("Expected SOURCE=VALUE, got '{}'", pair))
            })?;
            let source = source.trim();
            if source.is_empty() {
                return Err(TcwError::InvalidInput(format!("Missing source in '{}'", pair)));
            }
            Ok(TemperatureInput::new(source, Temperature::parse(value)?))
        })
        .collect()
}
