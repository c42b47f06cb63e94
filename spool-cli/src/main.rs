//! spool - print QR codes, text, images and raw ESC/POS jobs
//!
//! ```text
//! spool --printer "POS-80 Printer" qr "https://example.com"
//! echo "hello" | spool --channel socket --printer 192.168.1.100 text --layout margin
//! spool --output job.bin image logo.png
//! spool qr "https://example.com" --png QRCode.png
//! ```

mod config;
mod logger;
mod payload;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{ChannelKind, Config};
use payload::{AlignArg, CharsetArg, EcArg, LayoutArg, Payload, TextOptions, TrimArg};
use spool_printer::{
    DEFAULT_MODULE_PX, DeviceChannel, JobReport, PrintError, Printer, RawPrinterChannel,
    SocketChannel, SpoolFailure, SpoolPrinter,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "spool", version, about = "Raw ESC/POS printing", long_about = None)]
struct Cli {
    /// Printer name, host[:port] or device path [env: SPOOL_PRINTER]
    #[arg(short, long, global = true)]
    printer: Option<String>,

    /// How to reach the printer [env: SPOOL_CHANNEL]
    #[arg(long, value_enum, global = true)]
    channel: Option<ChannelKind>,

    /// Spooler document name [env: SPOOL_DOC_NAME]
    #[arg(long, global = true)]
    doc_name: Option<String>,

    /// Write the encoded bytes to FILE instead of printing
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<PathBuf>,

    /// Print the job report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a QR code as a raster image
    Qr {
        /// Text to encode (reads stdin if omitted)
        text: Option<String>,

        /// Pixels per QR module
        #[arg(long, default_value_t = DEFAULT_MODULE_PX)]
        module_size: u16,

        /// Error correction level
        #[arg(long, value_enum, default_value = "l")]
        ec: EcArg,

        /// Also save the symbol as a PNG image. Without a printer or
        /// --output, only the image is written
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Print word-wrapped text
    Text {
        /// Text to print (reads stdin if omitted)
        text: Option<String>,

        #[arg(long, value_enum, default_value = "aligned")]
        layout: LayoutArg,

        /// Wrap column, defaults to the layout's width
        #[arg(long)]
        column: Option<usize>,

        /// Trailing whitespace policy, defaults to the layout's policy
        #[arg(long, value_enum)]
        trim: Option<TrimArg>,

        /// Alignment for the aligned layout
        #[arg(long, value_enum, default_value = "left")]
        align: AlignArg,

        #[arg(long, value_enum, default_value = "ascii")]
        charset: CharsetArg,
    },

    /// Print an image file as a raster image
    Image {
        /// Image path (PNG, JPEG, WebP)
        path: PathBuf,
    },

    /// Send a file of raw printer bytes unchanged
    Raw {
        /// File with ESC/POS data
        path: PathBuf,
    },
}

impl Commands {
    fn build(self) -> Result<Payload> {
        match self {
            Commands::Qr {
                text,
                module_size,
                ec,
                png,
            } => {
                let symbol = payload::qr_symbol(&payload::text_or_stdin(text)?, module_size, ec)?;
                if let Some(path) = png {
                    payload::save_png(&symbol, &path)?;
                }
                Ok(payload::qr(&symbol))
            }
            Commands::Text {
                text,
                layout,
                column,
                trim,
                align,
                charset,
            } => {
                let options = TextOptions {
                    layout,
                    column,
                    trim,
                    align,
                    charset,
                };
                Ok(payload::text(&payload::text_or_stdin(text)?, &options))
            }
            Commands::Image { path } => payload::image(&path),
            Commands::Raw { path } => payload::raw(&path),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.printer, cli.channel, cli.doc_name);
    let _guard = logger::init_logger(&config.log_level, config.log_dir.as_deref());

    let image_only = matches!(&cli.command, Commands::Qr { png: Some(_), .. })
        && config.printer.is_none()
        && cli.output.is_none();
    let payload = cli.command.build()?;
    if image_only {
        return Ok(());
    }

    let document = config
        .doc_name
        .clone()
        .unwrap_or_else(|| payload.document.to_string());

    if let Some(path) = &cli.output {
        std::fs::write(path, &payload.data)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), bytes = payload.data.len(), "Wrote job to file");
        return Ok(());
    }

    let printer = config
        .printer
        .clone()
        .context("No printer given, use --printer or set SPOOL_PRINTER")?;

    let result = match config.channel {
        ChannelKind::Socket => {
            let channel = SocketChannel::new()
                .with_connect_timeout(config.connect_timeout())
                .with_write_timeout(config.write_timeout());
            print_with(channel, &printer, &document, &payload.data).await
        }
        ChannelKind::Device => {
            print_with(DeviceChannel::new(), &printer, &document, &payload.data).await
        }
        ChannelKind::Spooler => print_spooler(&printer, &document, &payload.data).await,
    };

    match result {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Sent {} bytes to \"{}\" as \"{}\"",
                    report.bytes_written, report.printer, report.document
                );
            }
            Ok(())
        }
        Err(PrintError::Spool(failure)) => {
            error!(step = %failure.step(), error = %failure.error, "Print job failed");
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&failure_json(&failure))?);
            }
            Err(PrintError::Spool(failure).into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn print_with<C>(
    channel: C,
    printer: &str,
    document: &str,
    data: &[u8],
) -> Result<JobReport, PrintError>
where
    C: RawPrinterChannel + Clone + Send + 'static,
{
    SpoolPrinter::new(channel, printer)
        .with_document(document)
        .print(data)
        .await
}

#[cfg(windows)]
async fn print_spooler(printer: &str, document: &str, data: &[u8]) -> Result<JobReport, PrintError> {
    print_with(spool_printer::WindowsSpoolChannel::new(), printer, document, data).await
}

#[cfg(not(windows))]
async fn print_spooler(
    _printer: &str,
    _document: &str,
    _data: &[u8],
) -> Result<JobReport, PrintError> {
    Err(PrintError::InvalidConfig(
        "spooler channel is only available on Windows, use --channel socket or device".into(),
    ))
}

fn failure_json(failure: &SpoolFailure) -> serde_json::Value {
    serde_json::json!({
        "ok": false,
        "step": failure.step(),
        "error": failure.error.to_string(),
        "suppressed": failure
            .suppressed
            .iter()
            .map(|e| serde_json::json!({ "step": e.step(), "error": e.to_string() }))
            .collect::<Vec<_>>(),
    })
}
