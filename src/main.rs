use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use mdterm::{detect_terminal_width, normalize_width, render_markdown_with_options, Error, RenderOptions};
use tracing_subscriber::EnvFilter;

/// Render a Markdown file as styled terminal text.
#[derive(Debug, Parser)]
#[command(name = "mdterm", version, about)]
struct Cli {
    /// Markdown file to render; reads standard input when omitted.
    path: Option<PathBuf>,

    /// Wrap width in columns (defaults to the terminal width).
    #[arg(short, long, allow_negative_numbers = true)]
    width: Option<i64>,

    /// Leave out the version trailer.
    #[arg(long)]
    no_trailer: bool,

    /// Log degraded constructs to stderr.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mdterm: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> mdterm::Result<()> {
    let markdown = read_input(cli.path.as_ref())?;
    let width = cli.width.map(normalize_width).unwrap_or_else(detect_terminal_width);
    tracing::debug!(width, "rendering");

    let options = RenderOptions {
        terminal_width: width,
        ..RenderOptions::default()
    }
    .suppress_trailer(cli.no_trailer)
    .debug_logging(cli.debug);
    let rendered = render_markdown_with_options(&markdown, options);

    let mut out = io::BufWriter::new(io::stdout().lock());
    out.write_all(rendered.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> mdterm::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        }),
        None => {
            let mut markdown = String::new();
            io::stdin().read_to_string(&mut markdown).map_err(Error::Stdin)?;
            Ok(markdown)
        }
    }
}
