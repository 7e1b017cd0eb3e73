use crate::args::{Args, Command};
use clap::Parser;
use eyre::eyre;
use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use sugo_ast_parsing::parser::error::SyntaxError;
use sugo_ast_parsing::parser::Mode;
use sugo_tokens::pos::LineReader;
use sugoc::{SugoC, SugoCError, SugoCErrorKind, Unit};
use tracing::metadata::LevelFilter;
use tracing::{debug, info, trace};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry};

mod args;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.logging().log_level_filter())?;
    trace!("starting sugoc with args: {args:?}");
    debug!("sugoc version: {}", env!("CARGO_PKG_VERSION"));

    let mut builder = SugoC::builder();
    if let Some(jobs) = args.jobs {
        builder = builder.jobs(jobs);
    }
    if args.strict {
        builder = builder.mode(Mode::STRICT);
    }
    let sugoc = builder.build()?;

    let units = match sugoc.compile_all(args.command.files().to_vec()).await {
        Ok(units) => units,
        Err(error) => {
            let failed = report(&error);
            return Err(eyre!("could not compile {failed} file(s)"));
        }
    };

    match args.command {
        Command::Dump { .. } => dump(&units)?,
        Command::Check { .. } => {
            for unit in &units {
                info!("{}: {:?}", unit.path.display(), unit.report);
            }
            println!(
                "{} {} file(s)",
                "ok".if_supports_color(Stdout, |text| text.green()),
                units.len()
            );
        }
    }
    Ok(())
}

fn dump(units: &[Unit]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for (i, unit) in units.iter().enumerate() {
        if units.len() > 1 {
            if i > 0 {
                writeln!(stdout)?;
            }
            writeln!(stdout, "// {}", unit.path.display())?;
        }
        write!(stdout, "{}", unit.file)?;
    }
    stdout.flush()
}

/// Prints every failure of `error` to stderr and returns the number of files that failed
fn report(error: &SugoCError) -> usize {
    match error.kind() {
        SugoCErrorKind::Multi(errors) => errors.iter().map(report).sum(),
        SugoCErrorKind::Parse { path, diagnostics } => {
            let src = fs::read_to_string(path).ok();
            for diagnostic in diagnostics {
                print_diagnostic(path, src.as_deref(), diagnostic);
            }
            1
        }
        SugoCErrorKind::Io(e) => {
            eprintln!("{}: {e}", "error".if_supports_color(Stderr, |text| text.bright_red()));
            1
        }
    }
}

fn print_diagnostic(path: &Path, src: Option<&str>, diagnostic: &SyntaxError) {
    eprintln!(
        "{}: {}",
        "error".if_supports_color(Stderr, |text| text.bright_red()),
        diagnostic.if_supports_color(Stderr, |text| text.bold())
    );
    match (src, diagnostic.pos()) {
        (Some(src), Some(pos)) => {
            let snippet = LineReader::new(1, 0).snippet(src, pos);
            eprint!("{}", snippet.if_supports_color(Stderr, |text| text.blue()));
        }
        _ => debug!("no source available for {}", path.display()),
    }
}

fn init_logging(level_filter: LevelFilter) -> eyre::Result<()> {
    let registry = Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format().with_thread_ids(true))
                .with_writer(io::stderr)
                .with_filter(level_filter),
        )
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)?;

    Ok(())
}
