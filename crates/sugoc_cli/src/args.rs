//! the args for running sugoc

use clap::{value_parser, ArgAction};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// The args struct
#[derive(Debug, clap::Parser)]
#[clap(author, version, about = "Lowers sugo source files into plain Go syntax")]
pub struct Args {
    #[command(flatten)]
    logging: LoggingArgs,

    /// Report misplaced break, continue, goto and fallthrough statements and unused labels
    #[clap(long, global = true)]
    pub strict: bool,
    /// Maximum number of files processed at once. Defaults to the number of cpus.
    #[clap(short = 'j', long, global = true, env = "SUGOC_JOBS")]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn logging(&self) -> &LoggingArgs {
        &self.logging
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Prints every file after lowering
    Dump {
        #[clap(required = true, value_name = "source file", value_hint = clap::ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },
    /// Only reports errors
    Check {
        #[clap(required = true, value_name = "source file", value_hint = clap::ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },
}

impl Command {
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Command::Dump { files } | Command::Check { files } => files,
        }
    }
}

/// Common way to set logging levels
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct LoggingArgs {
    #[clap(short = 'v', value_parser = value_parser!(u8).range(0..=2), action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    #[clap(short = 'q', value_parser = value_parser!(u8).range(0..=2), action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

impl LoggingArgs {
    /// Gets the logging level based on whether `-v[v]` or `-q[q]` has been used,
    pub fn log_level_filter(&self) -> LevelFilter {
        match self.verbose.min(2) as i8 - self.quiet.min(2) as i8 {
            i8::MIN..=-2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            2..=i8::MAX => LevelFilter::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    fn parse(line: &str) -> Args {
        Args::try_parse_from(line.split(' ')).expect("could not parse test string")
    }

    #[test]
    fn test_args_parsing() {
        let args = parse("sugoc check file.sugo other.sugo");
        assert!(matches!(args.command, Command::Check { .. }));
        assert_eq!(args.command.files()[0], Path::new("file.sugo"));
        assert_eq!(args.command.files().len(), 2);
        assert!(!args.strict);
        assert_eq!(args.jobs, None);
    }

    #[test]
    fn test_global_flags() {
        let args = parse("sugoc dump --strict -j 2 file.sugo");
        assert!(matches!(args.command, Command::Dump { .. }));
        assert!(args.strict);
        assert_eq!(args.jobs, Some(2));
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse("sugoc check f").logging().log_level_filter(), LevelFilter::INFO);
        assert_eq!(parse("sugoc -vv check f").logging().log_level_filter(), LevelFilter::TRACE);
        assert_eq!(parse("sugoc -qq check f").logging().log_level_filter(), LevelFilter::OFF);
        assert!(Args::try_parse_from(["sugoc", "-v", "-q", "check", "f"]).is_err());
    }

    #[test]
    fn test_files_are_required() {
        assert!(Args::try_parse_from(["sugoc", "dump"]).is_err());
    }
}
