use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jiff::civil::Date;
use staytrack::{OutputFormat, commands, default_data_dir, default_profile_path, init_logging};

#[derive(Parser, Debug)]
#[command(name = "staytrack")]
#[command(about = "Track residence, visa and tax-day goals against your travel history")]
struct Args {
    /// Path to the data directory (default: ~/.staytrack/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Profile to read (default: <data-dir>/profile.yaml)
    #[arg(short, long, global = true)]
    profile: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every goal in the profile
    Status {
        /// Evaluate as of this date (default: today)
        #[arg(long)]
        as_of: Option<Date>,
        /// Only goals whose name contains this text
        #[arg(short, long)]
        goal: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Look for incomplete or overlapping trips and invalid goals
    Check {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List the supported goal types
    Goals {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List trips with their day counts
    Trips {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Write a sample profile
    Init {
        /// Replace an existing profile
        #[arg(long)]
        force: bool,
    },
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    let profile = args
        .profile
        .unwrap_or_else(|| default_profile_path(&data_dir));

    let _guard = init_logging(Some(&data_dir), &args.log_level)?;
    tracing::debug!(profile = %profile.display(), "starting");

    let mut stdout = std::io::stdout().lock();
    match args.command {
        Command::Status {
            as_of,
            goal,
            format,
        } => {
            let as_of = as_of.unwrap_or_else(commands::today);
            commands::status(&mut stdout, &profile, as_of, goal.as_deref(), format)?;
        }
        Command::Check { format } => {
            if !commands::check(&mut stdout, &profile, format)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Goals { format } => commands::goals(&mut stdout, format)?,
        Command::Trips { format } => commands::trips(&mut stdout, &profile, format)?,
        Command::Init { force } => commands::init(&mut stdout, &profile, force)?,
    }

    Ok(ExitCode::SUCCESS)
}
