use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use scada_core::ScreenKind;
use scada_views::SortBy;

mod commands;

#[derive(Parser)]
#[command(
    name = "scada",
    about = "SCADA feed — headless driver for the industrial monitoring dashboard",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one snapshot for a screen and print its derived view as JSON
    Snapshot {
        /// Screen to generate
        #[arg(value_enum)]
        screen: ScreenArg,
        /// Path to scada.toml (default: ./scada.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Base RNG seed, overriding [feed].seed
        #[arg(long)]
        seed: Option<u64>,
        /// Alarms only: keep severity ≥ 3
        #[arg(long)]
        critical_only: bool,
        /// Maintenance only: sort order
        #[arg(long, value_enum, default_value = "rul")]
        sort_by: SortArg,
    },
    /// Mount screens and log every refreshed view.
    ///
    /// Runs until Ctrl-C, or until --duration elapses, then unmounts
    /// every screen.
    Watch {
        /// Path to scada.toml (default: ./scada.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Screens to mount (repeatable; default: all four)
        #[arg(short, long = "screen", value_enum)]
        screens: Vec<ScreenArg>,
        /// Stop after this long, e.g. "30s" or "2m"
        #[arg(short, long)]
        duration: Option<String>,
        /// Also print each view as a JSON line on stdout
        #[arg(long)]
        json: bool,
    },
    /// Write a scaffold scada.toml with every default spelled out
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScreenArg {
    Alarms,
    Maintenance,
    Pipeline,
    Sustainability,
}

impl From<ScreenArg> for ScreenKind {
    fn from(arg: ScreenArg) -> Self {
        match arg {
            ScreenArg::Alarms => ScreenKind::Alarms,
            ScreenArg::Maintenance => ScreenKind::Maintenance,
            ScreenArg::Pipeline => ScreenKind::Pipeline,
            ScreenArg::Sustainability => ScreenKind::Sustainability,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Rul,
    Name,
    Status,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Rul => SortBy::Rul,
            SortArg::Name => SortBy::Name,
            SortArg::Status => SortBy::Status,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scada=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot {
            screen,
            config,
            seed,
            critical_only,
            sort_by,
        } => commands::snapshot::snapshot(
            screen.into(),
            config.as_deref(),
            seed,
            critical_only,
            sort_by.into(),
        ),
        Commands::Watch {
            config,
            screens,
            duration,
            json,
        } => {
            let screens: Vec<ScreenKind> = screens.into_iter().map(Into::into).collect();
            commands::watch::watch(config.as_deref(), &screens, duration.as_deref(), json)
        }
        Commands::Init { path } => commands::init::init(&path),
    }
}
