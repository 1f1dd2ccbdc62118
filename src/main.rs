use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};

use certpress::config::Config;
use certpress::mail::SmtpMailer;
use certpress::{batch, dispatch, new_rasterizer, roster, RasterConfig, Strategy};

#[derive(Parser)]
#[command(name = "certpress", version, about = "Generate and mail event certificates")]
struct Cli {
    /// Configuration file with [certificate] and [email] sections
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render certificates and email bodies into the output root
    Generate {
        /// Roster CSV with at least name and email columns
        #[arg(long, default_value = "runners.csv")]
        roster: PathBuf,

        /// Directory holding certificate.svg, email.txt, and email.html
        #[arg(long, default_value = "templates")]
        templates: PathBuf,

        /// Output root; one folder per recipient
        #[arg(long, default_value = "out")]
        out: PathBuf,

        /// Rasterizer backend
        #[arg(long, value_enum, default_value_t = StrategyArg::Shared)]
        strategy: StrategyArg,
    },
    /// Email every completed folder under the output root
    Send {
        /// Output root produced by `generate`
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// One browser process reused across the batch
    Shared,
    /// A fresh browser process per certificate
    PerCall,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Shared => Strategy::Shared,
            StrategyArg::PerCall => Strategy::PerCall,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate {
            roster,
            templates,
            out,
            strategy,
        } => generate(&cli.config, &roster, &templates, &out, strategy.into()),
        Command::Send { out } => send(&cli.config, &out),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn generate(
    config: &Path,
    roster_path: &Path,
    templates_dir: &Path,
    out_root: &Path,
    strategy: Strategy,
) -> certpress::Result<ExitCode> {
    let config = Config::load(config)?;
    let shared = config.certificate.context()?;
    let roster = roster::load(roster_path)?;
    let templates = batch::Templates::load(templates_dir)?;

    info!("rendering {} certificates into {}", roster.len(), out_root.display());
    let mut rasterizer = new_rasterizer(strategy, RasterConfig::default())?;
    let outcome = batch::generate(&roster, &shared, &templates, out_root, rasterizer.as_mut());
    rasterizer.close()?;
    outcome?;

    Ok(ExitCode::SUCCESS)
}

fn send(config: &Path, out_root: &Path) -> certpress::Result<ExitCode> {
    let config = Config::load(config)?;
    let outgoing = dispatch::collect_outgoing(out_root, config.email.attachments_dir.as_deref())?;
    if outgoing.is_empty() {
        warn!("nothing to send under {}", out_root.display());
        return Ok(ExitCode::SUCCESS);
    }

    info!(
        "sending {} messages with {} workers via {}",
        outgoing.len(),
        config.email.workers,
        config.email.relay
    );
    let email = config.email.clone();
    let results = dispatch::dispatch(outgoing, email.workers, || SmtpMailer::connect(&email));

    let mut failed = 0usize;
    for (recipient, result) in &results {
        match result {
            Ok(()) => info!("sent to {recipient}"),
            Err(e) => {
                failed += 1;
                error!("failed to send to {recipient}: {e}");
            }
        }
    }

    if failed > 0 {
        warn!("{failed} of {} sends failed", results.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
