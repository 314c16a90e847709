//! Point d'entrée CLI pour kartblad-clipper

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use kartblad_clipper::cli::{self, ClipArgs};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Découper des données laser selon les kartblad d'une zone d'intérêt
#[derive(Parser)]
#[command(name = "kartblad-clipper")]
#[command(author, version)]
#[command(about = "Clip laser data against kartblad polygon geometries")]
#[command(long_about = "Kartblad Clipper\n\nBuilds the kartblad covering an area of interest with Fysak, optionally indexes the input laser data, then clips the *.laz files against every kartblad polygon with LAStools.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv); désactive l'indicateur d'avancement
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long)]
    quiet: bool,

    #[command(flatten)]
    clip: ClipArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    info!(
        input = %cli.clip.input_directory.display(),
        output = %cli.clip.output_directory.display(),
        aoi = %cli.clip.aoi.display(),
        "Clipping laser data"
    );
    cli::cmd_clip(&cli.clip, cli.verbose > 0).await?;

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
