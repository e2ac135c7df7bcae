//! Entry point for modgen.
//! Scans a mod project, resolves asset identities and arrays, parses models.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod scan;

#[derive(Parser, Debug)]
#[command(name = "modgen")]
#[command(about = "Resolve asset identities, arrays and models of a mod project")]
#[command(version)]
struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Project root (defaults to the folder containing build.txt)
    #[arg(long, env = "MODGEN_ROOT")]
    root: Option<PathBuf>,

    /// Decode texture assets and report their dimensions
    #[arg(long)]
    probe_textures: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let files = scan::discover(&cli.path)?;
    let root = scan::resolve_root(cli.root.as_deref(), &cli.path, &files);
    log::info!(
        "Scanning {} ({} files), root={}",
        cli.path.display(),
        files.len(),
        root
    );

    let report = scan::scan(&root, &files, cli.probe_textures);
    print!("{report}");

    match report.failures() {
        0 => log::info!("Done."),
        n => log::warn!("Done with {n} failed asset(s)."),
    }
    Ok(())
}
