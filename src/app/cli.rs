use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Aggregate a project's architecturally significant files into one blueprint"
)]
pub struct Cli {
    /// Root directory of the project to scan
    #[arg(default_value = ".")]
    pub project_path: PathBuf,

    /// File the blueprint is written to
    #[arg(long, short = 'o', default_value = "monorepo_snapshot_blueprint.txt")]
    pub output: PathBuf,

    /// Configuration file (defaults to ./blueprint.toml, then ~/.config/blueprint/config.toml)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Skip files larger than this many kilobytes
    #[arg(long)]
    pub max_file_size_kb: Option<u64>,

    /// Omit the category / matched-pattern header from each file block
    #[arg(long)]
    pub no_provenance: bool,

    /// Extra patterns for files or directories to ignore
    #[arg(long, num_args = 1..)]
    pub ignore: Option<Vec<String>>,

    /// Print the bundled starter configuration and exit
    #[arg(long)]
    pub print_default_config: bool,
}
