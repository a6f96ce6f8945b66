use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "hopsh", about = "Browse bastion hosts and open a shell on one")]
pub struct Cli {
    /// Config file path (default: ~/.config/hopsh/config.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Connect to this hostname immediately, skipping the browser.
    #[arg(long, value_name = "HOSTNAME")]
    pub connect: Option<String>,

    /// Force a cache-populating fetch and exit.
    #[arg(long)]
    pub nodecache: bool,
}
