use clap::Parser;
use color_eyre::eyre::Result;
use hopsh_tui::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let code = hopsh_tui::run_main(cli).await?;
    std::process::exit(code)
}
