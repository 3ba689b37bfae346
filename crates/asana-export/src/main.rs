use clap::Parser;

use asana_export::asana;
use asana_export::prelude::*;
use asana_export::Global;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Export Asana projects, tasks, and attachments to structured archives"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List workspace projects grouped by team
    Projects(asana::list::ListOptions),

    /// Export selected projects to a zip bundle or per-project directories
    Export(asana::export::ExportOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Projects(options) => asana::list::run(options, app.global).await,
        SubCommands::Export(options) => asana::export::run(options, app.global).await,
    }
}
