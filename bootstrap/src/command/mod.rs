pub mod serve;

use crate::args::CommonArgs;
use crate::command::serve::ServeArgs;
use clap::Subcommand;
use tracing::instrument;

#[derive(Subcommand)]
pub enum Command {
    /// Connects to Discord and answers commands until stopped
    #[command(name = "serve")]
    Serve(#[arg(flatten)] ServeArgs),
}

impl Command {
    #[instrument(level = "trace", skip(self, common_args))]
    pub async fn run(self, common_args: CommonArgs) -> anyhow::Result<()> {
        match self {
            Command::Serve(args) => serve::run(common_args, args).await,
        }
    }
}
