use clap::Parser;
use retro_core::store::DocStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "retro-board",
    about = "Collaborative retrospective board — sprints, sticky notes, action items",
    version
)]
struct Cli {
    /// Directory holding the board database (created if missing)
    #[arg(long, env = "RETRO_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Port to listen on (0 = OS-assigned)
    #[arg(long, env = "RETRO_PORT", default_value = "3440")]
    port: u16,

    /// Don't open the browser automatically
    #[arg(long)]
    no_open: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    std::fs::create_dir_all(&cli.data_dir)?;
    let store = DocStore::open(&cli.data_dir.join("retro-board.redb"))?;

    retro_server::serve(store, cli.port, !cli.no_open).await
}
