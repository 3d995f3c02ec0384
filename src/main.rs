use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use bulk_pinner::cache::FileBoardCache;
use bulk_pinner::config::{ConfigError, PinnerConfig};
use bulk_pinner::events::{EventReceiver, SessionEvent};
use bulk_pinner::image::ImageSource;
use bulk_pinner::remote::{PinError, PinterestClient};
use bulk_pinner::services::session::{SessionCoordinator, SessionError};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Remote(#[from] PinError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("cannot read image {path}: {source}")]
    Image { path: PathBuf, source: std::io::Error },
    #[error("{failed} of {total} pin(s) failed")]
    PinsFailed { failed: usize, total: usize },
    #[error("event stream closed before all pins finished")]
    EventsClosed,
}

#[derive(Parser, Debug)]
#[command(name = "bulk-pinner", about = "Create many pins at once from local images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the boards you can pin to.
    Boards {
        /// Ignore the local board cache.
        #[arg(long)]
        refresh: bool,
    },
    /// Pin every given image.
    Pin {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Note applied to every pin.
        #[arg(long, env = "PINNER_NOTE")]
        note: Option<String>,
        /// Link applied to every pin.
        #[arg(long)]
        link: Option<String>,
        /// Board id applied to every pin (defaults to your first board).
        #[arg(long)]
        board: Option<String>,
        /// Ignore the local board cache.
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PinnerConfig::from_env()?;
    let remote = Arc::new(PinterestClient::new(&config)?);
    let cache = Arc::new(FileBoardCache::new(config.board_cache_path.clone()));
    let (session, events) = SessionCoordinator::new(cache, remote);

    match cli.command {
        Command::Boards { refresh } => run_boards(session, refresh).await,
        Command::Pin { files, note, link, board, refresh } => {
            run_pin(session, events, PinArgs { files, note, link, board, refresh }).await
        }
    }
}

async fn run_boards(mut session: SessionCoordinator, refresh: bool) -> Result<(), CliError> {
    let boards = session.refresh_boards(refresh).await?;
    if boards.is_empty() {
        println!("no boards yet; create one on the service, then run `boards --refresh`");
    }
    for board in boards {
        println!("{}\t{}", board.id, board.name);
    }
    Ok(())
}

struct PinArgs {
    files: Vec<PathBuf>,
    note: Option<String>,
    link: Option<String>,
    board: Option<String>,
    refresh: bool,
}

async fn run_pin(mut session: SessionCoordinator, mut events: EventReceiver, args: PinArgs) -> Result<(), CliError> {
    session.refresh_boards(args.refresh).await?;

    let mut images = Vec::with_capacity(args.files.len());
    for path in args.files {
        let image = ImageSource::from_path(&path)
            .await
            .map_err(|source| CliError::Image { path: path.clone(), source })?;
        images.push(image);
    }
    let drafts = session.create_drafts(images);

    if let Some(first) = drafts.first() {
        first.set_note(args.note.unwrap_or_default());
        first.set_link(args.link.unwrap_or_default());
    }
    session.autofill_from_first();
    if let Some(board) = args.board.as_deref() {
        session.apply_board_to_all(board);
    }

    let dispatched = session.send()?;
    let mut pending: HashSet<_> = dispatched.iter().copied().collect();
    let total = pending.len();
    let mut failed = 0;

    while !pending.is_empty() {
        let Some(event) = events.recv().await else {
            return Err(CliError::EventsClosed);
        };
        let (draft_id, outcome) = match event {
            SessionEvent::SubmissionFinished { draft_id, outcome } => (draft_id, outcome),
            other => {
                debug!(event = ?other, "cli: session event");
                continue;
            }
        };
        pending.remove(&draft_id);

        let name = session.draft(draft_id).map_or("?", |d| d.image().name());
        match outcome {
            Ok(pin_id) => println!("pinned\t{name}\t{pin_id}"),
            Err(e) => {
                failed += 1;
                println!("failed\t{name}\t{e}");
            }
        }
    }

    if failed > 0 {
        return Err(CliError::PinsFailed { failed, total });
    }
    Ok(())
}
