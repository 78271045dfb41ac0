use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use uuid::Uuid;

use recsched_core::config::RecorderConfig;
use recsched_core::wallclock::TimeCodec;
use recsched_events::{marshal, EventRecord, RepeatRule};

mod render;

/// Scheduled-recording manager: one load → operate → save session per run.
#[derive(Parser)]
#[command(name = "recsched", version, about)]
struct Cli {
    /// Path to recsched.toml (default: ~/.recsched/recsched.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print all events sorted by start time (rollover applied in memory).
    List {
        /// Emit JSON instead of the plain table.
        #[arg(long)]
        json: bool,
    },
    /// Print a single event.
    Show { tag: String },
    /// Schedule a new recording under a freshly minted tag.
    Add {
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Start as `MM/DD/YYYY HH:MM AM`.
        #[arg(long)]
        start: String,
        /// Stop as `MM/DD/YYYY HH:MM AM`.
        #[arg(long)]
        stop: String,
        /// Once, Daily, Weekly or Monday-Friday (default: Once).
        #[arg(long)]
        repeat: Option<String>,
    },
    /// Remove an event. Removing an absent tag is a no-op.
    Remove { tag: String },
    /// Advance or purge every event whose stop time has passed, then save.
    Rollover,
    /// Note that an event's recording fired (retires Once events).
    Recorded { tag: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recsched=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // load config: explicit path > RECSCHED_CONFIG env > ~/.recsched/recsched.toml
    let env_path = std::env::var("RECSCHED_CONFIG").ok();
    let config_path = cli.config.as_deref().or(env_path.as_deref());
    let config = RecorderConfig::load(config_path)?;
    let events_file = config
        .events_file()
        .context("global.recorddir is not configured; set it in recsched.toml")?;

    let codec = TimeCodec::system();
    let mut store = marshal::load(&events_file)?;

    match cli.command {
        Command::List { json } => {
            // Rollover before display, never persisted: listing must not write.
            store.rollover_all(codec.now());
            if json {
                render::print_json(&store)?;
            } else {
                render::print_table(&codec, &store);
            }
        }

        Command::Show { tag } => {
            store.rollover_all(codec.now());
            match store.lookup(&tag) {
                Some(record) => render::print_record(&codec, &tag, record),
                None => anyhow::bail!("no event with tag {tag}"),
            }
        }

        Command::Add {
            channel,
            title,
            start,
            stop,
            repeat,
        } => {
            let record = EventRecord {
                channel,
                title,
                start: Some(render::parse_stamp(&codec, &start)?),
                stop: Some(render::parse_stamp(&codec, &stop)?),
                repeat: repeat
                    .as_deref()
                    .unwrap_or("")
                    .parse::<RepeatRule>()
                    .unwrap_or_default(),
            };
            let tag = Uuid::new_v4().to_string();
            store.add(tag.clone(), record)?;
            marshal::save(&events_file, &store)?;
            println!("{tag}");
        }

        Command::Remove { tag } => {
            if !store.delete(&tag) {
                warn!(%tag, "no such event, nothing removed");
            }
            marshal::save(&events_file, &store)?;
        }

        Command::Rollover => {
            let before = store.len();
            store.rollover_all(codec.now());
            marshal::save(&events_file, &store)?;
            info!(
                before,
                after = store.len(),
                "rollover pass complete"
            );
        }

        Command::Recorded { tag } => {
            if !store.mark_recorded(&tag, codec.now()) {
                anyhow::bail!("no event with tag {tag}");
            }
            marshal::save(&events_file, &store)?;
        }
    }

    Ok(())
}
