use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use discovery_client::{
    logging,
    models::{MediaType, Suggestion, WatchlistFilter, WatchlistKey},
    pagination::PageButton,
    search::{SearchResultsReady, SearchView},
    ui::ResultSink,
    AppContext, Collaborators, Config, Dispatcher, UiEvent,
};

#[derive(Parser)]
#[command(name = "discovery-client")]
#[command(about = "Search the catalog and manage your watchlist")]
#[command(version)]
struct Cli {
    /// Override the API base URL from the environment
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies or TV shows
    Search {
        query: String,
        #[arg(long = "type", default_value = "movie")]
        media_type: MediaType,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show the suggestion dropdown for a partial query
    Suggest { query: String },
    /// List the watchlist
    Watchlist {
        #[arg(long, default_value = "all")]
        filter: WatchlistFilter,
    },
    /// Add a title to the watchlist, or remove it if already present
    Toggle {
        media_type: MediaType,
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        poster: String,
    },
    /// Mark a watchlist item as watched
    Watched {
        media_type: MediaType,
        id: String,
        #[arg(long, default_value_t = 0.0)]
        rating: f64,
    },
    /// Mark a watchlist item as not yet watched
    Unwatched { media_type: MediaType, id: String },
    /// Show watchlist statistics
    Stats {
        /// Compute from the fetched list instead of asking the service
        #[arg(long)]
        local: bool,
    },
    /// Export the watchlist
    Export {
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

/// Prints search output to stdout
struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn on_results(&self, ready: SearchResultsReady) {
        if let SearchView::Fallback { notice, .. } = &ready.view {
            println!("! {}", notice);
        }
        if ready.view == SearchView::Empty {
            println!("No {} found for \"{}\"", ready.media_type.label(), ready.query);
            return;
        }

        for item in ready.view.items() {
            println!(
                "{:>8}  {} ({})  {:.1}",
                item.id,
                item.display_title(),
                item.year(),
                item.vote_average
            );
        }

        let pages: Vec<String> = ready
            .page_model
            .buttons
            .iter()
            .map(|button| match button {
                PageButton::Page(p) if ready.page_model.is_active(button) => format!("[{}]", p),
                PageButton::Page(p) => p.to_string(),
                PageButton::Ellipsis => "...".to_string(),
            })
            .collect();
        if !pages.is_empty() {
            println!("pages: {}  ({} results)", pages.join(" "), ready.total_results);
        }
    }

    fn clear_results(&self) {}

    fn on_suggestions(&self, suggestions: Vec<Suggestion>) {
        for s in suggestions {
            println!("{:<5} {} ({})", s.media_type, s.title, s.year);
        }
    }

    fn clear_suggestions(&self) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }
    logging::init(&config.log_filter)?;

    let context = AppContext::new(&config, Collaborators::tracing(Arc::new(ConsoleSink)))?;
    let dispatcher = Dispatcher::new(context.clone());

    match cli.command {
        Commands::Search {
            query,
            media_type,
            page,
        } => {
            dispatcher
                .dispatch(UiEvent::SetMediaType(media_type))
                .await?;
            context.search.search_page(&query, page).await;
        }
        Commands::Suggest { query } => {
            context.search.fetch_suggestions(&query).await;
        }
        Commands::Watchlist { filter } => {
            context.watchlist.reload().await?;
            let items = context.watchlist.items(filter);
            if items.is_empty() {
                println!("{}", filter.empty_message());
            }
            for item in items {
                let status = if item.watched {
                    format!("watched {:.1}", item.rating)
                } else {
                    "to watch".to_string()
                };
                println!("{:<5} {:>8}  {}  [{}]", item.media_type, item.id, item.title, status);
            }
        }
        Commands::Toggle {
            media_type,
            id,
            title,
            poster,
        } => {
            dispatcher
                .dispatch(UiEvent::ToggleWatchlist {
                    key: WatchlistKey::new(id, media_type),
                    title,
                    poster_path: poster,
                    control: None,
                })
                .await?;
        }
        Commands::Watched {
            media_type,
            id,
            rating,
        } => {
            dispatcher
                .dispatch(UiEvent::ToggleWatched {
                    key: WatchlistKey::new(id, media_type),
                    watched: false,
                    rating,
                })
                .await?;
        }
        Commands::Unwatched { media_type, id } => {
            dispatcher
                .dispatch(UiEvent::ToggleWatched {
                    key: WatchlistKey::new(id, media_type),
                    watched: true,
                    rating: 0.0,
                })
                .await?;
        }
        Commands::Stats { local } => {
            let stats = if local {
                context.watchlist.reload().await?;
                context.watchlist.local_stats()
            } else {
                context.watchlist.stats().await?
            };
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Export { format, output } => {
            context.watchlist.reload().await?;
            let rendered = match format {
                ExportFormat::Json => context.watchlist.export_json()?,
                ExportFormat::Csv => context.watchlist.export_csv()?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "Exported watchlist");
                }
                None => print!("{}", rendered),
            }
        }
    }

    Ok(())
}
