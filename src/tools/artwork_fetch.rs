use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, ValueEnum};
use log::{error, info};

use discogs_artwork::artwork::{Artwork, ArtworkWorker, Fallback, Strategy, WorkerOptions};
use discogs_artwork::config::{self, ArtworkConfig, CacheDirectory};
use discogs_artwork::data::AlbumQuery;
use discogs_artwork::logging::{self, LoggingConfig};

/// Albums fetched when none is given on the command line
const DEMO_ALBUMS: [(&str, &str, Option<i32>); 4] = [
    ("Arcade Fire", "Funeral", Some(2004)),
    ("Tame Impala", "Innerspeaker", Some(2010)),
    ("Tame Impala", "Innerspeaker", Some(2010)),
    ("Fake artist", "Fake album title", None),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Random,
    Largest,
    Cache,
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Download album artwork from Discogs", long_about = None)]
struct Args {
    /// Artist name
    #[clap(long, short = 'a', requires = "album")]
    artist: Option<String>,

    /// Album title
    #[clap(long, short = 'b', requires = "artist")]
    album: Option<String>,

    /// Release year
    #[clap(long, short = 'y')]
    year: Option<i32>,

    /// Retrieval strategy
    #[clap(long, value_enum, default_value = "cache")]
    strategy: StrategyArg,

    /// Use the largest image when nothing is cached
    #[clap(long)]
    largest_fallback: bool,

    /// Directory to store images in (default: the working directory)
    #[clap(long, short = 'd')]
    directory: Option<PathBuf>,

    /// JSON configuration file with a "discogs" section
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// Discogs personal access token
    #[clap(long, env = "DISCOGS_TOKEN")]
    token: Option<String>,

    /// Run each lookup on a background worker
    #[clap(long)]
    background: bool,

    /// Retries after a release without images (random strategies only)
    #[clap(long, default_value_t = 0)]
    retries: usize,

    /// JSON logging configuration (overrides --verbose)
    #[clap(long)]
    log_config: Option<PathBuf>,

    #[clap(long, short = 'v', help = "Enable debug output")]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<ArtworkConfig, Box<dyn std::error::Error>> {
    let mut artwork_config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let json: serde_json::Value = serde_json::from_str(&content)?;
            ArtworkConfig::from_config(&json)
        }
        None => ArtworkConfig {
            // Let's download to our working directory
            directory: CacheDirectory::WorkingDirectory,
            ..ArtworkConfig::default()
        },
    };

    if let Some(directory) = &args.directory {
        artwork_config.directory = CacheDirectory::Path(directory.clone());
    }
    if let Some(token) = &args.token {
        artwork_config.token = Some(token.clone());
    }
    Ok(artwork_config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match &args.log_config {
        Some(path) => logging::initialize_logging_from_file(path)?,
        None => LoggingConfig {
            level: if args.verbose { "debug".to_string() } else { "info".to_string() },
            timestamps: false,
            ..LoggingConfig::default()
        }
        .initialize_logger()?,
    }

    let artwork_config = load_config(&args)?;
    config::set_config(artwork_config.clone());

    let queries: Vec<AlbumQuery> = match (&args.artist, &args.album) {
        (Some(artist), Some(album)) => vec![AlbumQuery::new(artist, album, args.year)],
        _ => DEMO_ALBUMS
            .iter()
            .map(|(artist, album, year)| AlbumQuery::new(artist, album, *year))
            .collect(),
    };

    let fallback = if args.largest_fallback { Fallback::Largest } else { Fallback::Random };
    let strategy = match args.strategy {
        StrategyArg::Random => Strategy::Random,
        StrategyArg::Largest => Strategy::Largest,
        StrategyArg::Cache => Strategy::Cache(fallback),
    };

    let artwork = Arc::new(Artwork::from_config(&artwork_config));
    let mut failures = 0;

    for query in queries {
        info!("Looking up artwork for {}", query);
        let outcome = if args.background {
            let options = WorkerOptions {
                strategy,
                max_retries: args.retries,
                ..WorkerOptions::default()
            };
            ArtworkWorker::start_with(Arc::clone(&artwork), query.clone(), options, Vec::new()).wait()
        } else {
            artwork.retrieve(strategy, &query)
        };

        match outcome {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                error!("{}: {}", query, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} lookups failed", failures).into());
    }
    Ok(())
}
