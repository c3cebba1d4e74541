use std::path::PathBuf;

use anyhow::{Context, Result};
use chess_board::{Fen, Notation, INITIAL_FEN};
use chess_cli::Game;
use chess_engine::{Difficulty, SearchConfig, SearchEngine};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "chess-cli", about = "Alpha-beta chess engine: best-move queries and self-play")]
struct Cli {
    /// JSON search config file ({"difficulty": "hard", "max_depth": 4})
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Difficulty preset (easy|medium|hard), ignored when --config is given
    #[arg(long, global = true)]
    difficulty: Option<Difficulty>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the best move for a position
    Best {
        /// Position in FEN
        #[arg(long, default_value = INITIAL_FEN)]
        fen: String,

        /// Search depth (overrides the config)
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Let the engine play against itself from the start position
    Selfplay {
        /// Search depth (overrides the config)
        #[arg(long)]
        depth: Option<u32>,

        /// Max plies before stopping
        #[arg(long, default_value_t = 200)]
        max_plies: usize,

        /// Print the game summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli, depth: Option<u32>) -> Result<SearchConfig> {
    let mut config = match (&cli.config, cli.difficulty) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SearchConfig::from_json(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        (None, Some(difficulty)) => SearchConfig::from_difficulty(difficulty),
        (None, None) => SearchConfig::default(),
    };

    if let Some(depth) = depth {
        config.max_depth = depth;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_engine=info".parse()?)
                .add_directive("chess_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Best { fen, depth } => {
            let config = load_config(&cli, *depth)?;
            let state = Fen::parse(fen).with_context(|| format!("invalid FEN: {}", fen))?;
            info!(depth = config.max_depth, fen = %fen, "searching");

            let mut engine = SearchEngine::new(config);
            match engine.search(&state) {
                Some(mv) => println!("{}", Notation::to_coordinate(&mv)),
                None => println!("(none)"),
            }
        }
        Command::Selfplay {
            depth,
            max_plies,
            json,
        } => {
            let config = load_config(&cli, *depth)?;
            info!(depth = config.max_depth, max_plies, "starting self-play");

            let mut engine = SearchEngine::new(config);
            let mut game = Game::new();
            let result = game.self_play(&mut engine, *max_plies);
            let summary = game.summary(result);

            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.moves.join(" "));
                println!("{:?} after {} plies", summary.result, summary.plies);
                println!("{}", Fen::to_string(game.state()));
            }
        }
    }

    Ok(())
}
