use std::error::Error;
use std::{env, fs, io};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use coup_engine::{stats, Coup, GameConfig, RandomAgent, Seat};

const NUM_BOTS: usize = 4;

/// Plays one game between random bots and writes the stats as CSV to stdout.
/// An optional first argument names a JSON config file.
fn main() -> Result<(), Box<dyn Error>> {
    // logs go to stderr so stdout stays clean csv
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match env::args().nth(1) {
        Some(path) => GameConfig::from_json(&fs::read_to_string(path)?)?,
        None => GameConfig::default(),
    };
    info!(?config, "starting game");

    let seats = (0..NUM_BOTS)
        .map(|idx| Seat::new(format!("Player {}", idx + 1), RandomAgent::new(rand::random())))
        .collect();
    let mut game = Coup::new(seats, config)?;
    let results = game.play_game()?;

    let game_id = format!("{:016x}", rand::random::<u64>());
    stats::write_csv(io::stdout().lock(), &game_id, &results)?;

    Ok(())
}
