//! Plays a match headlessly and prints the round log.
//!
//! `RUST_LOG=debug simulate --players 3 --rounds 10 --seed 7`

use clap::Parser;
use speed_battle_engine::config::MatchConfig;
use speed_battle_engine::error::Result;
use speed_battle_engine::rules::RoundOutcome;
use speed_battle_engine::Match;

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate a Speed Battle dice match", long_about = None)]
struct Args {
    /// JSON match config; flags below override it.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    #[arg(long)]
    players: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Completed rounds to play, sudden-death rounds included.
    #[arg(long, default_value_t = 10)]
    rounds: u64,
    /// Print the final state as JSON instead of the table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut cfg = match &args.config { Some(path) => MatchConfig::from_path(path)?, None => MatchConfig::default() };
    if let Some(n) = args.players { cfg.players = MatchConfig::with_player_count(n).players; }
    if args.seed.is_some() { cfg.seed = args.seed; }

    let mut game = Match::from_config(&cfg)?;
    while game.state().round_idx < args.rounds {
        game.roll()?;
        game.apply_scheduled_reset();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(game.state())?);
        return Ok(());
    }
    let names: Vec<String> = game.state().players.iter().map(|p| p.name.clone()).collect();
    for summary in game.history_log() {
        let result = match (&summary.outcome, summary.winner_name(&names)) {
            (_, Some(name)) => format!("Winner: {}", name),
            (RoundOutcome::Draw { tied }, None) if tied.is_empty() => "Draw (no unique dice)".to_string(),
            _ => "Draw".to_string(),
        };
        let dice: Vec<String> = summary.faces.iter()
            .map(|f| f.iter().map(u8::to_string).collect::<Vec<_>>().join(" · "))
            .collect();
        println!("Round {:>3}  {:<18} {:<40} {}", summary.number, summary.phase.label(), dice.join(" | "), result);
    }
    println!();
    let leaders = game.leaders();
    for (i, p) in game.state().players.iter().enumerate() {
        println!("{:<12} {:>4}{}", p.name, p.victories, if leaders.contains(&i) { "  *" } else { "" });
    }
    Ok(())
}
