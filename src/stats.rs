use std::io;
use serde::{Deserialize, Serialize};

/// Why a player had to give up an influence card.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossCause {
    Coup,
    Assassination,
    /// challenged someone who had the card
    LostChallenge,
    /// was challenged without the card
    CaughtBluffing,
}

/// Per-player counters, updated by the engine in the same step as the mutation
/// they describe.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub id: usize,
    pub name: String,
    pub winner: bool,
    pub elimination_round: Option<usize>,
    pub elimination_cause: Option<LossCause>,
    /// cause of every card lost, in order
    pub loss_causes: Vec<LossCause>,
    pub bluffs: u32,
    pub successful_bluffs: u32,
    pub failed_bluffs: u32,
    pub challenges_won: u32,
    pub challenges_lost: u32,
    pub coups_launched: u32,
    pub assassinations_blocked: u32,
    pub coins_earned: u32,
    pub coins_stolen: u32,
    pub coins_lost_to_theft: u32,
}

impl PlayerStats {
    pub fn new(id: usize, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    game_id: &'a str,
    player_id: usize,
    player_name: &'a str,
    winner: bool,
    elimination_round: Option<usize>,
    cause_of_elimination: Option<LossCause>,
    causes_of_loss: String,
    num_bluffs: u32,
    successful_bluffs: u32,
    failed_bluffs: u32,
    challenges_won: u32,
    challenges_lost: u32,
    coups_launched: u32,
    assassinations_blocked: u32,
    total_coins_earned: u32,
    coins_stolen: u32,
    coins_lost_to_theft: u32,
}

impl<'a> CsvRow<'a> {
    fn new(game_id: &'a str, stats: &'a PlayerStats) -> Self {
        let causes_of_loss = stats.loss_causes
            .iter()
            .map(|cause| format!("{:?}", cause))
            .collect::<Vec<_>>()
            .join(";");

        Self {
            game_id,
            player_id: stats.id,
            player_name: &stats.name,
            winner: stats.winner,
            elimination_round: stats.elimination_round,
            cause_of_elimination: stats.elimination_cause,
            causes_of_loss,
            num_bluffs: stats.bluffs,
            successful_bluffs: stats.successful_bluffs,
            failed_bluffs: stats.failed_bluffs,
            challenges_won: stats.challenges_won,
            challenges_lost: stats.challenges_lost,
            coups_launched: stats.coups_launched,
            assassinations_blocked: stats.assassinations_blocked,
            total_coins_earned: stats.coins_earned,
            coins_stolen: stats.coins_stolen,
            coins_lost_to_theft: stats.coins_lost_to_theft,
        }
    }
}

/// Writes one CSV row per player, header included. Where the bytes end up is
/// the caller's business.
pub fn write_csv<W: io::Write>(writer: W, game_id: &str, stats: &[PlayerStats]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for player_stats in stats {
        writer.serialize(CsvRow::new(game_id, player_stats))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::stats::{write_csv, LossCause, PlayerStats};

    #[test]
    fn csv_has_a_header_and_a_row_per_player() {
        let mut winner = PlayerStats::new(0, "Player 1");
        winner.winner = true;
        winner.coups_launched = 2;
        winner.coins_earned = 12;

        let mut loser = PlayerStats::new(1, "Player 2");
        loser.elimination_round = Some(9);
        loser.elimination_cause = Some(LossCause::Coup);
        loser.loss_causes = vec![LossCause::LostChallenge, LossCause::Coup];

        let mut out = Vec::new();
        write_csv(&mut out, "abc123", &[winner, loser]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("game_id,player_id,player_name,winner,elimination_round,cause_of_elimination"));
        assert!(lines[1].starts_with("abc123,0,Player 1,true,,,"));
        assert!(lines[2].starts_with("abc123,1,Player 2,false,9,Coup,LostChallenge;Coup,"));
    }
}
