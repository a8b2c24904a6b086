use json::JsonValue;

/// The three combat statistics tracked per player per match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kda {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

impl Kda {
    pub fn new(kills: u32, deaths: u32, assists: u32) -> Self {
        Self { kills, deaths, assists }
    }

    pub fn add(&mut self, other: &Kda) {
        self.kills += other.kills;
        self.deaths += other.deaths;
        self.assists += other.assists;
    }
}

/// One player's line in a single match, joined from the payload's identity
/// and statistics lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub participant_id: u16,
    pub summoner_name: String,
    pub kda: Kda,
}

/// Running totals for one summoner name across the matches processed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerAggregate {
    pub appearances: u32,
    pub kda: Kda,
}

impl PlayerAggregate {
    /// Records one more match appearance with the given per-match stats.
    pub fn record(&mut self, kda: &Kda) {
        self.appearances += 1;
        self.kda.add(kda);
    }
}

/// Final per-player entry of a ranked run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlayer {
    pub summoner_name: String,
    pub appearances: u32,
    pub kda: Kda,
}

impl RankedPlayer {
    pub fn to_json(&self) -> JsonValue {
        json::object! {
            summonerName: self.summoner_name.clone(),
            appearances: self.appearances,
            kills: self.kda.kills,
            deaths: self.kda.deaths,
            assists: self.kda.assists,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kda_adds_componentwise() {
        let mut kda = Kda::new(5, 1, 3);
        kda.add(&Kda::new(2, 3, 1));
        assert_eq!(kda, Kda::new(7, 4, 4));
    }

    #[test]
    fn aggregate_counts_appearances() {
        let mut agg = PlayerAggregate::default();
        agg.record(&Kda::new(1, 0, 2));
        agg.record(&Kda::new(4, 2, 5));
        assert_eq!(agg.appearances, 2);
        assert_eq!(agg.kda, Kda::new(5, 2, 7));
    }

    #[test]
    fn ranked_player_serializes_flat_record() {
        let player = RankedPlayer {
            summoner_name: "Teemo".to_string(),
            appearances: 3,
            kda: Kda::new(7, 5, 4),
        };
        let value = player.to_json();
        assert_eq!(value["summonerName"], "Teemo");
        assert_eq!(value["appearances"], 3);
        assert_eq!(value["kills"], 7);
        assert_eq!(value["deaths"], 5);
        assert_eq!(value["assists"], 4);
    }
}
