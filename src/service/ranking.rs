use std::collections::HashMap;

use crate::model::kda::{PlayerAggregate, RankedPlayer};

/// Direction of the appearance-count ordering. Ties are always broken by
/// summoner name ascending, so the result is a total order either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

pub fn rank(players: HashMap<String, PlayerAggregate>, order: SortOrder) -> Vec<RankedPlayer> {
    let mut ranked: Vec<RankedPlayer> = players
        .into_iter()
        .map(|(summoner_name, aggregate)| RankedPlayer {
            summoner_name,
            appearances: aggregate.appearances,
            kda: aggregate.kda,
        })
        .collect();

    ranked.sort_by(|a, b| {
        let by_appearances = match order {
            SortOrder::Ascending => a.appearances.cmp(&b.appearances),
            SortOrder::Descending => b.appearances.cmp(&a.appearances),
        };
        by_appearances.then_with(|| a.summoner_name.cmp(&b.summoner_name))
    });

    ranked
}
