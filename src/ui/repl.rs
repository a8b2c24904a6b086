use std::io::{self, Write};

use big_inters::{
    model::region::Region,
    service::{
        aggregator::{AggregateOutcome, Aggregator, CancelToken},
        data_manager::{DataManager, DataRetrievalError, DEFAULT_MATCH_COUNT},
        gameapi::{client::ApiClient, queues::QueueCatalog},
        ranking::{rank, SortOrder},
    },
};

use super::ReplError;

pub fn run(api_key: String, catalog: &QueueCatalog) -> Result<(), ReplError> {
    println!("Available queue types:");
    for (label, _) in catalog.popular() {
        println!("  {}", label);
    }
    println!();

    loop {
        let summoner = prompt("Enter summoner to search for (empty to quit): ")?;
        if summoner.is_empty() {
            return Ok(());
        }

        let region_input = prompt("Enter region to search for (default NA1): ")?;
        let region = if region_input.is_empty() {
            Region::DEFAULT
        } else {
            match region_input.parse::<Region>() {
                Ok(region) => region,
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
            }
        };

        let count_input = prompt("Enter number of matches to look up (default 10): ")?;
        let count = if count_input.is_empty() {
            DEFAULT_MATCH_COUNT
        } else {
            match count_input.parse::<u32>() {
                Ok(count) => count,
                Err(_) => {
                    println!("Not a number: '{}'", count_input);
                    continue;
                }
            }
        };

        let queues_input = prompt("Enter queue types to search for (default any): ")?;
        let queue_ids = parse_queue_filters(&queues_input, catalog);

        let client = ApiClient::new(api_key.clone(), region)?;
        match run_query(client, &summoner, count, &queue_ids) {
            Ok(()) => {}
            Err(DataRetrievalError::SummonerNotFound(name)) => {
                println!("Summoner '{}' not found on {}", name, region);
            }
            Err(err) => println!("Lookup failed: {}", err),
        }
        println!();
    }
}

fn run_query(
    client: ApiClient,
    summoner: &str,
    count: u32,
    queue_ids: &[u16],
) -> Result<(), DataRetrievalError> {
    let manager = DataManager::new(client);

    let account = manager.resolve_account(summoner)?;
    let match_ids = manager.match_ids(&account, count, queue_ids)?;
    if match_ids.is_empty() {
        println!("No matches found");
        return Ok(());
    }

    let cancel = CancelToken::new();
    let outcome = Aggregator::new(manager).aggregate(match_ids, &cancel);
    print_outcome(outcome);
    Ok(())
}

fn print_outcome(outcome: AggregateOutcome) {
    let ranked = rank(outcome.players, SortOrder::Ascending);

    println!();
    println!(
        "{:<24} {:>8} {:>7} {:>7} {:>8}",
        "Summoner", "Matches", "Kills", "Deaths", "Assists"
    );
    for player in &ranked {
        println!(
            "{:<24} {:>8} {:>7} {:>7} {:>8}",
            player.summoner_name,
            player.appearances,
            player.kda.kills,
            player.kda.deaths,
            player.kda.assists
        );
    }

    println!("{} players found", ranked.len());
    println!(
        "{} of {} matches aggregated",
        outcome.fetched, outcome.total
    );
    if !outcome.skipped.is_empty() {
        println!("{} skipped:", outcome.skipped.len());
        for skip in &outcome.skipped {
            println!("  match {}: {}", skip.match_id, skip.reason);
        }
    }
    if outcome.cancelled {
        println!("Run was cancelled before all matches were fetched");
    }
}

fn parse_queue_filters(input: &str, catalog: &QueueCatalog) -> Vec<u16> {
    let mut queue_ids = Vec::new();
    for label in input.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        match catalog.id_of(label) {
            Some(id) => queue_ids.push(id),
            None => println!("Unknown queue type '{}', ignoring", label),
        }
    }
    queue_ids
}

fn prompt(text: &str) -> Result<String, ReplError> {
    print!("{}", text);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
