use std::collections::HashMap;

use json::JsonValue;

use super::ParsingError;

/// Parses the provider's queues feed into a label -> queueId map. Entries
/// whose notes mark them deprecated are dropped; entries without a
/// description become the "Custom" label.
pub fn parse_queue_catalog(json: &JsonValue) -> Result<HashMap<String, u16>, ParsingError> {
    if let JsonValue::Array(array) = json {
        let mut queues = HashMap::new();

        for entry in array {
            let queue_id = entry["queueId"]
                .as_u16()
                .ok_or(ParsingError::InvalidType("queueId".into()))?;

            if let Some(notes) = entry["notes"].as_str() {
                if notes.to_lowercase().contains("deprecated") {
                    continue;
                }
            }

            let label = match entry["description"].as_str() {
                Some(description) => strip_games_suffix(description),
                None => "Custom".to_string(),
            };

            queues.insert(label, queue_id);
        }

        return Ok(queues);
    }

    Err(ParsingError::InvalidType("root".into()))
}

fn strip_games_suffix(description: &str) -> String {
    let trimmed = description.trim();
    trimmed
        .strip_suffix("games")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_games_word() {
        assert_eq!(strip_games_suffix("5v5 Ranked Solo games"), "5v5 Ranked Solo");
        assert_eq!(strip_games_suffix("Ultra Rapid Fire"), "Ultra Rapid Fire");
        assert_eq!(strip_games_suffix("  5v5 ARAM games "), "5v5 ARAM");
    }

    #[test]
    fn skips_deprecated_entries() {
        let feed = json::array![
            { queueId: 2, description: "5v5 Blind Pick games", notes: "Deprecated in patch 7.19 in favor of queueId 430" },
            { queueId: 430, description: "5v5 Blind Pick games", notes: null },
        ];
        let catalog = parse_queue_catalog(&feed).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog["5v5 Blind Pick"], 430);
    }

    #[test]
    fn missing_description_becomes_custom() {
        let feed = json::array![
            { queueId: 0, description: null, notes: null },
        ];
        let catalog = parse_queue_catalog(&feed).unwrap();
        assert_eq!(catalog["Custom"], 0);
    }

    #[test]
    fn non_array_feed_fails() {
        let feed = json::object! { queues: [] };
        assert!(parse_queue_catalog(&feed).is_err());
    }
}
