use std::collections::HashMap;

use json::{object::Object, JsonValue};

use crate::model::{
    ids::MatchId,
    kda::{Kda, ParticipantRecord},
};

use super::ParsingError;

/// Extracts the ordered match id list from a matchlist payload. The provider
/// returns most-recent-first and that order is preserved.
pub fn parse_match_list(json: &JsonValue) -> Result<Vec<MatchId>, ParsingError> {
    if let JsonValue::Array(array) = &json["matches"] {
        let mut ids = Vec::with_capacity(array.len());

        for entry in array {
            let game_id = entry["gameId"]
                .as_u64()
                .ok_or(ParsingError::InvalidType("gameId".into()))?;
            ids.push(game_id.into());
        }

        return Ok(ids);
    }

    Err(ParsingError::InvalidType("matches".into()))
}

/// Joins a match payload's identity list and statistics list on
/// participantId. A statistics entry with no matching identity makes the
/// whole match malformed.
pub fn parse_match_participants(json: &JsonValue) -> Result<Vec<ParticipantRecord>, ParsingError> {
    let identities = parse_identities(&json["participantIdentities"])?;

    if let JsonValue::Array(array) = &json["participants"] {
        let mut records = Vec::with_capacity(array.len());

        for entry in array {
            if let JsonValue::Object(participant) = entry {
                records.push(parse_participant(participant, &identities)?);
            } else {
                return Err(ParsingError::InvalidType("participant entry".into()));
            }
        }

        return Ok(records);
    }

    Err(ParsingError::InvalidType("participants".into()))
}

fn parse_identities(json: &JsonValue) -> Result<HashMap<u16, String>, ParsingError> {
    if let JsonValue::Array(array) = json {
        let mut identities = HashMap::with_capacity(array.len());

        for entry in array {
            let pid = entry["participantId"]
                .as_u16()
                .ok_or(ParsingError::InvalidType("participantId".into()))?;
            let name = entry["player"]["summonerName"]
                .as_str()
                .ok_or(ParsingError::InvalidType("summonerName".into()))?;
            identities.insert(pid, name.to_string());
        }

        return Ok(identities);
    }

    Err(ParsingError::InvalidType("participantIdentities".into()))
}

fn parse_participant(
    obj: &Object,
    identities: &HashMap<u16, String>,
) -> Result<ParticipantRecord, ParsingError> {
    let pid = obj["participantId"]
        .as_u16()
        .ok_or(ParsingError::InvalidType("participantId".into()))?;
    let summoner_name = identities
        .get(&pid)
        .ok_or(ParsingError::IdentityMissing(pid))?
        .clone();

    let stats = &obj["stats"];
    let kills = stats["kills"]
        .as_u32()
        .ok_or(ParsingError::InvalidType("kills".into()))?;
    let deaths = stats["deaths"]
        .as_u32()
        .ok_or(ParsingError::InvalidType("deaths".into()))?;
    let assists = stats["assists"]
        .as_u32()
        .ok_or(ParsingError::InvalidType("assists".into()))?;

    Ok(ParticipantRecord {
        participant_id: pid,
        summoner_name,
        kda: Kda::new(kills, deaths, assists),
    })
}
