use std::fmt;

use crate::model::{
    ids::{AccountId, MatchId},
    kda::ParticipantRecord,
};

use super::aggregator::MatchSource;
use super::gameapi::{
    client::{ApiClient, RequestError},
    parsing::{
        matches::{parse_match_list, parse_match_participants},
        summoner::parse_account_id,
        ParsingError,
    },
};

pub const DEFAULT_MATCH_COUNT: u32 = 10;
pub const MAX_MATCH_COUNT: u32 = 90;

/// Region-scoped access to summoner and match data. Thin typed layer over
/// the API client; each aggregation run owns one of these.
#[derive(Clone)]
pub struct DataManager {
    client: ApiClient,
}

impl DataManager {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Maps a display name to the account id it belongs to in this region.
    pub fn resolve_account(&self, summoner_name: &str) -> DataRetrievalResult<AccountId> {
        let path = format!(
            "/lol/summoner/v4/summoners/by-name/{}",
            urlencoding::encode(summoner_name)
        );

        let json = match self.client.get(&path, &[]) {
            Ok(json) => json,
            Err(RequestError::InvalidResponse { status: 404, .. }) => {
                return Err(DataRetrievalError::SummonerNotFound(summoner_name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(parse_account_id(&json)?)
    }

    /// Lists up to `count` recent match ids, most recent first. An empty
    /// `queue_ids` slice means all queues. Only the provider's first page is
    /// requested; paging past its per-call cap is an extension point.
    pub fn match_ids(
        &self,
        account: &AccountId,
        count: u32,
        queue_ids: &[u16],
    ) -> DataRetrievalResult<Vec<MatchId>> {
        let count = count.clamp(1, MAX_MATCH_COUNT);

        let path = format!("/lol/match/v4/matchlists/by-account/{}", account);
        let mut params = vec![("endIndex", count.to_string())];
        for queue_id in queue_ids {
            params.push(("queue", queue_id.to_string()));
        }

        let json = self.client.get(&path, &params)?;
        Ok(parse_match_list(&json)?)
    }

    /// Fetches one match's detail and joins it into participant records.
    pub fn match_participants(&self, id: &MatchId) -> DataRetrievalResult<Vec<ParticipantRecord>> {
        let path = format!("/lol/match/v4/matches/{}", id);
        let json = self.client.get(&path, &[])?;
        Ok(parse_match_participants(&json)?)
    }
}

impl MatchSource for DataManager {
    fn match_participants(&self, id: &MatchId) -> DataRetrievalResult<Vec<ParticipantRecord>> {
        DataManager::match_participants(self, id)
    }
}

pub type DataRetrievalResult<T> = Result<T, DataRetrievalError>;

#[derive(Debug)]
pub enum DataRetrievalError {
    SummonerNotFound(String),
    ClientFailed(RequestError),
    ParsingFailed(ParsingError),
}

impl fmt::Display for DataRetrievalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataRetrievalError::SummonerNotFound(name) => {
                write!(f, "Summoner '{}' not found in this region", name)
            }
            DataRetrievalError::ClientFailed(err) => write!(f, "Client error: {}", err),
            DataRetrievalError::ParsingFailed(err) => write!(f, "Parsing error: {}", err),
        }
    }
}

impl From<RequestError> for DataRetrievalError {
    fn from(error: RequestError) -> Self {
        Self::ClientFailed(error)
    }
}

impl From<ParsingError> for DataRetrievalError {
    fn from(error: ParsingError) -> Self {
        Self::ParsingFailed(error)
    }
}
