use std::{collections::HashMap, fmt, time::Duration};

use reqwest::blocking::Client;

use super::parsing::{queues::parse_queue_catalog, ParsingError};

const QUEUES_URL: &str = "https://static.developer.riotgames.com/docs/lol/queues.json";
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Bundled copy of the queues feed, used when the remote catalog is
/// unreachable.
const FALLBACK_QUEUES: &str = include_str!("../../../data/queues.json");

/// Labels offered for user-facing filter selection.
const POPULAR_QUEUE_LABELS: [&str; 6] = [
    "Custom",
    "5v5 ARAM",
    "5v5 Draft Pick",
    "5v5 Ranked Solo",
    "5v5 Blind Pick",
    "5v5 Ranked Flex",
];

/// Label -> queueId catalog, built once at startup. Remote data wins when
/// reachable; otherwise the bundled copy is used, so loading never fails.
pub struct QueueCatalog {
    queues: HashMap<String, u16>,
}

impl QueueCatalog {
    pub fn load() -> Self {
        let queues = match Self::fetch_remote() {
            Ok(queues) => queues,
            Err(reason) => {
                log::warn!(
                    "Could not reach provider for queues file ({}). Falling back on local...",
                    reason
                );
                Self::parse_fallback()
            }
        };

        for label in POPULAR_QUEUE_LABELS {
            if !queues.contains_key(label) {
                log::warn!("Popular queue type '{}' not found in catalog", label);
            }
        }

        Self { queues }
    }

    fn fetch_remote() -> Result<HashMap<String, u16>, CatalogFetchError> {
        let client = Client::builder().timeout(CATALOG_TIMEOUT).build()?;

        let response = client.get(QUEUES_URL).send()?;
        if !response.status().is_success() {
            return Err(CatalogFetchError::InvalidStatus(response.status().as_u16()));
        }

        let text = response.text()?;
        let json = json::parse(&text)?;
        Ok(parse_queue_catalog(&json)?)
    }

    fn parse_fallback() -> HashMap<String, u16> {
        match json::parse(FALLBACK_QUEUES) {
            Ok(json) => match parse_queue_catalog(&json) {
                Ok(queues) => queues,
                Err(err) => {
                    log::error!("Bundled queues file malformed: {}", err);
                    HashMap::new()
                }
            },
            Err(err) => {
                log::error!("Bundled queues file unreadable: {}", err);
                HashMap::new()
            }
        }
    }

    pub fn all(&self) -> &HashMap<String, u16> {
        &self.queues
    }

    /// The curated subset shown to the user, in a stable order.
    pub fn popular(&self) -> Vec<(&'static str, u16)> {
        POPULAR_QUEUE_LABELS
            .iter()
            .filter_map(|label| self.queues.get(*label).map(|id| (*label, *id)))
            .collect()
    }

    pub fn id_of(&self, label: &str) -> Option<u16> {
        self.queues.get(label).copied()
    }

    #[cfg(test)]
    pub(crate) fn from_fallback() -> Self {
        Self { queues: Self::parse_fallback() }
    }
}

#[derive(Debug)]
enum CatalogFetchError {
    ClientFailed(reqwest::Error),
    InvalidStatus(u16),
    ParsingFailed(json::Error),
    Malformed(ParsingError),
}

impl fmt::Display for CatalogFetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CatalogFetchError::ClientFailed(err) => write!(f, "Client error: {}", err),
            CatalogFetchError::InvalidStatus(status) => write!(f, "status {}", status),
            CatalogFetchError::ParsingFailed(err) => write!(f, "Parsing error: {}", err),
            CatalogFetchError::Malformed(err) => write!(f, "Malformed feed: {}", err),
        }
    }
}

impl From<reqwest::Error> for CatalogFetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::ClientFailed(error)
    }
}

impl From<json::Error> for CatalogFetchError {
    fn from(error: json::Error) -> Self {
        Self::ParsingFailed(error)
    }
}

impl From<ParsingError> for CatalogFetchError {
    fn from(error: ParsingError) -> Self {
        Self::Malformed(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_catalog_is_populated() {
        let catalog = QueueCatalog::from_fallback();
        assert!(!catalog.all().is_empty());
        assert_eq!(catalog.id_of("5v5 Ranked Solo"), Some(420));
        assert_eq!(catalog.id_of("Custom"), Some(0));
    }

    #[test]
    fn fallback_excludes_deprecated_entries() {
        let catalog = QueueCatalog::from_fallback();
        // queueId 2 is the deprecated predecessor of 430 in the bundled file.
        assert_eq!(catalog.id_of("5v5 Blind Pick"), Some(430));
    }

    #[test]
    fn popular_labels_resolve_against_fallback() {
        let catalog = QueueCatalog::from_fallback();
        let popular = catalog.popular();
        assert_eq!(popular.len(), POPULAR_QUEUE_LABELS.len());
    }

    #[test]
    fn fetch_errors_carry_their_cause() {
        let err = CatalogFetchError::from(ParsingError::InvalidType("root".into()));
        assert!(err.to_string().contains("root"));
        assert!(CatalogFetchError::InvalidStatus(503).to_string().contains("503"));
    }
}
