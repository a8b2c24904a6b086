use std::{
    env, fmt,
    fs::File,
    io::{self, Read},
    time::Duration,
};

use json::JsonValue;
use reqwest::{blocking::Client, header, StatusCode};

use crate::model::region::Region;

const API_KEY_ENV: &str = "RIOT_API_KEY";
const API_KEY_FILE: &str = "api_key.json";
const API_KEY_FIELD: &str = "API-KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Reads the API key from the environment, falling back to the local
/// `api_key.json` secret file.
pub fn load_api_key() -> Result<String, CredentialError> {
    if let Ok(key) = env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    let mut file = File::open(API_KEY_FILE)?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)?;
    let json = json::parse(&buf)?;

    match json[API_KEY_FIELD].as_str() {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(CredentialError::FieldMissing),
    }
}

/// Authenticated GET client against one region's API host.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    region: Region,
    api_key: String,
}

impl ApiClient {
    pub fn new(api_key: String, region: Region) -> Result<Self, ClientInitError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, region, api_key })
    }

    /// Issues a GET request for `path` with the given query parameters.
    /// Repeated keys are passed as repeated pairs. The credential is appended
    /// after the URL is logged, so it never ends up in the log output.
    pub fn get(&self, path: &str, params: &[(&str, String)]) -> Result<JsonValue, RequestError> {
        let mut url = format!("https://{}.api.riotgames.com{}", self.region.host(), path);
        let mut sep = '?';
        for (key, value) in params {
            url.push(sep);
            sep = '&';
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        log::info!("Make GET request: \"{}\"", url);

        url.push(sep);
        url.push_str("api_key=");
        url.push_str(&self.api_key);

        let response = self.client.get(&url).send()?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok());
            return Err(RequestError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
                })
                .collect();
            let text = response.text().unwrap_or_default();
            let body = match json::parse(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(text),
            };
            log::error!("Failed GET request: status {}", status);
            return Err(RequestError::InvalidResponse {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        let text = response.text()?;
        Ok(json::parse(&text)?)
    }
}

#[derive(Debug)]
pub enum CredentialError {
    Missing(io::Error),
    Invalid(json::Error),
    FieldMissing,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CredentialError::Missing(err) => {
                write!(f, "API key file missing or unreadable: {}", err)
            }
            CredentialError::Invalid(err) => write!(f, "API key file invalid: {}", err),
            CredentialError::FieldMissing => {
                write!(f, "API key file has no '{}' field", API_KEY_FIELD)
            }
        }
    }
}

impl From<io::Error> for CredentialError {
    fn from(error: io::Error) -> Self {
        CredentialError::Missing(error)
    }
}

impl From<json::Error> for CredentialError {
    fn from(error: json::Error) -> Self {
        CredentialError::Invalid(error)
    }
}

#[derive(Debug)]
pub enum ClientInitError {
    ClientError(reqwest::Error),
}

impl fmt::Display for ClientInitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientInitError::ClientError(err) => write!(f, "Client error: {}", err),
        }
    }
}

impl From<reqwest::Error> for ClientInitError {
    fn from(error: reqwest::Error) -> Self {
        Self::ClientError(error)
    }
}

/// Body of a failed response, kept for diagnostics.
#[derive(Debug)]
pub enum ResponseBody {
    Json(JsonValue),
    Text(String),
}

#[derive(Debug)]
pub enum RequestError {
    NetworkError(reqwest::Error),
    RateLimited { retry_after: Option<u64> },
    InvalidResponse {
        status: u16,
        headers: Vec<(String, String)>,
        body: ResponseBody,
    },
    ParsingFailed(json::Error),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RequestError::NetworkError(err) => write!(f, "Network error: {}", err),
            RequestError::RateLimited { retry_after } => match retry_after {
                Some(secs) => write!(f, "Rate limited, retry after {}s", secs),
                None => write!(f, "Rate limited"),
            },
            RequestError::InvalidResponse { status, body, .. } => {
                let body = match body {
                    ResponseBody::Json(value) => value.dump(),
                    ResponseBody::Text(text) => text.clone(),
                };
                write!(f, "The server returned status {}: {}", status, body)
            }
            RequestError::ParsingFailed(err) => write!(f, "Parsing error: {}", err),
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(error: reqwest::Error) -> Self {
        RequestError::NetworkError(error)
    }
}

impl From<json::Error> for RequestError {
    fn from(error: json::Error) -> Self {
        RequestError::ParsingFailed(error)
    }
}
