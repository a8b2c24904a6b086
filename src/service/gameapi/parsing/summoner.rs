use json::JsonValue;

use crate::model::ids::AccountId;

use super::ParsingError;

pub fn parse_account_id(json: &JsonValue) -> Result<AccountId, ParsingError> {
    let account_id = json["accountId"]
        .as_str()
        .ok_or(ParsingError::InvalidType("accountId".into()))?;

    Ok(account_id.into())
}
