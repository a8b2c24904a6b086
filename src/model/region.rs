use std::{fmt, str::FromStr};

/// Platform shard the request is routed to. Accounts and match data do not
/// cross regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Na1,
    Euw1,
    Eun1,
    Kr,
    Br1,
    Jp1,
    La1,
    La2,
    Oc1,
    Tr1,
    Ru,
}

impl Region {
    pub const DEFAULT: Region = Region::Na1;

    pub fn host(&self) -> &'static str {
        match self {
            Region::Na1 => "na1",
            Region::Euw1 => "euw1",
            Region::Eun1 => "eun1",
            Region::Kr => "kr",
            Region::Br1 => "br1",
            Region::Jp1 => "jp1",
            Region::La1 => "la1",
            Region::La2 => "la2",
            Region::Oc1 => "oc1",
            Region::Tr1 => "tr1",
            Region::Ru => "ru",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.host().to_uppercase())
    }
}

impl FromStr for Region {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "na1" | "na" => Ok(Region::Na1),
            "euw1" | "euw" => Ok(Region::Euw1),
            "eun1" | "eune" => Ok(Region::Eun1),
            "kr" => Ok(Region::Kr),
            "br1" | "br" => Ok(Region::Br1),
            "jp1" | "jp" => Ok(Region::Jp1),
            "la1" => Ok(Region::La1),
            "la2" => Ok(Region::La2),
            "oc1" | "oce" => Ok(Region::Oc1),
            "tr1" | "tr" => Ok(Region::Tr1),
            "ru" => Ok(Region::Ru),
            other => Err(RegionParseError(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct RegionParseError(String);

impl fmt::Display for RegionParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unknown region: '{}'", self.0)
    }
}
