use std::fmt;

pub mod matches;
pub mod queues;
pub mod summoner;

#[derive(Debug)]
pub enum ParsingError {
    InvalidType(String),
    IdentityMissing(u16),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsingError::InvalidType(field) => write!(f, "Unexpected type for field '{}'", field),
            ParsingError::IdentityMissing(pid) => {
                write!(f, "No identity entry for participant {}", pid)
            }
        }
    }
}
