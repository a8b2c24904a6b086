use std::{fmt, io};

use big_inters::service::{
    data_manager::DataRetrievalError,
    gameapi::client::ClientInitError,
};

pub mod repl;

#[derive(Debug)]
pub enum ReplError {
    Io(io::Error),
    Init(ClientInitError),
    Retrieval(DataRetrievalError),
}

impl fmt::Display for ReplError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReplError::Io(err) => write!(f, "IO error: {}", err),
            ReplError::Init(err) => write!(f, "Init error: {}", err),
            ReplError::Retrieval(err) => write!(f, "Retrieval error: {}", err),
        }
    }
}

impl From<io::Error> for ReplError {
    fn from(error: io::Error) -> Self {
        ReplError::Io(error)
    }
}

impl From<ClientInitError> for ReplError {
    fn from(error: ClientInitError) -> Self {
        ReplError::Init(error)
    }
}

impl From<DataRetrievalError> for ReplError {
    fn from(error: DataRetrievalError) -> Self {
        ReplError::Retrieval(error)
    }
}
