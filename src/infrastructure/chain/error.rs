use std::error::Error;
use std::fmt;

/// Represents errors that can occur while talking to the EVM chain
#[derive(Debug)]
pub enum ChainClientError {
    /// Error from the JSON-RPC provider
    RpcError(ethers::providers::ProviderError),
    /// Read-only contract call failed or reverted
    ContractCall(String),
    /// A log could not be decoded into a known event
    DecodeError(String),
    /// A field the indexer relies on was absent from the RPC response
    MissingField(&'static str),
    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for ChainClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainClientError::RpcError(e) => write!(f, "RPC error: {}", e),
            ChainClientError::ContractCall(msg) => write!(f, "Contract call failed: {}", msg),
            ChainClientError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            ChainClientError::MissingField(field) => {
                write!(f, "RPC response is missing {}", field)
            }
            ChainClientError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ChainClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChainClientError::RpcError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ethers::providers::ProviderError> for ChainClientError {
    fn from(error: ethers::providers::ProviderError) -> Self {
        ChainClientError::RpcError(error)
    }
}

impl From<ethers::abi::Error> for ChainClientError {
    fn from(error: ethers::abi::Error) -> Self {
        ChainClientError::DecodeError(error.to_string())
    }
}
