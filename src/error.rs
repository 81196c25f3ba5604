use thiserror::Error;

#[derive(Debug, Error)]
pub enum PtridError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture error: {0}")]
    Capture(#[from] pcap::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed packet: {0}")]
    PacketParse(&'static str),
    #[error("no open session for this conversation")]
    MissingSession,
}

pub type Result<T> = std::result::Result<T, PtridError>;
