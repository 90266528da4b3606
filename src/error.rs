use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid network '{input}': {reason}")]
    MalformedNetwork { input: String, reason: String },

    #[error("cannot create {required} subnets from a /{prefix} network (longest prefix is /{max_prefix})")]
    AddressSpaceExhausted {
        required: u128,
        prefix: u8,
        max_prefix: u8,
    },

    #[error("unable to create {required} subnets from {network}: {available} left after reserving {reserved}")]
    InsufficientSubnets {
        network: String,
        required: usize,
        available: usize,
        reserved: usize,
    },

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("region index {index} out of range for {available} subnets")]
    IndexOutOfRange { index: usize, available: usize },

    #[error("network {0} has no last host address")]
    NoLastHost(String),

    #[error("prefix /{prefix} is outside /{min}../{max}")]
    InvalidPrefix { prefix: u8, min: u8, max: u8 },

    #[error("at least one subnet must be requested")]
    NoPartitions,
}

impl Error {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Error::MalformedNetwork {
            input: input.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
