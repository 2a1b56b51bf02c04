#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use waylock_core::AreaRecord;

const TRANSFER_DOMAIN: &str = "waylock";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded record payload.
pub(crate) const TRANSFER_HEADER: &str = "waylock:v1";
/// Delimiter used to separate the prefix, record count and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes an area record list into a single-line clipboard string.
#[must_use]
pub(crate) fn encode(records: &[AreaRecord]) -> String {
    let json = serde_json::to_vec(records).expect("area record serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!("{TRANSFER_HEADER}:{}:{encoded}", records.len())
}

/// Decodes an area record list from its clipboard string representation.
pub(crate) fn decode(value: &str) -> Result<Vec<AreaRecord>, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let count = parts.next().ok_or(TransferError::MissingCount)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let expected = count
        .trim()
        .parse::<usize>()
        .map_err(|_| TransferError::InvalidCount(count.to_owned()))?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    let records: Vec<AreaRecord> =
        serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

    if records.len() != expected {
        return Err(TransferError::CountMismatch {
            expected,
            actual: records.len(),
        });
    }

    Ok(records)
}

/// Errors that can occur while decoding area transfer strings.
#[derive(Debug)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded string.
    MissingPrefix,
    /// The encoded string did not contain a version segment.
    MissingVersion,
    /// The encoded string did not include the record count.
    MissingCount,
    /// The encoded string did not include the payload segment.
    MissingPayload,
    /// The encoded string used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded string used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The record count could not be parsed from the encoded string.
    InvalidCount(String),
    /// The decoded payload held a different number of records than
    /// announced.
    CountMismatch {
        /// Count announced in the header.
        expected: usize,
        /// Records actually decoded.
        actual: usize,
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "transfer payload was empty"),
            Self::MissingPrefix => write!(f, "transfer string is missing the prefix"),
            Self::MissingVersion => write!(f, "transfer string is missing the version"),
            Self::MissingCount => write!(f, "transfer string is missing the record count"),
            Self::MissingPayload => write!(f, "transfer string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "transfer prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "transfer version '{version}' is not supported")
            }
            Self::InvalidCount(count) => {
                write!(f, "could not parse record count '{count}'")
            }
            Self::CountMismatch { expected, actual } => {
                write!(f, "expected {expected} records but decoded {actual}")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode transfer payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse transfer payload: {error}")
            }
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
