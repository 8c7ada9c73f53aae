//! # Request Parser
//!
//! Splits `commands "," seqno "," salt "," digest` into its fields.
//!
//! The scan is a single left-to-right pass bounded by the payload length and
//! stops at the third comma. The final byte of the payload is never examined
//! as a delimiter, so a third comma in the last position leaves no room for a
//! digest and is reported as malformed.

use super::entities::{ParsedRequest, SequenceNumber, FIELD_DELIMITER};
use super::errors::ValidationError;

/// Index of the field holding the sequence number.
const SEQUENCE_FIELD: usize = 1;

/// Number of delimiters that end the signed prefix.
const PREFIX_DELIMITERS: usize = 3;

/// Parse a raw payload.
///
/// Digits inside the second field accumulate into the sequence number and any
/// other bytes there are skipped. A field without digits, or one whose value
/// overflows `i64`, is rejected, but only once the delimiter count has been
/// confirmed, so a payload with fewer than three commas is always
/// [`ValidationError::MalformedRequest`].
pub fn parse_request(payload: &[u8]) -> Result<ParsedRequest<'_>, ValidationError> {
    if payload.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }

    let mut field = 0usize;
    let mut sequence: Option<SequenceNumber> = None;
    let mut overflowed = false;
    let mut commands_len = None;
    let mut prefix_len = None;

    for (index, &byte) in payload[..payload.len() - 1].iter().enumerate() {
        if field == SEQUENCE_FIELD && byte.is_ascii_digit() {
            let digit = SequenceNumber::from(byte - b'0');
            match sequence
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|value| value.checked_add(digit))
            {
                Some(value) => sequence = Some(value),
                None => overflowed = true,
            }
        }

        if byte == FIELD_DELIMITER {
            field += 1;
            if field == 1 {
                commands_len = Some(index);
            }
            if field == PREFIX_DELIMITERS {
                prefix_len = Some(index + 1);
                break;
            }
        }
    }

    let (Some(commands_len), Some(prefix_len)) = (commands_len, prefix_len) else {
        return Err(ValidationError::MalformedRequest);
    };

    match sequence {
        Some(value) if !overflowed => Ok(ParsedRequest::new(
            payload,
            commands_len,
            prefix_len,
            value,
        )),
        _ => Err(ValidationError::InvalidSequenceNumber),
    }
}
