//! Revert-data decoding for contract calls.

use std::fmt;

use crate::config::consts::ERROR_STRING_SELECTOR;

/// Outcome of trying to decode revert data out of a provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRevert {
    /// A standard `Error(string)` revert with its message.
    ErrorString(String),
    /// Revert data was present but not a standard `Error(string)`.
    Raw(String),
    /// No revert data could be found; carries the original error text.
    NoRevertData(String),
}

impl fmt::Display for DecodedRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedRevert::ErrorString(msg) => write!(f, "{msg}"),
            DecodedRevert::Raw(data) => write!(f, "revert data {data}"),
            DecodedRevert::NoRevertData(original) => write!(f, "{original}"),
        }
    }
}

/// Decode a Solidity `Error(string)` revert message from hex data.
///
/// Returns `None` when the data is not a standard `Error(string)` encoding.
pub fn decode_error_string(revert_data: &str) -> Option<String> {
    let data = revert_data.strip_prefix("0x").unwrap_or(revert_data);

    if !data.starts_with(ERROR_STRING_SELECTOR) {
        return None;
    }

    // Skip the 4-byte selector (8 hex chars). The remainder is ABI encoding
    // for a single string: 32-byte offset, 32-byte length, padded data.
    let encoded = &data[8..];
    if encoded.len() < 128 {
        return None;
    }

    let offset = u64::from_str_radix(&encoded[0..64], 16).ok()?;
    if offset != 32 {
        return None;
    }

    let length = u64::from_str_radix(&encoded[64..128], 16).ok()?;
    let string_bytes = hex::decode(&encoded[128..]).ok()?;
    if length as usize > string_bytes.len() {
        return None;
    }

    String::from_utf8(string_bytes[..length as usize].to_vec()).ok()
}

/// Pull revert data out of an arbitrary error's text and decode it.
///
/// RPC providers embed revert data in error messages in a few different
/// shapes; this scans for the known patterns before falling back to the raw
/// message.
pub fn decode_any_error<E: fmt::Display>(error: &E) -> DecodedRevert {
    let error_msg = error.to_string();

    let revert_data = error_msg
        .split("reverted with data: ")
        .nth(1)
        .or_else(|| error_msg.split("revert data: ").nth(1))
        .or_else(|| {
            // Bare hex blob starting with the Error(string) selector.
            error_msg
                .find(&format!("0x{ERROR_STRING_SELECTOR}"))
                .map(|start| {
                    let remaining = &error_msg[start..];
                    let end = remaining
                        .char_indices()
                        .skip(2) // skip "0x"
                        .find(|(_, c)| !c.is_ascii_hexdigit())
                        .map(|(i, _)| i)
                        .unwrap_or(remaining.len());
                    &error_msg[start..start + end]
                })
        });

    match revert_data {
        Some(data) => match decode_error_string(data.trim()) {
            Some(msg) => DecodedRevert::ErrorString(msg),
            None => DecodedRevert::Raw(data.trim().to_string()),
        },
        None => DecodedRevert::NoRevertData(error_msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ABI-encode a message the way `revert("msg")` does.
    fn encode_error_string(msg: &str) -> String {
        let bytes = msg.as_bytes();
        let mut padded = bytes.to_vec();
        while padded.len() % 32 != 0 || padded.is_empty() {
            padded.push(0);
        }
        format!(
            "0x{ERROR_STRING_SELECTOR}{:064x}{:064x}{}",
            32,
            bytes.len(),
            hex::encode(padded)
        )
    }

    #[test]
    fn test_decode_error_string() {
        let data = encode_error_string("CreatorRouter: fee too high");
        assert_eq!(
            decode_error_string(&data),
            Some("CreatorRouter: fee too high".to_string())
        );

        // Without 0x prefix
        assert_eq!(
            decode_error_string(&data[2..]),
            Some("CreatorRouter: fee too high".to_string())
        );
    }

    #[test]
    fn test_decode_error_string_wrong_selector() {
        let data = encode_error_string("nope").replacen(ERROR_STRING_SELECTOR, "12345678", 1);
        assert_eq!(decode_error_string(&data), None);
    }

    #[test]
    fn test_decode_error_string_truncated() {
        assert_eq!(decode_error_string("0x08c379a000ff"), None);
    }

    #[test]
    fn test_decode_any_error_finds_embedded_data() {
        let data = encode_error_string("MultiSigVault: not an owner");
        let err = std::io::Error::other(format!("call reverted with data: {data}"));
        assert_eq!(
            decode_any_error(&err),
            DecodedRevert::ErrorString("MultiSigVault: not an owner".to_string())
        );
    }

    #[test]
    fn test_decode_any_error_bare_hex() {
        let data = encode_error_string("SubscriptionPass: expired");
        let err = std::io::Error::other(format!("server returned {data} while estimating gas"));
        assert_eq!(
            decode_any_error(&err),
            DecodedRevert::ErrorString("SubscriptionPass: expired".to_string())
        );
    }

    #[test]
    fn test_decode_any_error_no_data() {
        let err = std::io::Error::other("connection refused");
        assert_eq!(
            decode_any_error(&err),
            DecodedRevert::NoRevertData("connection refused".to_string())
        );
    }
}
