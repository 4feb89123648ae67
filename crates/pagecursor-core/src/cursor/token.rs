//! Cursor wire format.
//!
//! `base64( signature "#" value "@" page )` where `signature` is the
//! unpadded base64url SHA-256 of `canonical_query "#" value "@" page`.
//! Only this module knows the separators and encodings.

use crate::cursor::CursorDecodeError;
use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// Defensive decode bound for untrusted cursor token input.
pub const MAX_CURSOR_TOKEN_LEN: usize = 8 * 1024;

/// Page number of the first page.
pub const FIRST_PAGE: u32 = 1;

const SIGNATURE_SEPARATOR: char = '#';
const PAGE_SEPARATOR: char = '@';

///
/// CursorPosition
///
/// Decoded cursor payload: the anchor record's cursor-field value and the
/// page number the cursor was minted for.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CursorPosition {
    pub value: String,
    pub page_number: u32,
}

impl CursorPosition {
    #[must_use]
    pub fn new(value: impl Into<String>, page_number: u32) -> Self {
        Self {
            value: value.into(),
            page_number,
        }
    }

    /// The anchor value parsed as a numeric id.
    pub fn number_id(&self) -> Result<i64, CursorDecodeError> {
        self.value
            .parse()
            .map_err(|_| CursorDecodeError::InvalidNumberId {
                raw: self.value.clone(),
            })
    }

    // The page number follows the last separator so values may contain '@'.
    pub(crate) fn parse_payload(payload: &str) -> Result<Self, CursorDecodeError> {
        let (value, page) = payload
            .rsplit_once(PAGE_SEPARATOR)
            .ok_or(CursorDecodeError::MissingPageSeparator)?;
        let page_number = page
            .parse::<u32>()
            .ok()
            .filter(|page| *page >= FIRST_PAGE)
            .ok_or_else(|| CursorDecodeError::InvalidPageNumber {
                raw: page.to_string(),
            })?;

        Ok(Self::new(value, page_number))
    }

    pub(crate) fn payload(&self) -> String {
        format!("{}{PAGE_SEPARATOR}{}", self.value, self.page_number)
    }
}

impl fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.payload())
    }
}

///
/// RawCursor
/// Token split into its signature and payload; signature not yet checked.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct RawCursor {
    pub(crate) signature: String,
    pub(crate) payload: String,
}

/// Signature over a canonical query string and a payload.
pub(crate) fn sign(canonical_query: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_query.as_bytes());
    hasher.update([SIGNATURE_SEPARATOR as u8]);
    hasher.update(payload.as_bytes());

    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

pub(crate) fn encode_token(signature: &str, payload: &str) -> String {
    STANDARD.encode(format!("{signature}{SIGNATURE_SEPARATOR}{payload}"))
}

/// Decode and split a token. Surrounding whitespace is trimmed.
pub(crate) fn decode_token(token: &str) -> Result<RawCursor, CursorDecodeError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(CursorDecodeError::Empty);
    }
    if token.len() > MAX_CURSOR_TOKEN_LEN {
        return Err(CursorDecodeError::TooLong {
            len: token.len(),
            max: MAX_CURSOR_TOKEN_LEN,
        });
    }

    let bytes = STANDARD
        .decode(token)
        .map_err(|_| CursorDecodeError::InvalidBase64)?;
    let text = String::from_utf8(bytes).map_err(|_| CursorDecodeError::InvalidUtf8)?;
    let (signature, payload) = text
        .split_once(SIGNATURE_SEPARATOR)
        .ok_or(CursorDecodeError::MissingSeparator)?;

    Ok(RawCursor {
        signature: signature.to_string(),
        payload: payload.to_string(),
    })
}

///
/// TESTS
///
