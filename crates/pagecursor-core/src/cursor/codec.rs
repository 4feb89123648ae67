//! Cursor minting and verification against a query's canonical shape.

use crate::{
    cursor::{
        CursorPosition, FIRST_PAGE,
        token::{decode_token, encode_token, sign},
    },
    error::{Error, InternalError},
    obs::sink::{CursorEvent, CursorKind, record},
    query::{CursorQuery, PageDirection, QueryFilter},
};

/// Mint a cursor bound to `query`'s non-navigation fields.
///
/// `value` is the anchor record's cursor-field value; a missing value is a
/// bug in the fetch collaborator and fails with an encoding error.
pub fn encode_cursor<F: QueryFilter>(
    query: &CursorQuery<F>,
    value: Option<&str>,
    page_number: u32,
) -> Result<String, Error> {
    let Some(value) = value else {
        tracing::error!(page_number, "cursor field value is missing on a fetched record");
        return Err(InternalError::encoding("cursor field value is missing").into());
    };
    if page_number < FIRST_PAGE {
        tracing::error!(page_number, "cursor page number must be positive");
        return Err(InternalError::encoding("cursor page number must be positive").into());
    }

    let payload = CursorPosition::new(value, page_number).payload();
    let signature = sign(&query.canonical_string(), &payload);

    tracing::debug!(page_number, "minted cursor");

    Ok(encode_token(&signature, &payload))
}

/// Verify `token` against `query` and return its position.
pub fn decode_cursor<F: QueryFilter>(
    query: &CursorQuery<F>,
    token: &str,
) -> Result<CursorPosition, Error> {
    let result = verify(query, token);

    match &result {
        Ok(position) => {
            record(CursorEvent::CursorVerified);
            tracing::debug!(page_number = position.page_number, "verified cursor");
        }
        Err(err) => {
            record(CursorEvent::CursorRejected { class: err.class() });
            tracing::warn!(class = %err.class(), "rejected cursor");
        }
    }

    result
}

fn verify<F: QueryFilter>(query: &CursorQuery<F>, token: &str) -> Result<CursorPosition, Error> {
    let raw = decode_token(token)?;

    // integrity only, not secrecy: plain equality is sufficient
    if sign(&query.canonical_string(), &raw.payload) != raw.signature {
        return Err(Error::CursorSignature);
    }

    Ok(CursorPosition::parse_payload(&raw.payload)?)
}

/// Page number the query's inbound cursor points at; 1 on the first page.
pub fn current_page_number<F: QueryFilter>(query: &CursorQuery<F>) -> Result<u32, Error> {
    match inbound_position(query)? {
        Some(position) => Ok(position.page_number),
        None => Ok(FIRST_PAGE),
    }
}

/// Verified position of whichever navigation cursor the query carries.
pub(crate) fn inbound_position<F: QueryFilter>(
    query: &CursorQuery<F>,
) -> Result<Option<CursorPosition>, Error> {
    let token = match query.page_direction() {
        PageDirection::First => return Ok(None),
        PageDirection::Forward => query.next_cursor(),
        PageDirection::Backward => query.prev_cursor(),
    };

    token.map(|token| decode_cursor(query, token)).transpose()
}

// Mint one outbound cursor and report it.
pub(crate) fn mint<F: QueryFilter>(
    query: &CursorQuery<F>,
    kind: CursorKind,
    value: Option<&str>,
    page_number: u32,
) -> Result<String, Error> {
    let token = encode_cursor(query, value, page_number)?;
    record(CursorEvent::CursorMinted { kind });

    Ok(token)
}
