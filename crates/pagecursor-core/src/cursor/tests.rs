use crate::{
    cursor::{
        CursorDecodeError, CursorPosition, KeysetSeek, MAX_CURSOR_TOKEN_LEN, SeekOp,
        current_page_number, decode_cursor, encode_cursor,
    },
    error::{Error, ErrorClass},
    query::{
        CanonicalFields, CursorPolicy, CursorQuery, DefaultOrderField, OrderDirection, PageDirection,
        QueryFilter,
    },
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
struct NameFilter {
    name: Option<String>,
}

impl QueryFilter for NameFilter {
    fn canonical_fields(&self, fields: &mut CanonicalFields) {
        fields.push("name", &self.name);
    }
}

fn first(size: u32) -> CursorQuery {
    CursorQuery::first(&CursorPolicy::default(), size).expect("query should build")
}

// Rewrite the payload of a token while keeping its original signature.
fn with_payload(token: &str, payload: &str) -> String {
    let bytes = STANDARD.decode(token).expect("token should be base64");
    let text = String::from_utf8(bytes).expect("token should be utf-8");
    let (signature, _) = text.split_once('#').expect("token should carry a signature");

    STANDARD.encode(format!("{signature}#{payload}"))
}

#[test]
fn encoding_is_deterministic() {
    let query = first(2);

    let a = encode_cursor(&query, Some("10"), 2).expect("cursor should encode");
    let b = encode_cursor(&query, Some("10"), 2).expect("cursor should encode");

    assert_eq!(a, b);
}

#[test]
fn token_is_standard_base64_of_signature_and_payload() {
    let token = encode_cursor(&first(2), Some("10"), 2).expect("cursor should encode");
    let text = String::from_utf8(STANDARD.decode(&token).expect("token should be base64"))
        .expect("token should be utf-8");
    let (signature, payload) = text.split_once('#').expect("separator should be present");

    assert_eq!(payload, "10@2");
    // unpadded base64url of a 32-byte digest
    assert_eq!(signature.len(), 43);
    assert!(!signature.contains('='));
}

#[test]
fn missing_value_is_an_encoding_error() {
    let err = encode_cursor(&first(2), None, 2).expect_err("missing value should fail");

    assert_eq!(err.class(), ErrorClass::Encoding);
    assert!(matches!(err, Error::Internal(_)));
}

#[test]
fn zero_page_is_an_encoding_error() {
    let err = encode_cursor(&first(2), Some("10"), 0).expect_err("page zero should fail");

    assert_eq!(err.class(), ErrorClass::Encoding);
}

#[test]
fn tampered_payload_fails_signature_check() {
    let query = first(2);
    let token = encode_cursor(&query, Some("10"), 2).expect("cursor should encode");

    for payload in ["11@2", "10@3", "1@2", "10@22"] {
        let forged = with_payload(&token, payload);
        let err = decode_cursor(&query, &forged).expect_err("forged payload should fail");
        assert!(matches!(err, Error::CursorSignature), "payload {payload}");
    }
}

#[test]
fn cursor_is_bound_to_the_query_shape() {
    let policy = CursorPolicy::default();
    let query = first(2);
    let token = encode_cursor(&query, Some("10"), 2).expect("cursor should encode");

    let resized = first(3);
    let reordered = CursorQuery::asc(&policy, DefaultOrderField::Id)
        .and_then(|query| query.with_query_size(&policy, 2))
        .expect("query should build");
    let filtered = first(2).with_filter(NameFilter {
        name: Some("zhans".to_string()),
    });

    for err in [
        decode_cursor(&resized, &token).expect_err("size change should invalidate"),
        decode_cursor(&reordered, &token).expect_err("direction change should invalidate"),
        decode_cursor(&filtered, &token).expect_err("added filter should invalidate"),
    ] {
        assert!(matches!(err, Error::CursorSignature));
        assert!(err.is_client_error());
    }

    // an absent optional filter contributes nothing
    let unfiltered = first(2).with_filter(NameFilter::default());
    decode_cursor(&unfiltered, &token).expect("absent filter should not change the shape");
}

#[test]
fn filter_value_cannot_impersonate_extra_fields() {
    let smuggled: BTreeMap<String, String> =
        BTreeMap::from([("a".to_string(), "x&b=y".to_string())]);
    let split: BTreeMap<String, String> = BTreeMap::from([
        ("a".to_string(), "x".to_string()),
        ("b".to_string(), "y".to_string()),
    ]);
    let minted_for = first(2).with_filter(smuggled);
    let replayed_on = first(2).with_filter(split);
    let token = encode_cursor(&minted_for, Some("10"), 2).expect("cursor should encode");

    decode_cursor(&minted_for, &token).expect("cursor should verify for its own filter");
    assert!(matches!(
        decode_cursor(&replayed_on, &token),
        Err(Error::CursorSignature)
    ));
}

#[test]
fn malformed_tokens_are_classified() {
    let query = first(2);
    let no_separator = STANDARD.encode("no separator here");
    let oversized = "A".repeat(MAX_CURSOR_TOKEN_LEN + 4);

    let cases: [(&str, CursorDecodeError); 4] = [
        ("", CursorDecodeError::Empty),
        ("%%%not-base64%%%", CursorDecodeError::InvalidBase64),
        (no_separator.as_str(), CursorDecodeError::MissingSeparator),
        (
            oversized.as_str(),
            CursorDecodeError::TooLong {
                len: MAX_CURSOR_TOKEN_LEN + 4,
                max: MAX_CURSOR_TOKEN_LEN,
            },
        ),
    ];

    for (token, expected) in cases {
        let err = decode_cursor(&query, token).expect_err("malformed token should fail");
        match err {
            Error::MalformedCursor(found) => assert_eq!(found, expected),
            other => panic!("unexpected error for {token:?}: {other:?}"),
        }
    }
}

#[test]
fn signature_error_message_leaks_nothing() {
    let query = first(2);
    let token = encode_cursor(&query, Some("10"), 2).expect("cursor should encode");
    let err = decode_cursor(&first(5), &token).expect_err("shape change should fail");

    assert_eq!(err.to_string(), "cursor signature mismatch");
}

#[test]
fn values_with_separators_round_trip() {
    let query = first(2);
    let token = encode_cursor(&query, Some("a#b@c"), 7).expect("cursor should encode");
    let position = decode_cursor(&query, &token).expect("cursor should verify");

    assert_eq!(position, CursorPosition::new("a#b@c", 7));
    assert!(matches!(
        position.number_id(),
        Err(CursorDecodeError::InvalidNumberId { .. })
    ));
}

#[test]
fn current_page_follows_the_inbound_cursor() {
    let query = first(4);
    assert_eq!(current_page_number(&query).expect("first page"), 1);

    let token = encode_cursor(&query, Some("42"), 3).expect("cursor should encode");
    let forward = query.clone().with_next_cursor(token.clone());
    let backward = query.with_prev_cursor(token);

    assert_eq!(current_page_number(&forward).expect("cursor should verify"), 3);
    assert_eq!(current_page_number(&backward).expect("cursor should verify"), 3);
    assert_eq!(forward.next_cursor_number_id().expect("cursor should verify"), Some(42));
    assert_eq!(forward.prev_cursor_value().expect("no prev cursor"), None);
    assert_eq!(
        backward.prev_cursor_value().expect("cursor should verify"),
        Some("42".to_string())
    );
}

#[test]
fn number_id_rejects_text_ids() {
    let query = first(4);
    let token = encode_cursor(&query, Some("abc"), 2).expect("cursor should encode");
    let forward = query.with_next_cursor(token);

    let err = forward
        .next_cursor_number_id()
        .expect_err("text id is not numeric");
    assert_eq!(err.class(), ErrorClass::MalformedCursor);
}

#[test]
fn seek_for_descending_query() {
    let policy = CursorPolicy::default();
    let query = first(5);

    let seek = KeysetSeek::for_query(&policy, &query).expect("first page needs no cursor");
    assert_eq!(seek.direction, PageDirection::First);
    assert_eq!(seek.value(), None);
    assert_eq!(seek.comparison, SeekOp::Lt);
    assert_eq!(seek.limit, 6);

    let token = encode_cursor(&query, Some("100"), 2).expect("cursor should encode");
    let backward = query.with_prev_cursor(token);
    let seek = KeysetSeek::for_query(&policy, &backward).expect("cursor should verify");

    assert_eq!(seek.direction, PageDirection::Backward);
    assert_eq!(seek.value(), Some("100"));
    assert_eq!(seek.comparison, SeekOp::Gt);
    assert_eq!(seek.fetch_order.direction_of("id"), Some(OrderDirection::Asc));
    assert_eq!(seek.comparison.to_string(), ">");
}

#[test]
fn seek_rejects_a_foreign_cursor() {
    let policy = CursorPolicy::default();
    let token = encode_cursor(&first(5), Some("100"), 2).expect("cursor should encode");
    let query = first(6).with_next_cursor(token);

    let err = KeysetSeek::for_query(&policy, &query).expect_err("foreign cursor should fail");
    assert!(matches!(err, Error::CursorSignature));
}

proptest! {
    #[test]
    fn round_trip_recovers_value_and_page(
        value in "[a-zA-Z0-9@#:_-]{1,40}",
        page in 1u32..=u32::MAX,
        size in 1u32..=8192,
    ) {
        let query = first(size);
        let token = encode_cursor(&query, Some(value.as_str()), page).expect("cursor should encode");
        let position = decode_cursor(&query, &token).expect("cursor should verify");

        prop_assert_eq!(position.value, value);
        prop_assert_eq!(position.page_number, page);
    }

    #[test]
    fn single_byte_payload_change_is_detected(
        value in "[0-9]{1,12}",
        page in 1u32..10_000,
        index in any::<prop::sample::Index>(),
        replacement in "[a-z]",
    ) {
        let query = first(20);
        let token = encode_cursor(&query, Some(value.as_str()), page).expect("cursor should encode");
        let payload = format!("{value}@{page}");
        let at = index.index(payload.len());
        let mut tampered = payload.clone();
        tampered.replace_range(at..=at, &replacement);

        let err = decode_cursor(&query, &with_payload(&token, &tampered))
            .expect_err("tampered payload should fail");
        prop_assert!(matches!(err, Error::CursorSignature));
    }

    #[test]
    fn cursor_does_not_verify_under_another_size(
        value in "[0-9]{1,12}",
        a in 1u32..=8192,
        b in 1u32..=8192,
    ) {
        prop_assume!(a != b);
        let token = encode_cursor(&first(a), Some(value.as_str()), 2).expect("cursor should encode");

        prop_assert!(matches!(
            decode_cursor(&first(b), &token),
            Err(Error::CursorSignature)
        ));
    }
}
