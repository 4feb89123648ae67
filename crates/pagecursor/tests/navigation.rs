use pagecursor::{Error, PaginateError, policy_from_toml, prelude::*};
use proptest::prelude::*;
use thiserror::Error as ThisError;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct Article {
    id: i64,
    author: String,
}

impl CursorRecord for Article {
    fn cursor_value(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct ByAuthor {
    author: Option<String>,
}

impl QueryFilter for ByAuthor {
    fn canonical_fields(&self, fields: &mut CanonicalFields) {
        fields.push("author", &self.author);
    }
}

#[derive(Debug, ThisError)]
#[error("bad anchor value")]
struct BadAnchor;

struct Articles(Vec<Article>);

impl Articles {
    fn seeded(count: i64) -> Self {
        Self(
            (1..=count)
                .map(|id| Article {
                    id,
                    author: if id % 3 == 0 { "ana" } else { "bo" }.to_string(),
                })
                .collect(),
        )
    }

    fn matching(&self, filter: &ByAuthor) -> Vec<Article> {
        self.0
            .iter()
            .filter(|article| {
                filter
                    .author
                    .as_ref()
                    .is_none_or(|author| &article.author == author)
            })
            .cloned()
            .collect()
    }
}

impl RecordSource<ByAuthor> for Articles {
    type Record = Article;
    type Error = BadAnchor;

    fn fetch(
        &self,
        query: &CursorQuery<ByAuthor>,
        seek: &KeysetSeek,
    ) -> Result<Vec<Article>, BadAnchor> {
        let anchor = match seek.value() {
            Some(value) => Some(value.parse::<i64>().map_err(|_| BadAnchor)?),
            None => None,
        };

        let mut rows: Vec<Article> = self
            .matching(query.filter())
            .into_iter()
            .filter(|article| {
                anchor.is_none_or(|anchor| seek.comparison.admits(article.id.cmp(&anchor)))
            })
            .collect();
        rows.sort_by_key(|article| article.id);
        if seek.fetch_order.direction_of(&seek.cursor_field) == Some(OrderDirection::Desc) {
            rows.reverse();
        }
        rows.truncate(usize::try_from(seek.limit).map_err(|_| BadAnchor)?);

        Ok(rows)
    }

    fn count_total(&self, query: &CursorQuery<ByAuthor>) -> Result<Option<u64>, BadAnchor> {
        Ok(Some(self.matching(query.filter()).len() as u64))
    }
}

fn ids(page: &CursorPagination<Article>) -> Vec<i64> {
    page.records().iter().map(|article| article.id).collect()
}

// Walk forward to the last page, then back to the first, collecting ids.
fn walk(
    policy: &CursorPolicy,
    store: &Articles,
    query: CursorQuery<ByAuthor>,
) -> (Vec<Vec<i64>>, Vec<Vec<i64>>) {
    let paginator = Paginator::new(policy);
    let mut forward = Vec::new();
    let mut backward = Vec::new();

    let mut query = query;
    let mut page = paginator.paginate(store, &query).expect("page should load");
    forward.push(ids(&page));
    while let Some(next) = page.next_query(&query) {
        query = next;
        page = paginator.paginate(store, &query).expect("page should load");
        assert_eq!(usize::try_from(page.page_number()).ok(), Some(forward.len() + 1));
        forward.push(ids(&page));
    }

    backward.push(ids(&page));
    while let Some(prev) = page.prev_query(&query) {
        query = prev;
        page = paginator.paginate(store, &query).expect("page should load");
        backward.push(ids(&page));
    }
    assert_eq!(page.page_number(), 1);
    assert!(!page.has_prev());
    backward.reverse();

    (forward, backward)
}

#[test]
fn filtered_walk_visits_every_row_once_in_both_directions() {
    let policy = CursorPolicy::default();
    let store = Articles::seeded(20);
    let query = CursorQuery::first(&policy, 2)
        .expect("query should build")
        .with_filter(ByAuthor {
            author: Some("ana".to_string()),
        });

    let (forward, backward) = walk(&policy, &store, query);

    assert_eq!(forward, vec![vec![18, 15], vec![12, 9], vec![6, 3]]);
    assert_eq!(backward, forward);
}

#[test]
fn changing_the_filter_between_requests_invalidates_the_cursor() {
    let policy = CursorPolicy::default();
    let store = Articles::seeded(20);
    let query = CursorQuery::first(&policy, 2)
        .expect("query should build")
        .with_filter(ByAuthor {
            author: Some("ana".to_string()),
        });
    let page = Paginator::new(&policy)
        .paginate(&store, &query)
        .expect("page should load");

    let tampered = page
        .next_query(&query)
        .expect("next page exists")
        .with_filter(ByAuthor {
            author: Some("bo".to_string()),
        });
    let err = Paginator::new(&policy)
        .paginate(&store, &tampered)
        .expect_err("cursor is bound to the filter");

    assert!(matches!(err, PaginateError::Cursor(Error::CursorSignature)));
    assert!(err.is_client_error());
}

#[test]
fn toml_policy_drives_size_compare_mode() {
    let policy = policy_from_toml(
        r#"
        max_query_size = 50
        default_query_size = 4
        end_detection = "size_compare"
        "#,
    )
    .expect("config should load");
    let store = Articles::seeded(8);

    let query = CursorQuery::desc(&policy, DefaultOrderField::Id)
        .expect("query should build")
        .with_filter(ByAuthor::default());
    assert_eq!(query.query_size(), 4);

    let paginator = Paginator::new(&policy);
    let first = paginator.paginate(&store, &query).expect("page should load");
    assert_eq!(ids(&first), vec![8, 7, 6, 5]);

    let second_query = first.next_query(&query).expect("full page implies more");
    let second = paginator
        .paginate(&store, &second_query)
        .expect("page should load");
    assert_eq!(ids(&second), vec![4, 3, 2, 1]);

    // size comparison cannot see that the data ended exactly here
    let third = paginator
        .paginate(&store, &second.next_query(&second_query).expect("assumed to continue"))
        .expect("page should load");
    assert!(third.is_empty());
    assert!(!third.has_next());
    assert!(!third.has_prev());

    assert!(matches!(
        CursorQuery::first(&policy, 51),
        Err(pagecursor::QueryError::QuerySizeExceedsMax { size: 51, max: 50 })
    ));
}

#[test]
fn gmt_create_order_keeps_an_id_tie_breaker() {
    let policy = CursorPolicy::default();
    let query = CursorQuery::asc(&policy, "gmt_create").expect("query should build");

    assert_eq!(
        query.order_spec().field_names().collect::<Vec<_>>(),
        vec!["gmt_create", "id"]
    );
}

#[test]
fn invalid_config_is_rejected() {
    let err = policy_from_toml(r#"cursor_field = "seq""#).expect_err("seq is not allowed");

    assert!(matches!(
        err,
        pagecursor::ConfigError::CursorFieldNotAllowed { field } if field == "seq"
    ));
}

#[test]
fn fetch_and_count_reports_the_filtered_total() {
    let policy = CursorPolicy::default();
    let store = Articles::seeded(20);
    let query = CursorQuery::of(
        &policy,
        None,
        None,
        5,
        QueryType::FetchAndCount,
        &["id"],
        &[OrderDirection::Desc],
    )
    .expect("query should build")
    .with_filter(ByAuthor {
        author: Some("ana".to_string()),
    });

    let page = Paginator::new(&policy)
        .paginate(&store, &query)
        .expect("page should load");

    assert_eq!(page.total(), 6);
    assert_eq!(ids(&page), vec![18, 15, 12, 9, 6]);
}

#[test]
fn version_is_exported() {
    assert!(!pagecursor::VERSION.is_empty());
}

proptest! {
    #[test]
    fn walks_partition_the_table(rows in 0i64..40, size in 1u32..8, ascending in any::<bool>()) {
        let policy = CursorPolicy::default();
        let store = Articles::seeded(rows);
        let direction = if ascending { OrderDirection::Asc } else { OrderDirection::Desc };
        let query = CursorQuery::order(&policy, "id", direction)
            .and_then(|query| query.with_query_size(&policy, size))
            .expect("query should build")
            .with_filter(ByAuthor::default());

        let (forward, backward) = walk(&policy, &store, query);

        let mut expected: Vec<i64> = (1..=rows).collect();
        if !ascending {
            expected.reverse();
        }
        let flat: Vec<i64> = forward.iter().flatten().copied().collect();
        prop_assert_eq!(flat, expected);
        prop_assert_eq!(backward, forward);
    }
}
