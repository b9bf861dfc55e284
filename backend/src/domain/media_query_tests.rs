//! Tests for filter parsing, predicate scoping, pagination, and reads.

use std::collections::HashMap;
use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockBlobStore, MockMediaRepository};
use crate::domain::{ErrorCode, MediaType, NewMediaRecord};
use crate::test_support::{BlobOp, InMemoryBlobStore, InMemoryMediaRepository};
use crate::domain::ports::BlobStore as _;
use rstest::{fixture, rstest};

const ALICE: AccountId = AccountId::new(1);
const BOB: AccountId = AccountId::new(2);

struct Harness {
    media: Arc<InMemoryMediaRepository>,
    blobs: Arc<InMemoryBlobStore>,
    service: MediaQueryService<InMemoryMediaRepository, InMemoryBlobStore>,
}

#[fixture]
fn harness() -> Harness {
    let media = Arc::new(InMemoryMediaRepository::default());
    let blobs = Arc::new(InMemoryBlobStore::default());
    let service = MediaQueryService::new(media.clone(), blobs.clone());
    Harness {
        media,
        blobs,
        service,
    }
}

fn new_record(owner: AccountId, title: &str, media_type: MediaType, shareable: bool) -> NewMediaRecord {
    NewMediaRecord {
        owner,
        title: title.to_owned(),
        size: 4,
        media_type,
        shareable,
    }
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[rstest]
#[case(&[], true)]
#[case(&[("page", "3")], true)]
#[case(&[("unknown", "x")], true)]
#[case(&[("title", "")], false)]
#[case(&[("shareable", "false")], false)]
fn only_recognised_keys_count_as_filters(#[case] pairs: &[(&str, &str)], #[case] empty: bool) {
    let filters = MediaFilters::from_params(&params(pairs)).expect("parse");
    assert_eq!(filters.is_empty(), empty);
}

#[rstest]
#[case("id", "abc")]
#[case("uid", "1.5")]
#[case("shareable", "yes")]
fn malformed_filters_are_invalid_requests(#[case] key: &str, #[case] value: &str) {
    let error = MediaFilters::from_params(&params(&[(key, value)])).expect_err("malformed");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn filters_parse_typed_values() {
    let filters = MediaFilters::from_params(&params(&[
        ("id", "7"),
        ("uid", "2"),
        ("encoding", "image/png"),
        ("shareable", "1"),
    ]))
    .expect("parse");
    assert_eq!(filters.id, Some(MediaId::new(7)));
    assert_eq!(filters.owner, Some(BOB));
    assert_eq!(filters.encoding.as_deref(), Some("image/png"));
    assert_eq!(filters.shareable, Some(true));
    assert_eq!(filters.title, None);
}

#[rstest]
fn filtered_predicate_admits_shareable_records_of_others() {
    let filters = MediaFilters {
        encoding: Some("image/png".to_owned()),
        ..MediaFilters::default()
    };
    let predicate = MediaPredicate::compile(ALICE, filters);
    assert_eq!(predicate.visibility, Visibility::OwnedOrShareable(ALICE));

    let shared = new_record(BOB, "b.png", MediaType::Png, true).into_record(MediaId::new(1));
    let private = new_record(BOB, "c.png", MediaType::Png, false).into_record(MediaId::new(2));
    let jpeg = new_record(ALICE, "d.jpeg", MediaType::Jpeg, false).into_record(MediaId::new(3));
    assert!(predicate.matches(&shared));
    assert!(!predicate.matches(&private));
    assert!(!predicate.matches(&jpeg));
}

#[rstest]
#[case(0, 50)]
#[case(1, 50)]
#[case(2, 20)]
#[case(3, 0)]
#[tokio::test]
async fn pages_split_matches_and_keep_total(
    harness: Harness,
    #[case] page: u32,
    #[case] expected_rows: usize,
) {
    for n in 0..120 {
        harness
            .media
            .seed(new_record(ALICE, &format!("{n}.png"), MediaType::Png, false));
    }
    harness
        .media
        .seed(new_record(ALICE, "other.jpeg", MediaType::Jpeg, false));
    let filters = MediaFilters {
        encoding: Some("image/png".to_owned()),
        ..MediaFilters::default()
    };

    let result = harness
        .service
        .search(ALICE, filters, PageIndex::new(page))
        .await
        .expect("search");

    assert_eq!(result.items().len(), expected_rows);
    assert_eq!(result.total_results(), 120);
    assert_eq!(result.page(), page);
    assert_eq!(result.page_size(), 50);
}

#[rstest]
#[tokio::test]
async fn pages_are_ordered_by_id(harness: Harness) {
    for n in 0..60 {
        harness
            .media
            .seed(new_record(ALICE, &format!("{n}.png"), MediaType::Png, false));
    }
    let second = harness
        .service
        .search(ALICE, MediaFilters::default(), PageIndex::new(1))
        .await
        .expect("search");
    let ids: Vec<i64> = second.items().iter().map(|record| record.id.get()).collect();
    assert_eq!(ids, (51..=60).collect::<Vec<_>>());
}

#[rstest]
#[tokio::test]
async fn unscoped_search_returns_only_own_records(harness: Harness) {
    let mine = harness
        .media
        .seed(new_record(ALICE, "mine.png", MediaType::Png, false));
    harness
        .media
        .seed(new_record(BOB, "shared.png", MediaType::Png, true));
    harness
        .media
        .seed(new_record(BOB, "private.png", MediaType::Png, false));

    let result = harness
        .service
        .search(ALICE, MediaFilters::default(), PageIndex::FIRST)
        .await
        .expect("search");

    assert_eq!(result.total_results(), 1);
    assert_eq!(result.items(), &[mine]);
}

#[rstest]
#[tokio::test]
async fn filtered_search_never_leaks_private_records(harness: Harness) {
    harness
        .media
        .seed(new_record(BOB, "shared.png", MediaType::Png, true));
    harness
        .media
        .seed(new_record(BOB, "private.png", MediaType::Png, false));

    let filters = MediaFilters {
        owner: Some(BOB),
        ..MediaFilters::default()
    };
    let result = harness
        .service
        .search(ALICE, filters, PageIndex::FIRST)
        .await
        .expect("search");

    assert_eq!(result.total_results(), 1);
    assert_eq!(result.items()[0].title, "shared.png");
}

#[tokio::test]
async fn search_counts_before_selecting() {
    let mut sequence = mockall::Sequence::new();
    let mut media = MockMediaRepository::new();
    media
        .expect_count()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(75));
    media
        .expect_select()
        .withf(|predicate, window| {
            predicate.visibility == Visibility::OwnedBy(ALICE)
                && window.limit() == 50
                && window.offset() == 50
        })
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(Vec::new()));
    let service = MediaQueryService::new(Arc::new(media), Arc::new(MockBlobStore::new()));

    let result = service
        .search(ALICE, MediaFilters::default(), PageIndex::new(1))
        .await
        .expect("search");
    assert_eq!(result.total_results(), 75);
}

#[rstest]
#[tokio::test]
async fn private_content_is_unauthorized_for_others(harness: Harness) {
    let record = harness
        .media
        .seed(new_record(ALICE, "a.png", MediaType::Png, false));
    harness
        .blobs
        .write(&record.blob_key(), b"data")
        .await
        .expect("seed blob");
    let locator = MediaLocator::new(ALICE, record.id);

    let error = harness
        .service
        .fetch_content(BOB, locator)
        .await
        .expect_err("private");
    assert_eq!(error.code(), ErrorCode::Unauthorized);

    let content = harness
        .service
        .fetch_content(ALICE, locator)
        .await
        .expect("owner reads");
    assert_eq!(content.bytes, b"data");
    assert_eq!(content.media_type, MediaType::Png);
}

#[rstest]
#[tokio::test]
async fn missing_record_is_not_found(harness: Harness) {
    let error = harness
        .service
        .fetch_content(
            ALICE,
            MediaLocator::new(ALICE, MediaId::new(404)),
        )
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unreadable_blob_is_internal(harness: Harness) {
    let record = harness
        .media
        .seed(new_record(ALICE, "a.png", MediaType::Png, true));
    harness.blobs.fail_on(BlobOp::Read);

    let error = harness
        .service
        .fetch_content(
            BOB,
            MediaLocator::new(ALICE, record.id),
        )
        .await
        .expect_err("read fails");
    assert_eq!(error.code(), ErrorCode::InternalError);
}
