//! Circulation scenarios against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use kernel::clock::{Clock, FixedClock};
use kernel::identity::{Identity, Role};
use tower::ServiceExt;

use crate::application::{
    BorrowReceipt, BorrowUseCase, LendingConfig, LendingQueries, ReturnReceipt, ReturnUseCase,
};
use crate::domain::entities::{BookCopy, LedgerAction};
use crate::domain::repository::{CatalogRepository, LedgerRepository};
use crate::domain::value_objects::CatalogQuery;
use crate::error::LendingError;
use crate::infra::InMemoryLendingStore;
use crate::presentation::{LendingAppState, lending_router};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 3, 9, 0, 0).unwrap()
}

fn reader(name: &str) -> Identity {
    Identity::new(name, Role::Reader)
}

fn librarian() -> Identity {
    Identity::new("marian", Role::Librarian)
}

struct Fixture {
    store: Arc<InMemoryLendingStore>,
    clock: Arc<FixedClock>,
    config: Arc<LendingConfig>,
}

impl Fixture {
    async fn new() -> Self {
        let store = InMemoryLendingStore::new();
        for copy in [
            BookCopy::new(1, "Dune", "Frank Herbert", "Sci-Fi"),
            BookCopy::new(2, "Emma", "Jane Austen", "Classics"),
            BookCopy::new(3, "Persuasion", "Jane Austen", "Classics"),
            BookCopy::new(4, "Neuromancer", "William Gibson", "Sci-Fi"),
            BookCopy::new(42, "The Hitchhiker's Guide", "Douglas Adams", "Sci-Fi"),
        ] {
            store.add_copy(&copy).await.unwrap();
        }
        Self {
            store: Arc::new(store),
            clock: Arc::new(FixedClock::new(t0())),
            config: Arc::new(LendingConfig::default()),
        }
    }

    fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    fn borrow_use_case(&self) -> BorrowUseCase<InMemoryLendingStore> {
        BorrowUseCase::new(self.store.clone(), self.clock(), self.config.clone())
    }

    fn queries(&self) -> LendingQueries<InMemoryLendingStore> {
        LendingQueries::new(self.store.clone(), self.clock())
    }

    async fn borrow(&self, who: &str, copy_id: i64) -> Result<BorrowReceipt, LendingError> {
        self.borrow_use_case().execute(&reader(who), copy_id).await
    }

    async fn give_back(&self, who: &str, copy_id: i64) -> Result<ReturnReceipt, LendingError> {
        ReturnUseCase::new(self.store.clone(), self.clock())
            .execute(&reader(who), copy_id)
            .await
    }

    async fn copy(&self, copy_id: i64) -> BookCopy {
        self.store.find_copy(copy_id).await.unwrap().unwrap()
    }
}

// ============================================================================
// Borrow
// ============================================================================

#[tokio::test]
async fn borrow_marks_copy_and_writes_one_entry() {
    let f = Fixture::new().await;
    let receipt = f.borrow("alice", 1).await.unwrap();

    assert_eq!(receipt.due_date, t0() + Duration::days(14));
    let copy = f.copy(1).await;
    assert!(!copy.available);
    assert_eq!(copy.due_date, Some(t0() + Duration::days(14)));

    let history = f.store.history("alice").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, LedgerAction::Borrow);
    assert_eq!(history[0].loan_id, receipt.loan_id);
}

#[tokio::test]
async fn copy_42_goes_to_the_first_borrower() {
    let f = Fixture::new().await;
    f.borrow("alice", 42).await.unwrap();

    f.clock.advance(Duration::hours(1));
    let err = f.borrow("bob", 42).await.unwrap_err();
    assert!(matches!(err, LendingError::AlreadyBorrowed));

    // Bob's failed attempt leaves no trace
    assert!(f.store.history("bob").await.unwrap().is_empty());
    assert_eq!(f.copy(42).await.due_date, Some(t0() + Duration::days(14)));
}

#[tokio::test]
async fn fourth_borrow_hits_the_limit() {
    let f = Fixture::new().await;
    for copy_id in [1, 2, 3] {
        f.borrow("alice", copy_id).await.unwrap();
    }

    let err = f.borrow("alice", 4).await.unwrap_err();
    assert!(matches!(err, LendingError::LimitReached { count: 3 }));
    assert!(f.copy(4).await.available);

    // Someone else is unaffected
    f.borrow("bob", 4).await.unwrap();
}

#[tokio::test]
async fn missing_copy() {
    let f = Fixture::new().await;
    let err = f.borrow("alice", 999).await.unwrap_err();
    assert!(matches!(err, LendingError::CopyNotFound));
}

#[tokio::test]
async fn librarians_do_not_borrow() {
    let f = Fixture::new().await;
    let err = f.borrow_use_case().execute(&librarian(), 1).await.unwrap_err();
    assert!(matches!(err, LendingError::Unauthorized));
    assert!(f.copy(1).await.available);
}

#[tokio::test]
async fn concurrent_borrows_of_one_copy() {
    let f = Fixture::new().await;
    let use_case = Arc::new(f.borrow_use_case());

    let mut handles = Vec::new();
    for i in 0..8 {
        let use_case = use_case.clone();
        handles.push(tokio::spawn(async move {
            use_case.execute(&reader(&format!("reader{i}")), 42).await
        }));
    }

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(LendingError::AlreadyBorrowed) => {}
            Err(other) => panic!("unexpected: {other:?}"),
        }
    }
    assert_eq!(won, 1);
    assert_eq!(f.store.overdue_loans(t0() + Duration::days(15)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_borrows_by_one_account_respect_the_limit() {
    let f = Fixture::new().await;
    let use_case = Arc::new(f.borrow_use_case());

    let mut handles = Vec::new();
    for copy_id in [1, 2, 3, 4, 42] {
        let use_case = use_case.clone();
        handles.push(tokio::spawn(async move {
            use_case.execute(&reader("alice"), copy_id).await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            ok += 1;
        }
    }
    assert_eq!(ok, 3);
    assert_eq!(f.store.open_loans_for("alice").await.unwrap().len(), 3);
}

// ============================================================================
// Return
// ============================================================================

#[tokio::test]
async fn round_trip_restores_availability() {
    let f = Fixture::new().await;
    f.borrow("alice", 2).await.unwrap();

    f.clock.advance(Duration::days(3));
    let receipt = f.give_back("alice", 2).await.unwrap();
    assert!(!receipt.was_overdue);
    assert_eq!(receipt.returned_at, t0() + Duration::days(3));

    let copy = f.copy(2).await;
    assert!(copy.available);
    assert_eq!(copy.due_date, None);

    let history = f.store.history("alice").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, LedgerAction::Return);
    assert_eq!(history[1].action, LedgerAction::Borrow);
    assert_eq!(history[1].returned_at, Some(t0() + Duration::days(3)));

    // Free again for the next reader
    f.borrow("bob", 2).await.unwrap();
}

#[tokio::test]
async fn return_frees_a_slot_under_the_limit() {
    let f = Fixture::new().await;
    for copy_id in [1, 2, 3] {
        f.borrow("alice", copy_id).await.unwrap();
    }
    f.give_back("alice", 1).await.unwrap();
    f.borrow("alice", 4).await.unwrap();
}

#[tokio::test]
async fn nothing_to_return() {
    let f = Fixture::new().await;
    let err = f.give_back("alice", 1).await.unwrap_err();
    assert!(matches!(err, LendingError::NothingToReturn));

    // Only the holder can return
    f.borrow("alice", 1).await.unwrap();
    let err = f.give_back("bob", 1).await.unwrap_err();
    assert!(matches!(err, LendingError::NothingToReturn));
    assert!(!f.copy(1).await.available);
}

#[tokio::test]
async fn late_return_is_flagged() {
    let f = Fixture::new().await;
    f.borrow("alice", 1).await.unwrap();
    f.clock.advance(Duration::days(20));
    assert!(f.give_back("alice", 1).await.unwrap().was_overdue);
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn my_borrowed_lists_oldest_first_with_overdue_flag() {
    let f = Fixture::new().await;
    f.borrow("alice", 3).await.unwrap();
    f.clock.advance(Duration::days(10));
    f.borrow("alice", 1).await.unwrap();
    f.clock.advance(Duration::days(5));

    let loans = f.queries().list_my_borrowed(&reader("alice")).await.unwrap();
    assert_eq!(loans.iter().map(|l| l.copy_id).collect::<Vec<_>>(), vec![3, 1]);
    assert!(loans[0].is_overdue);
    assert!(!loans[1].is_overdue);
}

#[tokio::test]
async fn overdue_report_is_for_librarians() {
    let f = Fixture::new().await;
    f.borrow("alice", 1).await.unwrap();
    f.borrow("bob", 2).await.unwrap();
    f.clock.advance(Duration::days(14));

    // Due exactly now is not yet overdue
    assert!(f.queries().list_overdue(&librarian()).await.unwrap().is_empty());

    f.clock.advance(Duration::minutes(1));
    let overdue = f.queries().list_overdue(&librarian()).await.unwrap();
    assert_eq!(overdue.len(), 2);
    assert!(overdue.iter().all(|l| l.is_overdue));

    let err = f.queries().list_overdue(&reader("alice")).await.unwrap_err();
    assert!(matches!(err, LendingError::Unauthorized));
}

#[tokio::test]
async fn overdue_report_puts_longest_overdue_first() {
    let f = Fixture::new().await;
    f.borrow("zed", 4).await.unwrap();
    f.borrow("alice", 2).await.unwrap();
    f.clock.advance(Duration::days(1));
    f.borrow("bob", 1).await.unwrap();
    f.clock.advance(Duration::days(20));

    let overdue = f.queries().list_overdue(&librarian()).await.unwrap();
    let order: Vec<(&str, i64)> = overdue
        .iter()
        .map(|l| (l.account.as_str(), l.copy_id))
        .collect();
    assert_eq!(order, vec![("alice", 2), ("zed", 4), ("bob", 1)]);
}

#[tokio::test]
async fn catalog_filters() {
    let f = Fixture::new().await;
    let q = f.queries();

    let all = q.list_catalog(&CatalogQuery::default()).await.unwrap();
    assert_eq!(all.iter().map(|c| c.copy_id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 42]);

    let austen = q
        .list_catalog(&CatalogQuery::new(Some("austen".into()), Some("All".into())))
        .await
        .unwrap();
    assert_eq!(austen.len(), 2);

    let scifi_with_an = q
        .list_catalog(&CatalogQuery::new(Some("an".into()), Some("Sci-Fi".into())))
        .await
        .unwrap();
    // "Frank Herbert" and "Neuromancer"; Austen titles are not Sci-Fi
    assert_eq!(scifi_with_an.iter().map(|c| c.copy_id).collect::<Vec<_>>(), vec![1, 4]);

    // Result is an owned list; running it again gives the same answer
    assert_eq!(q.list_catalog(&CatalogQuery::default()).await.unwrap(), all);
}

// ============================================================================
// HTTP
// ============================================================================

fn app(f: &Fixture, identity: Identity) -> axum::Router {
    let state = LendingAppState {
        store: f.store.clone(),
        clock: f.clock(),
        config: f.config.clone(),
    };
    lending_router(state).layer(axum::Extension(identity))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn borrow_over_http() {
    let f = Fixture::new().await;

    let response = app(&f, reader("alice")).oneshot(post("/copies/42/borrow")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["copyId"], 42);
    assert_eq!(body["message"], "Successfully borrowed book ID: 42");
    assert_eq!(body["category"], "success");

    let response = app(&f, reader("bob")).oneshot(post("/copies/42/borrow")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "This book is already borrowed by someone else.");
    assert_eq!(body["category"], "danger");
}

#[tokio::test]
async fn catalog_over_http() {
    let f = Fixture::new().await;
    let response = app(&f, reader("alice"))
        .oneshot(
            Request::builder()
                .uri("/catalog?q=AUSTEN&category=Classics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["copies"].as_array().unwrap().len(), 2);
}
