//! Anonymous cart behavior over a real session, without a database.
//!
//! The session-backed store reads and writes only the session map, so these
//! tests exercise the full add/update/remove/count surface against an
//! in-memory session store.

use voltbay_core::{ProductId, UserId};
use voltbay_integration_tests::{lazy_pool, memory_session};
use voltbay_storefront::models::cart::SessionCart;
use voltbay_storefront::models::session_keys;
use voltbay_storefront::services::cart::{
    CartError, CartIdentity, CartService, CartStore, SessionCartStore,
};

#[tokio::test]
async fn test_add_accumulates_quantity() {
    let pool = lazy_pool();
    let session = memory_session();
    let store = SessionCartStore::new(&session, &pool);

    store.add(ProductId::new(1), 2).await.unwrap();
    store.add(ProductId::new(1), 3).await.unwrap();
    store.add(ProductId::new(2), 1).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 6);
}

#[tokio::test]
async fn test_update_overwrites_and_zero_removes() {
    let pool = lazy_pool();
    let session = memory_session();
    let store = SessionCartStore::new(&session, &pool);

    store.add(ProductId::new(7), 5).await.unwrap();
    store.update(ProductId::new(7), 2).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);

    store.update(ProductId::new(7), 0).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_rejects_out_of_range_quantities() {
    let pool = lazy_pool();
    let session = memory_session();
    let store = SessionCartStore::new(&session, &pool);

    for q in [0, -1, -5_000_000_000, i64::from(i32::MAX) + 1] {
        let err = store.add(ProductId::new(1), q).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(got) if got == q));
    }

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_rejects_overflowing_quantity() {
    let pool = lazy_pool();
    let session = memory_session();
    let store = SessionCartStore::new(&session, &pool);

    store.add(ProductId::new(2), 3).await.unwrap();
    let err = store
        .update(ProductId::new(2), i64::from(i32::MAX) + 1)
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::InvalidQuantity(_)));
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_remove_absent_product_is_noop() {
    let pool = lazy_pool();
    let session = memory_session();
    let store = SessionCartStore::new(&session, &pool);

    store.add(ProductId::new(1), 1).await.unwrap();
    store.remove(ProductId::new(99)).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_empty_session_counts_zero() {
    let pool = lazy_pool();
    let session = memory_session();
    let store = SessionCartStore::new(&session, &pool);

    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cart_survives_session_round_trip() {
    let pool = lazy_pool();
    let session = memory_session();
    let store = SessionCartStore::new(&session, &pool);

    store.add(ProductId::new(3), 4).await.unwrap();

    // The session stores the cart as a plain string-keyed map.
    let raw: SessionCart = session
        .get(session_keys::CART)
        .await
        .unwrap()
        .expect("cart stored in session");
    assert_eq!(raw.quantity(ProductId::new(3)), 4);
}

#[tokio::test]
async fn test_anonymous_merge_is_noop() {
    let pool = lazy_pool();
    let session = memory_session();

    // An anonymous service has nothing to merge into; the call must not
    // touch the database or the session map.
    let service = CartService::new(&pool, &session, CartIdentity::Anonymous);
    service.add(ProductId::new(5), 2).await.unwrap();
    service.merge_session_cart().await.unwrap();

    assert_eq!(service.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_merge_leaves_session_cart_in_place() {
    let pool = lazy_pool();
    let session = memory_session();

    let anonymous = CartService::new(&pool, &session, CartIdentity::Anonymous);
    anonymous.add(ProductId::new(8), 2).await.unwrap();

    // The pool has nothing to connect to, so the merge fails after loading
    // the session map; the map must survive for the next login attempt.
    let authed = CartService::new(&pool, &session, CartIdentity::Authenticated(UserId::new(1)));
    assert!(authed.merge_session_cart().await.is_err());

    let raw: SessionCart = session
        .get(session_keys::CART)
        .await
        .unwrap()
        .expect("cart still in session");
    assert_eq!(raw.quantity(ProductId::new(8)), 2);
}

#[tokio::test]
async fn test_service_dispatches_to_session_store_for_anonymous() {
    let pool = lazy_pool();
    let session = memory_session();

    let service = CartService::new(&pool, &session, CartIdentity::Anonymous);
    service.add(ProductId::new(10), 1).await.unwrap();
    service.add(ProductId::new(11), 2).await.unwrap();
    service.remove(ProductId::new(10)).await.unwrap();

    assert_eq!(service.count().await.unwrap(), 2);
}
