//! Cross-crate contracts: serialization shapes and shared formatting.

use rust_decimal::Decimal;
use serde_json::json;

use voltbay_core::{Email, UserId, Username, format_usd};
use voltbay_integration_tests::memory_session;
use voltbay_storefront::models::review::average_rating;
use voltbay_storefront::models::{CurrentUser, session_keys};
use voltbay_storefront::services::wishlist::ToggleAction;

#[test]
fn test_toggle_action_serializes_lowercase() {
    assert_eq!(serde_json::to_value(ToggleAction::Added).unwrap(), json!("added"));
    assert_eq!(
        serde_json::to_value(ToggleAction::Removed).unwrap(),
        json!("removed")
    );
}

#[tokio::test]
async fn test_current_user_round_trips_through_session() {
    let session = memory_session();
    let user = CurrentUser {
        id: UserId::new(42),
        username: "alice".to_owned(),
    };

    session.insert(session_keys::CURRENT_USER, &user).await.unwrap();
    let loaded: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .unwrap()
        .expect("user stored in session");

    assert_eq!(loaded.id, user.id);
    assert_eq!(loaded.username, "alice");
}

#[test]
fn test_usd_formatting_matches_storefront_display() {
    assert_eq!(format_usd(Decimal::new(129_900, 2)), "$1299.00");
    assert_eq!(format_usd(Decimal::ZERO), "$0.00");
}

#[test]
fn test_average_rating_rounds_to_one_decimal() {
    assert_eq!(average_rating(&[5, 4]), Decimal::new(45, 1));
    assert_eq!(average_rating(&[]), Decimal::ZERO);
}

#[test]
fn test_core_validation_rules() {
    assert!(Username::parse("shopper_01").is_ok());
    assert!(Username::parse("ab").is_err());
    assert!(Email::parse("shopper@example.com").is_ok());
    assert!(Email::parse("not-an-email").is_err());
}
