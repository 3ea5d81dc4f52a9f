mod support;

use bce_common::Cv;
use compensation_engine::{
    api::RegistrationApi,
    db_types::{NewMember, WalletCategory},
    helpers::member_number::MEMBER_NUMBER_PREFIX,
    traits::{CompensationDatabase, MemberDirectory, RegistrationError, WELCOME_BONUS_KEY},
};
use support::{new_test_db, register};

#[tokio::test]
async fn member_numbers_are_allocated_in_the_house_format() {
    let (db, root) = new_test_db().await;
    let alice = register(&db, "Alice", "alice@example.com", root.id).await;
    assert_eq!(alice.member_number.len(), 9);
    assert!(alice.member_number.starts_with(MEMBER_NUMBER_PREFIX));
    assert!(alice.member_number.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn contact_details_must_be_unique() {
    let (db, root) = new_test_db().await;
    let new_member =
        NewMember::new("Alice", "alice@example.com", root.id).with_phone("555-0100").with_national_id("ID-1");
    db.register_member(new_member).await.unwrap();

    let err = db.register_member(NewMember::new("Mallory", "alice@example.com", root.id)).await.unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateEmail(_)));

    let dup_phone = NewMember::new("Mallory", "mallory@example.com", root.id).with_phone("555-0100");
    let err = db.register_member(dup_phone).await.unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicatePhone(_)));

    let dup_id = NewMember::new("Mallory", "mallory@example.com", root.id).with_national_id("ID-1");
    let err = db.register_member(dup_id).await.unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateNationalId(_)));

    let dup_number = NewMember::new("Mallory", "mallory@example.com", root.id).with_member_number("900000000");
    let err = db.register_member(dup_number).await.unwrap_err();
    assert!(matches!(err, RegistrationError::DuplicateMemberNumber(_)));

    // Nothing was persisted for any of the failed attempts.
    assert!(db.fetch_member_by_email("mallory@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn commits_are_visible_to_the_very_next_call() {
    let (db, root) = new_test_db().await;
    // Every read after a commit must observe it: a freshly seeded or registered member is a
    // valid sponsor immediately, with no warm-up reads in between.
    for i in 0..20 {
        assert!(db.fetch_member(root.id).await.unwrap().is_some(), "root missing on iteration {i}");
        let member = register(&db, &format!("Member {i}"), &format!("member{i}@example.com"), root.id).await;
        assert!(db.fetch_member(member.id).await.unwrap().is_some(), "member missing on iteration {i}");
    }
}

#[tokio::test]
async fn the_sponsor_must_exist() {
    let (db, _root) = new_test_db().await;
    let err = db.register_member(NewMember::new("Alice", "alice@example.com", 99_999)).await.unwrap_err();
    assert!(matches!(err, RegistrationError::SponsorNotFound(_)));
}

#[tokio::test]
async fn the_sponsor_earns_a_referral_bonus() {
    let (db, root) = new_test_db().await;
    let alice = register(&db, "Alice", "alice@example.com", root.id).await;

    // Default referral bonus is 50 CV.
    let sponsor = db.fetch_member(root.id).await.unwrap().unwrap();
    assert_eq!(sponsor.total_cv, Cv::from_cv(50));

    let history = db.wallet_history(root.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].category, WalletCategory::Referral);
    assert_eq!(history[0].amount, Cv::from_cv(50));
    assert!(history[0].memo.contains(&alice.full_name));
}

#[tokio::test]
async fn the_welcome_bonus_is_off_until_configured() {
    let (db, root) = new_test_db().await;
    let alice = register(&db, "Alice", "alice@example.com", root.id).await;
    assert_eq!(alice.total_cv, Cv::zero());
    assert!(db.wallet_history(alice.id).await.unwrap().is_empty());

    db.set_setting(WELCOME_BONUS_KEY, 25.0).await.unwrap();
    let bob = register(&db, "Bob", "bob@example.com", root.id).await;
    assert_eq!(bob.total_cv, Cv::from_cv(25));
    let history = db.wallet_history(bob.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].category, WalletCategory::Welcome);
}

#[tokio::test]
async fn sponsors_resolve_by_member_number_or_id() {
    let (db, root) = new_test_db().await;
    let api = RegistrationApi::new(db.clone());
    let alice = register(&db, "Alice", "alice@example.com", root.id).await;

    let by_number = api.resolve_sponsor(&alice.member_number).await.unwrap();
    assert_eq!(by_number.id, alice.id);

    let by_id = api.resolve_sponsor(&alice.id.to_string()).await.unwrap();
    assert_eq!(by_id.id, alice.id);

    let err = api.resolve_sponsor("nobody-here").await.unwrap_err();
    assert!(matches!(err, RegistrationError::SponsorNotFound(_)));
}

#[tokio::test]
async fn signup_form_availability_checks() {
    let (db, root) = new_test_db().await;
    let api = RegistrationApi::new(db.clone());
    let new_member =
        NewMember::new("Alice", "alice@example.com", root.id).with_phone("555-0100").with_national_id("ID-1");
    api.register(new_member).await.unwrap();

    assert!(!api.email_available("alice@example.com").await.unwrap());
    assert!(api.email_available("bob@example.com").await.unwrap());
    assert!(!api.phone_available("555-0100").await.unwrap());
    assert!(api.phone_available("555-0199").await.unwrap());
    assert!(!api.national_id_available("ID-1").await.unwrap());
    assert!(api.national_id_available("ID-2").await.unwrap());
}
