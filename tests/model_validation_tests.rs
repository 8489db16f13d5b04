use batts_portal::{
    guard::{DASHBOARD_PAGE, LOGIN_PAGE, decide, is_public},
    membership::membership_id_at,
    models::{MembershipType, Profile, ProfilePatch, STATUS_PENDING_APPROVAL},
    views::{DashboardView, DelayedRedirect},
};
use chrono::DateTime;
use rand::{SeedableRng, rngs::StdRng};
use regex::Regex;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

fn profile() -> Profile {
    Profile {
        id: Uuid::new_v4(),
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: None,
        membership_type: MembershipType::Junior,
        membership_id: "JR-000042-001".to_string(),
        status: STATUS_PENDING_APPROVAL.to_string(),
        created_at: None,
        updated_at: None,
    }
}

// --- Profile Records ---

#[test]
fn test_profile_row_deserializes_from_table_json() {
    let id = Uuid::new_v4();
    let row = json!({
        "id": id,
        "full_name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": null,
        "membership_type": "Senior",
        "membership_id": "SR-123456-007",
        "status": "Approved",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:00Z"
    });

    let profile: Profile = serde_json::from_value(row).unwrap();

    assert_eq!(profile.id, id);
    assert_eq!(profile.membership_type, MembershipType::Senior);
    assert!(profile.phone.is_none());
    assert!(profile.created_at.is_some());
}

#[test]
fn test_session_record_omits_missing_timestamps() {
    let value = serde_json::to_value(profile()).unwrap();

    assert_eq!(value["membership_type"], "Junior");
    assert!(value.get("created_at").is_none());
    assert!(value.get("updated_at").is_none());
}

#[test]
fn test_patch_merges_only_present_fields() {
    let mut record = profile();
    let patch = ProfilePatch {
        phone: Some("555-0100".to_string()),
        membership_type: Some(MembershipType::Senior),
        ..ProfilePatch::default()
    };

    record.apply(&patch);

    assert_eq!(record.full_name, "Ada Lovelace");
    assert_eq!(record.phone.as_deref(), Some("555-0100"));
    assert_eq!(record.membership_type, MembershipType::Senior);
}

#[test]
fn test_patch_serializes_only_present_fields() {
    let patch = ProfilePatch {
        full_name: Some("Ada King".to_string()),
        ..ProfilePatch::default()
    };

    assert_eq!(
        serde_json::to_value(&patch).unwrap(),
        json!({ "full_name": "Ada King" })
    );
    assert!(!patch.is_empty());
    assert!(ProfilePatch::default().is_empty());
}

// --- Membership Ids ---

#[test]
fn test_membership_id_uses_last_six_timestamp_digits() {
    let mut rng = StdRng::seed_from_u64(7);
    let now = DateTime::from_timestamp_millis(1_700_000_123_456).unwrap();

    let id = membership_id_at(MembershipType::Senior, now, &mut rng);

    assert!(id.starts_with("SR-123456-"), "{id}");
}

#[test]
fn test_membership_id_pads_timestamp_and_suffix() {
    let pattern = Regex::new(r"^JR-000042-\d{3}$").unwrap();
    let now = DateTime::from_timestamp_millis(1_700_000_000_042).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    for _ in 0..50 {
        let id = membership_id_at(MembershipType::Junior, now, &mut rng);
        assert!(pattern.is_match(&id), "{id}");
    }
}

// --- Route Guard Decisions ---

#[test]
fn test_guard_public_routes() {
    assert!(is_public("/"));
    assert!(is_public("/index.html"));
    assert!(is_public("/site/login.html"));
    assert!(!is_public(DASHBOARD_PAGE));
}

#[test]
fn test_guard_decisions() {
    assert_eq!(decide(DASHBOARD_PAGE, false), Some(LOGIN_PAGE));
    assert_eq!(decide(DASHBOARD_PAGE, true), None);
    assert_eq!(decide("/login.html", true), Some(DASHBOARD_PAGE));
    assert_eq!(decide("/register.html", true), Some(DASHBOARD_PAGE));
    assert_eq!(decide("/login.html", false), None);
    assert_eq!(decide("/index.html", true), None);
    assert_eq!(decide("/index.html", false), None);
}

// --- Dashboard Rendering ---

#[test]
fn test_dashboard_view_fallbacks() {
    let record = Profile {
        full_name: String::new(),
        membership_id: " ".to_string(),
        status: String::new(),
        ..profile()
    };

    let view = DashboardView::from_profile(&record);

    assert_eq!(view.user_name, "Member");
    assert_eq!(view.membership_id, "Not assigned");
    assert_eq!(view.detail_name, "Not provided");
    assert_eq!(view.detail_phone, "Not provided");
    assert_eq!(view.detail_type, "Junior");
    assert_eq!(view.detail_status, "Pending");
    assert_eq!(view.status_class, None);
}

#[test]
fn test_dashboard_view_status_classes() {
    let pending = DashboardView::from_profile(&profile());
    assert_eq!(pending.status_class, Some("status-pending"));

    let approved = DashboardView::from_profile(&Profile {
        status: "Approved".to_string(),
        ..profile()
    });
    assert_eq!(approved.status_class, Some("status-approved"));

    let other = DashboardView::from_profile(&Profile {
        status: "Suspended".to_string(),
        ..profile()
    });
    assert_eq!(other.status_class, None);
    assert_eq!(other.detail_status, "Suspended");
}

#[test]
fn test_delayed_redirect_seconds() {
    assert_eq!(
        DelayedRedirect::new(LOGIN_PAGE, Duration::from_millis(3000)).seconds(),
        "3"
    );
    assert_eq!(
        DelayedRedirect::new(DASHBOARD_PAGE, Duration::from_millis(1500)).seconds(),
        "1.5"
    );
}
