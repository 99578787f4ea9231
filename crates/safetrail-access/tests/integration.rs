//! End-to-end tests of the emergency-access workflow and the hash-storage
//! endpoints over the in-memory stores and ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use safetrail_access::{
    EmergencyAccessService, InMemoryAuditStore, InMemoryPrivacyStore, InMemoryShareStore,
    LocationHashStorage, LocationShare, PrivacySettings,
};
use safetrail_canonical::{derive_address, LocationData, Precision, UserId};
use safetrail_core::{
    BatchAccessItem, BatchLocationAccessEvent, EmergencyAccessRequest, EmergencyServiceCredential,
    EmergencyType, InMemoryApiKeyRegistry, InMemoryServiceRegistry, LocationAccessEvent, Priority,
};
use safetrail_ledger::{InMemoryLedger, LedgerClient, LedgerConfig, RetryPolicy, SignerIdentity};

fn fast_config() -> LedgerConfig {
    LedgerConfig {
        retry: RetryPolicy {
            max_attempts: 1,
            backoff: Duration::ZERO,
        },
        ..LedgerConfig::default()
    }
}

struct Harness {
    ledger: Arc<InMemoryLedger>,
    audit: Arc<InMemoryAuditStore>,
    privacy: Arc<InMemoryPrivacyStore>,
    shares: Arc<InMemoryShareStore>,
    service: EmergencyAccessService,
}

impl Harness {
    fn new() -> Self {
        Self::over(Arc::new(InMemoryLedger::new("testnet")))
    }

    fn with_unreachable_ledger() -> Self {
        Self::over(Arc::new(InMemoryLedger::unreachable()))
    }

    fn over(ledger: Arc<InMemoryLedger>) -> Self {
        let audit = Arc::new(InMemoryAuditStore::new());
        let privacy = Arc::new(InMemoryPrivacyStore::new());
        let shares = Arc::new(InMemoryShareStore::new());
        let client = Arc::new(LedgerClient::connect(ledger.clone(), fast_config()));
        let service = EmergencyAccessService::new(
            Arc::new(InMemoryServiceRegistry::development_fixture()),
            Arc::new(InMemoryApiKeyRegistry::development_fixture()),
            privacy.clone(),
            shares.clone(),
            audit.clone(),
            client,
        );
        Self {
            ledger,
            audit,
            privacy,
            shares,
            service,
        }
    }

    fn allow_user(&self, user_id: &str) {
        self.privacy.set(
            user_id,
            PrivacySettings {
                allow_emergency_access: true,
            },
        );
    }

    fn share_location(&self, user_id: &str, lat: f64, lng: f64, precision: Precision) {
        self.shares.add(
            user_id,
            LocationShare {
                location: LocationData::new(lat, lng, precision).unwrap(),
                created_at: Utc::now(),
            },
        );
    }
}

fn police_credential() -> EmergencyServiceCredential {
    EmergencyServiceCredential {
        service_id: "POLICE_001".into(),
        api_key: "emergency-api-key-456".into(),
        operator_id: "op-7".into(),
        jurisdiction: "NYC".into(),
        emergency_type: EmergencyType::Police,
    }
}

fn request(user_id: &str) -> EmergencyAccessRequest {
    EmergencyAccessRequest {
        user_id: user_id.into(),
        request_reason: "missing person report".into(),
        incident_id: "INC-001".into(),
        priority: Priority::High,
    }
}

#[test]
fn registered_service_authenticates() {
    let harness = Harness::new();
    let response = harness
        .service
        .authenticate_emergency_service(&police_credential());
    assert!(response.success);
    let info = response.data.unwrap();
    assert_eq!(info.service_id, "POLICE_001");
    assert_eq!(info.jurisdiction, "NYC");
    assert_eq!(info.emergency_type, EmergencyType::Police);
    assert!(info.authenticated);
}

#[test]
fn wrong_jurisdiction_is_rejected() {
    let harness = Harness::new();
    let mut credential = police_credential();
    credential.jurisdiction = "LA".into();
    let response = harness.service.authenticate_emergency_service(&credential);
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("invalid emergency service credentials")
    );
}

#[test]
fn mismatches_share_one_error_message() {
    let harness = Harness::new();

    let mut wrong_type = police_credential();
    wrong_type.emergency_type = EmergencyType::Fire;
    let mut unknown_service = police_credential();
    unknown_service.service_id = "POLICE_999".into();
    let mut unknown_key = police_credential();
    unknown_key.api_key = "emergency-api-key-000".into();

    for credential in [wrong_type, unknown_service, unknown_key] {
        let response = harness.service.authenticate_emergency_service(&credential);
        assert_eq!(
            response.error.as_deref(),
            Some("invalid emergency service credentials")
        );
    }
}

#[test]
fn granted_access_returns_location_and_audit_entry() {
    let harness = Harness::new();
    harness.allow_user("user-123");
    harness.share_location("user-123", 40.7128, -74.0060, Precision::Exact);

    let response = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    assert!(response.success);
    let result = response.data.unwrap();
    assert!(result.access_granted);
    assert_eq!(result.location.lat, 40.7128);
    assert_eq!(result.location.lng, -74.0060);
    assert_eq!(result.location.precision, Precision::Exact);
    assert!(result.warning.is_none());
    assert!(result.access_log.access_granted);
    assert_eq!(result.access_log.incident_id, "INC-001");

    let entries = harness.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0], result.access_log);

    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(harness.ledger.record_count(&subject), 1);
}

#[test]
fn most_recent_share_wins() {
    let harness = Harness::new();
    harness.allow_user("user-123");
    harness.shares.add(
        "user-123",
        LocationShare {
            location: LocationData::new(34.0522, -118.2437, Precision::General).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        },
    );
    harness.shares.add(
        "user-123",
        LocationShare {
            location: LocationData::new(40.7128, -74.0060, Precision::Approximate).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        },
    );

    let response = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    let result = response.data.unwrap();
    assert_eq!(result.location.lat, 40.7128);
    assert_eq!(result.location.precision, Precision::Approximate);
}

#[test]
fn disabled_privacy_setting_denies_and_audits() {
    let harness = Harness::new();
    harness.privacy.set(
        "user-123",
        PrivacySettings {
            allow_emergency_access: false,
        },
    );
    harness.share_location("user-123", 40.7128, -74.0060, Precision::Exact);

    let response = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("emergency access disabled for this user")
    );

    let entries = harness.audit.entries();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].access_granted);
}

#[test]
fn unknown_user_is_denied_like_a_disabled_one() {
    let harness = Harness::new();
    let response = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-999"));
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("emergency access disabled for this user")
    );
}

#[test]
fn missing_location_data_is_its_own_refusal() {
    let harness = Harness::new();
    harness.allow_user("user-123");

    let response = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("no location data available for user")
    );
    assert_eq!(harness.audit.entries().len(), 1);
    assert!(!harness.audit.entries()[0].access_granted);
}

#[test]
fn malformed_requests_are_rejected_before_any_audit_write() {
    let harness = Harness::new();
    let mut bad_request = request("user-123");
    bad_request.request_reason = "   ".into();

    let response = harness
        .service
        .request_emergency_access(&police_credential(), &bad_request);
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("invalid request parameters"));
    assert!(harness.audit.entries().is_empty());
}

#[test]
fn failed_authentication_is_audited_as_denied() {
    let harness = Harness::new();
    harness.allow_user("user-123");
    harness.share_location("user-123", 40.7128, -74.0060, Precision::Exact);

    let mut credential = police_credential();
    credential.api_key = "emergency-api-key-000".into();
    let response = harness
        .service
        .request_emergency_access(&credential, &request("user-123"));
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("authentication failed"));

    let entries = harness.audit.entries();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].access_granted);

    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(harness.ledger.record_count(&subject), 0);
}

#[test]
fn ledger_failure_downgrades_to_a_warning() {
    let harness = Harness::with_unreachable_ledger();
    harness.allow_user("user-123");
    harness.share_location("user-123", 40.7128, -74.0060, Precision::Exact);

    let response = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    assert!(response.success);
    let result = response.data.unwrap();
    assert!(result.access_granted);
    assert_eq!(
        result.warning.as_deref(),
        Some("ledger logging failed but access was granted")
    );

    let entries = harness.audit.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].access_granted);
}

#[test]
fn audit_store_failure_fails_a_grantable_request() {
    let harness = Harness::new();
    harness.allow_user("user-123");
    harness.share_location("user-123", 40.7128, -74.0060, Precision::Exact);
    harness.audit.fail_appends(true);

    let response = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    assert!(!response.success);
    assert!(response.error.unwrap().contains("internal error"));

    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(harness.ledger.record_count(&subject), 0);
}

#[test]
fn audit_store_failure_masks_the_refusal_reason() {
    let harness = Harness::new();
    harness.audit.fail_appends(true);

    let mut credential = police_credential();
    credential.api_key = "emergency-api-key-000".into();
    let response = harness
        .service
        .request_emergency_access(&credential, &request("user-123"));
    assert!(!response.success);
    let error = response.error.unwrap();
    assert!(error.contains("internal error"));
    assert!(!error.contains("authentication failed"));
}

#[test]
fn repeated_requests_create_distinct_records() {
    let harness = Harness::new();
    harness.allow_user("user-123");
    harness.share_location("user-123", 40.7128, -74.0060, Precision::Exact);

    let first = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    let second = harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    assert!(first.success && second.success);
    assert_ne!(
        first.data.unwrap().access_log.id,
        second.data.unwrap().access_log.id
    );

    assert_eq!(harness.audit.entries().len(), 2);
    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(harness.ledger.record_count(&subject), 2);
}

#[test]
fn audit_trail_filters_by_service_and_type() {
    let harness = Harness::new();
    harness.allow_user("user-123");
    harness.share_location("user-123", 40.7128, -74.0060, Precision::Exact);

    harness
        .service
        .request_emergency_access(&police_credential(), &request("user-123"));
    let fire = EmergencyServiceCredential {
        service_id: "FIRE_DEPT_001".into(),
        api_key: "emergency-api-key-123".into(),
        operator_id: "op-2".into(),
        jurisdiction: "NYC".into(),
        emergency_type: EmergencyType::Fire,
    };
    harness
        .service
        .request_emergency_access(&fire, &request("user-123"));

    let all = harness
        .service
        .get_emergency_access_audit_trail("user-123", None);
    assert!(all.success);
    assert_eq!(all.data.unwrap().logs.len(), 2);

    let police_only = harness.service.get_emergency_access_audit_trail(
        "user-123",
        Some(safetrail_core::AuditTrailFilter {
            service_id: Some("POLICE_001".into()),
            ..Default::default()
        }),
    );
    assert_eq!(police_only.data.unwrap().logs.len(), 1);

    let fire_only = harness.service.get_emergency_access_audit_trail(
        "user-123",
        Some(safetrail_core::AuditTrailFilter {
            emergency_type: Some(EmergencyType::Fire),
            ..Default::default()
        }),
    );
    let logs = fire_only.data.unwrap().logs;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].service_id, "FIRE_DEPT_001");
}

#[test]
fn audit_trail_rejects_blank_user_and_inverted_ranges() {
    let harness = Harness::new();

    let blank = harness.service.get_emergency_access_audit_trail("  ", None);
    assert!(!blank.success);
    assert!(blank.error.unwrap().contains("userId"));

    let inverted = harness.service.get_emergency_access_audit_trail(
        "user-123",
        Some(safetrail_core::AuditTrailFilter {
            start_date: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }),
    );
    assert!(!inverted.success);
}

fn storage() -> (Arc<InMemoryLedger>, LocationHashStorage) {
    let ledger = Arc::new(InMemoryLedger::new("testnet"));
    let client = Arc::new(LedgerClient::connect(ledger.clone(), fast_config()));
    (ledger, LocationHashStorage::new(client))
}

fn access_event() -> LocationAccessEvent {
    LocationAccessEvent {
        user_id: "user-123".into(),
        service_id: "POLICE_001".into(),
        operator_id: "op-7".into(),
        incident_id: "INC-001".into(),
        location_data: LocationData::new(40.7128, -74.0060, Precision::Exact).unwrap(),
        timestamp: Utc.with_ymd_and_hms(2023, 12, 1, 10, 0, 0).unwrap(),
        access_granted: true,
    }
}

#[test]
fn storing_an_event_returns_a_record_handle() {
    let (ledger, storage) = storage();
    let outcome = storage.store_location_access_hash(&access_event());
    assert!(outcome.success);
    assert!(outcome.record_id.unwrap().starts_with("0x"));
    assert_eq!(outcome.sequence_number, Some(1));

    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(ledger.record_count(&subject), 1);
}

#[test]
fn invalid_coordinates_never_reach_the_ledger() {
    let (ledger, storage) = storage();
    let mut event = access_event();
    event.location_data.lat = 91.0;
    let outcome = storage.store_location_access_hash(&event);
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("lat"));

    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(ledger.record_count(&subject), 0);
}

fn batch(n: usize) -> BatchLocationAccessEvent {
    let template = access_event();
    BatchLocationAccessEvent {
        user_id: template.user_id.clone(),
        service_id: template.service_id.clone(),
        operator_id: template.operator_id.clone(),
        access_logs: (0..n)
            .map(|i| BatchAccessItem {
                incident_id: format!("INC-{i:03}"),
                location_data: template.location_data,
                timestamp: template.timestamp + chrono::Duration::seconds(i as i64),
                access_granted: true,
            })
            .collect(),
    }
}

#[test]
fn batch_of_three_lands_in_one_transaction() {
    let (ledger, storage) = storage();
    let outcome = storage.batch_store_location_access_hashes(&batch(3));
    assert!(outcome.success);
    assert_eq!(outcome.sequence_number, Some(1));

    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(ledger.record_count(&subject), 3);
}

#[test]
fn oversized_batch_is_rejected_with_the_limit() {
    let (ledger, storage) = storage();
    let outcome = storage.batch_store_location_access_hashes(&batch(51));
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("50"));

    let subject = derive_address(&UserId::parse("user-123").unwrap());
    assert_eq!(ledger.record_count(&subject), 0);
}

#[test]
fn verification_matches_only_the_stored_instant() {
    let (_ledger, storage) = storage();
    let event = access_event();
    assert!(storage.store_location_access_hash(&event).success);

    let reader = SignerIdentity::from_seed("safetrail-dev-signer").unwrap();
    let verified = storage.verify_location_access(
        "user-123",
        &event.location_data,
        event.timestamp,
        reader.address(),
    );
    assert!(verified.success);
    assert!(verified.verified);

    let off_by_one = storage.verify_location_access(
        "user-123",
        &event.location_data,
        event.timestamp + chrono::Duration::seconds(1),
        reader.address(),
    );
    assert!(off_by_one.success);
    assert!(!off_by_one.verified);
}

#[test]
fn ledger_trail_pages_default_to_fifty() {
    let (_ledger, storage) = storage();
    assert!(storage.batch_store_location_access_hashes(&batch(50)).success);
    assert!(storage.batch_store_location_access_hashes(&batch(10)).success);

    let first_page = storage.get_location_access_audit_trail("user-123", None, None);
    assert!(first_page.success);
    assert_eq!(first_page.logs.len(), 50);

    let second_page = storage.get_location_access_audit_trail("user-123", Some(50), None);
    assert_eq!(second_page.logs.len(), 10);
    assert_eq!(second_page.logs[0].incident_id.as_ref(), "INC-000");
}

#[test]
fn unreachable_ledger_fails_storage_calls_with_unavailability() {
    let ledger = Arc::new(InMemoryLedger::unreachable());
    let client = Arc::new(LedgerClient::connect(ledger, fast_config()));
    let storage = LocationHashStorage::new(client);

    let outcome = storage.store_location_access_hash(&access_event());
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("unavailable"));

    let status = storage.connection_status();
    assert!(!status.connected);
    assert!(status.error.is_some());
}

#[test]
fn authorized_reader_check_consults_the_registry() {
    let (ledger, storage) = storage();
    let reader = SignerIdentity::from_seed("reader-seed-material").unwrap();

    let before = storage.is_authorized_reader(reader.address());
    assert!(before.success);
    assert!(!before.authorized);

    ledger.authorize_reader(reader.address());
    let after = storage.is_authorized_reader(reader.address());
    assert!(after.authorized);
}
