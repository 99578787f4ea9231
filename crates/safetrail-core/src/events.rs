use chrono::{DateTime, Utc};
use safetrail_canonical::{ApiKey, LocationData, ValidationError};
use serde::{Deserialize, Serialize};

/// Kind of emergency service requesting access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyType {
    /// Fire department.
    Fire,
    /// Police department.
    Police,
    /// Medical responders.
    Medical,
    /// Search and rescue.
    Rescue,
}

impl std::fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fire => write!(f, "FIRE"),
            Self::Police => write!(f, "POLICE"),
            Self::Medical => write!(f, "MEDICAL"),
            Self::Rescue => write!(f, "RESCUE"),
        }
    }
}

/// Priority declared by the requesting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Routine follow-up.
    Low,
    /// Elevated but not time-critical.
    Medium,
    /// Time-critical.
    High,
    /// Life-threatening.
    Critical,
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// A single location-access event submitted for ledger recording.
///
/// Transient: validated at the subsystem boundary, fingerprinted, and
/// discarded. The raw coordinates never leave the caller's own records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAccessEvent {
    /// User whose location was accessed.
    pub user_id: String,
    /// Emergency service that accessed it.
    pub service_id: String,
    /// Operator acting for the service.
    pub operator_id: String,
    /// Incident the access belongs to.
    pub incident_id: String,
    /// Coordinates and disclosure precision.
    pub location_data: LocationData,
    /// When the access happened.
    pub timestamp: DateTime<Utc>,
    /// Whether access was granted.
    pub access_granted: bool,
}

impl LocationAccessEvent {
    /// Validates the event shape before any I/O.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("userId", &self.user_id)?;
        non_empty("serviceId", &self.service_id)?;
        non_empty("operatorId", &self.operator_id)?;
        non_empty("incidentId", &self.incident_id)?;
        self.location_data.validate()?;
        Ok(())
    }
}

/// One entry inside a batched submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAccessItem {
    /// Incident the access belongs to.
    pub incident_id: String,
    /// Coordinates and disclosure precision.
    pub location_data: LocationData,
    /// When the access happened.
    pub timestamp: DateTime<Utc>,
    /// Whether access was granted.
    pub access_granted: bool,
}

/// A batch of pre-collected access events recorded in one ledger
/// transaction to amortize per-write overhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchLocationAccessEvent {
    /// User whose location was accessed.
    pub user_id: String,
    /// Emergency service that accessed it.
    pub service_id: String,
    /// Operator acting for the service.
    pub operator_id: String,
    /// Ordered access entries; order is preserved in the ledger.
    pub access_logs: Vec<BatchAccessItem>,
}

impl BatchLocationAccessEvent {
    /// Validates the batch shape against the configured size limit.
    pub fn validate(&self, max_batch: usize) -> Result<(), ValidationError> {
        non_empty("userId", &self.user_id)?;
        non_empty("serviceId", &self.service_id)?;
        non_empty("operatorId", &self.operator_id)?;
        let len = self.access_logs.len();
        if len < 1 || len > max_batch {
            return Err(ValidationError::BatchSize {
                len,
                min: 1,
                max: max_batch,
            });
        }
        for item in &self.access_logs {
            non_empty("incidentId", &item.incident_id)?;
            item.location_data.validate()?;
        }
        Ok(())
    }
}

/// Credentials presented by an emergency service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyServiceCredential {
    /// Registered service identifier.
    pub service_id: String,
    /// API key on the allow-list.
    pub api_key: String,
    /// Operator acting for the service.
    pub operator_id: String,
    /// Jurisdiction the service claims to operate in.
    pub jurisdiction: String,
    /// Kind of emergency service.
    pub emergency_type: EmergencyType,
}

impl EmergencyServiceCredential {
    /// Validates the credential shape. Membership and registry checks are
    /// the orchestrator's job; this only rejects malformed input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("serviceId", &self.service_id)?;
        non_empty("operatorId", &self.operator_id)?;
        non_empty("jurisdiction", &self.jurisdiction)?;
        ApiKey::parse(self.api_key.clone())?;
        Ok(())
    }
}

/// A request for emergency access to a user's location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAccessRequest {
    /// User whose location is requested.
    pub user_id: String,
    /// Why access is requested.
    pub request_reason: String,
    /// Incident the request belongs to.
    pub incident_id: String,
    /// Declared priority.
    pub priority: Priority,
}

impl EmergencyAccessRequest {
    /// Validates the request shape before any I/O.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("userId", &self.user_id)?;
        non_empty("requestReason", &self.request_reason)?;
        non_empty("incidentId", &self.incident_id)?;
        Ok(())
    }
}

/// Draft of an audit entry, before the store assigns an id and timestamp.
///
/// One attempt, success or failure, becomes exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessAttempt {
    /// User whose location was requested.
    pub user_id: String,
    /// Requesting service.
    pub service_id: String,
    /// Operator acting for the service.
    pub operator_id: String,
    /// Incident the attempt belongs to.
    pub incident_id: String,
    /// Kind of emergency service.
    pub emergency_type: EmergencyType,
    /// Jurisdiction the service claimed.
    pub jurisdiction: String,
    /// Whether access was granted.
    pub access_granted: bool,
    /// Reason given in the request.
    pub request_reason: String,
}

/// Persisted audit entry: one row per access attempt, created once and
/// never mutated. This is the system of record for the audit surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Store-assigned identifier.
    pub id: u64,
    /// User whose location was requested.
    pub user_id: String,
    /// Requesting service.
    pub service_id: String,
    /// Operator acting for the service.
    pub operator_id: String,
    /// Incident the attempt belongs to.
    pub incident_id: String,
    /// Kind of emergency service.
    pub emergency_type: EmergencyType,
    /// Jurisdiction the service claimed.
    pub jurisdiction: String,
    /// Whether access was granted.
    pub access_granted: bool,
    /// Reason given in the request.
    pub request_reason: String,
    /// When the entry was created. Serialized as `timestamp`, the name
    /// audit-trail consumers already read.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Filter for querying the local audit trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrailFilter {
    /// Include entries created at or after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// Include entries created at or before this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Restrict to one emergency type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<EmergencyType>,
    /// Restrict to one service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

impl AuditTrailFilter {
    /// Rejects filters whose date bounds are reversed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ValidationError::InvertedDateRange);
            }
        }
        Ok(())
    }

    /// Returns true if the entry matches every populated criterion.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if let Some(start) = self.start_date {
            if entry.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if entry.created_at > end {
                return false;
            }
        }
        if let Some(kind) = self.emergency_type {
            if entry.emergency_type != kind {
                return false;
            }
        }
        if let Some(ref service_id) = self.service_id {
            if &entry.service_id != service_id {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use safetrail_canonical::Precision;

    fn event() -> LocationAccessEvent {
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

    fn item() -> BatchAccessItem {
        let e = event();
        BatchAccessItem {
            incident_id: e.incident_id,
            location_data: e.location_data,
            timestamp: e.timestamp,
            access_granted: e.access_granted,
        }
    }

    #[test]
    fn valid_event_passes() {
        assert!(event().validate().is_ok());
    }

    #[test]
    fn empty_fields_are_rejected() {
        let mutations: [fn(&mut LocationAccessEvent); 4] = [
            |e| e.user_id.clear(),
            |e| e.service_id.clear(),
            |e| e.operator_id.clear(),
            |e| e.incident_id = "   ".into(),
        ];
        for mutate in mutations {
            let mut e = event();
            mutate(&mut e);
            assert!(e.validate().is_err());
        }
    }

    #[test]
    fn batch_bounds_are_enforced() {
        let batch = |n: usize| BatchLocationAccessEvent {
            user_id: "user-123".into(),
            service_id: "POLICE_001".into(),
            operator_id: "op-7".into(),
            access_logs: std::iter::repeat_with(item).take(n).collect(),
        };
        assert!(batch(0).validate(50).is_err());
        assert!(batch(1).validate(50).is_ok());
        assert!(batch(50).validate(50).is_ok());
        assert!(batch(51).validate(50).is_err());

        let err = batch(51).validate(50).unwrap_err();
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn short_api_keys_are_rejected() {
        let credential = EmergencyServiceCredential {
            service_id: "POLICE_001".into(),
            api_key: "short".into(),
            operator_id: "op-7".into(),
            jurisdiction: "NYC".into(),
            emergency_type: EmergencyType::Police,
        };
        assert!(credential.validate().is_err());
    }

    #[test]
    fn filter_rejects_inverted_date_range() {
        let filter = AuditTrailFilter {
            start_date: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn audit_entries_serialize_their_instant_as_timestamp() {
        let entry = AuditLogEntry {
            id: 1,
            user_id: "user-123".into(),
            service_id: "POLICE_001".into(),
            operator_id: "op-7".into(),
            incident_id: "INC-001".into(),
            emergency_type: EmergencyType::Police,
            jurisdiction: "NYC".into(),
            access_granted: true,
            request_reason: "missing person".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("timestamp").is_some());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn filter_matches_by_type_and_service() {
        let entry = AuditLogEntry {
            id: 1,
            user_id: "user-123".into(),
            service_id: "POLICE_001".into(),
            operator_id: "op-7".into(),
            incident_id: "INC-001".into(),
            emergency_type: EmergencyType::Police,
            jurisdiction: "NYC".into(),
            access_granted: true,
            request_reason: "missing person".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        };

        let mut filter = AuditTrailFilter {
            emergency_type: Some(EmergencyType::Police),
            ..Default::default()
        };
        assert!(filter.matches(&entry));

        filter.emergency_type = Some(EmergencyType::Fire);
        assert!(!filter.matches(&entry));

        let by_service = AuditTrailFilter {
            service_id: Some("FIRE_DEPT_001".into()),
            ..Default::default()
        };
        assert!(!by_service.matches(&entry));
    }
}
