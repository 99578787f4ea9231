//! The emergency-access orchestrator.
//!
//! Per-request walk, synchronous and not persisted:
//! validate → authenticate → policy check → location lookup → local audit
//! write → best-effort ledger write → respond. Every attempt, granted or
//! denied, produces exactly one audit entry; a request that cannot be
//! audited fails instead of proceeding silently. Repeating an identical
//! request creates a new audit entry and a new ledger record each time;
//! repeats are independently auditable, never deduplicated.

use std::sync::Arc;

use safetrail_canonical::{
    compute_fingerprint, derive_address, IncidentId, LocationData, UserId,
};
use safetrail_core::{
    AccessAttempt, AccessError, ApiKeyRegistry, AuditLogEntry, AuditTrailFilter,
    EmergencyAccessRequest, EmergencyServiceCredential, EmergencyType, ServiceRegistry,
};
use safetrail_ledger::{LedgerClient, WriteReceipt};
use serde::{Deserialize, Serialize};

use crate::response::ServiceResponse;
use crate::stores::{AuditLogStore, LocationShareStore, PrivacyPolicyStore};

/// Authenticated identity of an emergency service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyServiceInfo {
    /// Registered service identifier.
    pub service_id: String,
    /// Jurisdiction the service operates in.
    pub jurisdiction: String,
    /// Kind of emergency service.
    pub emergency_type: EmergencyType,
    /// Always true in a successful response.
    pub authenticated: bool,
}

/// Result of a granted emergency-access request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAccessResult {
    /// Whether access was granted. Always true in a successful response;
    /// refusals surface as failed envelopes.
    pub access_granted: bool,
    /// The user's location at the share's declared precision.
    pub location: LocationData,
    /// The audit entry recording this access.
    pub access_log: AuditLogEntry,
    /// Present when the best-effort ledger write failed after access was
    /// already granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Audit-trail payload for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    /// Matching entries, oldest first.
    pub logs: Vec<AuditLogEntry>,
}

/// Orchestrates emergency-service access to user locations.
///
/// All collaborators are constructor-injected so tests can substitute
/// fakes without touching process-wide state.
pub struct EmergencyAccessService {
    services: Arc<dyn ServiceRegistry>,
    api_keys: Arc<dyn ApiKeyRegistry>,
    privacy: Arc<dyn PrivacyPolicyStore>,
    shares: Arc<dyn LocationShareStore>,
    audit: Arc<dyn AuditLogStore>,
    ledger: Arc<LedgerClient>,
}

impl EmergencyAccessService {
    /// Creates the orchestrator over its collaborators.
    pub fn new(
        services: Arc<dyn ServiceRegistry>,
        api_keys: Arc<dyn ApiKeyRegistry>,
        privacy: Arc<dyn PrivacyPolicyStore>,
        shares: Arc<dyn LocationShareStore>,
        audit: Arc<dyn AuditLogStore>,
        ledger: Arc<LedgerClient>,
    ) -> Self {
        Self {
            services,
            api_keys,
            privacy,
            shares,
            audit,
            ledger,
        }
    }

    /// Authenticates emergency-service credentials against the registries.
    pub fn authenticate_emergency_service(
        &self,
        credential: &EmergencyServiceCredential,
    ) -> ServiceResponse<EmergencyServiceInfo> {
        match self.authenticate(credential) {
            Ok(info) => ServiceResponse::ok(info),
            Err(err) => ServiceResponse::failure(err.to_string()),
        }
    }

    fn authenticate(
        &self,
        credential: &EmergencyServiceCredential,
    ) -> Result<EmergencyServiceInfo, AccessError> {
        credential.validate()?;
        if !self.api_keys.contains(&credential.api_key) {
            return Err(AccessError::InvalidCredential);
        }
        let record = self
            .services
            .lookup(&credential.service_id)
            .ok_or(AccessError::InvalidCredential)?;
        // A jurisdiction or type mismatch gets the same error as an
        // unknown service: distinct messages would let a caller probe
        // which service IDs exist.
        if record.jurisdiction != credential.jurisdiction
            || record.emergency_type != credential.emergency_type
        {
            return Err(AccessError::InvalidCredential);
        }
        Ok(EmergencyServiceInfo {
            service_id: credential.service_id.clone(),
            jurisdiction: credential.jurisdiction.clone(),
            emergency_type: credential.emergency_type,
            authenticated: true,
        })
    }

    /// Processes an emergency-access request end to end.
    ///
    /// Malformed inputs are rejected before any audit write. Every other
    /// refusal writes a denied audit entry first; the granted path writes
    /// its entry synchronously and only then attempts the ledger write,
    /// whose failure downgrades to a warning because access has already
    /// been safety-critically granted.
    pub fn request_emergency_access(
        &self,
        credential: &EmergencyServiceCredential,
        request: &EmergencyAccessRequest,
    ) -> ServiceResponse<EmergencyAccessResult> {
        if credential.validate().is_err() || request.validate().is_err() {
            return ServiceResponse::failure("invalid request parameters");
        }

        if self.authenticate(credential).is_err() {
            return self.deny(credential, request, AccessError::AuthenticationFailed);
        }

        let allowed = match self.privacy.settings(&request.user_id) {
            Ok(settings) => settings.map(|s| s.allow_emergency_access).unwrap_or(false),
            Err(err) => {
                return self.deny(credential, request, AccessError::Internal(err.to_string()))
            }
        };
        if !allowed {
            return self.deny(credential, request, AccessError::AccessDenied);
        }

        let shares = match self.shares.active_shares(&request.user_id) {
            Ok(shares) => shares,
            Err(err) => {
                return self.deny(credential, request, AccessError::Internal(err.to_string()))
            }
        };
        let latest = match shares.into_iter().max_by_key(|share| share.created_at) {
            Some(share) => share,
            None => return self.deny(credential, request, AccessError::NoLocationData),
        };
        // The share's declared precision travels with the location; the
        // response never upgrades beyond it.
        let location = latest.location;

        // System of record: this write must succeed or the whole request
        // fails, even though access was otherwise grantable.
        let access_log = match self.record_attempt(credential, request, true) {
            Ok(entry) => entry,
            Err(err) => return ServiceResponse::failure(err.to_string()),
        };

        let warning = match self.record_on_ledger(request, &location, &access_log) {
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(
                    incident_id = %request.incident_id,
                    error = %err,
                    "ledger write failed after access was granted"
                );
                Some("ledger logging failed but access was granted".to_string())
            }
        };

        ServiceResponse::ok(EmergencyAccessResult {
            access_granted: true,
            location,
            access_log,
            warning,
        })
    }

    /// Returns a user's emergency-access audit trail, optionally filtered
    /// by date range, emergency type, or service.
    pub fn get_emergency_access_audit_trail(
        &self,
        user_id: &str,
        filter: Option<AuditTrailFilter>,
    ) -> ServiceResponse<AuditTrail> {
        if user_id.trim().is_empty() {
            return ServiceResponse::failure("userId must not be empty");
        }
        let filter = filter.unwrap_or_default();
        if let Err(err) = filter.validate() {
            return ServiceResponse::failure(err.to_string());
        }
        match self.audit.query(user_id, &filter) {
            Ok(logs) => ServiceResponse::ok(AuditTrail { logs }),
            Err(err) => {
                tracing::error!(error = %err, "audit trail query failed");
                ServiceResponse::failure("failed to retrieve audit trail")
            }
        }
    }

    fn deny(
        &self,
        credential: &EmergencyServiceCredential,
        request: &EmergencyAccessRequest,
        reason: AccessError,
    ) -> ServiceResponse<EmergencyAccessResult> {
        match self.record_attempt(credential, request, false) {
            Ok(_) => ServiceResponse::failure(reason.to_string()),
            // If the refusal itself cannot be audited, the audit failure
            // wins: proceeding silently is worse than masking the reason.
            Err(err) => ServiceResponse::failure(err.to_string()),
        }
    }

    fn record_attempt(
        &self,
        credential: &EmergencyServiceCredential,
        request: &EmergencyAccessRequest,
        access_granted: bool,
    ) -> Result<AuditLogEntry, AccessError> {
        let attempt = AccessAttempt {
            user_id: request.user_id.clone(),
            service_id: credential.service_id.clone(),
            operator_id: credential.operator_id.clone(),
            incident_id: request.incident_id.clone(),
            emergency_type: credential.emergency_type,
            jurisdiction: credential.jurisdiction.clone(),
            access_granted,
            request_reason: request.request_reason.clone(),
        };
        self.audit.append(&attempt).map_err(|err| {
            tracing::error!(error = %err, "audit store write failed");
            AccessError::Internal(format!("audit log write failed: {err}"))
        })
    }

    fn record_on_ledger(
        &self,
        request: &EmergencyAccessRequest,
        location: &LocationData,
        access_log: &AuditLogEntry,
    ) -> Result<WriteReceipt, Box<dyn std::error::Error>> {
        let user_id = UserId::parse(request.user_id.clone())?;
        let incident_id = IncidentId::parse(request.incident_id.clone())?;
        let fingerprint = compute_fingerprint(location, access_log.created_at)?;
        let subject = derive_address(&user_id);
        Ok(self.ledger.write_single(&subject, fingerprint, incident_id)?)
    }
}
