//! Authorization seam for request resolution
//!
//! The minimum contract lets any active official resolve any request.
//! Jurisdictions that want official sign-off scoped to the property's
//! state/district enable [`JurisdictionPolicy`] in config.

use crate::config::PolicyConfig;
use crate::types::{Official, Property};

/// Decides whether an official may resolve requests for a property
pub trait ResolutionPolicy: Send + Sync {
    /// Policy name for logs
    fn name(&self) -> &'static str;

    /// May `official` resolve verification/transfer requests for `property`?
    ///
    /// Only called for *active* officials; the active check is not the
    /// policy's concern.
    fn may_resolve(&self, official: &Official, property: &Property) -> bool;
}

/// Minimum contract: any active official may resolve any request
#[derive(Debug, Default)]
pub struct OpenPolicy;

impl ResolutionPolicy for OpenPolicy {
    fn name(&self) -> &'static str {
        "open"
    }

    fn may_resolve(&self, _official: &Official, _property: &Property) -> bool {
        true
    }
}

/// Stricter policy: the official's jurisdiction must match the property's
#[derive(Debug)]
pub struct JurisdictionPolicy {
    /// Also require the district to match (state always must)
    pub match_district: bool,
}

impl ResolutionPolicy for JurisdictionPolicy {
    fn name(&self) -> &'static str {
        "jurisdiction"
    }

    fn may_resolve(&self, official: &Official, property: &Property) -> bool {
        if official.state != property.state {
            return false;
        }
        !self.match_district || official.district == property.district
    }
}

/// Build the configured policy
pub fn policy_from_config(config: &PolicyConfig) -> Box<dyn ResolutionPolicy> {
    if config.jurisdiction_matching {
        Box::new(JurisdictionPolicy {
            match_district: config.match_district,
        })
    } else {
        Box::new(OpenPolicy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ContentRef, EmployeeId, Identity, PropertyId, PropertyKind,
    };
    use chrono::Utc;

    fn official(state: &str, district: &str) -> Official {
        Official {
            employee_id: EmployeeId::new("EMP-1"),
            identity: Identity::new("0xofficial"),
            name: "Inspector".to_string(),
            department: "Land Records".to_string(),
            state: state.to_string(),
            district: district.to_string(),
            active: true,
            registered_at: Utc::now(),
        }
    }

    fn property(state: &str, district: &str) -> Property {
        Property {
            id: PropertyId(1),
            address: "12 Canal Road".to_string(),
            district: district.to_string(),
            state: state.to_string(),
            area: 1200,
            kind: PropertyKind::Residential,
            survey_number: "SRV-44".to_string(),
            subdivision: "A".to_string(),
            owner: Identity::new("0xowner"),
            document: ContentRef::new("doc://deed"),
            registered: true,
            verified: false,
            transferable: false,
            registered_at: Utc::now(),
            last_transfer_at: None,
            verification_fee_paid: false,
            transfer_history: vec![],
        }
    }

    #[test]
    fn test_open_policy_allows_everything() {
        let policy = OpenPolicy;
        assert!(policy.may_resolve(&official("KA", "North"), &property("MH", "Pune")));
    }

    #[test]
    fn test_jurisdiction_policy_state_and_district() {
        let strict = JurisdictionPolicy { match_district: true };
        assert!(strict.may_resolve(&official("KA", "North"), &property("KA", "North")));
        assert!(!strict.may_resolve(&official("KA", "South"), &property("KA", "North")));
        assert!(!strict.may_resolve(&official("MH", "North"), &property("KA", "North")));
    }

    #[test]
    fn test_jurisdiction_policy_state_wide() {
        let state_wide = JurisdictionPolicy { match_district: false };
        assert!(state_wide.may_resolve(&official("KA", "South"), &property("KA", "North")));
        assert!(!state_wide.may_resolve(&official("MH", "South"), &property("KA", "North")));
    }

    #[test]
    fn test_policy_from_config() {
        let open = policy_from_config(&PolicyConfig {
            jurisdiction_matching: false,
            match_district: true,
        });
        assert_eq!(open.name(), "open");

        let strict = policy_from_config(&PolicyConfig {
            jurisdiction_matching: true,
            match_district: true,
        });
        assert_eq!(strict.name(), "jurisdiction");
    }
}
