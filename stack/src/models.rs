// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bundle::CertificateBundle;
use crate::configuration::StackOptions;
use crate::constants::{
    CERTIFICATE_BUNDLE_SOURCE_TYPE, POLICY_ATTACHMENT_LOGICAL_NAME, PROFILE_LOGICAL_NAME,
    ROLE_LOGICAL_NAME, TRUST_ANCHOR_LOGICAL_NAME, TRUST_POLICY,
};
use crate::errors::StackError;

/// Desired state of the certificate-bundle trust anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustAnchorSpec {
    pub logical_name: String,
    pub name: String,
    pub enabled: bool,
    pub source_type: String,
    /// Root PEM bundle immediately followed by the intermediate PEM bundle.
    #[serde(skip_serializing)]
    pub certificate_data: String,
}

/// Desired state of the IAM role assumed through Roles Anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSpec {
    pub logical_name: String,
    pub name: String,
    pub max_session_duration: i32,
    pub assume_role_policy: String,
}

impl RoleSpec {
    /// The trust policy as JSON, for structural comparison with live state.
    pub fn policy_document(&self) -> Result<Value, StackError> {
        Ok(serde_json::from_str(&self.assume_role_policy)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyAttachmentSpec {
    pub logical_name: String,
    pub role_name: String,
    pub policy_arn: String,
}

/// Desired state of the profile. Its role list is the ARN of [`RoleSpec`],
/// which is only known once the role exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSpec {
    pub logical_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackDefinition {
    pub trust_anchor: TrustAnchorSpec,
    pub role: RoleSpec,
    pub policy_attachment: PolicyAttachmentSpec,
    pub profile: ProfileSpec,
}

impl StackDefinition {
    pub fn new(options: &StackOptions, bundle: &CertificateBundle) -> Self {
        Self {
            trust_anchor: TrustAnchorSpec {
                logical_name: TRUST_ANCHOR_LOGICAL_NAME.to_string(),
                name: options.trust_anchor_name.clone(),
                enabled: true,
                source_type: CERTIFICATE_BUNDLE_SOURCE_TYPE.to_string(),
                certificate_data: bundle.data(),
            },
            role: RoleSpec {
                logical_name: ROLE_LOGICAL_NAME.to_string(),
                name: options.role_name.clone(),
                max_session_duration: options.max_session_duration,
                assume_role_policy: TRUST_POLICY.to_string(),
            },
            policy_attachment: PolicyAttachmentSpec {
                logical_name: POLICY_ATTACHMENT_LOGICAL_NAME.to_string(),
                role_name: options.role_name.clone(),
                policy_arn: options.policy_arn.clone(),
            },
            profile: ProfileSpec {
                logical_name: PROFILE_LOGICAL_NAME.to_string(),
                name: options.profile_name.clone(),
                enabled: None,
            },
        }
    }

    pub fn names(&self) -> ResourceNames {
        ResourceNames {
            trust_anchor: self.trust_anchor.name.clone(),
            role: self.role.name.clone(),
            policy_arn: self.policy_attachment.policy_arn.clone(),
            profile: self.profile.name.clone(),
        }
    }
}

/// Physical names of the stack's resources, enough to tear it down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub trust_anchor: String,
    pub role: String,
    pub policy_arn: String,
    pub profile: String,
}

impl From<&StackOptions> for ResourceNames {
    fn from(options: &StackOptions) -> Self {
        Self {
            trust_anchor: options.trust_anchor_name.clone(),
            role: options.role_name.clone(),
            policy_arn: options.policy_arn.clone(),
            profile: options.profile_name.clone(),
        }
    }
}

/// A trust anchor as reported by IAM Roles Anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchorState {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub enabled: bool,
    pub certificate_data: Option<String>,
}

/// A role as reported by IAM, with its trust policy already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleState {
    pub name: String,
    pub arn: String,
    pub max_session_duration: Option<i32>,
    pub assume_role_policy: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileState {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub role_arns: Vec<String>,
    pub enabled: Option<bool>,
}

/// Values exported once the stack is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackOutputs {
    pub trust_anchor_id: String,
    pub trust_anchor_arn: String,
    pub role_arn: String,
    pub profile_arn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceKind {
    #[serde(rename = "aws:rolesanywhere:TrustAnchor")]
    TrustAnchor,
    #[serde(rename = "aws:iam:Role")]
    Role,
    #[serde(rename = "aws:iam:RolePolicyAttachment")]
    PolicyAttachment,
    #[serde(rename = "aws:rolesanywhere:Profile")]
    Profile,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::TrustAnchor => "aws:rolesanywhere:TrustAnchor",
            Self::Role => "aws:iam:Role",
            Self::PolicyAttachment => "aws:iam:RolePolicyAttachment",
            Self::Profile => "aws:rolesanywhere:Profile",
        };
        f.write_str(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Unchanged,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub kind: ResourceKind,
    pub logical_name: String,
    pub action: Action,
}

impl Change {
    pub fn new(kind: ResourceKind, logical_name: impl Into<String>, action: Action) -> Self {
        Self {
            kind,
            logical_name: logical_name.into(),
            action,
        }
    }
}

/// Result of a successful `up`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub changes: Vec<Change>,
    pub outputs: StackOutputs,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn definition() -> StackDefinition {
        let bundle = CertificateBundle::new("ROOT\n", "INTERMEDIATE\n");
        StackDefinition::new(&StackOptions::default(), &bundle)
    }

    // ==================== Definition Tests ====================

    #[test]
    fn test_definition_uses_concatenated_bundle() {
        let definition = definition();
        assert_eq!(
            definition.trust_anchor.certificate_data,
            "ROOT\nINTERMEDIATE\n"
        );
        assert_eq!(definition.trust_anchor.source_type, "CERTIFICATE_BUNDLE");
        assert!(definition.trust_anchor.enabled);
    }

    #[test]
    fn test_definition_literal_values() {
        let definition = definition();
        assert_eq!(definition.trust_anchor.name, "Mac Mini CA TA");
        assert_eq!(definition.role.name, "DEMO_S3_READ_ONLY");
        assert_eq!(definition.role.max_session_duration, 43_200);
        assert_eq!(definition.policy_attachment.role_name, "DEMO_S3_READ_ONLY");
        assert_eq!(
            definition.policy_attachment.policy_arn,
            "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess"
        );
        assert_eq!(definition.profile.name, "Mac Mini CA Profile");
        assert_eq!(definition.profile.enabled, None);
    }

    #[test]
    fn test_role_policy_document_parses() {
        let document = definition().role.policy_document().unwrap();
        assert_eq!(
            document["Statement"][0]["Principal"]["Service"],
            "rolesanywhere.amazonaws.com"
        );
    }

    #[test]
    fn test_names_match_options() {
        let names = definition().names();
        assert_eq!(names, ResourceNames::from(&StackOptions::default()));
    }

    #[test]
    fn test_definition_serialization_omits_certificate_data() {
        let json = serde_json::to_value(definition()).unwrap();
        assert!(json["trust_anchor"].get("certificate_data").is_none());
        assert_eq!(json["role"]["logical_name"], "DEMO_S3_READ_ONLY");
    }

    // ==================== Output Tests ====================

    #[test]
    fn test_outputs_use_exported_keys() {
        let outputs = StackOutputs {
            trust_anchor_id: "ta-1".to_string(),
            trust_anchor_arn: "arn:ta".to_string(),
            role_arn: "arn:role".to_string(),
            profile_arn: "arn:profile".to_string(),
        };
        let json = serde_json::to_value(&outputs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "trustAnchorId": "ta-1",
                "trustAnchorArn": "arn:ta",
                "roleArn": "arn:role",
                "profileArn": "arn:profile"
            })
        );
    }

    #[test]
    fn test_change_serialization() {
        let change = Change::new(ResourceKind::Role, "DEMO_S3_READ_ONLY", Action::Create);
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "aws:iam:Role");
        assert_eq!(json["action"], "create");
    }

    #[test]
    fn test_resource_kind_display_matches_serialization() {
        for kind in [
            ResourceKind::TrustAnchor,
            ResourceKind::Role,
            ResourceKind::PolicyAttachment,
            ResourceKind::Profile,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }
}
