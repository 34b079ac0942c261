// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! [`CloudProvider`] backed by the AWS SDK for Rust.
//!
//! Trust anchors and profiles are managed with `aws-sdk-rolesanywhere`, the
//! role and its policy attachment with `aws-sdk-iam`. Both clients share one
//! [`SdkConfig`](aws_config::SdkConfig) loaded from the default provider
//! chain, optionally pinned to a region and a shared-config profile.
//!
//! Roles Anywhere has no "get by name" call, so lookups page through the
//! list operations and match on the resource name.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_iam::types::Role;
use aws_sdk_rolesanywhere::types::{
    ProfileDetail, Source, SourceData, TrustAnchorDetail, TrustAnchorType,
};
use serde_json::Value;

use crate::errors::StackError;
use crate::models::{
    ProfileSpec, ProfileState, RoleSpec, RoleState, TrustAnchorSpec, TrustAnchorState,
};
use crate::provider::CloudProvider;

pub struct AwsProvider {
    iam: aws_sdk_iam::Client,
    rolesanywhere: aws_sdk_rolesanywhere::Client,
}

impl AwsProvider {
    pub async fn new(region: Option<String>, profile: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        tracing::debug!("[stack] loaded AWS config for region {:?}", config.region());

        Self::from_clients(
            aws_sdk_iam::Client::new(&config),
            aws_sdk_rolesanywhere::Client::new(&config),
        )
    }

    /// Wraps already configured clients, e.g. ones pointed at a custom endpoint.
    pub fn from_clients(
        iam: aws_sdk_iam::Client,
        rolesanywhere: aws_sdk_rolesanywhere::Client,
    ) -> Self {
        Self { iam, rolesanywhere }
    }

    async fn set_trust_anchor_enabled(
        &self,
        id: &str,
        enabled: bool,
    ) -> Result<TrustAnchorState, StackError> {
        let detail = if enabled {
            let output = self
                .rolesanywhere
                .enable_trust_anchor()
                .trust_anchor_id(id)
                .send()
                .await
                .map_err(|e| StackError::aws("EnableTrustAnchor", e))?;
            output.trust_anchor().cloned()
        } else {
            let output = self
                .rolesanywhere
                .disable_trust_anchor()
                .trust_anchor_id(id)
                .send()
                .await
                .map_err(|e| StackError::aws("DisableTrustAnchor", e))?;
            output.trust_anchor().cloned()
        };

        let detail = detail.ok_or_else(|| StackError::missing("EnableTrustAnchor", "trustAnchor"))?;
        trust_anchor_state(&detail, "EnableTrustAnchor")
    }

    async fn set_profile_enabled(
        &self,
        id: &str,
        enabled: bool,
    ) -> Result<ProfileState, StackError> {
        let detail = if enabled {
            let output = self
                .rolesanywhere
                .enable_profile()
                .profile_id(id)
                .send()
                .await
                .map_err(|e| StackError::aws("EnableProfile", e))?;
            output.profile().cloned()
        } else {
            let output = self
                .rolesanywhere
                .disable_profile()
                .profile_id(id)
                .send()
                .await
                .map_err(|e| StackError::aws("DisableProfile", e))?;
            output.profile().cloned()
        };

        let detail = detail.ok_or_else(|| StackError::missing("EnableProfile", "profile"))?;
        profile_state(&detail, "EnableProfile")
    }
}

#[async_trait]
impl CloudProvider for AwsProvider {
    #[tracing::instrument(skip(self))]
    async fn find_trust_anchor(&self, name: &str) -> Result<Option<TrustAnchorState>, StackError> {
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .rolesanywhere
                .list_trust_anchors()
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| StackError::aws("ListTrustAnchors", e))?;

            if let Some(detail) = output
                .trust_anchors()
                .iter()
                .find(|detail| detail.name() == Some(name))
            {
                return trust_anchor_state(detail, "ListTrustAnchors").map(Some);
            }

            match output.next_token() {
                // a token equal to the one just sent would page forever
                Some(token) if next_token.as_deref() != Some(token) => {
                    next_token = Some(token.to_string());
                }
                _ => return Ok(None),
            }
        }
    }

    #[tracing::instrument(skip(self, spec), fields(name = %spec.name))]
    async fn create_trust_anchor(
        &self,
        spec: &TrustAnchorSpec,
    ) -> Result<TrustAnchorState, StackError> {
        let output = self
            .rolesanywhere
            .create_trust_anchor()
            .name(&spec.name)
            .enabled(spec.enabled)
            .source(certificate_source(spec))
            .send()
            .await
            .map_err(|e| StackError::aws("CreateTrustAnchor", e))?;

        let detail = output
            .trust_anchor()
            .ok_or_else(|| StackError::missing("CreateTrustAnchor", "trustAnchor"))?;
        trust_anchor_state(detail, "CreateTrustAnchor")
    }

    #[tracing::instrument(skip(self, spec), fields(name = %spec.name))]
    async fn update_trust_anchor(
        &self,
        id: &str,
        spec: &TrustAnchorSpec,
    ) -> Result<TrustAnchorState, StackError> {
        let output = self
            .rolesanywhere
            .update_trust_anchor()
            .trust_anchor_id(id)
            .name(&spec.name)
            .source(certificate_source(spec))
            .send()
            .await
            .map_err(|e| StackError::aws("UpdateTrustAnchor", e))?;

        let detail = output
            .trust_anchor()
            .ok_or_else(|| StackError::missing("UpdateTrustAnchor", "trustAnchor"))?;
        let state = trust_anchor_state(detail, "UpdateTrustAnchor")?;

        if state.enabled == spec.enabled {
            return Ok(state);
        }
        self.set_trust_anchor_enabled(id, spec.enabled).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_trust_anchor(&self, id: &str) -> Result<(), StackError> {
        self.rolesanywhere
            .delete_trust_anchor()
            .trust_anchor_id(id)
            .send()
            .await
            .map_err(|e| StackError::aws("DeleteTrustAnchor", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_role(&self, name: &str) -> Result<Option<RoleState>, StackError> {
        match self.iam.get_role().role_name(name).send().await {
            Ok(output) => {
                let role = output
                    .role()
                    .ok_or_else(|| StackError::missing("GetRole", "role"))?;
                role_state(role, "GetRole").map(Some)
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_entity_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(StackError::aws("GetRole", err)),
        }
    }

    #[tracing::instrument(skip(self, spec), fields(name = %spec.name))]
    async fn create_role(&self, spec: &RoleSpec) -> Result<RoleState, StackError> {
        let output = self
            .iam
            .create_role()
            .role_name(&spec.name)
            .assume_role_policy_document(&spec.assume_role_policy)
            .max_session_duration(spec.max_session_duration)
            .send()
            .await
            .map_err(|e| StackError::aws("CreateRole", e))?;

        let role = output
            .role()
            .ok_or_else(|| StackError::missing("CreateRole", "role"))?;
        role_state(role, "CreateRole")
    }

    #[tracing::instrument(skip(self, spec), fields(name = %spec.name))]
    async fn update_role(&self, spec: &RoleSpec) -> Result<RoleState, StackError> {
        self.iam
            .update_role()
            .role_name(&spec.name)
            .max_session_duration(spec.max_session_duration)
            .send()
            .await
            .map_err(|e| StackError::aws("UpdateRole", e))?;

        self.iam
            .update_assume_role_policy()
            .role_name(&spec.name)
            .policy_document(&spec.assume_role_policy)
            .send()
            .await
            .map_err(|e| StackError::aws("UpdateAssumeRolePolicy", e))?;

        // neither update call returns the role
        self.find_role(&spec.name)
            .await?
            .ok_or_else(|| StackError::missing("GetRole", "role"))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_role(&self, name: &str) -> Result<(), StackError> {
        self.iam
            .delete_role()
            .role_name(name)
            .send()
            .await
            .map_err(|e| StackError::aws("DeleteRole", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_attached_policies(&self, role_name: &str) -> Result<Vec<String>, StackError> {
        let mut policy_arns = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .iam
                .list_attached_role_policies()
                .role_name(role_name)
                .set_marker(marker.clone())
                .send()
                .await
                .map_err(|e| StackError::aws("ListAttachedRolePolicies", e))?;

            policy_arns.extend(
                output
                    .attached_policies()
                    .iter()
                    .filter_map(|policy| policy.policy_arn().map(str::to_string)),
            );

            match output.marker() {
                Some(next) if marker.as_deref() != Some(next) => marker = Some(next.to_string()),
                _ => return Ok(policy_arns),
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), StackError> {
        self.iam
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| StackError::aws("AttachRolePolicy", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn detach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), StackError> {
        self.iam
            .detach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| StackError::aws("DetachRolePolicy", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_profile(&self, name: &str) -> Result<Option<ProfileState>, StackError> {
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .rolesanywhere
                .list_profiles()
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|e| StackError::aws("ListProfiles", e))?;

            if let Some(detail) = output
                .profiles()
                .iter()
                .find(|detail| detail.name() == Some(name))
            {
                return profile_state(detail, "ListProfiles").map(Some);
            }

            match output.next_token() {
                // a token equal to the one just sent would page forever
                Some(token) if next_token.as_deref() != Some(token) => {
                    next_token = Some(token.to_string());
                }
                _ => return Ok(None),
            }
        }
    }

    #[tracing::instrument(skip(self, spec), fields(name = %spec.name))]
    async fn create_profile(
        &self,
        spec: &ProfileSpec,
        role_arns: &[String],
    ) -> Result<ProfileState, StackError> {
        let output = self
            .rolesanywhere
            .create_profile()
            .name(&spec.name)
            .set_role_arns(Some(role_arns.to_vec()))
            .set_enabled(spec.enabled)
            .send()
            .await
            .map_err(|e| StackError::aws("CreateProfile", e))?;

        let detail = output
            .profile()
            .ok_or_else(|| StackError::missing("CreateProfile", "profile"))?;
        profile_state(detail, "CreateProfile")
    }

    #[tracing::instrument(skip(self, spec), fields(name = %spec.name))]
    async fn update_profile(
        &self,
        id: &str,
        spec: &ProfileSpec,
        role_arns: &[String],
    ) -> Result<ProfileState, StackError> {
        let output = self
            .rolesanywhere
            .update_profile()
            .profile_id(id)
            .name(&spec.name)
            .set_role_arns(Some(role_arns.to_vec()))
            .send()
            .await
            .map_err(|e| StackError::aws("UpdateProfile", e))?;

        let detail = output
            .profile()
            .ok_or_else(|| StackError::missing("UpdateProfile", "profile"))?;
        let state = profile_state(detail, "UpdateProfile")?;

        match spec.enabled {
            Some(enabled) if state.enabled != Some(enabled) => {
                self.set_profile_enabled(id, enabled).await
            }
            _ => Ok(state),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn delete_profile(&self, id: &str) -> Result<(), StackError> {
        self.rolesanywhere
            .delete_profile()
            .profile_id(id)
            .send()
            .await
            .map_err(|e| StackError::aws("DeleteProfile", e))?;
        Ok(())
    }
}

fn certificate_source(spec: &TrustAnchorSpec) -> Source {
    Source::builder()
        .source_type(TrustAnchorType::from(spec.source_type.as_str()))
        .source_data(SourceData::X509CertificateData(
            spec.certificate_data.clone(),
        ))
        .build()
}

fn trust_anchor_state(
    detail: &TrustAnchorDetail,
    operation: &'static str,
) -> Result<TrustAnchorState, StackError> {
    let id = detail
        .trust_anchor_id()
        .ok_or_else(|| StackError::missing(operation, "trustAnchorId"))?;
    let arn = detail
        .trust_anchor_arn()
        .ok_or_else(|| StackError::missing(operation, "trustAnchorArn"))?;
    let certificate_data = detail
        .source()
        .and_then(|source| source.source_data())
        .and_then(|data| data.as_x509_certificate_data().ok())
        .cloned();

    Ok(TrustAnchorState {
        id: id.to_string(),
        arn: arn.to_string(),
        name: detail.name().unwrap_or_default().to_string(),
        enabled: detail.enabled().unwrap_or(false),
        certificate_data,
    })
}

fn profile_state(
    detail: &ProfileDetail,
    operation: &'static str,
) -> Result<ProfileState, StackError> {
    let id = detail
        .profile_id()
        .ok_or_else(|| StackError::missing(operation, "profileId"))?;
    let arn = detail
        .profile_arn()
        .ok_or_else(|| StackError::missing(operation, "profileArn"))?;

    Ok(ProfileState {
        id: id.to_string(),
        arn: arn.to_string(),
        name: detail.name().unwrap_or_default().to_string(),
        role_arns: detail.role_arns().to_vec(),
        enabled: detail.enabled(),
    })
}

fn role_state(role: &Role, operation: &'static str) -> Result<RoleState, StackError> {
    let assume_role_policy = role
        .assume_role_policy_document()
        .map(|encoded| decode_policy(encoded, operation))
        .transpose()?;

    Ok(RoleState {
        name: role.role_name().to_string(),
        arn: role.arn().to_string(),
        max_session_duration: role.max_session_duration(),
        assume_role_policy,
    })
}

/// IAM returns policy documents URL-encoded.
fn decode_policy(encoded: &str, operation: &'static str) -> Result<Value, StackError> {
    let malformed = |message: String| StackError::MalformedResponse { operation, message };
    let decoded = urlencoding::decode(encoded)
        .map_err(|err| malformed(format!("undecodable policy document: {err}")))?;
    serde_json::from_str(&decoded).map_err(|err| malformed(format!("policy document: {err}")))
}
