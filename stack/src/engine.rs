// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Sequential reconciler for the Roles Anywhere stack.
//!
//! The stack is four resources with a fixed dependency order:
//!
//! ```text
//! TrustAnchor    Role ──> RolePolicyAttachment
//!                  │
//!                  └────> Profile (role ARN)
//! ```
//!
//! [`Stack::up`] walks them in declaration order (trust anchor, role, policy
//! attachment, profile), creating what is missing and updating what drifted.
//! [`destroy`] walks the same list backwards. Every step is awaited before the
//! next one starts and the first error aborts the run; nothing already applied
//! is rolled back.
//!
//! There is no state file. Each resource is found by its physical name, so
//! running `up` twice converges to the same resources.

use serde_json::Value;

use crate::constants::{
    POLICY_ATTACHMENT_LOGICAL_NAME, PROFILE_LOGICAL_NAME, ROLE_LOGICAL_NAME,
    TRUST_ANCHOR_LOGICAL_NAME,
};
use crate::errors::StackError;
use crate::models::{
    Action, Change, Deployment, ProfileSpec, ProfileState, ResourceKind, ResourceNames, RoleSpec,
    RoleState, StackDefinition, StackOutputs, TrustAnchorSpec, TrustAnchorState,
};
use crate::provider::CloudProvider;

pub struct Stack<P> {
    definition: StackDefinition,
    provider: P,
}

impl<P: CloudProvider> Stack<P> {
    pub fn new(definition: StackDefinition, provider: P) -> Self {
        Self {
            definition,
            provider,
        }
    }

    pub fn definition(&self) -> &StackDefinition {
        &self.definition
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Computes what [`Stack::up`] would do, without changing anything.
    #[tracing::instrument(skip(self))]
    pub async fn preview(&self) -> Result<Vec<Change>, StackError> {
        let definition = &self.definition;
        let mut changes = Vec::with_capacity(4);

        let trust_anchor = self
            .provider
            .find_trust_anchor(&definition.trust_anchor.name)
            .await?;
        changes.push(Change::new(
            ResourceKind::TrustAnchor,
            &definition.trust_anchor.logical_name,
            trust_anchor_action(trust_anchor.as_ref(), &definition.trust_anchor),
        ));

        let role = self.provider.find_role(&definition.role.name).await?;
        changes.push(Change::new(
            ResourceKind::Role,
            &definition.role.logical_name,
            role_action(role.as_ref(), &definition.role)?,
        ));

        let attachment = match role {
            Some(_) => {
                let attached = self
                    .provider
                    .list_attached_policies(&definition.policy_attachment.role_name)
                    .await?;
                attachment_action(&attached, &definition.policy_attachment.policy_arn)
            }
            None => Action::Create,
        };
        changes.push(Change::new(
            ResourceKind::PolicyAttachment,
            &definition.policy_attachment.logical_name,
            attachment,
        ));

        let profile = self.provider.find_profile(&definition.profile.name).await?;
        let action = match (&profile, &role) {
            (None, _) => Action::Create,
            // the role will be created with a new ARN
            (Some(_), None) => Action::Update,
            (Some(existing), Some(role)) => {
                profile_action(existing, &definition.profile, &role.arn)
            }
        };
        changes.push(Change::new(
            ResourceKind::Profile,
            &definition.profile.logical_name,
            action,
        ));

        Ok(changes)
    }

    /// Converges all four resources and returns the exported values.
    ///
    /// # Errors
    ///
    /// Returns the first provider error. Resources converged before the
    /// failure stay as they are.
    #[tracing::instrument(skip(self))]
    pub async fn up(&self) -> Result<Deployment, StackError> {
        let definition = &self.definition;
        let mut changes = Vec::with_capacity(4);

        let (trust_anchor, action) = self.ensure_trust_anchor(&definition.trust_anchor).await?;
        changes.push(Change::new(
            ResourceKind::TrustAnchor,
            &definition.trust_anchor.logical_name,
            action,
        ));

        let (role, action) = self.ensure_role(&definition.role).await?;
        changes.push(Change::new(
            ResourceKind::Role,
            &definition.role.logical_name,
            action,
        ));

        let action = self
            .ensure_policy_attachment(&role.name, &definition.policy_attachment.policy_arn)
            .await?;
        changes.push(Change::new(
            ResourceKind::PolicyAttachment,
            &definition.policy_attachment.logical_name,
            action,
        ));

        let (profile, action) = self.ensure_profile(&definition.profile, &role.arn).await?;
        changes.push(Change::new(
            ResourceKind::Profile,
            &definition.profile.logical_name,
            action,
        ));

        let outputs = StackOutputs {
            trust_anchor_id: trust_anchor.id,
            trust_anchor_arn: trust_anchor.arn,
            role_arn: role.arn,
            profile_arn: profile.arn,
        };

        tracing::info!("[stack] up complete: {:?}", outputs);

        Ok(Deployment { changes, outputs })
    }

    async fn ensure_trust_anchor(
        &self,
        spec: &TrustAnchorSpec,
    ) -> Result<(TrustAnchorState, Action), StackError> {
        match self.provider.find_trust_anchor(&spec.name).await? {
            None => {
                tracing::info!("[stack] creating trust anchor {:?}", spec.name);
                let state = self.provider.create_trust_anchor(spec).await?;
                Ok((state, Action::Create))
            }
            Some(existing) => match trust_anchor_action(Some(&existing), spec) {
                Action::Update => {
                    tracing::info!("[stack] updating trust anchor {}", existing.id);
                    let state = self.provider.update_trust_anchor(&existing.id, spec).await?;
                    Ok((state, Action::Update))
                }
                _ => Ok((existing, Action::Unchanged)),
            },
        }
    }

    async fn ensure_role(&self, spec: &RoleSpec) -> Result<(RoleState, Action), StackError> {
        match self.provider.find_role(&spec.name).await? {
            None => {
                tracing::info!("[stack] creating role {:?}", spec.name);
                let state = self.provider.create_role(spec).await?;
                Ok((state, Action::Create))
            }
            Some(existing) => match role_action(Some(&existing), spec)? {
                Action::Update => {
                    tracing::info!("[stack] updating role {:?}", spec.name);
                    let state = self.provider.update_role(spec).await?;
                    Ok((state, Action::Update))
                }
                _ => Ok((existing, Action::Unchanged)),
            },
        }
    }

    async fn ensure_policy_attachment(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<Action, StackError> {
        let attached = self.provider.list_attached_policies(role_name).await?;
        let action = attachment_action(&attached, policy_arn);
        if action == Action::Create {
            tracing::info!("[stack] attaching {} to role {:?}", policy_arn, role_name);
            self.provider.attach_role_policy(role_name, policy_arn).await?;
        }
        Ok(action)
    }

    async fn ensure_profile(
        &self,
        spec: &ProfileSpec,
        role_arn: &str,
    ) -> Result<(ProfileState, Action), StackError> {
        let role_arns = vec![role_arn.to_string()];
        match self.provider.find_profile(&spec.name).await? {
            None => {
                tracing::info!("[stack] creating profile {:?}", spec.name);
                let state = self.provider.create_profile(spec, &role_arns).await?;
                Ok((state, Action::Create))
            }
            Some(existing) => match profile_action(&existing, spec, role_arn) {
                Action::Update => {
                    tracing::info!("[stack] updating profile {}", existing.id);
                    let state = self
                        .provider
                        .update_profile(&existing.id, spec, &role_arns)
                        .await?;
                    Ok((state, Action::Update))
                }
                _ => Ok((existing, Action::Unchanged)),
            },
        }
    }
}

/// Deletes the stack's resources in reverse dependency order.
///
/// Resources that no longer exist are skipped and reported as `unchanged`.
#[tracing::instrument(skip(provider))]
pub async fn destroy<P: CloudProvider>(
    provider: &P,
    names: &ResourceNames,
) -> Result<Vec<Change>, StackError> {
    let mut changes = Vec::with_capacity(4);

    let action = match provider.find_profile(&names.profile).await? {
        Some(profile) => {
            tracing::info!("[stack] deleting profile {}", profile.id);
            provider.delete_profile(&profile.id).await?;
            Action::Delete
        }
        None => Action::Unchanged,
    };
    changes.push(Change::new(ResourceKind::Profile, PROFILE_LOGICAL_NAME, action));

    let role = provider.find_role(&names.role).await?;

    let action = match role {
        Some(_) => {
            let attached = provider.list_attached_policies(&names.role).await?;
            if attached.iter().any(|arn| arn == &names.policy_arn) {
                tracing::info!("[stack] detaching {} from {:?}", names.policy_arn, names.role);
                provider
                    .detach_role_policy(&names.role, &names.policy_arn)
                    .await?;
                Action::Delete
            } else {
                Action::Unchanged
            }
        }
        None => Action::Unchanged,
    };
    changes.push(Change::new(
        ResourceKind::PolicyAttachment,
        POLICY_ATTACHMENT_LOGICAL_NAME,
        action,
    ));

    let action = match role {
        Some(role) => {
            tracing::info!("[stack] deleting role {:?}", role.name);
            provider.delete_role(&role.name).await?;
            Action::Delete
        }
        None => Action::Unchanged,
    };
    changes.push(Change::new(ResourceKind::Role, ROLE_LOGICAL_NAME, action));

    let action = match provider.find_trust_anchor(&names.trust_anchor).await? {
        Some(trust_anchor) => {
            tracing::info!("[stack] deleting trust anchor {}", trust_anchor.id);
            provider.delete_trust_anchor(&trust_anchor.id).await?;
            Action::Delete
        }
        None => Action::Unchanged,
    };
    changes.push(Change::new(
        ResourceKind::TrustAnchor,
        TRUST_ANCHOR_LOGICAL_NAME,
        action,
    ));

    Ok(changes)
}

fn trust_anchor_action(existing: Option<&TrustAnchorState>, spec: &TrustAnchorSpec) -> Action {
    let Some(existing) = existing else {
        return Action::Create;
    };

    // the service may normalize trailing whitespace of the PEM data
    let data_matches = existing
        .certificate_data
        .as_deref()
        .is_some_and(|data| data.trim() == spec.certificate_data.trim());

    if data_matches && existing.enabled == spec.enabled {
        Action::Unchanged
    } else {
        Action::Update
    }
}

fn role_action(existing: Option<&RoleState>, spec: &RoleSpec) -> Result<Action, StackError> {
    let Some(existing) = existing else {
        return Ok(Action::Create);
    };

    let desired: Value = spec.policy_document()?;
    let policy_matches = existing.assume_role_policy.as_ref() == Some(&desired);
    let duration_matches = existing.max_session_duration == Some(spec.max_session_duration);

    if policy_matches && duration_matches {
        Ok(Action::Unchanged)
    } else {
        Ok(Action::Update)
    }
}

fn attachment_action(attached: &[String], policy_arn: &str) -> Action {
    if attached.iter().any(|arn| arn == policy_arn) {
        Action::Unchanged
    } else {
        Action::Create
    }
}

fn profile_action(existing: &ProfileState, spec: &ProfileSpec, role_arn: &str) -> Action {
    let roles_match = existing.role_arns == [role_arn];
    let enabled_matches = spec.enabled.is_none() || existing.enabled == spec.enabled;

    if roles_match && enabled_matches {
        Action::Unchanged
    } else {
        Action::Update
    }
}
