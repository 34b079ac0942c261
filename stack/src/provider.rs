// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! The seam between the stack engine and the cloud.
//!
//! [`CloudProvider`] exposes just enough of IAM and IAM Roles Anywhere for
//! the engine to look resources up by name and converge them. The production
//! implementation is [`crate::aws::AwsProvider`].

use async_trait::async_trait;

use crate::errors::StackError;
use crate::models::{
    ProfileSpec, ProfileState, RoleSpec, RoleState, TrustAnchorSpec, TrustAnchorState,
};

#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Looks a trust anchor up by its name. `None` when it does not exist.
    async fn find_trust_anchor(&self, name: &str) -> Result<Option<TrustAnchorState>, StackError>;
    async fn create_trust_anchor(
        &self,
        spec: &TrustAnchorSpec,
    ) -> Result<TrustAnchorState, StackError>;
    /// Replaces name, source and enabled flag of an existing trust anchor.
    async fn update_trust_anchor(
        &self,
        id: &str,
        spec: &TrustAnchorSpec,
    ) -> Result<TrustAnchorState, StackError>;
    async fn delete_trust_anchor(&self, id: &str) -> Result<(), StackError>;

    async fn find_role(&self, name: &str) -> Result<Option<RoleState>, StackError>;
    async fn create_role(&self, spec: &RoleSpec) -> Result<RoleState, StackError>;
    /// Applies session duration and trust policy to an existing role.
    async fn update_role(&self, spec: &RoleSpec) -> Result<RoleState, StackError>;
    async fn delete_role(&self, name: &str) -> Result<(), StackError>;

    /// ARNs of the managed policies attached to the role.
    async fn list_attached_policies(&self, role_name: &str) -> Result<Vec<String>, StackError>;
    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str)
    -> Result<(), StackError>;
    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str)
    -> Result<(), StackError>;

    async fn find_profile(&self, name: &str) -> Result<Option<ProfileState>, StackError>;
    async fn create_profile(
        &self,
        spec: &ProfileSpec,
        role_arns: &[String],
    ) -> Result<ProfileState, StackError>;
    async fn update_profile(
        &self,
        id: &str,
        spec: &ProfileSpec,
        role_arns: &[String],
    ) -> Result<ProfileState, StackError>;
    async fn delete_profile(&self, id: &str) -> Result<(), StackError>;
}
