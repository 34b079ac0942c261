// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! In-memory [`CloudProvider`] and a local CA host shared by the integration
//! tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use rolesanywhere_stack::bundle::CertificateBundle;
use rolesanywhere_stack::configuration::StackOptions;
use rolesanywhere_stack::errors::StackError;
use rolesanywhere_stack::models::{
    ProfileSpec, ProfileState, RoleSpec, RoleState, StackDefinition, TrustAnchorSpec,
    TrustAnchorState,
};
use rolesanywhere_stack::provider::CloudProvider;
use tokio::net::TcpListener;

pub const ACCOUNT_ID: &str = "111122223333";

pub const ROOT_PEM: &str = "-----BEGIN CERTIFICATE-----\nUk9PVA==\n-----END CERTIFICATE-----\n";
pub const INTERMEDIATE_PEM: &str =
    "-----BEGIN CERTIFICATE-----\nSU5URVJNRURJQVRF\n-----END CERTIFICATE-----\n";

pub fn bundle() -> CertificateBundle {
    CertificateBundle::new(ROOT_PEM, INTERMEDIATE_PEM)
}

pub fn definition() -> StackDefinition {
    StackDefinition::new(&StackOptions::default(), &bundle())
}

/// Serves the CA bundles on an ephemeral port and returns its base URL.
pub async fn spawn_ca_server() -> String {
    let app = Router::new()
        .route("/roots.pem", get(|| async { ROOT_PEM }))
        .route("/intermediates.pem", get(|| async { INTERMEDIATE_PEM }))
        .route("/empty.pem", get(|| async { "" }))
        .route("/unicode.txt", get(|| async { "ünïcødé\r\nline two\n" }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{address}")
}

#[derive(Default)]
pub struct Account {
    pub trust_anchors: Vec<TrustAnchorState>,
    pub roles: Vec<RoleState>,
    pub attachments: BTreeMap<String, Vec<String>>,
    pub profiles: Vec<ProfileState>,
    next_id: usize,
}

impl Account {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:04}", self.next_id)
    }
}

/// Records every call and keeps resources in plain vectors.
#[derive(Default)]
pub struct InMemoryProvider {
    pub account: Mutex<Account>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<&'static str>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named operation fail from now on.
    pub fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().unwrap() = Some(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that changed the account, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("find_") && !call.starts_with("list_"))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, operation: &'static str) -> Result<(), StackError> {
        self.calls.lock().unwrap().push(operation.to_string());
        if *self.fail_on.lock().unwrap() == Some(operation) {
            return Err(StackError::Aws {
                operation,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn not_found(operation: &'static str) -> StackError {
    StackError::Aws {
        operation,
        message: "ResourceNotFoundException".to_string(),
    }
}

#[async_trait]
impl CloudProvider for InMemoryProvider {
    async fn find_trust_anchor(&self, name: &str) -> Result<Option<TrustAnchorState>, StackError> {
        self.record("find_trust_anchor")?;
        let account = self.account.lock().unwrap();
        Ok(account
            .trust_anchors
            .iter()
            .find(|anchor| anchor.name == name)
            .cloned())
    }

    async fn create_trust_anchor(
        &self,
        spec: &TrustAnchorSpec,
    ) -> Result<TrustAnchorState, StackError> {
        self.record("create_trust_anchor")?;
        let mut account = self.account.lock().unwrap();
        let id = account.next_id("ta");
        let state = TrustAnchorState {
            arn: format!("arn:aws:rolesanywhere:us-east-1:{ACCOUNT_ID}:trust-anchor/{id}"),
            id,
            name: spec.name.clone(),
            enabled: spec.enabled,
            certificate_data: Some(spec.certificate_data.clone()),
        };
        account.trust_anchors.push(state.clone());
        Ok(state)
    }

    async fn update_trust_anchor(
        &self,
        id: &str,
        spec: &TrustAnchorSpec,
    ) -> Result<TrustAnchorState, StackError> {
        self.record("update_trust_anchor")?;
        let mut account = self.account.lock().unwrap();
        let anchor = account
            .trust_anchors
            .iter_mut()
            .find(|anchor| anchor.id == id)
            .ok_or_else(|| not_found("UpdateTrustAnchor"))?;
        anchor.name = spec.name.clone();
        anchor.enabled = spec.enabled;
        anchor.certificate_data = Some(spec.certificate_data.clone());
        Ok(anchor.clone())
    }

    async fn delete_trust_anchor(&self, id: &str) -> Result<(), StackError> {
        self.record("delete_trust_anchor")?;
        let mut account = self.account.lock().unwrap();
        let before = account.trust_anchors.len();
        account.trust_anchors.retain(|anchor| anchor.id != id);
        if account.trust_anchors.len() == before {
            return Err(not_found("DeleteTrustAnchor"));
        }
        Ok(())
    }

    async fn find_role(&self, name: &str) -> Result<Option<RoleState>, StackError> {
        self.record("find_role")?;
        let account = self.account.lock().unwrap();
        Ok(account.roles.iter().find(|role| role.name == name).cloned())
    }

    async fn create_role(&self, spec: &RoleSpec) -> Result<RoleState, StackError> {
        self.record("create_role")?;
        let state = RoleState {
            name: spec.name.clone(),
            arn: format!("arn:aws:iam::{ACCOUNT_ID}:role/{}", spec.name),
            max_session_duration: Some(spec.max_session_duration),
            assume_role_policy: Some(spec.policy_document()?),
        };
        self.account.lock().unwrap().roles.push(state.clone());
        Ok(state)
    }

    async fn update_role(&self, spec: &RoleSpec) -> Result<RoleState, StackError> {
        self.record("update_role")?;
        let policy = spec.policy_document()?;
        let mut account = self.account.lock().unwrap();
        let role = account
            .roles
            .iter_mut()
            .find(|role| role.name == spec.name)
            .ok_or_else(|| not_found("UpdateRole"))?;
        role.max_session_duration = Some(spec.max_session_duration);
        role.assume_role_policy = Some(policy);
        Ok(role.clone())
    }

    async fn delete_role(&self, name: &str) -> Result<(), StackError> {
        self.record("delete_role")?;
        let mut account = self.account.lock().unwrap();
        if account
            .attachments
            .get(name)
            .is_some_and(|policies| !policies.is_empty())
        {
            return Err(StackError::Aws {
                operation: "DeleteRole",
                message: "DeleteConflict: role has attached policies".to_string(),
            });
        }
        let before = account.roles.len();
        account.roles.retain(|role| role.name != name);
        if account.roles.len() == before {
            return Err(not_found("DeleteRole"));
        }
        Ok(())
    }

    async fn list_attached_policies(&self, role_name: &str) -> Result<Vec<String>, StackError> {
        self.record("list_attached_policies")?;
        let account = self.account.lock().unwrap();
        Ok(account
            .attachments
            .get(role_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), StackError> {
        self.record("attach_role_policy")?;
        let mut account = self.account.lock().unwrap();
        if !account.roles.iter().any(|role| role.name == role_name) {
            return Err(not_found("AttachRolePolicy"));
        }
        let policies = account.attachments.entry(role_name.to_string()).or_default();
        if !policies.iter().any(|arn| arn == policy_arn) {
            policies.push(policy_arn.to_string());
        }
        Ok(())
    }

    async fn detach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), StackError> {
        self.record("detach_role_policy")?;
        let mut account = self.account.lock().unwrap();
        let policies = account
            .attachments
            .get_mut(role_name)
            .ok_or_else(|| not_found("DetachRolePolicy"))?;
        let before = policies.len();
        policies.retain(|arn| arn != policy_arn);
        if policies.len() == before {
            return Err(not_found("DetachRolePolicy"));
        }
        Ok(())
    }

    async fn find_profile(&self, name: &str) -> Result<Option<ProfileState>, StackError> {
        self.record("find_profile")?;
        let account = self.account.lock().unwrap();
        Ok(account
            .profiles
            .iter()
            .find(|profile| profile.name == name)
            .cloned())
    }

    async fn create_profile(
        &self,
        spec: &ProfileSpec,
        role_arns: &[String],
    ) -> Result<ProfileState, StackError> {
        self.record("create_profile")?;
        let mut account = self.account.lock().unwrap();
        let id = account.next_id("profile");
        let state = ProfileState {
            arn: format!("arn:aws:rolesanywhere:us-east-1:{ACCOUNT_ID}:profile/{id}"),
            id,
            name: spec.name.clone(),
            role_arns: role_arns.to_vec(),
            enabled: Some(spec.enabled.unwrap_or(false)),
        };
        account.profiles.push(state.clone());
        Ok(state)
    }

    async fn update_profile(
        &self,
        id: &str,
        spec: &ProfileSpec,
        role_arns: &[String],
    ) -> Result<ProfileState, StackError> {
        self.record("update_profile")?;
        let mut account = self.account.lock().unwrap();
        let profile = account
            .profiles
            .iter_mut()
            .find(|profile| profile.id == id)
            .ok_or_else(|| not_found("UpdateProfile"))?;
        profile.name = spec.name.clone();
        profile.role_arns = role_arns.to_vec();
        if let Some(enabled) = spec.enabled {
            profile.enabled = Some(enabled);
        }
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: &str) -> Result<(), StackError> {
        self.record("delete_profile")?;
        let mut account = self.account.lock().unwrap();
        let before = account.profiles.len();
        account.profiles.retain(|profile| profile.id != id);
        if account.profiles.len() == before {
            return Err(not_found("DeleteProfile"));
        }
        Ok(())
    }
}
