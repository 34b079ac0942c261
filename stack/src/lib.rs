// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # Roles Anywhere Stack
//!
//! Provisions the AWS IAM Roles Anywhere resources needed to hand out AWS
//! sessions to workloads holding certificates from a private CA.
//!
//! ## Architecture
//!
//! ```text
//! roots.pem + intermediates.pem -> CertificateBundle
//!                                        |
//!            StackOptions -> StackDefinition -> Stack (engine)
//!                                                  |
//!                                    CloudProvider (AwsProvider)
//!                                      |                  |
//!                               IAM Roles Anywhere       IAM
//! ```
//!
//! The stack consists of:
//!
//! - **Trust anchor**: the root and intermediate PEM bundles, concatenated
//! - **Role**: trusts `rolesanywhere.amazonaws.com` for `sts:AssumeRole`,
//!   `sts:TagSession` and `sts:SetSourceIdentity`
//! - **Policy attachment**: a managed policy on the role
//!   (`AmazonS3ReadOnlyAccess` by default)
//! - **Profile**: maps the role for sessions created through the trust anchor
//!
//! Once up, the trust anchor id and ARN, the role ARN and the profile ARN are
//! exported as [`models::StackOutputs`].
//!
//! ## Modules
//!
//! - [`aws`]: [`provider::CloudProvider`] implementation on the AWS SDK
//! - [`bundle`]: fetching and validating the certificate bundles
//! - [`commands`]: subcommand dispatch and the outputs file
//! - [`configuration`]: CLI argument parsing with clap
//! - [`constants`]: default names, URLs and the role trust policy
//! - [`engine`]: preview, up and destroy
//! - [`errors`]: the crate's error type
//! - [`fetch`]: HTTP GET helpers
//! - [`models`]: resource specs, observed states and outputs
//! - [`provider`]: the cloud abstraction used by the engine
//!
//! ## Usage
//!
//! ```bash
//! rolesanywhere-stack --region us-east-1 preview
//! rolesanywhere-stack --region us-east-1 --outputs-file outputs.json up
//! rolesanywhere-stack --region us-east-1 destroy
//! ```

pub mod aws;
pub mod bundle;
pub mod commands;
pub mod configuration;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod provider;
