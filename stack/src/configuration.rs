// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::constants;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct StackOptions {
    #[arg(long, env("STACK_AWS_REGION"))]
    pub region: Option<String>,
    #[arg(long, env("STACK_AWS_PROFILE"))]
    pub profile: Option<String>,
    #[arg(long, default_value = constants::ROOT_PEM_URL, env("STACK_ROOT_PEM_URL"))]
    pub root_pem_url: String,
    #[arg(long, default_value = constants::INTERMEDIATE_PEM_URL, env("STACK_INTERMEDIATE_PEM_URL"))]
    pub intermediate_pem_url: String,
    #[arg(long, default_value = constants::DEFAULT_TRUST_ANCHOR_NAME, env("STACK_TRUST_ANCHOR_NAME"))]
    pub trust_anchor_name: String,
    #[arg(long, default_value = constants::DEFAULT_ROLE_NAME, env("STACK_ROLE_NAME"))]
    pub role_name: String,
    #[arg(long, default_value = constants::DEFAULT_PROFILE_NAME, env("STACK_PROFILE_NAME"))]
    pub profile_name: String,
    #[arg(long, default_value = constants::DEFAULT_POLICY_ARN, env("STACK_POLICY_ARN"))]
    pub policy_arn: String,
    #[arg(
        long,
        default_value_t = constants::DEFAULT_SESSION_DURATION,
        env("STACK_MAX_SESSION_DURATION"),
        value_parser = clap::value_parser!(i32).range(
            i64::from(constants::MIN_SESSION_DURATION)..=i64::from(constants::MAX_SESSION_DURATION)
        )
    )]
    pub max_session_duration: i32,
    #[arg(long, env("STACK_OUTPUTS_FILE"))]
    pub outputs_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create or update the stack and print its outputs
    Up,
    /// Show the changes `up` would make without applying them
    Preview,
    /// Delete every resource of the stack
    Destroy,
    /// Fetch and print the root and intermediate PEM bundles
    Bundle,
}

impl Default for StackOptions {
    fn default() -> Self {
        StackOptions {
            region: None,
            profile: None,
            root_pem_url: constants::ROOT_PEM_URL.to_string(),
            intermediate_pem_url: constants::INTERMEDIATE_PEM_URL.to_string(),
            trust_anchor_name: constants::DEFAULT_TRUST_ANCHOR_NAME.to_string(),
            role_name: constants::DEFAULT_ROLE_NAME.to_string(),
            profile_name: constants::DEFAULT_PROFILE_NAME.to_string(),
            policy_arn: constants::DEFAULT_POLICY_ARN.to_string(),
            max_session_duration: constants::DEFAULT_SESSION_DURATION,
            outputs_file: None,
            command: Command::Preview,
        }
    }
}
