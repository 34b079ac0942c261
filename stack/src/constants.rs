// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

pub const ROOT_PEM_URL: &str = "https://ca-mini.01101011.in/roots.pem";
pub const INTERMEDIATE_PEM_URL: &str = "https://ca-mini.01101011.in/intermediates.pem";

// Logical names identify resources inside the stack definition
pub const TRUST_ANCHOR_LOGICAL_NAME: &str = "mac-mini-ca-trust-anchor";
pub const ROLE_LOGICAL_NAME: &str = "DEMO_S3_READ_ONLY";
pub const POLICY_ATTACHMENT_LOGICAL_NAME: &str = "s3-read-only-policy-attachment";
pub const PROFILE_LOGICAL_NAME: &str = "mac-mini-ca-profile";

pub const DEFAULT_TRUST_ANCHOR_NAME: &str = "Mac Mini CA TA";
pub const DEFAULT_ROLE_NAME: &str = "DEMO_S3_READ_ONLY";
pub const DEFAULT_PROFILE_NAME: &str = "Mac Mini CA Profile";
pub const DEFAULT_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

/// https://docs.aws.amazon.com/IAM/latest/APIReference/API_CreateRole.html
/// the maximum session duration must be between 1 and 12 hours
pub const MIN_SESSION_DURATION: i32 = 3600;
pub const MAX_SESSION_DURATION: i32 = 3600 * 12;
pub const DEFAULT_SESSION_DURATION: i32 = MAX_SESSION_DURATION;

pub const CERTIFICATE_BUNDLE_SOURCE_TYPE: &str = "CERTIFICATE_BUNDLE";
pub const PEM_CERTIFICATE_HEADER: &str = "-----BEGIN CERTIFICATE-----";

/// Trust policy allowing IAM Roles Anywhere to vend sessions for the role.
pub const TRUST_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {
            "Effect": "Allow",
            "Principal": {
                "Service": "rolesanywhere.amazonaws.com"
            },
            "Action": [
                "sts:AssumeRole",
                "sts:TagSession",
                "sts:SetSourceIdentity"
            ]
        }
    ]
}
"#;
