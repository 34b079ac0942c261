// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

#[derive(thiserror::Error, Debug)]
pub enum StackError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid certificate bundle: {0}")]
    InvalidBundle(String),
    #[error("{operation} failed: {message}")]
    Aws {
        operation: &'static str,
        message: String,
    },
    #[error("{field} missing from {operation} response")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
    #[error("malformed {operation} response: {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StackError {
    /// Wraps an AWS SDK failure, keeping the full error chain in the message.
    pub fn aws<E>(operation: &'static str, source: E) -> Self
    where
        E: std::error::Error,
    {
        let message = aws_sdk_iam::error::DisplayErrorContext(&source).to_string();
        tracing::error!("[stack] {} failed: {}", operation, message);
        StackError::Aws { operation, message }
    }

    pub fn missing(operation: &'static str, field: &'static str) -> Self {
        StackError::MissingField { operation, field }
    }
}
