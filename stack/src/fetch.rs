// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Plain HTTP GET helpers for the certificate bundles.
//!
//! There is intentionally no timeout or retry here: a fetch either returns the
//! full body or the underlying [`reqwest::Error`] is handed back to the caller.

use reqwest::Client;

use crate::errors::StackError;

/// Builds the HTTP client shared by both bundle fetches.
pub fn http_client() -> Result<Client, StackError> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Performs a single GET request and returns the response body as text.
///
/// # Errors
///
/// Returns [`StackError::Http`] if the request cannot be sent, the server
/// answers with a non-success status, or the body cannot be read.
#[tracing::instrument(skip(client))]
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, StackError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;

    tracing::debug!("[stack] fetched {} bytes from {}", body.len(), url);

    Ok(body)
}

pub async fn get_root_pem(client: &Client, url: &str) -> Result<String, StackError> {
    fetch_text(client, url).await
}

pub async fn get_intermediate_pem(client: &Client, url: &str) -> Result<String, StackError> {
    fetch_text(client, url).await
}
