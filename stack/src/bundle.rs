// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Root and intermediate CA bundles that back the trust anchor.
//!
//! The trust anchor's X.509 certificate data is the root bundle immediately
//! followed by the intermediate bundle. No separator is inserted, so the
//! result is byte-for-byte `root + intermediate`.

use reqwest::Client;
use rustls_pki_types::CertificateDer;
use rustls_pki_types::pem::PemObject;

use crate::constants::PEM_CERTIFICATE_HEADER;
use crate::errors::StackError;
use crate::fetch::{get_intermediate_pem, get_root_pem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    pub root: String,
    pub intermediate: String,
}

impl CertificateBundle {
    pub fn new(root: impl Into<String>, intermediate: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            intermediate: intermediate.into(),
        }
    }

    /// Fetches the root bundle, then the intermediate bundle.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error, or [`StackError::InvalidBundle`] if
    /// either document holds no parsable certificate.
    #[tracing::instrument(skip(client))]
    pub async fn fetch(
        client: &Client,
        root_url: &str,
        intermediate_url: &str,
    ) -> Result<Self, StackError> {
        let root = get_root_pem(client, root_url).await?;
        let intermediate = get_intermediate_pem(client, intermediate_url).await?;

        let bundle = Self { root, intermediate };
        bundle.validate()?;

        tracing::info!(
            "[stack] fetched certificate bundle with {} certificates",
            bundle.certificate_count()
        );

        Ok(bundle)
    }

    /// The certificate data registered with the trust anchor.
    pub fn data(&self) -> String {
        format!("{}{}", self.root, self.intermediate)
    }

    pub fn certificate_count(&self) -> usize {
        count_certificates(&self.root) + count_certificates(&self.intermediate)
    }

    pub fn validate(&self) -> Result<(), StackError> {
        validate_part("root", &self.root)?;
        validate_part("intermediate", &self.intermediate)?;
        Ok(())
    }
}

fn count_certificates(pem: &str) -> usize {
    CertificateDer::pem_slice_iter(pem.as_bytes())
        .filter(Result::is_ok)
        .count()
}

fn validate_part(label: &str, pem: &str) -> Result<(), StackError> {
    if !pem.contains(PEM_CERTIFICATE_HEADER) {
        return Err(StackError::InvalidBundle(format!(
            "{label} bundle contains no certificate"
        )));
    }

    for certificate in CertificateDer::pem_slice_iter(pem.as_bytes()) {
        certificate.map_err(|err| {
            StackError::InvalidBundle(format!("{label} bundle is not valid PEM: {err}"))
        })?;
    }

    Ok(())
}
