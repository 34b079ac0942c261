// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Subcommand dispatch. The binary only sets up logging, parses options and
//! hands stdout to [`run`].

use std::io::Write;
use std::path::Path;

use crate::bundle::CertificateBundle;
use crate::configuration::{Command, StackOptions};
use crate::engine::{Stack, destroy};
use crate::errors::StackError;
use crate::fetch::http_client;
use crate::models::{ResourceNames, StackDefinition, StackOutputs};
use crate::provider::CloudProvider;

/// Runs the selected subcommand, printing its JSON result to `out`.
///
/// # Errors
///
/// Returns the first fetch, provider or I/O error.
pub async fn run<P, W>(options: &StackOptions, provider: P, out: &mut W) -> Result<(), StackError>
where
    P: CloudProvider,
    W: Write,
{
    match options.command {
        Command::Bundle => {
            let bundle = fetch_bundle(options).await?;
            print_bundle(&bundle, out)?;
        }
        Command::Preview => {
            let bundle = fetch_bundle(options).await?;
            let stack = Stack::new(StackDefinition::new(options, &bundle), provider);
            let changes = stack.preview().await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&changes)?)?;
        }
        Command::Up => {
            let bundle = fetch_bundle(options).await?;
            let stack = Stack::new(StackDefinition::new(options, &bundle), provider);
            let deployment = stack.up().await?;
            if let Some(path) = &options.outputs_file {
                write_outputs(path, &deployment.outputs).await?;
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&deployment.changes)?)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&deployment.outputs)?)?;
        }
        Command::Destroy => {
            let changes = destroy(&provider, &ResourceNames::from(options)).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&changes)?)?;
        }
    }

    Ok(())
}

pub async fn fetch_bundle(options: &StackOptions) -> Result<CertificateBundle, StackError> {
    let client = http_client()?;
    CertificateBundle::fetch(&client, &options.root_pem_url, &options.intermediate_pem_url).await
}

/// Prints the root bundle, then the intermediate bundle, each followed by a
/// newline.
pub fn print_bundle<W: Write>(bundle: &CertificateBundle, out: &mut W) -> Result<(), StackError> {
    writeln!(out, "{}", bundle.root)?;
    writeln!(out, "{}", bundle.intermediate)?;
    Ok(())
}

/// Writes the exported values to `path` as pretty JSON with camelCase keys.
#[tracing::instrument(skip(outputs))]
pub async fn write_outputs(path: &Path, outputs: &StackOutputs) -> Result<(), StackError> {
    let json = serde_json::to_string_pretty(outputs)?;
    tokio::fs::write(path, json).await.map_err(|err| {
        tracing::error!("[stack] failed to write outputs to {}: {}", path.display(), err);
        StackError::Io(err)
    })?;
    tracing::info!("[stack] wrote outputs to {}", path.display());
    Ok(())
}
