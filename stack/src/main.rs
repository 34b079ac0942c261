// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use anyhow::Result;
use clap::Parser;
use rolesanywhere_stack::aws::AwsProvider;
use rolesanywhere_stack::commands::{fetch_bundle, print_bundle, run};
use rolesanywhere_stack::configuration::{Command, StackOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with_current_span(false)
        // stdout carries the JSON results, keep the logs apart
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    let options = StackOptions::parse();

    tracing::info!("[stack] {:?}", &options);

    let mut stdout = std::io::stdout();
    match options.command {
        // needs no AWS credentials
        Command::Bundle => {
            let bundle = fetch_bundle(&options).await?;
            print_bundle(&bundle, &mut stdout)?;
        }
        Command::Preview | Command::Up | Command::Destroy => {
            let provider =
                AwsProvider::new(options.region.clone(), options.profile.clone()).await;
            run(&options, provider, &mut stdout).await?;
        }
    }

    Ok(())
}
