// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod args;
mod error;
mod run;
mod status;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wgrotate_common::X25519KeyGenerator;

use crate::args::Args;
use crate::status::Status;

fn main() -> ExitCode {
	let args = Args::parse();

	if let Err(e) = init_tracing(&args) {
		eprintln!("{} {e:#}", style("✗").red().bold());
		return ExitCode::FAILURE;
	}

	match execute(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			tracing::error!(error = %e, "update failed");
			let _ = writeln!(io::stdout(), "{} {e:#}", style("✗").red().bold());
			ExitCode::FAILURE
		}
	}
}

fn execute(args: &Args) -> anyhow::Result<()> {
	let settings = args.settings()?;
	let mut status = Status::new(io::stdout().lock());

	run::run_pass(
		&settings,
		&args.endpoint_source(),
		&X25519KeyGenerator,
		&mut status,
	)
	.with_context(|| format!("failed to update {}", settings.store_path.display()))?;

	Ok(())
}

/// Logs go to stderr so status lines on stdout stay readable.
fn init_tracing(args: &Args) -> anyhow::Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&args.log_level)
			.with_context(|| format!("invalid log filter {:?}", args.log_level))?,
	};

	let json = args.json_logs.then(|| {
		tracing_subscriber::fmt::layer()
			.json()
			.with_writer(io::stderr)
	});
	let compact = (!args.json_logs).then(|| {
		tracing_subscriber::fmt::layer()
			.compact()
			.with_writer(io::stderr)
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(json)
		.with(compact)
		.try_init()
		.context("failed to install tracing subscriber")
}
