// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Human-readable status lines, one per notable condition of a pass.
//!
//! Output is best-effort: once a write fails (closed pipe, full disk) the
//! failure is logged and later lines are dropped, the pass itself carries on.

use std::fmt;
use std::io::Write;
use std::path::Path;

use console::style;
use tracing::warn;
use wgrotate_common::{EndpointDescriptor, KeyError, WgPublicKey};
use wgrotate_config::{DocumentSource, FallbackReason, LoadedDocument};
use wgrotate_reconcile::ReconcileReport;

pub struct Status<W: Write> {
	out: W,
	broken: bool,
}

impl<W: Write> Status<W> {
	pub fn new(out: W) -> Self {
		Self { out, broken: false }
	}

	#[cfg(test)]
	pub fn into_inner(self) -> W {
		self.out
	}

	fn line(&mut self, args: fmt::Arguments<'_>) {
		if self.broken {
			return;
		}
		if let Err(e) = self.out.write_fmt(format_args!("{args}\n")) {
			warn!(error = %e, "status output unavailable, continuing without it");
			self.broken = true;
		}
	}

	pub fn endpoint(&mut self, endpoint: &EndpointDescriptor) {
		self.line(format_args!(
			"{} Endpoint: {}",
			style("→").cyan(),
			style(endpoint).cyan()
		));
	}

	pub fn key_rotated(&mut self, public_key: &WgPublicKey) {
		self.line(format_args!(
			"{} Generated new private key (public key {})",
			style("✓").green().bold(),
			style(public_key).dim()
		));
	}

	pub fn key_failed(&mut self, error: &KeyError) {
		self.line(format_args!(
			"{} Key generation failed ({error}); a placeholder key will be written",
			style("!").yellow().bold()
		));
	}

	pub fn loaded(&mut self, store: &Path, loaded: &LoadedDocument) {
		let Some(reason) = &loaded.fallback_reason else {
			self.line(format_args!(
				"{} Loaded {}",
				style("✓").green().bold(),
				store.display()
			));
			return;
		};

		let why = match reason {
			FallbackReason::Missing => "is missing".to_string(),
			FallbackReason::Empty => "is empty".to_string(),
			FallbackReason::Corrupt(e) => format!("is invalid ({e})"),
		};
		let from = match &loaded.source {
			DocumentSource::Template(template) => format!("template {}", template.display()),
			DocumentSource::Skeleton | DocumentSource::Store => "an empty configuration".to_string(),
		};

		self.line(format_args!(
			"{} {} {why}; recreated it from {from}",
			style("!").yellow().bold(),
			store.display()
		));
	}

	pub fn report(&mut self, report: &ReconcileReport) {
		for diagnostic in &report.diagnostics {
			self.line(format_args!("{} {diagnostic}", style("!").yellow().bold()));
		}
		for entry in &report.updated {
			self.line(format_args!(
				"{} Updated wireguard outbound {entry}",
				style("✓").green().bold()
			));
		}
		if let Some(entry) = &report.created {
			self.line(format_args!(
				"{} Created wireguard outbound {entry}",
				style("✓").green().bold()
			));
		}
		if report.is_noop() {
			self.line(format_args!(
				"{} No wireguard outbound matched; nothing was changed",
				style("!").yellow().bold()
			));
		}
	}

	pub fn saved(&mut self, store: &Path, endpoint: &EndpointDescriptor) {
		self.line(format_args!(
			"{} Update completed: {} now points at {}",
			style("✓").green().bold(),
			store.display(),
			style(endpoint).cyan()
		));
	}
}

/// A writer whose every write fails, like stdout after the reader hung up.
#[cfg(test)]
pub(crate) struct ClosedPipe {
	pub attempts: usize,
}

#[cfg(test)]
impl Write for ClosedPipe {
	fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
		self.attempts += 1;
		Err(std::io::ErrorKind::BrokenPipe.into())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}
