// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

/// Position and tag of an outbound entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRef {
	pub index: usize,
	pub tag: Option<String>,
}

impl fmt::Display for EntryRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.tag {
			Some(tag) => write!(f, "{tag:?} (#{})", self.index),
			None => write!(f, "#{}", self.index),
		}
	}
}

/// A recoverable condition met during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
	/// `outbounds` was absent and has been added as `[]`.
	OutboundsMissing,
	/// `outbounds` held another JSON kind and has been reset to `[]`.
	OutboundsReplaced(&'static str),
	/// The entry was updated except for `local_address`.
	MalformedEntry { entry: EntryRef, reason: String },
	/// No wireguard outbound carries this tag.
	TagNotFound(String),
	/// No key material was supplied; the sentinel was written instead.
	SentinelKeyUsed,
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::OutboundsMissing => {
				f.write_str("`outbounds` was missing, started from an empty list")
			}
			Self::OutboundsReplaced(kind) => {
				write!(f, "`outbounds` was a {kind}, replaced with an empty list")
			}
			Self::MalformedEntry { entry, reason } => {
				write!(f, "left local_address of wireguard outbound {entry} as is: {reason}")
			}
			Self::TagNotFound(tag) => write!(f, "no wireguard outbound tagged {tag:?}"),
			Self::SentinelKeyUsed => f.write_str("no private key available, wrote placeholder key"),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	/// Existing entries whose endpoint fields were rewritten.
	pub updated: Vec<EntryRef>,
	/// The entry appended by an upsert.
	pub created: Option<EntryRef>,
	pub diagnostics: Vec<Diagnostic>,
}

impl ReconcileReport {
	/// True when no outbound was touched.
	pub fn is_noop(&self) -> bool {
		self.updated.is_empty() && self.created.is_none()
	}

	pub fn malformed_entries(&self) -> impl Iterator<Item = &EntryRef> {
		self.diagnostics.iter().filter_map(|d| match d {
			Diagnostic::MalformedEntry { entry, .. } => Some(entry),
			_ => None,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entry_ref_display() {
		let tagged = EntryRef {
			index: 2,
			tag: Some("Main".to_string()),
		};
		let untagged = EntryRef { index: 0, tag: None };
		assert_eq!(tagged.to_string(), "\"Main\" (#2)");
		assert_eq!(untagged.to_string(), "#0");
	}

	#[test]
	fn empty_report_is_noop() {
		let mut report = ReconcileReport::default();
		assert!(report.is_noop());

		report.diagnostics.push(Diagnostic::TagNotFound("Main".to_string()));
		assert!(report.is_noop());

		report.created = Some(EntryRef { index: 0, tag: None });
		assert!(!report.is_noop());
	}

	#[test]
	fn diagnostics_are_distinguishable() {
		let lines: Vec<String> = [
			Diagnostic::OutboundsMissing,
			Diagnostic::OutboundsReplaced("string"),
			Diagnostic::MalformedEntry {
				entry: EntryRef { index: 1, tag: None },
				reason: "missing".to_string(),
			},
			Diagnostic::TagNotFound("Main".to_string()),
			Diagnostic::SentinelKeyUsed,
		]
		.iter()
		.map(ToString::to_string)
		.collect();

		for (i, line) in lines.iter().enumerate() {
			assert!(!line.is_empty());
			assert!(lines.iter().skip(i + 1).all(|other| other != line));
		}
	}
}
