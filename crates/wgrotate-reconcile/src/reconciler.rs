// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};
use wgrotate_common::{EndpointDescriptor, SENTINEL_PRIVATE_KEY};
use wgrotate_config::outbound::fields;
use wgrotate_config::{outbound_tag, ConfigDocument, OutboundsShape, WireGuardTemplate};

use crate::policy::SelectionPolicy;
use crate::report::{Diagnostic, EntryRef, ReconcileReport};

/// Points wireguard outbounds of a document at a new endpoint.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
	template: WireGuardTemplate,
}

impl Reconciler {
	pub fn new(template: WireGuardTemplate) -> Self {
		Self { template }
	}

	/// Rewrite the outbounds selected by `policy` in place.
	///
	/// Entries outside the selection, including every non-wireguard entry,
	/// are not touched. A missing `private_key` is replaced by
	/// [`SENTINEL_PRIVATE_KEY`].
	#[instrument(skip_all, fields(endpoint = %endpoint, ?policy))]
	pub fn apply(
		&self,
		document: &mut ConfigDocument,
		endpoint: &EndpointDescriptor,
		private_key: Option<&str>,
		policy: &SelectionPolicy,
	) -> ReconcileReport {
		let mut report = ReconcileReport::default();

		match document.repair_outbounds() {
			OutboundsShape::Intact => {}
			OutboundsShape::Missing => {
				warn!("outbounds missing, added an empty list");
				report.diagnostics.push(Diagnostic::OutboundsMissing);
			}
			OutboundsShape::WrongShape(kind) => {
				warn!(kind, "outbounds is not a list, replaced it");
				report.diagnostics.push(Diagnostic::OutboundsReplaced(kind));
			}
		}

		let private_key = match private_key {
			Some(key) => key,
			None => {
				warn!("no key material supplied, writing sentinel key");
				report.diagnostics.push(Diagnostic::SentinelKeyUsed);
				SENTINEL_PRIVATE_KEY
			}
		};

		let outbounds = document.outbounds_mut();
		let selection = policy.select(outbounds.as_slice());

		for index in selection.indices {
			let entry = &mut outbounds[index];
			let entry_ref = EntryRef {
				index,
				tag: outbound_tag(entry).map(str::to_string),
			};

			// Selected entries are wireguard-typed, hence objects.
			let Some(object) = entry.as_object_mut() else {
				continue;
			};

			if let Err(reason) = update_entry(object, endpoint, private_key) {
				warn!(entry = %entry_ref, %reason, "skipped local_address of malformed entry");
				report.diagnostics.push(Diagnostic::MalformedEntry {
					entry: entry_ref.clone(),
					reason,
				});
			}

			info!(entry = %entry_ref, "updated wireguard outbound");
			report.updated.push(entry_ref);
		}

		for tag in selection.missing_tags {
			warn!(%tag, "no wireguard outbound with tag");
			report.diagnostics.push(Diagnostic::TagNotFound(tag));
		}

		if let Some(tag) = selection.create_tag {
			let outbound = self.template.instantiate(
				&tag,
				endpoint.address(),
				endpoint.port(),
				private_key,
			);
			outbounds.push(Value::from(outbound));

			let created = EntryRef {
				index: outbounds.len() - 1,
				tag: Some(tag),
			};
			info!(entry = %created, "created wireguard outbound");
			report.created = Some(created);
		}

		report
	}
}

/// Write endpoint and key fields. `Err` carries why `local_address` was left
/// alone; the other fields are written either way.
fn update_entry(
	entry: &mut Map<String, Value>,
	endpoint: &EndpointDescriptor,
	private_key: &str,
) -> Result<(), String> {
	let address = endpoint.address();

	entry.insert(fields::SERVER.to_string(), Value::from(address));
	entry.insert(
		fields::SERVER_PORT.to_string(),
		Value::from(endpoint.port().get()),
	);
	entry.insert(fields::PRIVATE_KEY.to_string(), Value::from(private_key));

	match entry.get_mut(fields::LOCAL_ADDRESS) {
		Some(Value::Array(addresses)) if addresses.len() > 1 => {
			addresses[1] = Value::from(address);
			Ok(())
		}
		Some(Value::Array(addresses)) => Err(format!(
			"local_address has {} element(s), need at least 2",
			addresses.len()
		)),
		Some(_) => Err("local_address is not a list".to_string()),
		None => Err("local_address is missing".to_string()),
	}
}
