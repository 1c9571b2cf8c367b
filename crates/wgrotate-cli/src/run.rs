// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::Write;

use tracing::{error, info, instrument};
use wgrotate_common::{EndpointSource, KeyGenerator};
use wgrotate_config::ConfigStore;
use wgrotate_reconcile::{ReconcileReport, Reconciler};

use crate::args::RunSettings;
use crate::error::Result;
use crate::status::Status;

/// One full pass: discover, generate a key, load, reconcile, save.
///
/// Discovery and persistence failures abort before the store is touched
/// further. A key generation failure does not; the placeholder key is
/// written and reported instead. Status output never fails the pass.
#[instrument(skip_all, fields(store = %settings.store_path.display()))]
pub fn run_pass<W: Write>(
	settings: &RunSettings,
	endpoints: &dyn EndpointSource,
	keys: &dyn KeyGenerator,
	status: &mut Status<W>,
) -> Result<ReconcileReport> {
	let endpoint = endpoints.discover()?;
	status.endpoint(&endpoint);

	let private_key = match keys.generate() {
		Ok(key) => {
			status.key_rotated(&key.public_key());
			Some(key.to_base64())
		}
		Err(e) => {
			error!(error = %e, "key generation failed");
			status.key_failed(&e);
			None
		}
	};

	let store = ConfigStore::new(&settings.store_path);
	let mut loaded = store.load(&settings.fallback)?;
	status.loaded(store.path(), &loaded);

	let report = Reconciler::new(settings.template.clone()).apply(
		&mut loaded.document,
		&endpoint,
		private_key.as_ref().map(|k| k.expose().as_str()),
		&settings.policy,
	);
	status.report(&report);

	store.save(&loaded.document)?;
	status.saved(store.path(), &endpoint);

	info!(
		endpoint = %endpoint,
		updated = report.updated.len(),
		created = report.created.is_some(),
		"pass complete"
	);

	Ok(report)
}
