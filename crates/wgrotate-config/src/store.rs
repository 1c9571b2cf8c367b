// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! File-backed store for the configuration document.
//!
//! Loading never fails on a missing, empty or corrupt store: the fallback
//! document is used and written back so the next run reads it. A store that
//! exists but cannot be read is an error and is left alone. Saving goes through a
//! sibling `.tmp` file and a rename, so the store always holds either the old
//! or the new document.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::document::ConfigDocument;
use crate::error::StoreError;

pub const DEFAULT_STORE_FILE: &str = "hiddify-config.json";
pub const DEFAULT_TEMPLATE_FILE: &str = "hiddify-config.template.json";

/// rw-r--r--
pub const STORE_MODE: u32 = 0o644;

/// Why the store content was not used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
	Missing,
	Empty,
	Corrupt(String),
}

/// Where the loaded document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
	Store,
	Template(PathBuf),
	Skeleton,
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
	pub document: ConfigDocument,
	pub source: DocumentSource,
	pub fallback_reason: Option<FallbackReason>,
}

/// What to use when the store itself is unusable.
#[derive(Debug, Clone)]
pub struct Fallback {
	template: Option<PathBuf>,
	allow_skeleton: bool,
}

impl Default for Fallback {
	fn default() -> Self {
		Self {
			template: None,
			allow_skeleton: true,
		}
	}
}

impl Fallback {
	pub fn template(path: impl Into<PathBuf>) -> Self {
		Self {
			template: Some(path.into()),
			..Self::default()
		}
	}

	pub fn allow_skeleton(mut self, allow: bool) -> Self {
		self.allow_skeleton = allow;
		self
	}

	pub fn template_path(&self) -> Option<&Path> {
		self.template.as_deref()
	}
}

pub struct ConfigStore {
	path: PathBuf,
}

impl ConfigStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	#[instrument(skip_all, fields(path = %self.path.display()))]
	pub fn load(&self, fallback: &Fallback) -> Result<LoadedDocument, StoreError> {
		let content = read_optional(&self.path).map_err(|e| StoreError::read(&self.path, e))?;

		let reason = match content {
			None => FallbackReason::Missing,
			Some(content) if content.iter().all(u8::is_ascii_whitespace) => FallbackReason::Empty,
			Some(content) => match ConfigDocument::parse(&content) {
				Ok(document) => {
					debug!("loaded configuration from store");
					return Ok(LoadedDocument {
						document,
						source: DocumentSource::Store,
						fallback_reason: None,
					});
				}
				Err(e) => {
					warn!(error = %e, "stored configuration is corrupt, replacing it");
					FallbackReason::Corrupt(e.to_string())
				}
			},
		};

		let (document, source) = self.resolve_fallback(fallback)?;
		self.save(&document)?;

		info!(?reason, ?source, "seeded store from fallback");

		Ok(LoadedDocument {
			document,
			source,
			fallback_reason: Some(reason),
		})
	}

	fn resolve_fallback(
		&self,
		fallback: &Fallback,
	) -> Result<(ConfigDocument, DocumentSource), StoreError> {
		if let Some(template) = fallback.template_path() {
			match read_optional(template) {
				Ok(Some(content)) => match ConfigDocument::parse(&content) {
					Ok(document) => {
						return Ok((document, DocumentSource::Template(template.to_path_buf())));
					}
					Err(e) => {
						warn!(template = %template.display(), error = %e, "template is invalid")
					}
				},
				Ok(None) => debug!(template = %template.display(), "template not found"),
				Err(e) => {
					warn!(template = %template.display(), error = %e, "template is unreadable")
				}
			}
		}

		if fallback.allow_skeleton {
			return Ok((ConfigDocument::skeleton(), DocumentSource::Skeleton));
		}

		Err(StoreError::SourceUnavailable {
			store: self.path.clone(),
			template: fallback.template.clone(),
		})
	}

	#[instrument(skip_all, fields(path = %self.path.display()))]
	pub fn save(&self, document: &ConfigDocument) -> Result<(), StoreError> {
		let json = document.to_pretty_json()?;

		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::persist(parent, e))?;
		}

		let tmp_path = tmp_path(&self.path);
		if let Err(e) = write_replace(&tmp_path, &self.path, json.as_bytes()) {
			if let Err(cleanup) = fs::remove_file(&tmp_path) {
				if cleanup.kind() != io::ErrorKind::NotFound {
					warn!(tmp = %tmp_path.display(), error = %cleanup, "failed to remove temp file");
				}
			}
			return Err(StoreError::persist(&self.path, e));
		}

		debug!(bytes = json.len(), "saved configuration");

		Ok(())
	}
}

fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
	match fs::read(path) {
		Ok(content) => Ok(Some(content)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e),
	}
}

fn tmp_path(path: &Path) -> PathBuf {
	let mut name = path
		.file_name()
		.map(|n| n.to_os_string())
		.unwrap_or_default();
	name.push(".tmp");
	path.with_file_name(name)
}

fn write_replace(tmp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
	let mut file = fs::File::create(tmp_path)?;
	file.write_all(bytes)?;
	file.sync_all()?;
	drop(file);

	set_store_permissions(tmp_path)?;
	fs::rename(tmp_path, path)
}

#[cfg(unix)]
fn set_store_permissions(path: &Path) -> io::Result<()> {
	use std::os::unix::fs::PermissionsExt;

	fs::set_permissions(path, fs::Permissions::from_mode(STORE_MODE))
}

#[cfg(not(unix))]
fn set_store_permissions(_path: &Path) -> io::Result<()> {
	Ok(())
}
