// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::{Path, PathBuf};

/// Errors from interpreting raw content as a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
	/// Content is not valid JSON
	#[error("invalid JSON: {0}")]
	Parse(#[from] serde_json::Error),

	/// Content is JSON but the root is not an object
	#[error("document root must be a JSON object, found {0}")]
	NotAnObject(&'static str),
}

/// Errors that abort a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// Neither the store, the template nor the skeleton can be used
	#[error(
		"no usable configuration source: {} is unusable and template {} is unavailable",
		.store.display(),
		describe(.template)
	)]
	SourceUnavailable {
		store: PathBuf,
		template: Option<PathBuf>,
	},

	/// The store exists but could not be read
	#[error("failed to read {}: {source}", .path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Writing or renaming the store file failed
	#[error("failed to persist {}: {source}", .path.display())]
	Persist {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Serializing the document failed
	#[error("failed to serialize configuration: {0}")]
	Serialize(#[from] serde_json::Error),
}

impl StoreError {
	pub fn read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self::Read {
			path: path.as_ref().to_path_buf(),
			source,
		}
	}

	pub fn persist(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self::Persist {
			path: path.as_ref().to_path_buf(),
			source,
		}
	}
}

fn describe(template: &Option<PathBuf>) -> String {
	match template {
		Some(path) => path.display().to_string(),
		None => "(none configured)".to_string(),
	}
}
