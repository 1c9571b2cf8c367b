// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;
use wgrotate_common::DiscoveryError;
use wgrotate_config::StoreError;

#[derive(Error, Debug)]
pub enum CliError {
	#[error("endpoint discovery failed: {0}")]
	Discovery(#[from] DiscoveryError),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error("--policy tags needs at least one --tag")]
	NoTags,
}

pub type Result<T> = std::result::Result<T, CliError>;
