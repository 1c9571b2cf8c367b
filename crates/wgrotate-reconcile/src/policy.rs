// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::Value;
use wgrotate_config::{is_wireguard, outbound_tag};

pub const DEFAULT_TAG: &str = "Main";

/// Which wireguard outbounds a pass rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
	/// Every wireguard outbound.
	UpdateAll,
	/// For each tag, the first wireguard outbound carrying it.
	UpdateByTag(Vec<String>),
	/// The first wireguard outbound, created under this tag if there is none.
	UpsertDefault(String),
}

impl Default for SelectionPolicy {
	fn default() -> Self {
		Self::UpsertDefault(DEFAULT_TAG.to_string())
	}
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Selection {
	/// Indices into `outbounds`, ascending.
	pub indices: Vec<usize>,
	pub missing_tags: Vec<String>,
	/// Tag to create an outbound under when nothing was selected.
	pub create_tag: Option<String>,
}

impl SelectionPolicy {
	pub(crate) fn select(&self, outbounds: &[Value]) -> Selection {
		let mut wireguard = outbounds
			.iter()
			.enumerate()
			.filter(|(_, entry)| is_wireguard(entry));

		match self {
			Self::UpdateAll => Selection {
				indices: wireguard.map(|(i, _)| i).collect(),
				..Selection::default()
			},
			Self::UpdateByTag(tags) => {
				let wireguard: Vec<_> = wireguard.collect();
				let mut selection = Selection::default();
				for tag in tags {
					let first = wireguard
						.iter()
						.find(|(_, entry)| outbound_tag(entry) == Some(tag.as_str()));
					match first {
						Some((i, _)) => {
							if !selection.indices.contains(i) {
								selection.indices.push(*i);
							}
						}
						None => {
							if !selection.missing_tags.contains(tag) {
								selection.missing_tags.push(tag.clone());
							}
						}
					}
				}
				selection.indices.sort_unstable();
				selection
			}
			Self::UpsertDefault(tag) => match wireguard.next() {
				Some((i, _)) => Selection {
					indices: vec![i],
					..Selection::default()
				},
				None => Selection {
					create_tag: Some(tag.clone()),
					..Selection::default()
				},
			},
		}
	}
}
