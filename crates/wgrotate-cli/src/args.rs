// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use wgrotate_common::{EnvEndpointSource, ServerPort};
use wgrotate_config::{Fallback, WireGuardTemplate, DEFAULT_STORE_FILE, DEFAULT_TEMPLATE_FILE};
use wgrotate_reconcile::{SelectionPolicy, DEFAULT_TAG};

use crate::error::{CliError, Result};

/// Point a wireguard outbound at a fresh endpoint and rotate its private key
#[derive(Parser, Debug)]
#[command(name = "wgrotate", version)]
pub struct Args {
	/// Configuration file to update
	#[arg(long, env = "WGROTATE_CONFIG", default_value = DEFAULT_STORE_FILE)]
	pub config: PathBuf,

	/// Template used when the configuration file is missing or corrupt
	#[arg(long, env = "WGROTATE_TEMPLATE", default_value = DEFAULT_TEMPLATE_FILE)]
	pub template: PathBuf,

	/// Endpoint address (otherwise BEST_IPV6, then 2606:4700:d0::1)
	#[arg(long)]
	pub address: Option<String>,

	/// Endpoint port (otherwise BEST_PORT, then a random port)
	#[arg(long)]
	pub port: Option<ServerPort>,

	/// Which wireguard outbounds to update
	#[arg(long, value_enum, env = "WGROTATE_POLICY", default_value_t = PolicyArg::Upsert)]
	pub policy: PolicyArg,

	/// Outbound tag(s) used by the `tags` and `upsert` policies
	#[arg(
		long = "tag",
		env = "WGROTATE_TAGS",
		value_delimiter = ',',
		default_value = DEFAULT_TAG
	)]
	pub tags: Vec<String>,

	/// Tunnel-side address for created outbounds
	#[arg(long)]
	pub local_address: Option<String>,

	/// Peer public key for created outbounds
	#[arg(long)]
	pub peer_public_key: Option<String>,

	/// MTU for created outbounds
	#[arg(long)]
	pub mtu: Option<u32>,

	/// fake_packets range for created outbounds
	#[arg(long)]
	pub fake_packets: Option<String>,

	/// Fail instead of starting from an empty document when neither the
	/// configuration file nor the template is usable
	#[arg(long)]
	pub no_skeleton: bool,

	/// Log filter used when RUST_LOG is unset
	#[arg(long, env = "WGROTATE_LOG", default_value = "warn")]
	pub log_level: String,

	/// Emit logs as JSON
	#[arg(long)]
	pub json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
	/// Every wireguard outbound
	All,
	/// The first wireguard outbound for each --tag
	Tags,
	/// The first wireguard outbound, created under the first --tag if absent
	Upsert,
}

/// Everything one reconciliation pass needs, resolved from [`Args`].
#[derive(Debug, Clone)]
pub struct RunSettings {
	pub store_path: PathBuf,
	pub fallback: Fallback,
	pub policy: SelectionPolicy,
	pub template: WireGuardTemplate,
}

impl Args {
	pub fn settings(&self) -> Result<RunSettings> {
		let tags: Vec<String> = self
			.tags
			.iter()
			.map(|t| t.trim().to_string())
			.filter(|t| !t.is_empty())
			.collect();

		let policy = match self.policy {
			PolicyArg::All => SelectionPolicy::UpdateAll,
			PolicyArg::Tags if tags.is_empty() => return Err(CliError::NoTags),
			PolicyArg::Tags => SelectionPolicy::UpdateByTag(tags),
			PolicyArg::Upsert => SelectionPolicy::UpsertDefault(
				tags.into_iter()
					.next()
					.unwrap_or_else(|| DEFAULT_TAG.to_string()),
			),
		};

		let defaults = WireGuardTemplate::default();
		let template = WireGuardTemplate {
			local_address: self.local_address.clone().unwrap_or(defaults.local_address),
			peer_public_key: self
				.peer_public_key
				.clone()
				.unwrap_or(defaults.peer_public_key),
			mtu: self.mtu.unwrap_or(defaults.mtu),
			fake_packets: self.fake_packets.clone().unwrap_or(defaults.fake_packets),
			reserved: defaults.reserved,
		};

		Ok(RunSettings {
			store_path: self.config.clone(),
			fallback: Fallback::template(&self.template).allow_skeleton(!self.no_skeleton),
			policy,
			template,
		})
	}

	pub fn endpoint_source(&self) -> EnvEndpointSource {
		let mut source = EnvEndpointSource::new();
		if let Some(address) = &self.address {
			source = source.with_address(address.clone());
		}
		if let Some(port) = self.port {
			source = source.with_port(port);
		}
		source
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wgrotate_common::EndpointSource;

	fn parse(args: &[&str]) -> Args {
		let mut argv = vec!["wgrotate"];
		argv.extend_from_slice(args);
		Args::try_parse_from(argv).unwrap()
	}

	#[test]
	fn defaults_need_no_arguments() {
		let args = parse(&[]);
		assert_eq!(args.config, PathBuf::from(DEFAULT_STORE_FILE));
		assert_eq!(args.template, PathBuf::from(DEFAULT_TEMPLATE_FILE));

		let settings = args.settings().unwrap();
		assert_eq!(
			settings.policy,
			SelectionPolicy::UpsertDefault("Main".to_string())
		);
		assert_eq!(settings.template, WireGuardTemplate::default());
	}

	#[test]
	fn tags_policy_collects_tags() {
		let args = parse(&["--policy", "tags", "--tag", "A,B", "--tag", "C"]);
		assert_eq!(
			args.settings().unwrap().policy,
			SelectionPolicy::UpdateByTag(vec!["A".to_string(), "B".to_string(), "C".to_string()])
		);
	}

	#[test]
	fn tags_policy_without_tags_is_rejected() {
		let args = parse(&["--policy", "tags", "--tag", " "]);
		assert!(matches!(args.settings(), Err(CliError::NoTags)));
	}

	#[test]
	fn template_overrides_apply() {
		let args = parse(&["--mtu", "1420", "--fake-packets", "1-3"]);
		let template = args.settings().unwrap().template;
		assert_eq!(template.mtu, 1420);
		assert_eq!(template.fake_packets, "1-3");
		assert_eq!(template.local_address, "172.16.0.2/32");
	}

	#[test]
	fn port_outside_range_is_rejected_by_parser() {
		assert!(Args::try_parse_from(["wgrotate", "--port", "80"]).is_err());
	}

	#[test]
	fn explicit_endpoint_flags_are_used() {
		let args = parse(&["--address", "2606:4700:d0::1", "--port", "54321"]);
		let endpoint = args.endpoint_source().discover().unwrap();
		assert_eq!(endpoint.address(), "2606:4700:d0::1");
		assert_eq!(endpoint.port().get(), 54321);
	}
}
