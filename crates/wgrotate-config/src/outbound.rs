// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outbound entries and the default WireGuard template.

use serde::Deserialize;
use serde_json::{json, Value};
use wgrotate_common::ServerPort;

pub const WIREGUARD_TYPE: &str = "wireguard";

/// Field names of a wireguard outbound that a reconciliation pass rewrites.
pub mod fields {
	pub const TYPE: &str = "type";
	pub const TAG: &str = "tag";
	pub const LOCAL_ADDRESS: &str = "local_address";
	pub const PRIVATE_KEY: &str = "private_key";
	pub const SERVER: &str = "server";
	pub const SERVER_PORT: &str = "server_port";
}

pub fn outbound_type(entry: &Value) -> Option<&str> {
	entry.get(fields::TYPE).and_then(Value::as_str)
}

pub fn outbound_tag(entry: &Value) -> Option<&str> {
	entry.get(fields::TAG).and_then(Value::as_str)
}

pub fn is_wireguard(entry: &Value) -> bool {
	outbound_type(entry) == Some(WIREGUARD_TYPE)
}

/// Values copied into a wireguard outbound when one has to be created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WireGuardTemplate {
	/// Fixed tunnel-side address, kept at `local_address[0]`.
	pub local_address: String,
	pub peer_public_key: String,
	pub reserved: Value,
	pub mtu: u32,
	pub fake_packets: String,
}

impl Default for WireGuardTemplate {
	fn default() -> Self {
		Self {
			local_address: "172.16.0.2/32".to_string(),
			peer_public_key: "bmXOC+F1FxEMF9dyiK2H5/1SUtzH0JuVo51h2wPfgyo=".to_string(),
			reserved: json!([0, 0, 0]),
			mtu: 1280,
			fake_packets: "5-10".to_string(),
		}
	}
}

impl WireGuardTemplate {
	pub fn instantiate(
		&self,
		tag: &str,
		address: &str,
		port: ServerPort,
		private_key: &str,
	) -> WireGuardOutbound {
		WireGuardOutbound {
			kind: WIREGUARD_TYPE.to_string(),
			tag: tag.to_string(),
			local_address: vec![self.local_address.clone(), address.to_string()],
			private_key: private_key.to_string(),
			server: address.to_string(),
			server_port: port.get(),
			peer_public_key: self.peer_public_key.clone(),
			reserved: self.reserved.clone(),
			mtu: self.mtu,
			fake_packets: self.fake_packets.clone(),
		}
	}
}

/// A complete wireguard outbound as it appears in the document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireGuardOutbound {
	#[serde(rename = "type")]
	pub kind: String,
	pub tag: String,
	pub local_address: Vec<String>,
	pub private_key: String,
	pub server: String,
	pub server_port: u16,
	pub peer_public_key: String,
	pub reserved: Value,
	pub mtu: u32,
	pub fake_packets: String,
}

impl From<WireGuardOutbound> for Value {
	fn from(outbound: WireGuardOutbound) -> Self {
		json!({
			"type": outbound.kind,
			"tag": outbound.tag,
			"local_address": outbound.local_address,
			"private_key": outbound.private_key,
			"server": outbound.server,
			"server_port": outbound.server_port,
			"peer_public_key": outbound.peer_public_key,
			"reserved": outbound.reserved,
			"mtu": outbound.mtu,
			"fake_packets": outbound.fake_packets,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_entries() {
		let wg = json!({"type": "wireguard", "tag": "Main"});
		let direct = json!({"type": "direct", "tag": "direct"});
		let untyped = json!({"tag": "x"});

		assert!(is_wireguard(&wg));
		assert!(!is_wireguard(&direct));
		assert!(!is_wireguard(&untyped));
		assert!(!is_wireguard(&json!("wireguard")));
		assert_eq!(outbound_tag(&wg), Some("Main"));
		assert_eq!(outbound_tag(&untyped), Some("x"));
	}

	#[test]
	fn instantiate_fills_every_field() {
		let port = ServerPort::new(54321).unwrap();
		let outbound =
			WireGuardTemplate::default().instantiate("Main", "2606:4700:d0::1", port, "newkey");
		let value = Value::from(outbound.clone());

		assert_eq!(
			value,
			json!({
				"type": "wireguard",
				"tag": "Main",
				"local_address": ["172.16.0.2/32", "2606:4700:d0::1"],
				"private_key": "newkey",
				"server": "2606:4700:d0::1",
				"server_port": 54321,
				"peer_public_key": "bmXOC+F1FxEMF9dyiK2H5/1SUtzH0JuVo51h2wPfgyo=",
				"reserved": [0, 0, 0],
				"mtu": 1280,
				"fake_packets": "5-10",
			})
		);

		let parsed: WireGuardOutbound = serde_json::from_value(value).unwrap();
		assert_eq!(parsed, outbound);
	}

	#[test]
	fn template_fields_default_individually() {
		let template: WireGuardTemplate = serde_json::from_value(json!({"mtu": 1420})).unwrap();
		assert_eq!(template.mtu, 1420);
		assert_eq!(template.fake_packets, "5-10");
	}
}
