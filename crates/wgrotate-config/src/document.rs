// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The tunnel configuration document.
//!
//! Only `outbounds` is interpreted. Every other top-level key is carried as
//! opaque JSON, and object key order survives a load/save cycle.

use serde_json::{Map, Value};

use crate::error::DocumentError;

pub const OUTBOUNDS_KEY: &str = "outbounds";

/// What [`ConfigDocument::repair_outbounds`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundsShape {
	/// `outbounds` was already a sequence
	Intact,
	/// `outbounds` was absent and has been added as `[]`
	Missing,
	/// `outbounds` held some other JSON kind and has been replaced with `[]`
	WrongShape(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
	root: Map<String, Value>,
}

impl Default for ConfigDocument {
	fn default() -> Self {
		Self::skeleton()
	}
}

impl ConfigDocument {
	/// The minimal document: `{"outbounds": []}`.
	pub fn skeleton() -> Self {
		let mut root = Map::new();
		root.insert(OUTBOUNDS_KEY.to_string(), Value::Array(Vec::new()));
		Self { root }
	}

	pub fn parse(content: impl AsRef<[u8]>) -> Result<Self, DocumentError> {
		let value: Value = serde_json::from_slice(content.as_ref())?;
		Self::from_value(value)
	}

	pub fn from_value(value: Value) -> Result<Self, DocumentError> {
		match value {
			Value::Object(root) => Ok(Self { root }),
			other => Err(DocumentError::NotAnObject(json_kind(&other))),
		}
	}

	/// Two-space indented JSON with a trailing newline.
	pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
		let mut json = serde_json::to_string_pretty(&self.root)?;
		json.push('\n');
		Ok(json)
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.root.get(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.root.keys().map(String::as_str)
	}

	/// The outbound list, or `None` when it is absent or not a sequence.
	pub fn outbounds(&self) -> Option<&Vec<Value>> {
		self.root.get(OUTBOUNDS_KEY).and_then(Value::as_array)
	}

	/// Make sure `outbounds` exists and is a sequence.
	///
	/// A misshapen value is replaced where it sits, so the position of the key
	/// among its siblings does not change.
	pub fn repair_outbounds(&mut self) -> OutboundsShape {
		let shape = match self.root.get(OUTBOUNDS_KEY) {
			Some(Value::Array(_)) => return OutboundsShape::Intact,
			Some(other) => OutboundsShape::WrongShape(json_kind(other)),
			None => OutboundsShape::Missing,
		};
		self.root
			.insert(OUTBOUNDS_KEY.to_string(), Value::Array(Vec::new()));
		shape
	}

	/// Mutable access to the outbound list, repairing it first if needed.
	pub fn outbounds_mut(&mut self) -> &mut Vec<Value> {
		self.repair_outbounds();
		match self.root.get_mut(OUTBOUNDS_KEY) {
			Some(Value::Array(outbounds)) => outbounds,
			_ => unreachable!("outbounds was just repaired into an array"),
		}
	}
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn skeleton_has_empty_outbounds() {
		let doc = ConfigDocument::skeleton();
		assert_eq!(doc.outbounds(), Some(&Vec::new()));
		assert_eq!(doc.to_pretty_json().unwrap(), "{\n  \"outbounds\": []\n}\n");
	}

	#[test]
	fn parse_rejects_non_object_root() {
		let err = ConfigDocument::parse("[1, 2]").unwrap_err();
		assert!(matches!(err, DocumentError::NotAnObject("array")));
	}

	#[test]
	fn parse_rejects_invalid_json() {
		let err = ConfigDocument::parse("{\"outbounds\": [").unwrap_err();
		assert!(matches!(err, DocumentError::Parse(_)));
	}

	#[test]
	fn top_level_key_order_survives_roundtrip() {
		let content = r#"{"log":{"level":"warn"},"route":{"final":"Main"},"outbounds":[],"dns":{}}"#;
		let doc = ConfigDocument::parse(content).unwrap();
		let keys: Vec<_> = doc.keys().collect();
		assert_eq!(keys, vec!["log", "route", "outbounds", "dns"]);

		let reparsed = ConfigDocument::parse(&doc.to_pretty_json().unwrap()).unwrap();
		assert_eq!(reparsed, doc);
		assert_eq!(reparsed.keys().collect::<Vec<_>>(), keys);
	}

	#[test]
	fn number_literals_are_written_back_verbatim() {
		let content = r#"{"outbounds": [{"type": "direct", "x": 123456789012345678901234567890, "y": 1e3, "z": -0.50}]}"#;
		let json = ConfigDocument::parse(content).unwrap().to_pretty_json().unwrap();
		assert!(json.contains("\"x\": 123456789012345678901234567890,"));
		assert!(json.contains("\"y\": 1e3,"));
		assert!(json.contains("\"z\": -0.50\n"));
	}

	#[test]
	fn missing_outbounds_is_appended() {
		let mut doc = ConfigDocument::from_value(json!({"route": {}})).unwrap();
		assert_eq!(doc.repair_outbounds(), OutboundsShape::Missing);
		assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["route", "outbounds"]);
		assert_eq!(doc.repair_outbounds(), OutboundsShape::Intact);
	}

	#[test]
	fn scalar_outbounds_is_replaced_in_place() {
		let mut doc =
			ConfigDocument::from_value(json!({"outbounds": "oops", "route": {}})).unwrap();
		assert!(doc.outbounds().is_none());

		let shape = doc.repair_outbounds();
		assert_eq!(shape, OutboundsShape::WrongShape("string"));
		assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["outbounds", "route"]);
		assert_eq!(doc.outbounds(), Some(&Vec::new()));
	}

	#[test]
	fn outbounds_mut_repairs_silently() {
		let mut doc = ConfigDocument::from_value(json!({"outbounds": null})).unwrap();
		doc.outbounds_mut().push(json!({"type": "direct"}));
		assert_eq!(doc.get(OUTBOUNDS_KEY), Some(&json!([{"type": "direct"}])));
	}

	fn scalar() -> impl Strategy<Value = Value> {
		prop_oneof![
			Just(Value::Null),
			any::<bool>().prop_map(Value::from),
			any::<i64>().prop_map(Value::from),
			"[a-z]{0,8}".prop_map(Value::from),
		]
	}

	proptest! {
		#[test]
		fn repair_always_yields_a_list_and_keeps_siblings(
			outbounds in proptest::option::of(scalar()),
			siblings in proptest::collection::btree_map("[a-n]{1,6}", scalar(), 0..5),
		) {
			let mut root = Map::new();
			for (key, value) in &siblings {
				root.insert(key.clone(), value.clone());
			}
			if let Some(outbounds) = outbounds {
				root.insert(OUTBOUNDS_KEY.to_string(), outbounds);
			}
			let mut doc = ConfigDocument::from_value(Value::Object(root)).unwrap();

			prop_assert_ne!(doc.repair_outbounds(), OutboundsShape::Intact);
			prop_assert_eq!(doc.outbounds(), Some(&Vec::new()));
			for (key, value) in &siblings {
				prop_assert_eq!(doc.get(key), Some(value));
			}
		}
	}
}
