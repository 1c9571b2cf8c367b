// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tunnel configuration document and its file store.
//!
//! This crate provides:
//! - `ConfigDocument`, an order-preserving view over the JSON document
//! - helpers and a default template for wireguard outbounds
//! - `ConfigStore`, a self-healing loader with atomic saves

pub mod document;
pub mod error;
pub mod outbound;
pub mod store;

pub use document::{ConfigDocument, OutboundsShape, OUTBOUNDS_KEY};
pub use error::{DocumentError, StoreError};
pub use outbound::{
	is_wireguard, outbound_tag, outbound_type, WireGuardOutbound, WireGuardTemplate, WIREGUARD_TYPE,
};
pub use store::{
	ConfigStore, DocumentSource, Fallback, FallbackReason, LoadedDocument, DEFAULT_STORE_FILE,
	DEFAULT_TEMPLATE_FILE, STORE_MODE,
};
