// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use thiserror::Error;
use tracing::instrument;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::secret::{Secret, SecretString};

/// Written in place of a private key when none could be generated.
///
/// It is not valid base64, so anything that parses the key downstream fails
/// loudly instead of silently using a stale key.
pub const SENTINEL_PRIVATE_KEY: &str = "INVALID-KEY-GENERATION-FAILED";

#[derive(Error, Debug)]
pub enum KeyError {
	#[error("entropy source unavailable: {0}")]
	Entropy(#[from] rand::Error),
}

pub type Result<T> = std::result::Result<T, KeyError>;

#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct WgPrivateKey {
	bytes: [u8; 32],
}

impl WgPrivateKey {
	/// Draw a fresh Curve25519 private key from the OS RNG, clamped the same
	/// way `wg genkey` clamps it.
	pub fn generate() -> Result<Self> {
		let mut bytes = [0u8; 32];
		OsRng.try_fill_bytes(&mut bytes)?;
		Ok(Self::from_bytes(bytes))
	}

	pub fn from_bytes(mut bytes: [u8; 32]) -> Self {
		bytes[0] &= 248;
		bytes[31] &= 127;
		bytes[31] |= 64;
		Self { bytes }
	}

	pub fn to_base64(&self) -> SecretString {
		Secret::new(STANDARD.encode(self.bytes))
	}

	pub fn public_key(&self) -> WgPublicKey {
		let secret = StaticSecret::from(self.bytes);
		let public = PublicKey::from(&secret);
		WgPublicKey {
			bytes: *public.as_bytes(),
		}
	}
}

impl fmt::Debug for WgPrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WgPrivateKey")
			.field("bytes", &"[REDACTED]")
			.finish()
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WgPublicKey {
	bytes: [u8; 32],
}

impl WgPublicKey {
	pub fn to_base64(&self) -> String {
		STANDARD.encode(self.bytes)
	}

}

impl fmt::Debug for WgPublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let b64 = self.to_base64();
		f.debug_struct("WgPublicKey")
			.field("prefix", &format!("{}...", &b64[..8]))
			.finish()
	}
}

impl fmt::Display for WgPublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_base64())
	}
}

/// Source of private key material for a reconciliation pass.
pub trait KeyGenerator {
	fn generate(&self) -> Result<WgPrivateKey>;
}

/// Generates keys locally with x25519, no external `wg` binary needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct X25519KeyGenerator;

impl KeyGenerator for X25519KeyGenerator {
	#[instrument(skip(self))]
	fn generate(&self) -> Result<WgPrivateKey> {
		WgPrivateKey::generate()
	}
}
