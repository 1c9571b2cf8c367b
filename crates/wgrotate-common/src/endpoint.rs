// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use rand::Rng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_PORT: u16 = 1024;
pub const MAX_PORT: u16 = 65535;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EndpointError {
	#[error("endpoint address is empty")]
	EmptyAddress,

	#[error("port {0} is outside {min}-{max}", min = MIN_PORT, max = MAX_PORT)]
	PortOutOfRange(u64),

	#[error("invalid port: {0:?}")]
	InvalidPort(String),
}

/// A UDP port in the unprivileged range the tunnel config accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerPort(u16);

impl ServerPort {
	pub fn new(port: u16) -> Result<Self, EndpointError> {
		if port < MIN_PORT {
			return Err(EndpointError::PortOutOfRange(port as u64));
		}
		Ok(Self(port))
	}

	/// A uniformly random port in `MIN_PORT..=MAX_PORT`.
	pub fn random() -> Self {
		Self::random_with(&mut rand::thread_rng())
	}

	pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
		Self(rng.gen_range(MIN_PORT..=MAX_PORT))
	}

	pub fn get(self) -> u16 {
		self.0
	}
}

impl TryFrom<u64> for ServerPort {
	type Error = EndpointError;

	fn try_from(value: u64) -> Result<Self, Self::Error> {
		let port = u16::try_from(value).map_err(|_| EndpointError::PortOutOfRange(value))?;
		Self::new(port)
	}
}

impl FromStr for ServerPort {
	type Err = EndpointError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let value: u64 = s
			.trim()
			.parse()
			.map_err(|_| EndpointError::InvalidPort(s.to_string()))?;
		Self::try_from(value)
	}
}

impl fmt::Display for ServerPort {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Where the tunnel should connect: an address literal and a port.
///
/// The address is kept as the string discovery produced. No address-family
/// check is done here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
	address: String,
	port: ServerPort,
}

impl EndpointDescriptor {
	pub fn new(address: impl Into<String>, port: ServerPort) -> Result<Self, EndpointError> {
		let address = address.into().trim().to_string();
		if address.is_empty() {
			return Err(EndpointError::EmptyAddress);
		}
		Ok(Self { address, port })
	}

	pub fn address(&self) -> &str {
		&self.address
	}

	pub fn port(&self) -> ServerPort {
		self.port
	}
}

impl fmt::Display for EndpointDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.address.contains(':') {
			write!(f, "[{}]:{}", self.address, self.port)
		} else {
			write!(f, "{}:{}", self.address, self.port)
		}
	}
}
