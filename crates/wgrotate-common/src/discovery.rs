// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Endpoint discovery collaborators.
//!
//! Picking the "best" address is done elsewhere (a scanner run by the
//! scheduler, usually); the result reaches this process through explicit
//! overrides or the `BEST_IPV6` / `BEST_PORT` environment variables.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::endpoint::{EndpointDescriptor, EndpointError, ServerPort};

pub const DEFAULT_ADDRESS: &str = "2606:4700:d0::1";
pub const ADDRESS_ENV: &str = "BEST_IPV6";
pub const PORT_ENV: &str = "BEST_PORT";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiscoveryError {
	#[error("invalid endpoint from {source_name}: {error}")]
	Invalid {
		source_name: String,
		#[source]
		error: EndpointError,
	},
}

pub trait EndpointSource {
	fn discover(&self) -> Result<EndpointDescriptor, DiscoveryError>;
}

/// Resolves the endpoint from explicit overrides first, then the environment,
/// then [`DEFAULT_ADDRESS`] and a random port.
#[derive(Debug, Clone, Default)]
pub struct EnvEndpointSource {
	address: Option<String>,
	port: Option<ServerPort>,
}

impl EnvEndpointSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_address(mut self, address: impl Into<String>) -> Self {
		self.address = Some(address.into());
		self
	}

	pub fn with_port(mut self, port: ServerPort) -> Self {
		self.port = Some(port);
		self
	}

	fn resolve<F>(&self, lookup: F) -> Result<EndpointDescriptor, DiscoveryError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let (address, address_from) = match &self.address {
			Some(address) => (address.clone(), "override"),
			None => match lookup(ADDRESS_ENV).filter(|v| !v.trim().is_empty()) {
				Some(address) => (address, ADDRESS_ENV),
				None => (DEFAULT_ADDRESS.to_string(), "default"),
			},
		};

		let port = match self.port {
			Some(port) => port,
			None => match lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
				Some(raw) => raw.parse::<ServerPort>().map_err(|error| DiscoveryError::Invalid {
					source_name: PORT_ENV.to_string(),
					error,
				})?,
				None => ServerPort::random(),
			},
		};

		debug!(address = %address, address_from, port = port.get(), "resolved endpoint");

		EndpointDescriptor::new(address, port).map_err(|error| DiscoveryError::Invalid {
			source_name: address_from.to_string(),
			error,
		})
	}
}

impl EndpointSource for EnvEndpointSource {
	#[instrument(skip(self))]
	fn discover(&self) -> Result<EndpointDescriptor, DiscoveryError> {
		self.resolve(|name| std::env::var(name).ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn falls_back_to_default_address_and_random_port() {
		let endpoint = EnvEndpointSource::new().resolve(env(&[])).unwrap();
		assert_eq!(endpoint.address(), DEFAULT_ADDRESS);
		assert!(endpoint.port().get() >= 1024);
	}

	#[test]
	fn reads_environment() {
		let endpoint = EnvEndpointSource::new()
			.resolve(env(&[(ADDRESS_ENV, "2606:4700:d1::5"), (PORT_ENV, "40000")]))
			.unwrap();
		assert_eq!(endpoint.address(), "2606:4700:d1::5");
		assert_eq!(endpoint.port().get(), 40000);
	}

	#[test]
	fn blank_environment_values_are_ignored() {
		let endpoint = EnvEndpointSource::new()
			.resolve(env(&[(ADDRESS_ENV, "  "), (PORT_ENV, "")]))
			.unwrap();
		assert_eq!(endpoint.address(), DEFAULT_ADDRESS);
	}

	#[test]
	fn overrides_win_over_environment() {
		let endpoint = EnvEndpointSource::new()
			.with_address("2606:4700:d0::9")
			.with_port(ServerPort::new(2408).unwrap())
			.resolve(env(&[(ADDRESS_ENV, "::1"), (PORT_ENV, "40000")]))
			.unwrap();
		assert_eq!(endpoint.address(), "2606:4700:d0::9");
		assert_eq!(endpoint.port().get(), 2408);
	}

	#[test]
	fn out_of_range_port_is_a_typed_failure() {
		let err = EnvEndpointSource::new()
			.resolve(env(&[(PORT_ENV, "80")]))
			.unwrap_err();
		assert_eq!(
			err,
			DiscoveryError::Invalid {
				source_name: PORT_ENV.to_string(),
				error: EndpointError::PortOutOfRange(80),
			}
		);
	}

	#[test]
	fn empty_override_address_is_rejected() {
		let err = EnvEndpointSource::new()
			.with_address("")
			.resolve(env(&[]))
			.unwrap_err();
		assert!(matches!(
			err,
			DiscoveryError::Invalid {
				error: EndpointError::EmptyAddress,
				..
			}
		));
	}
}
