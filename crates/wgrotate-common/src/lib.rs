// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod discovery;
pub mod endpoint;
pub mod keys;
pub mod secret;

pub use discovery::{
	DiscoveryError, EndpointSource, EnvEndpointSource, ADDRESS_ENV, DEFAULT_ADDRESS, PORT_ENV,
};
pub use endpoint::{EndpointDescriptor, EndpointError, ServerPort, MAX_PORT, MIN_PORT};
pub use keys::{
	KeyError, KeyGenerator, WgPrivateKey, WgPublicKey, X25519KeyGenerator, SENTINEL_PRIVATE_KEY,
};
pub use secret::{Secret, SecretString, REDACTED};
