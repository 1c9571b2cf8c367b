// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper that keeps private key material out of logs and status output.
//!
//! ```
//! use wgrotate_common::Secret;
//!
//! let key = Secret::new("cGF5bG9hZA==".to_string());
//!
//! assert_eq!(format!("{:?}", key), "Secret(\"[REDACTED]\")");
//! assert_eq!(format!("{}", key), "[REDACTED]");
//! assert_eq!(key.expose(), "cGF5bG9hZA==");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// The redaction placeholder used in all output.
pub const REDACTED: &str = "[REDACTED]";

/// A sensitive value with redacted Debug/Display that is zeroized on drop.
///
/// There is no `Deref`; callers must go through [`Secret::expose`].
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Explicitly access the inner value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_is_redacted() {
		let secret = Secret::new("oLd4wX3cKbq1Yw2ZqS+v0j2m8Pp5n3a9Tz1rR7bJmHs=".to_string());
		let debug_output = format!("{secret:?}");

		assert!(!debug_output.contains("oLd4wX3c"));
		assert!(debug_output.contains(REDACTED));
	}

	#[test]
	fn display_is_redacted() {
		let secret = Secret::new("private".to_string());
		assert_eq!(format!("{secret}"), REDACTED);
	}

	#[test]
	fn option_secret_debug_is_redacted() {
		let secret: Option<SecretString> = Some(Secret::new("private".to_string()));
		let debug = format!("{secret:?}");
		assert!(debug.contains(REDACTED));
		assert!(!debug.contains("private"));
	}

	#[test]
	fn equality_compares_inner_values() {
		let a = Secret::new("key".to_string());
		let b = Secret::new("key".to_string());
		let c = Secret::new("other".to_string());

		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(a.clone().expose(), "key");
	}

	proptest! {
		#[test]
		fn display_never_contains_secret(inner in "[a-zA-Z0-9+/=]{8,44}") {
			prop_assume!(!inner.contains("REDACTED"));

			let secret = Secret::new(inner.clone());
			let display_output = format!("{secret}");
			prop_assert!(!display_output.contains(&inner));
		}
	}
}
