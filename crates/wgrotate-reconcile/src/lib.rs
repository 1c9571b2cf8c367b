// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reconciliation of a tunnel configuration document with a fresh endpoint.
//!
//! A pass selects wireguard outbounds according to a [`SelectionPolicy`],
//! rewrites their `server`, `server_port`, `local_address[1]` and
//! `private_key`, and reports anything it had to repair or skip.

pub mod policy;
pub mod reconciler;
pub mod report;

pub use policy::{SelectionPolicy, DEFAULT_TAG};
pub use reconciler::Reconciler;
pub use report::{Diagnostic, EntryRef, ReconcileReport};
