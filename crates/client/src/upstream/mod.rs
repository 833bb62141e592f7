// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests to the backend API: decoration, sending, and account flows.

pub mod account;
pub mod client;
pub mod decorate;
pub mod request;

pub use client::ApiClient;
pub use request::{ApiRequest, RequestBody};
