// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable request description.
//!
//! A `reqwest::RequestBuilder` is consumed by `send`, so the client keeps the
//! request as plain data and builds a fresh builder for the original send and
//! for the replay after a renewal.

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Raw { content_type: String, data: Bytes },
}

/// A request relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn raw(mut self, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.body = RequestBody::Raw { content_type: content_type.into(), data: data.into() };
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Absolute URL for this request under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        if self.path.starts_with('/') {
            format!("{}{}", base_url, self.path)
        } else {
            format!("{}/{}", base_url, self.path)
        }
    }

    /// Build an undecorated `reqwest` builder for one send.
    pub(crate) fn to_builder(
        &self,
        http: &reqwest::Client,
        base_url: &str,
    ) -> reqwest::RequestBuilder {
        let mut req = http.request(self.method.clone(), self.url(base_url));
        if !self.query.is_empty() {
            req = req.query(&self.query);
        }
        match &self.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(value),
            RequestBody::Form(fields) => req.form(fields),
            RequestBody::Raw { content_type, data } => {
                req.header(reqwest::header::CONTENT_TYPE, content_type.as_str()).body(data.clone())
            }
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
