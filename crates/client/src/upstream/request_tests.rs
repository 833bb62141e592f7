// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    leading_slash = { "/skills/", "http://api.test/api/skills/" },
    no_leading_slash = { "skills/", "http://api.test/api/skills/" },
    nested = { "/accounts/works/3/", "http://api.test/api/accounts/works/3/" },
)]
fn url_joins_base_and_path(path: &str, expected: &str) {
    assert_eq!(ApiRequest::get(path).url("http://api.test/api"), expected);
}

#[test]
fn builder_carries_method_query_and_json_body() -> anyhow::Result<()> {
    crate::tls::ensure_crypto();
    let http = reqwest::Client::new();
    let request = ApiRequest::post("/projects/")
        .query("search", "logo design")
        .json(&serde_json::json!({ "title": "Poster" }))?;

    let built = request.to_builder(&http, "http://api.test/api").build()?;
    assert_eq!(built.method(), &Method::POST);
    assert_eq!(built.url().path(), "/api/projects/");
    assert_eq!(built.url().query(), Some("search=logo+design"));
    let body = built.body().and_then(|b| b.as_bytes()).unwrap_or_default();
    let json: serde_json::Value = serde_json::from_slice(body)?;
    assert_eq!(json["title"], "Poster");
    Ok(())
}

#[test]
fn rebuilding_does_not_consume_the_request() -> anyhow::Result<()> {
    crate::tls::ensure_crypto();
    let http = reqwest::Client::new();
    let request = ApiRequest::patch("/accounts/profile/").raw("text/plain", "bio");

    let first = request.to_builder(&http, "http://api.test").build()?;
    let second = request.to_builder(&http, "http://api.test").build()?;
    assert_eq!(first.url(), second.url());
    assert_eq!(
        second.headers().get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("text/plain")
    );
    Ok(())
}

#[test]
fn get_carries_query_string() -> anyhow::Result<()> {
    crate::tls::ensure_crypto();
    let http = reqwest::Client::new();
    let request = ApiRequest::get("/projects/").query("search", "poster");

    let built = request.to_builder(&http, "http://api.test/api").build()?;
    assert_eq!(built.method(), &Method::GET);
    assert_eq!(built.url().as_str(), "http://api.test/api/projects/?search=poster");
    assert!(built.body().is_none());
    Ok(())
}
