// SPDX-FileCopyrightText: 2026 Fabrica Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AWS Signature Version 4 request signing for the S3 gateway.
//!
//! Implements header-based signing for PUT/GET/LIST calls and
//! query-string signing for presigned GET URLs. Only the pieces the
//! gateway needs are implemented; the service is always `s3`.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Static credentials used for signing.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Headers produced by signing one request.
pub(crate) struct SignedHeaders {
    pub amz_date: String,
    pub payload_hash: String,
    pub authorization: String,
}

/// Signs a request with the `Authorization` header scheme.
///
/// `canonical_path` must already be in canonical form (absolute,
/// segment-encoded); `query` entries are encoded and sorted here, so the
/// caller must build the request URL from the same encoding (see
/// [`canonical_query_string`]).
pub(crate) fn sign_request(
    creds: &Credentials,
    region: &str,
    method: &str,
    host: &str,
    canonical_path: &str,
    query: &[(String, String)],
    payload: &[u8],
    now: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let datestamp = now.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(payload);

    let canonical_headers = format!(
        "host:{host}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n"
    );
    let signed_headers = "host;x-amz-content-sha256;x-amz-date";

    let canonical_request = format!(
        "{method}\n{canonical_path}\n{}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        canonical_query_string(query)
    );

    let scope = format!("{datestamp}/{region}/{SERVICE}/aws4_request");
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(&creds.secret_access_key, &datestamp, region);
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        creds.access_key_id
    );

    SignedHeaders {
        amz_date,
        payload_hash,
        authorization,
    }
}

/// Builds a presigned GET URL valid for `expires_secs`.
///
/// Query-string signing with `UNSIGNED-PAYLOAD`; only the `host` header
/// is signed, which is what makes the URL usable from any client.
pub(crate) fn presign_get_url(
    creds: &Credentials,
    region: &str,
    endpoint: &str,
    host: &str,
    canonical_path: &str,
    expires_secs: u64,
    now: DateTime<Utc>,
) -> String {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let datestamp = now.format("%Y%m%d").to_string();
    let scope = format!("{datestamp}/{region}/{SERVICE}/aws4_request");

    let query: Vec<(String, String)> = vec![
        ("X-Amz-Algorithm".into(), ALGORITHM.into()),
        (
            "X-Amz-Credential".into(),
            format!("{}/{scope}", creds.access_key_id),
        ),
        ("X-Amz-Date".into(), amz_date.clone()),
        ("X-Amz-Expires".into(), expires_secs.to_string()),
        ("X-Amz-SignedHeaders".into(), "host".into()),
    ];
    let canonical_query = canonical_query_string(&query);

    let canonical_request = format!(
        "GET\n{canonical_path}\n{canonical_query}\nhost:{host}\n\nhost\n{UNSIGNED_PAYLOAD}"
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(&creds.secret_access_key, &datestamp, region);
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    format!("{endpoint}{canonical_path}?{canonical_query}&X-Amz-Signature={signature}")
}

/// Encodes and sorts query parameters into canonical form. The returned
/// string doubles as the literal query string of the request.
pub(crate) fn canonical_query_string(query: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (uri_encode(k, true), uri_encode(v, true)))
        .collect();
    encoded.sort();
    encoded
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical absolute path for a bucket/key pair, with each path segment
/// URI-encoded (slashes preserved as separators).
pub(crate) fn canonical_path(bucket: &str, key: &str) -> String {
    let mut path = format!("/{}", uri_encode(bucket, false));
    for segment in key.split('/') {
        path.push('/');
        path.push_str(&uri_encode(segment, false));
    }
    path
}

/// AWS-style URI encoding: unreserved characters (`A-Za-z0-9-._~`) pass
/// through, everything else becomes uppercase percent escapes. `/` is
/// only encoded inside query values.
pub(crate) fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Derives the per-day signing key: HMAC chain over date, region,
/// service, and the `aws4_request` terminator.
fn signing_key(secret: &str, datestamp: &str, region: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), datestamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}
