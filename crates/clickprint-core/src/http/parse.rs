//! Parse backend response bodies.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UploadEnvelope {
    #[serde(default)]
    data: Option<UploadData>,
    #[serde(default)]
    hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    #[serde(default)]
    hash: Option<String>,
}

/// Extract the hash the server reports for an upload.
///
/// Accepts `{"data": {"hash": ".."}}` and a bare `{"hash": ".."}`. Returns
/// `Ok(None)` when the JSON carries no hash, `Err` when the body is not JSON.
pub(crate) fn parse_upload_response(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    let env: UploadEnvelope = serde_json::from_slice(body)?;
    let hash = env.data.and_then(|d| d.hash).or(env.hash);
    Ok(hash.map(|h| h.trim().to_ascii_lowercase()))
}
