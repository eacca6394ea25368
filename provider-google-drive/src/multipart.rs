//! `multipart/related` bodies for Drive's multipart upload.
//!
//! Drive expects exactly two parts: JSON metadata first, then the media.

use bytes::Bytes;

/// `Content-Type` header value for a body built with `boundary`.
pub fn content_type(boundary: &str) -> String {
    format!("multipart/related; boundary={boundary}")
}

/// Build the two-part upload body.
pub fn related_body(boundary: &str, metadata_json: &[u8], mime_type: &str, data: &[u8]) -> Bytes {
    let mut body = Vec::with_capacity(metadata_json.len() + data.len() + 256);

    append_part(
        &mut body,
        boundary,
        "application/json; charset=UTF-8",
        metadata_json,
    );
    append_part(&mut body, boundary, mime_type, data);
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Bytes::from(body)
}

fn append_part(body: &mut Vec<u8>, boundary: &str, content_type: &str, content: &[u8]) {
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");
}
