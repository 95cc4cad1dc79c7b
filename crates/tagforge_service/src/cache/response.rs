use tagforge_db::{CacheEntry, NewCacheEntry, ResponseKind};

use crate::error::Result;

/// A same-origin response whose status, headers and body may be read and
/// rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl BasicResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, headers, body }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// A new response with the same status and body and `name` set to
    /// `value`, replacing any existing header of that name.
    pub fn with_header(&self, name: &str, value: &str) -> Self {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case(name))
            .cloned()
            .collect();
        headers.push((name.to_string(), value.to_string()));
        Self { status: self.status, headers, body: self.body.clone() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A cross-origin response. Status, headers and body are unreadable;
/// it can only be stored and replayed.
#[derive(Clone, PartialEq, Eq)]
pub struct OpaqueResponse {
    body: Vec<u8>,
}

impl OpaqueResponse {
    pub fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    /// Streams the stored bytes to `out` unchanged.
    pub fn replay_to(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        out.write_all(&self.body)
    }
}

impl std::fmt::Debug for OpaqueResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OpaqueResponse")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentResponse {
    Basic(BasicResponse),
    Opaque(OpaqueResponse),
}

impl DocumentResponse {
    pub fn is_opaque(&self) -> bool {
        matches!(self, DocumentResponse::Opaque(_))
    }

    pub fn replay_to(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        match self {
            DocumentResponse::Basic(response) => out.write_all(&response.body),
            DocumentResponse::Opaque(response) => response.replay_to(out),
        }
    }

    pub(crate) fn to_entry(&self, namespace: &str, url: &str) -> NewCacheEntry {
        match self {
            DocumentResponse::Basic(response) => NewCacheEntry {
                namespace: namespace.to_string(),
                url: url.to_string(),
                kind: ResponseKind::Basic,
                status: response.status,
                headers: response.headers.clone(),
                body: response.body.clone(),
            },
            // Stored as-is: no status, no headers
            DocumentResponse::Opaque(response) => NewCacheEntry {
                namespace: namespace.to_string(),
                url: url.to_string(),
                kind: ResponseKind::Opaque,
                status: 0,
                headers: Vec::new(),
                body: response.body.clone(),
            },
        }
    }

    /// Rebuilds a stored response. Entries whose body no longer matches the
    /// recorded checksum are rejected.
    pub(crate) fn from_entry(entry: CacheEntry) -> Result<Self> {
        if !entry.is_intact() {
            return Err(tagforge_db::Error::CorruptEntry {
                url: entry.url,
                reason: "body does not match its checksum".to_string(),
            }
            .into());
        }
        let response = match entry.response_kind()? {
            ResponseKind::Opaque => DocumentResponse::Opaque(OpaqueResponse::new(entry.body)),
            ResponseKind::Basic => {
                let headers = entry.headers()?;
                DocumentResponse::Basic(BasicResponse::new(entry.status_code(), headers, entry.body))
            }
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_header_builds_new_response() {
        let original = BasicResponse::new(
            200,
            vec![
                ("Content-Type".to_string(), "application/pdf".to_string()),
                ("Content-Disposition".to_string(), "attachment".to_string()),
            ],
            b"%PDF".to_vec(),
        );

        let inline = original.with_header("content-disposition", "inline");
        assert_eq!(inline.header("Content-Disposition"), Some("inline"));
        assert_eq!(inline.header("content-type"), Some("application/pdf"));
        assert_eq!(inline.body, original.body);
        assert_eq!(original.header("Content-Disposition"), Some("attachment"));
    }

    #[test]
    fn test_opaque_replays_without_inspection() {
        let response = DocumentResponse::Opaque(OpaqueResponse::new(b"foreign bytes".to_vec()));
        let mut out = Vec::new();
        response.replay_to(&mut out).unwrap();
        assert_eq!(out, b"foreign bytes");
        assert_eq!(format!("{:?}", response), "Opaque(OpaqueResponse)");

        let entry = response.to_entry("docs-acme", "https://cdn.example.org/a.pdf");
        assert_eq!(entry.kind, ResponseKind::Opaque);
        assert!(entry.headers.is_empty());
    }

    #[test]
    fn test_from_entry_rejects_checksum_mismatch() {
        let stored = DocumentResponse::Basic(BasicResponse::new(200, vec![], b"%PDF-1.7".to_vec()))
            .to_entry("tagforge-docs-acme", "https://x/doc.pdf");
        let mut entry = CacheEntry {
            namespace: stored.namespace.clone(),
            url: stored.url.clone(),
            kind: "basic".to_string(),
            status: 200,
            headers_json: "[]".to_string(),
            body: stored.body.clone(),
            checksum: stored.checksum(),
            cached_at: chrono::Utc::now(),
        };
        assert!(DocumentResponse::from_entry(entry.clone()).is_ok());

        entry.body = b"%PDF-1.7 truncated".to_vec();
        assert!(DocumentResponse::from_entry(entry).is_err());
    }
}
