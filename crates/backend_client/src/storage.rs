//! Evidence uploads.
//!
//! Files are validated client side before any bytes leave the browser:
//! only video and audio, and never more than [`MAX_EVIDENCE_BYTES`].

use tracing::info_span;
use uuid::Uuid;

use crate::transport;
use crate::{Backend, BackendError};

/// Upper bound on an evidence file, 100 MB.
pub const MAX_EVIDENCE_BYTES: usize = 100 * 1024 * 1024;

const EVIDENCE_BUCKET: &str = "evidence";

/// Accepted evidence media classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvidenceKind {
    Video,
    Audio,
}

impl EvidenceKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Video => "video",
            EvidenceKind::Audio => "audio",
        }
    }

    /// Classifies a MIME content type, rejecting anything that is not
    /// video or audio.
    pub fn classify(content_type: &str) -> Option<EvidenceKind> {
        if content_type.starts_with("video/") {
            Some(EvidenceKind::Video)
        } else if content_type.starts_with("audio/") {
            Some(EvidenceKind::Audio)
        } else {
            None
        }
    }
}

/// A stored evidence object.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedEvidence {
    pub url: String,
    pub kind: EvidenceKind,
}

fn validate(content_type: &str, len: usize) -> Result<EvidenceKind, BackendError> {
    let kind = EvidenceKind::classify(content_type).ok_or_else(|| {
        BackendError::Validation("only video and audio files are allowed".to_string())
    })?;
    if len > MAX_EVIDENCE_BYTES {
        return Err(BackendError::Validation(
            "file size must be less than 100MB".to_string(),
        ));
    }
    Ok(kind)
}

/// Builds a collision-free object path, keeping a short alphanumeric
/// extension from the original file name when it has one.
fn object_path(file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

impl Backend {
    /// Uploads an evidence file and returns its public URL.
    ///
    /// # Errors
    /// Returns [`BackendError::Validation`] when the file is not an
    /// acceptable media type or exceeds the size limit, and a transport or
    /// API error when the upload itself fails.
    pub async fn upload_evidence(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedEvidence, BackendError> {
        let kind = validate(content_type, bytes.len())?;
        let object = object_path(file_name);
        let url = self.endpoint(&format!("/storage/v1/object/{EVIDENCE_BUCKET}/{object}"))?;

        let span = info_span!("backend.upload_evidence", http.method = "POST", url = %url);
        transport::send(
            self.with_auth(self.http().post(&url))
                .header("Content-Type", content_type)
                .body(bytes),
            span,
        )
        .await?;

        let public_url = self.endpoint(&format!(
            "/storage/v1/object/public/{EVIDENCE_BUCKET}/{object}"
        ))?;
        Ok(UploadedEvidence {
            url: public_url,
            kind,
        })
    }
}
