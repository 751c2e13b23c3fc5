//! Pending photo attachments and their local previews.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

use super::DraftError;

/// Largest photo accepted for upload (10 MB).
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Stable handle for a pending photo, independent of its queue position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoHandle(Uuid);

impl PhotoHandle {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PhotoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A binary image waiting to be uploaded with the next submission.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingPhoto {
    handle: PhotoHandle,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PendingPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPhoto")
            .field("handle", &self.handle)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl PendingPhoto {
    /// Wrap a picked file. Nothing is checked until [`PendingPhoto::check`].
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            handle: PhotoHandle::generate(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reject anything that is not `image/*` or is larger than [`MAX_PHOTO_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NotAnImage`] or [`DraftError::PhotoTooLarge`].
    pub fn check(&self) -> Result<(), DraftError> {
        if !self.content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(DraftError::NotAnImage {
                file_name: self.file_name.clone(),
                content_type: self.content_type.clone(),
            });
        }
        if self.bytes.len() > MAX_PHOTO_BYTES {
            return Err(DraftError::PhotoTooLarge {
                file_name: self.file_name.clone(),
                size: self.bytes.len(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn handle(&self) -> PhotoHandle {
        self.handle
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Build the `data:` URL preview shown next to the pending photo.
    #[must_use]
    pub fn preview(&self) -> PhotoPreview {
        PhotoPreview {
            handle: self.handle,
            data_url: format!(
                "data:{};base64,{}",
                self.content_type,
                STANDARD.encode(&self.bytes)
            ),
        }
    }
}

/// Locally generated preview of a pending photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPreview {
    pub handle: PhotoHandle,
    pub data_url: String,
}

/// A file that was refused during intake, with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPhoto {
    pub file_name: String,
    pub reason: DraftError,
}

/// Outcome of a batch intake (file picker or drag-and-drop).
///
/// Intake is partial: valid files are accepted even when others in the
/// same batch are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeReport {
    pub accepted: Vec<PhotoHandle>,
    pub rejected: Vec<RejectedPhoto>,
}

impl IntakeReport {
    /// User-visible message for the batch, if anything was refused.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.rejected.as_slice() {
            [] => None,
            [only] => Some(only.reason.to_string()),
            many => Some(format!(
                "{} files were skipped: {}",
                many.len(),
                many.iter()
                    .map(|r| r.reason.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_images_up_to_limit() {
        let photo = PendingPhoto::new("room.jpg", "image/jpeg", vec![0; MAX_PHOTO_BYTES]);
        assert!(photo.check().is_ok());
    }

    #[test]
    fn test_check_rejects_non_images() {
        let photo = PendingPhoto::new("lease.pdf", "application/pdf", vec![1, 2, 3]);
        assert!(matches!(photo.check(), Err(DraftError::NotAnImage { .. })));
    }

    #[test]
    fn test_check_rejects_oversized() {
        let photo = PendingPhoto::new("huge.png", "image/png", vec![0; MAX_PHOTO_BYTES + 1]);
        assert!(matches!(photo.check(), Err(DraftError::PhotoTooLarge { .. })));
    }

    #[test]
    fn test_preview_is_data_url() {
        let photo = PendingPhoto::new("a.png", "image/png", b"abc".to_vec());
        let preview = photo.preview();
        assert_eq!(preview.data_url, "data:image/png;base64,YWJj");
        assert_eq!(preview.handle, photo.handle());
    }

    #[test]
    fn test_debug_omits_bytes() {
        let photo = PendingPhoto::new("a.png", "image/png", vec![7; 64]);
        let debug = format!("{photo:?}");
        assert!(debug.contains("size: 64"));
        assert!(!debug.contains("7, 7"));
    }

    #[test]
    fn test_intake_message() {
        let mut report = IntakeReport::default();
        assert!(report.message().is_none());

        report.rejected.push(RejectedPhoto {
            file_name: "a.pdf".into(),
            reason: DraftError::NotAnImage {
                file_name: "a.pdf".into(),
                content_type: "application/pdf".into(),
            },
        });
        assert_eq!(
            report.message().unwrap(),
            "a.pdf: please upload only image files"
        );
    }
}
