use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartRejection};

use crate::error::Result;
use crate::staging::UploadedImage;

/// The file parts of a multipart request, keyed by field name.
///
/// Only parts that carry a filename count as files; plain text fields are
/// ignored. When a field name repeats, the first part wins.
#[derive(Debug, Default)]
pub(super) struct UploadForm {
    files: HashMap<String, UploadedImage>,
}

impl UploadForm {
    /// Collect the file parts of the request.
    ///
    /// A body that is not multipart at all yields an empty form, so the
    /// handler reports the missing field rather than a content-type error.
    pub async fn read(multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<Self> {
        let mut multipart = match multipart {
            Ok(multipart) => multipart,
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Request is not a multipart upload");
                return Ok(Self::default());
            }
        };

        let mut files = HashMap::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };
            let name = field.name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;

            files
                .entry(name)
                .or_insert_with(|| UploadedImage::new(file_name, bytes));
        }

        Ok(Self { files })
    }

    pub fn take(&mut self, name: &str) -> Option<UploadedImage> {
        self.files.remove(name)
    }
}
