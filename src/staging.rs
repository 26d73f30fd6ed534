// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multipart staging to on-disk temporary files.

use {
    crate::DocsignError,
    axum::extract::Multipart,
    log::debug,
    std::{collections::HashMap, io::Write, path::Path},
    tempfile::NamedTempFile,
};

/// Uploaded form content staged to disk.
///
/// File parts are streamed chunk by chunk into process-unique temporary
/// files; contents are never buffered in memory. Other parts are retained
/// as string values. The temp files are owned by this value and removed
/// when it drops, so staged uploads are cleaned up on every exit path of a
/// request, including mid-stream failures.
#[derive(Default)]
pub struct StagedForm {
    files: HashMap<String, NamedTempFile>,
    values: HashMap<String, String>,
}

impl StagedForm {
    /// Consume a multipart body part by part.
    ///
    /// A part is staged as a file when its `Content-Disposition` carries a
    /// non-empty `filename` parameter. When a field name repeats, the last
    /// occurrence wins.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, DocsignError> {
        let mut form = Self::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| DocsignError::Multipart(e.to_string()))?
        {
            let name = match field.name() {
                Some(name) => name.to_string(),
                None => continue,
            };

            let is_file = field.file_name().map_or(false, |f| !f.is_empty());

            if is_file {
                let mut staged = NamedTempFile::new()?;

                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| DocsignError::Multipart(e.to_string()))?
                {
                    staged.write_all(&chunk)?;
                }
                staged.flush()?;

                debug!("staged part {:?} at {}", name, staged.path().display());
                form.files.insert(name, staged);
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| DocsignError::Multipart(e.to_string()))?;
                form.values.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Path of a staged file part, if that field was uploaded.
    pub fn file_path(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(|staged| staged.path())
    }

    /// Value of a non-file part.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|value| value.as_str())
    }
}
