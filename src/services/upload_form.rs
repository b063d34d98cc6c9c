use crate::config::UploadConfig;
use crate::models::SelectedFile;
use crate::services::multipart::UploadRequest;
use crate::services::transport::UploadTransport;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Which branch a submit took. Nothing here is an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    NothingSelected,
    Uploaded { status: u16 },
    Rejected { status: u16, status_text: String },
    TransportFailed { message: String },
}

impl SubmitOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, SubmitOutcome::Uploaded { .. })
    }
}

/// A file picker plus submit action, holding the Selected File Set.
///
/// One component covers both the multi-file form and the single-file form;
/// the difference lives in [`UploadConfig`]. The selection is replaced on every
/// non-empty pick and is never cleared by a submit.
pub struct UploadForm {
    config: UploadConfig,
    transport: Arc<dyn UploadTransport>,
    selection: Vec<SelectedFile>,
}

impl UploadForm {
    pub fn new(config: UploadConfig, transport: Arc<dyn UploadTransport>) -> Self {
        Self {
            config,
            transport,
            selection: Vec::new(),
        }
    }

    pub fn selection(&self) -> &[SelectedFile] {
        &self.selection
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Replaces the selection with `files`. An empty pick keeps what was there.
    pub fn on_files_picked(&mut self, files: Vec<SelectedFile>) {
        if files.is_empty() {
            return;
        }

        for file in &files {
            debug!("Selected file: {}", file.name);
        }

        let mut files = files;
        if let Some(max) = self.config.max_files {
            if files.len() > max {
                warn!(
                    "Picked {} files but this form accepts {}; keeping the first {}",
                    files.len(),
                    max,
                    max
                );
                files.truncate(max);
            }
        }

        self.selection = files;
    }

    /// Sends the selection as one multipart POST and logs how it went.
    pub async fn on_submit(&self) -> SubmitOutcome {
        if self.selection.is_empty() {
            info!("Please select a file to upload.");
            return SubmitOutcome::NothingSelected;
        }

        let request = UploadRequest::new(
            self.config.endpoint.clone(),
            self.config.field_name.clone(),
            self.selection.clone(),
        );

        info!(
            "Uploading {} file(s), {} bytes, to {} as '{}'",
            request.part_count(),
            request.total_bytes(),
            self.config.endpoint,
            self.config.field_name
        );

        match self.transport.send(request).await {
            Ok(response) if response.is_success() => {
                info!("File uploaded successfully");
                SubmitOutcome::Uploaded {
                    status: response.status,
                }
            }
            Ok(response) => {
                error!("File upload failed: {}", response.status_text);
                SubmitOutcome::Rejected {
                    status: response.status,
                    status_text: response.status_text,
                }
            }
            Err(e) => {
                error!("Error uploading file: {}", e);
                SubmitOutcome::TransportFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}
