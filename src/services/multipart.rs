use crate::models::SelectedFile;
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use url::Url;

/// A POST of one multipart body: every file attached under the same field name.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub endpoint: Url,
    pub field_name: String,
    pub parts: Vec<SelectedFile>,
}

impl UploadRequest {
    pub fn new(endpoint: Url, field_name: impl Into<String>, parts: Vec<SelectedFile>) -> Self {
        Self {
            endpoint,
            field_name: field_name.into(),
            parts,
        }
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.parts.iter().map(SelectedFile::size).sum()
    }

    /// Part names and file names in the order they are written to the body.
    pub fn layout(&self) -> Vec<(&str, &str)> {
        self.parts
            .iter()
            .map(|file| (self.field_name.as_str(), file.name.as_str()))
            .collect()
    }

    /// Serializes the parts into a reqwest form. Part order follows selection order.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let field_name = self.field_name;
        self.parts.into_iter().try_fold(Form::new(), |form, file| {
            let length = file.content.len() as u64;
            let part = Part::stream_with_length(Body::from(file.content), length)
                .file_name(file.name)
                .mime_str(file.mime.as_ref())?;
            Ok(form.part(field_name.clone(), part))
        })
    }
}
