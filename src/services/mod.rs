pub mod multipart;
pub mod transport;
pub mod upload_form;
