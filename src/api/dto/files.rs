use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub bucket: String,
    pub object: String,
}
