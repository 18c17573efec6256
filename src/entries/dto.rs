use bytes::Bytes;

/// Raw multipart submission of the entry form, before validation.
#[derive(Debug, Default)]
pub struct EntrySubmission {
    pub authorised_person: Option<String>,
    pub employee_id: Option<String>,
    pub final_batch_number: Option<String>,
    pub batch_quantity: Option<String>,
    pub urea_percentage: Option<String>,
    pub density: Option<String>,
    pub photo: Option<PhotoUpload>,
}

#[derive(Debug)]
pub struct PhotoUpload {
    pub file_name: String, // as sent by the browser
    pub body: Bytes,
}
