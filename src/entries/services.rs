use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::PrimitiveDateTime;
use tracing::{error, info};
use unicode_normalization::UnicodeNormalization;

use super::{
    dto::EntrySubmission,
    repo::EntryRepo,
    repo_types::{NewEntry, ProductionEntry},
};
use crate::{clock, storage::StorageClient};

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("could not read form: {0}")]
    Upload(String),
    #[error("{field} is required")]
    MissingNumber { field: &'static str },
    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("could not store photo: {0:#}")]
    Storage(anyhow::Error),
    #[error("could not save entry: {0:#}")]
    Database(anyhow::Error),
}

lazy_static! {
    static ref UNSAFE_CHARS_RE: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Reduces a client-supplied filename to `[A-Za-z0-9_.-]`. Accents are folded
/// to their ASCII base, `/` and whitespace runs become `_`, and `.`/`_` are
/// trimmed from both ends.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS_RE.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `YYYYMMDDHHMMSS_<sanitized name>`.
pub fn stored_photo_name(original: &str, now: PrimitiveDateTime) -> String {
    format!("{}_{}", clock::compact(now), secure_filename(original))
}

fn parse_number(field: &'static str, raw: Option<&str>) -> Result<f64, EntryError> {
    let raw = raw.ok_or(EntryError::MissingNumber { field })?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| EntryError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Validates, stores the photo and inserts the row. On any failure nothing
/// remains: no row, and a photo written by this call is removed again.
pub async fn save_entry(
    entries: &dyn EntryRepo,
    storage: &dyn StorageClient,
    user_id: i64,
    submission: EntrySubmission,
    now: PrimitiveDateTime,
) -> Result<ProductionEntry, EntryError> {
    let urea_percentage = parse_number("urea_percentage", submission.urea_percentage.as_deref())?;
    let density = parse_number("density", submission.density.as_deref())?;

    let photo_path = match submission.photo {
        Some(photo) => {
            let key = stored_photo_name(&photo.file_name, now);
            storage
                .put_object(&key, photo.body)
                .await
                .map_err(EntryError::Storage)?;
            Some(key)
        }
        None => None,
    };

    let new_entry = NewEntry {
        user_id,
        authorised_person: submission.authorised_person,
        employee_id: submission.employee_id,
        final_batch_number: submission.final_batch_number,
        batch_quantity: submission.batch_quantity,
        urea_percentage,
        density,
        photo_path: photo_path.clone(),
        created_at: now,
    };

    match entries.insert(new_entry).await {
        Ok(entry) => {
            info!(entry_id = entry.id, user_id, photo = ?entry.photo_path, "entry saved");
            Ok(entry)
        }
        Err(e) => {
            if let Some(key) = photo_path {
                if let Err(cleanup) = storage.delete_object(&key).await {
                    error!(error = %cleanup, %key, "failed to remove orphaned photo");
                }
            }
            Err(EntryError::Database(e))
        }
    }
}
