use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{EntrySubmission, PhotoUpload},
    services::{self, EntryError},
};
use crate::{
    app::internal,
    auth::extractors::AuthUser,
    clock,
    flash::{self, Flash},
    state::AppState,
    storage::{is_plain_key, mime_from_ext},
    views,
};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Routes behind the session gate.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/entry", get(new_entry))
        .route(
            "/save_entry",
            post(save_entry).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/delete_entry/:id", get(delete_entry))
        .route("/uploads/:filename", get(uploaded_file))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/fix_db", get(fix_db))
}

#[instrument(skip(state, jar))]
pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), (StatusCode, String)> {
    let entries = state.entries.list_newest_first().await.map_err(internal)?;
    let (jar, flashes) = flash::take(jar);
    Ok((jar, views::dashboard(&entries, &flashes)))
}

pub async fn new_entry(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flashes) = flash::take(jar);
    (jar, views::entry_form(&flashes))
}

async fn read_submission(mp: &mut Multipart) -> Result<EntrySubmission, EntryError> {
    let upload = |e: axum::extract::multipart::MultipartError| EntryError::Upload(e.body_text());
    let mut sub = EntrySubmission::default();
    while let Some(field) = mp.next_field().await.map_err(upload)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            // browsers send an empty filename when no file was picked
            let file_name = field.file_name().unwrap_or_default().to_string();
            if !file_name.is_empty() {
                let body = field.bytes().await.map_err(upload)?;
                sub.photo = Some(PhotoUpload { file_name, body });
            }
            continue;
        }
        let slot = match name.as_str() {
            "authorised_person" => &mut sub.authorised_person,
            "employee_id" => &mut sub.employee_id,
            "final_batch_number" => &mut sub.final_batch_number,
            "batch_quantity" => &mut sub.batch_quantity,
            "urea_percentage" => &mut sub.urea_percentage,
            "density" => &mut sub.density,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(upload)?);
    }
    Ok(sub)
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn save_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
    mut mp: Multipart,
) -> (CookieJar, Redirect) {
    let result = match read_submission(&mut mp).await {
        Ok(sub) => {
            services::save_entry(
                state.entries.as_ref(),
                state.storage.as_ref(),
                user.id,
                sub,
                clock::now_ist(),
            )
            .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => (
            flash::push(jar, Flash::success("Entry saved successfully!")),
            Redirect::to("/dashboard"),
        ),
        Err(e) => {
            warn!(error = %e, "entry rejected");
            (
                flash::push(jar, Flash::danger(format!("Error saving entry: {}", e))),
                Redirect::to("/entry"),
            )
        }
    }
}

/// Unsigned decimal ids only; anything else is not a route match.
fn parse_entry_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Any signed-in user may delete any entry.
#[instrument(skip_all, fields(user_id = user.id, entry_id = %raw_id))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let Some(id) = parse_entry_id(&raw_id) else {
        return Ok((StatusCode::NOT_FOUND, "Not Found").into_response());
    };
    let removed = state.entries.delete(id).await.map_err(internal)?;
    let notice = if removed {
        info!(entry_id = id, "entry deleted");
        Flash::success("Entry deleted successfully.")
    } else {
        warn!(entry_id = id, "delete of missing entry");
        Flash::danger("Entry not found.")
    };
    Ok((flash::push(jar, notice), Redirect::to("/dashboard")).into_response())
}

#[instrument(skip(state))]
pub async fn uploaded_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    if !is_plain_key(&filename) {
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    }
    match state.storage.get_object(&filename).await {
        Ok(Some(body)) => ([(header::CONTENT_TYPE, mime_from_ext(&filename))], body).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "File not found").into_response(),
        Err(e) => internal(e).into_response(),
    }
}

/// Schema escape hatch for databases created before `batch_quantity` existed.
pub async fn fix_db(State(state): State<AppState>) -> String {
    match state.entries.ensure_batch_quantity_column().await {
        Ok(()) => "Database fixed! Column 'batch_quantity' added.".to_string(),
        Err(e) => {
            error!(error = %e, "fix_db failed");
            format!("Error or already exists: {:#}", e)
        }
    }
}
