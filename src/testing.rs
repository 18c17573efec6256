//! In-memory stores and a small cookie-carrying client for router tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::{repo::UserRepo, repo_types::User},
    config::{AppConfig, SessionConfig},
    entries::{
        repo::EntryRepo,
        repo_types::{NewEntry, ProductionEntry, COMPANY_NAME, PRODUCT_LABEL},
    },
    state::AppState,
    storage::DiskStorage,
};

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserRepo {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let mut rows = self.rows.lock().unwrap();
        anyhow::ensure!(
            !rows.iter().any(|u| u.username == username || u.email == email),
            "unique violation"
        );
        let user = User {
            id: rows.len() as i64 + 1,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        };
        rows.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryEntryRepo {
    rows: Mutex<Vec<ProductionEntry>>,
    next_id: Mutex<i64>,
    fail_inserts: AtomicBool,
}

impl MemoryEntryRepo {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntryRepo for MemoryEntryRepo {
    async fn insert(&self, e: NewEntry) -> anyhow::Result<ProductionEntry> {
        anyhow::ensure!(!self.fail_inserts.load(Ordering::SeqCst), "database unavailable");
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let row = ProductionEntry {
            id: *next_id,
            user_id: e.user_id,
            company_name: Some(COMPANY_NAME.into()),
            authorised_person: e.authorised_person,
            employee_id: e.employee_id,
            final_batch_number: e.final_batch_number,
            sf_batch_number: Some(PRODUCT_LABEL.into()),
            batch_quantity: e.batch_quantity,
            urea_percentage: Some(e.urea_percentage),
            density: Some(e.density),
            photo_path: e.photo_path,
            created_at: e.created_at,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_newest_first(&self) -> anyhow::Result<Vec<ProductionEntry>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<ProductionEntry>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }

    async fn ensure_batch_quantity_column(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct TestEnv {
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
    pub entries: Arc<MemoryEntryRepo>,
    pub storage: DiskStorage,
    _dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DiskStorage::new(dir.path().join("uploads"))
            .await
            .expect("storage");
        let users = Arc::new(MemoryUserRepo::default());
        let entries = Arc::new(MemoryEntryRepo::default());
        let config = Arc::new(AppConfig {
            database_url: "postgresql://unused".into(),
            session: SessionConfig {
                secret: "test-secret".into(),
                issuer: "test".into(),
                ttl_minutes: 5,
                cookie_secure: false,
            },
            upload_dir: storage.root().to_path_buf(),
        });
        let state = AppState::from_parts(
            users.clone(),
            entries.clone(),
            Arc::new(storage.clone()),
            config,
        );
        Self {
            state,
            users,
            entries,
            storage,
            _dir: dir,
        }
    }

    pub fn client(&self) -> TestClient {
        TestClient::new(build_app(self.state.clone()))
    }

    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.storage.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Drives the router in-process, keeping cookies like a browser would.
pub struct TestClient {
    app: Router,
    cookies: HashMap<String, String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: HashMap::new(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// `file` is `(field, filename, bytes)`.
    pub async fn post_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> TestResponse {
        const BOUNDARY: &str = "----batch-records-test-boundary";
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Follows a redirect with a GET, like a browser after a form post.
    pub async fn follow(&mut self, res: TestResponse) -> TestResponse {
        let location = res
            .location()
            .unwrap_or_else(|| panic!("expected redirect, got {}", res.status))
            .to_string();
        self.get(&location).await
    }

    async fn send(&mut self, mut req: Request<Body>) -> TestResponse {
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            req.headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let res = self.app.clone().oneshot(req).await.unwrap();
        for raw in res.headers().get_all(header::SET_COOKIE) {
            let cookie = Cookie::parse(raw.to_str().unwrap().to_string()).unwrap();
            let expired = cookie.value().is_empty()
                || cookie.max_age().is_some_and(|age| age.is_zero());
            if expired {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let status = res.status();
        let headers = res.headers().clone();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Reads `Sheet1` of an `.xlsx` back as rows of cells, header row first.
pub fn read_sheet(bytes: &[u8]) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range.rows().map(|row| row.to_vec()).collect()
}

fn form_encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
