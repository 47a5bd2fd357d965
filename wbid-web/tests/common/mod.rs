//! Shared fixtures for wbid-web integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use wbid_ai::{ClassifierError, Prediction, SpeciesClassifier};
use wbid_common::db::admins::create_admin;
use wbid_common::db::init_database;
use wbid_web::{build_router, AppState, ServiceSettings};

pub const BOUNDARY: &str = "wbid-test-boundary";
pub const ADMIN_USER: &str = "warden";
pub const ADMIN_PASSWORD: &str = "heron-season-2024";

/// Classifier double returning a fixed outcome
pub enum StubClassifier {
    Fixed(Prediction),
    Failing,
    Slow(Duration),
}

impl StubClassifier {
    pub fn predicting(species: &str, scientific: &str, confidence: f64) -> Self {
        StubClassifier::Fixed(Prediction {
            species: species.to_string(),
            scientific: scientific.to_string(),
            confidence,
        })
    }
}

impl SpeciesClassifier for StubClassifier {
    fn classify(&self, _image: &DynamicImage) -> wbid_ai::Result<Prediction> {
        match self {
            StubClassifier::Fixed(p) => Ok(p.clone()),
            StubClassifier::Failing => Err(ClassifierError::Inference("stub failure".to_string())),
            StubClassifier::Slow(delay) => {
                std::thread::sleep(*delay);
                Err(ClassifierError::Inference("too late".to_string()))
            }
        }
    }

    fn class_count(&self) -> usize {
        50
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: SqlitePool,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new(classifier: StubClassifier) -> Self {
        Self::with_settings(classifier, ServiceSettings::default()).await
    }

    pub async fn with_settings(classifier: StubClassifier, settings: ServiceSettings) -> Self {
        let dir = TempDir::new().unwrap();
        let db = init_database(&dir.path().join("wbid.db")).await.unwrap();
        create_admin(&db, ADMIN_USER, ADMIN_PASSWORD).await.unwrap();

        let upload_dir = dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).unwrap();

        let state = AppState::new(
            db.clone(),
            Arc::new(classifier),
            "test-session-secret".to_string(),
            upload_dir.clone(),
            settings,
        );

        Self {
            app: build_router(state),
            db,
            upload_dir,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::util::ServiceExt;
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Log in as the fixture admin and return the `Cookie` header value
    pub async fn login(&self) -> String {
        let response = self
            .send(form_request(
                "POST",
                "/admin/login",
                &format!("username={}&password={}", ADMIN_USER, ADMIN_PASSWORD),
                None,
            ))
            .await;
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login should set a cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn form_request(method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Multipart upload with a single file field
pub fn upload_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    multipart(body)
}

/// Multipart form with one text field and no file
pub fn text_only_request(field: &str, value: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes();
    multipart(body)
}

fn multipart(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/identify")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 12, Rgb([90, 120, 60])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("response should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should have a Location")
        .to_str()
        .unwrap()
}
