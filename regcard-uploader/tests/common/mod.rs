//! In-process fake of the reporting API's dynamic-forms endpoint, served by axum.
//! Records every call so tests can assert on order and payloads.
#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::options;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::fs::write;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub enum Recorded {
    Options {
        property_id: String,
        authorization: Option<String>,
    },
    Post {
        property_id: String,
        doc_type: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: usize,
    },
    Put {
        property_id: String,
        body: Value,
    },
}

#[derive(Clone, Default)]
pub struct FakeApi {
    calls: Arc<Mutex<Vec<Recorded>>>,
    denied: Arc<Vec<String>>,
    nameless: Arc<Vec<String>>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Recorded) {
        self.calls.lock().unwrap().push(call);
    }
}

fn owned(ids: &[&str]) -> Arc<Vec<String>> {
    Arc::new(ids.iter().map(|s| s.to_string()).collect())
}

/// Start the fake on an ephemeral port. Returns its base URL and the recorder.
/// Probes for property ids in `denied` answer 403.
pub async fn spawn_fake_api(denied: &[&str]) -> (String, FakeApi) {
    spawn_fake_api_with(denied, &[]).await
}

/// Like [`spawn_fake_api`], but uploads for property ids in `nameless` answer
/// 200 with a body that carries no `filename`.
pub async fn spawn_fake_api_with(denied: &[&str], nameless: &[&str]) -> (String, FakeApi) {
    let api = FakeApi {
        calls: Arc::default(),
        denied: owned(denied),
        nameless: owned(nameless),
    };
    let app = Router::new()
        .route(
            "/properties/:property_id/dynamic-forms",
            options(probe).post(upload).put(mapping),
        )
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/properties"), api)
}

async fn probe(
    State(api): State<FakeApi>,
    Path(property_id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {TOKEN}");
    let authorised = authorization.as_deref() == Some(expected.as_str());
    let denied = api.denied.contains(&property_id);
    api.record(Recorded::Options {
        property_id,
        authorization,
    });
    if !authorised {
        (StatusCode::UNAUTHORIZED, r#"{"message":"invalid token"}"#.into())
    } else if denied {
        (StatusCode::FORBIDDEN, r#"{"message":"property not accessible"}"#.into())
    } else {
        (StatusCode::OK, String::new())
    }
}

async fn upload(
    State(api): State<FakeApi>,
    Path(property_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    let mut doc_type = None;
    let mut file_name = None;
    let mut content_type = None;
    let mut bytes = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        match field.name().unwrap_or_default().to_string().as_str() {
            "type" => doc_type = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?),
            "file" => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                bytes = field
                    .bytes()
                    .await
                    .map_err(|_| StatusCode::BAD_REQUEST)?
                    .len();
            }
            _ => {}
        }
    }

    let stem = file_name
        .as_deref()
        .and_then(|n| n.strip_suffix(".pdf"))
        .unwrap_or("card")
        .to_string();
    let nameless = api.nameless.contains(&property_id);
    api.record(Recorded::Post {
        property_id,
        doc_type,
        file_name,
        content_type,
        bytes,
    });
    if nameless {
        return Ok(Json(json!({ "name": stem })));
    }
    Ok(Json(json!({ "filename": format!("{stem}_abc.pdf") })))
}

async fn mapping(
    State(api): State<FakeApi>,
    Path(property_id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    api.record(Recorded::Put { property_id, body });
    StatusCode::OK
}

/// Lay out `root` the way the CLI expects: `reg_cards/NA/<cards>`, the
/// property map and a field mapping file with `mappings`.
pub fn write_workspace(root: &std::path::Path, cards: &[&str], property_map: Value, mappings: Value) {
    let cards_dir = root.join("reg_cards").join("NA");
    std::fs::create_dir_all(&cards_dir).unwrap();
    for card in cards {
        write(cards_dir.join(card), b"%PDF-1.4\n%fake registration card\n").unwrap();
    }
    write(root.join("property_id_map.json"), property_map.to_string()).unwrap();
    write(
        root.join("field_mapping_stage.json"),
        json!({ "parameter_mappings": mappings }).to_string(),
    )
    .unwrap();
}
