//! In-memory fake SIEM used by the integration tests
//!
//! Every collection endpoint is served by a [`CollectionResponder`] backed by
//! an explicit [`ObjectStore`], so tests can seed and inspect remote state.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use siem_sync::siem::auth::Credentials;
use siem_sync::siem::client::{ConnectionSettings, SiemClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const USER: &str = "elastic";
pub const PASSWORD: &str = "test123";

/// Remote objects keyed by id
pub type ObjectStore = Arc<Mutex<HashMap<String, Map<String, Value>>>>;

pub fn new_store() -> ObjectStore {
    Arc::new(Mutex::new(HashMap::new()))
}

pub const COLLECTIONS: &[&str] = &[
    "/api/detection_engine/rules",
    "/api/exception_lists",
    "/api/exception_lists/items",
];

fn not_found(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "status_code": 404,
        "message": format!("id: \"{}\" not found", id)
    }))
}

fn bad_request(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "status_code": 400,
        "message": message
    }))
}

/// Serves POST/GET/PUT/DELETE for one collection from a shared store
pub struct CollectionResponder {
    store: ObjectStore,
}

impl CollectionResponder {
    pub fn new(store: ObjectStore) -> Self {
        Self { store }
    }
}

impl Respond for CollectionResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query_id = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned());
        let mut store = self.store.lock().unwrap();

        match request.method.as_str() {
            "POST" => {
                let Ok(mut doc) = request.body_json::<Map<String, Value>>() else {
                    return bad_request("body must be a JSON object");
                };
                let id = uuid::Uuid::new_v4().to_string();
                doc.insert("id".into(), json!(id));
                doc.insert("created_at".into(), json!("2024-01-01T00:00:00.000Z"));
                doc.insert("created_by".into(), json!(USER));
                doc.insert("updated_at".into(), json!("2024-01-01T00:00:00.000Z"));
                doc.insert("updated_by".into(), json!(USER));
                store.insert(id, doc.clone());
                ResponseTemplate::new(200).set_body_json(doc)
            }
            "GET" => {
                let id = query_id.unwrap_or_default();
                match store.get(&id) {
                    Some(doc) => ResponseTemplate::new(200).set_body_json(doc),
                    None => not_found(&id),
                }
            }
            "PUT" => {
                let Ok(mut doc) = request.body_json::<Map<String, Value>>() else {
                    return bad_request("body must be a JSON object");
                };
                let Some(id) = doc.get("id").and_then(Value::as_str).map(String::from) else {
                    return bad_request("id is required");
                };
                let Some(existing) = store.get(&id) else {
                    return not_found(&id);
                };
                for key in ["created_at", "created_by"] {
                    if let Some(value) = existing.get(key) {
                        doc.insert(key.into(), value.clone());
                    }
                }
                doc.insert("updated_at".into(), json!("2024-01-02T00:00:00.000Z"));
                doc.insert("updated_by".into(), json!(USER));
                store.insert(id, doc.clone());
                ResponseTemplate::new(200).set_body_json(doc)
            }
            "DELETE" => {
                let id = query_id.unwrap_or_default();
                match store.remove(&id) {
                    Some(doc) => ResponseTemplate::new(200).set_body_json(doc),
                    None => not_found(&id),
                }
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

/// A running fake SIEM and the store behind it
pub struct FakeSiem {
    pub server: MockServer,
    pub store: ObjectStore,
}

impl FakeSiem {
    pub async fn start(store: ObjectStore) -> Self {
        let server = MockServer::start().await;

        for collection in COLLECTIONS {
            Mock::given(path(*collection))
                .respond_with(CollectionResponder::new(store.clone()))
                .mount(&server)
                .await;
        }

        Self { server, store }
    }

    pub fn client(&self) -> SiemClient {
        client_for(&self.server)
    }

    /// Bodies of every request received with this method, in order
    pub async fn request_bodies(&self, method: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == method)
            .filter_map(|r| r.body_json::<Value>().ok())
            .collect()
    }
}

pub fn settings_for(server: &MockServer) -> ConnectionSettings {
    let address = server.address();
    ConnectionSettings {
        hostname: address.ip().to_string(),
        port: address.port(),
        use_tls: false,
        credentials: Some(Credentials::new(USER, PASSWORD)),
        timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

pub fn client_for(server: &MockServer) -> SiemClient {
    SiemClient::new(&settings_for(server)).expect("client should build")
}
