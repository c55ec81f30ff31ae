use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HelloResponse {
    message: &'static str,
}

pub async fn hello_handler() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from Yacht Data Extractor backend!",
    })
}
