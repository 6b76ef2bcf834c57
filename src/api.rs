use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{
    delete, get, post,
    web::{self, Data},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Duration;
use log::info;
use serde_json::Value;

use crate::db::Db;
use crate::error::StoreError;
use crate::render;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("weather-backend")
}

/// Raw POST payload. Fields are kept as JSON values so that numeric
/// strings ("72.5") are accepted alongside numbers, which existing
/// device firmware sends.
#[derive(serde::Deserialize, Debug)]
struct ReadingPayload {
    temperature: Option<Value>,
    humidity: Option<Value>,
    device: Option<Value>,
}

fn require_f64(value: Option<&Value>, field: &str) -> Result<f64, StoreError> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(StoreError::InvalidInput(format!(
            "missing or invalid field: {field}"
        ))),
    }
}

fn require_i32(value: Option<&Value>, field: &str) -> Result<i32, StoreError> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed.and_then(|v| i32::try_from(v).ok()) {
        Some(v) => Ok(v),
        None => Err(StoreError::InvalidInput(format!(
            "missing or invalid field: {field}"
        ))),
    }
}

#[post("/weather")]
async fn add_reading(
    payload: web::Json<ReadingPayload>,
    db: web::Data<Arc<Mutex<Db>>>,
) -> Result<HttpResponse, StoreError> {
    let temperature = require_f64(payload.temperature.as_ref(), "temperature")?;
    let humidity = require_f64(payload.humidity.as_ref(), "humidity")?;
    let device = require_i32(payload.device.as_ref(), "device")?;

    let mut db = db.lock().map_err(|_| StoreError::Poisoned)?;
    let reading = db.insert_reading(temperature, humidity, device)?;
    info!("reading {} stored for device {}", reading.id, reading.device);
    Ok(HttpResponse::Created().json(reading))
}

#[derive(serde::Deserialize, Debug)]
struct ListQuery {
    details: Option<String>,
}

#[get("/weather")]
async fn list_readings(
    query: web::Query<ListQuery>,
    db: web::Data<Arc<Mutex<Db>>>,
) -> Result<HttpResponse, StoreError> {
    let readings = {
        let mut db = db.lock().map_err(|_| StoreError::Poisoned)?;
        db.recent_readings(Duration::hours(24))?
    };
    let body = if query.details.is_some() {
        render::list_page(&readings)
    } else {
        render::chart_page(&readings)
    };
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

#[get("/weather/{id}")]
async fn get_reading(
    path: web::Path<i32>,
    db: web::Data<Arc<Mutex<Db>>>,
) -> Result<HttpResponse, StoreError> {
    let mut db = db.lock().map_err(|_| StoreError::Poisoned)?;
    let reading = db.reading_by_id(path.into_inner())?;
    Ok(HttpResponse::Ok().json(reading))
}

#[delete("/weather/{id}")]
async fn delete_reading(
    path: web::Path<i32>,
    db: web::Data<Arc<Mutex<Db>>>,
) -> Result<HttpResponse, StoreError> {
    let reading_id = path.into_inner();
    let mut db = db.lock().map_err(|_| StoreError::Poisoned)?;
    db.delete_reading(reading_id)?;
    info!("reading {reading_id} deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("reading {reading_id} deleted"),
    })))
}

pub async fn new_http_server(db: Arc<Mutex<Db>>, listen_addr: &str) -> std::io::Result<()> {
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db.clone()))
            .service(hello)
            .service(add_reading)
            .service(list_readings)
            .service(get_reading)
            .service(delete_reading)
            .wrap(Cors::permissive())
    })
    .bind(listen_addr)?
    .run()
    .await
}
