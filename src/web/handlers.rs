use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use tera::Context;

use crate::protocol::{ChatRequest, ChatResponse};
use crate::web::AppState;

// Page hosting the widget
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let context = Context::new();
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    info!("Chat request: {}", req.message);

    match data.bot.reply(&req.message).await {
        Ok(response) => {
            info!("Reply length: {} characters", response.len());
            HttpResponse::Ok().json(ChatResponse { response })
        }
        Err(e) => {
            error!("Bot error: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": format!("Failed to generate response: {}", e)
            }))
        }
    }
}
