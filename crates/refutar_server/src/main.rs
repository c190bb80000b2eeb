use std::env;

use actix_web::{middleware, web, App, HttpResponse, HttpServer, Responder};
use log::info;
use serde::Deserialize;

mod refutation;

const DEFAULT_ADDR: &str = "127.0.0.1:7000";

#[derive(Deserialize)]
struct ParseForm {
    formula: String,
    params: Option<String>,
}

#[derive(Deserialize)]
struct StateForm {
    state: String,
}

#[derive(Deserialize)]
struct MoveForm {
    state: String,
    r#move: String,
}

async fn index() -> impl Responder {
    HttpResponse::Ok().body(
        "Refutar API Server

Available calculus endpoints:
fo-refutation",
    )
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/fo-refutation", web::get().to(refutation::fo))
        .route("/fo-refutation/parse", web::post().to(refutation::parse))
        .route(
            "/fo-refutation/validate",
            web::post().to(refutation::validate),
        )
        .route("/fo-refutation/move", web::post().to(refutation::r#move))
        .route("/fo-refutation/close", web::post().to(refutation::close))
        .route("/fo-refutation/prove", web::post().to(refutation::prove));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let addr = env::var("REFUTAR_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    info!("listening on {addr}");

    HttpServer::new(|| {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")))
            .configure(routes)
    })
    .bind(addr)?
    .run()
    .await
}
