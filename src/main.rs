use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod state;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::activity_log::ActivityLog;
use crate::state::{AppState, Stores};
use crate::store::{
    CalendarStore, MySqlActivityStore, MySqlAppointmentStore, MySqlCalendarStore, MySqlDirectory,
    MySqlLeaveStore,
};
use crate::utils::holiday_client::NagerClient;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;

    let calendar = Arc::new(MySqlCalendarStore::new(pool.clone()));
    let directory = Arc::new(MySqlDirectory::new(pool.clone()));
    let holidays = NagerClient::new(&config.holiday_api_base, config.holiday_timeout)?;

    let state = Data::new(AppState::new(
        Stores {
            leaves: Arc::new(MySqlLeaveStore::new(pool.clone())),
            appointments: Arc::new(MySqlAppointmentStore::new(pool.clone())),
            calendar: calendar.clone(),
            staff: directory.clone(),
            branches: directory,
            activity: ActivityLog::new(Arc::new(MySqlActivityStore::new(pool.clone()))),
        },
        Arc::new(holidays),
        &config.holiday_country,
    ));

    // Pick up calendar writes made by other instances. The first tick seeds the feed.
    let refresh_every = config.pending_refresh;
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(refresh_every);
        loop {
            ticker.tick().await;
            if let Err(e) = calendar.refresh_pending().await {
                warn!(error = %e, "Failed to refresh pending calendar entries");
            }
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .app_data(config_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
