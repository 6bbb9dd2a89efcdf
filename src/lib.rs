#[cfg(feature = "server")]
use std::sync::Arc;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::services::ServiceError;
#[cfg(feature = "server")]
use crate::services::dispatch::EmailDispatcher;
#[cfg(feature = "server")]
use crate::services::unsubscribe::UnsubscribeTokens;

pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod zmq;

/// JSON and query extractor settings that render bad input as `400` with
/// the usual error body.
#[cfg(feature = "server")]
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        ServiceError::Form(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        ServiceError::Form(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _| {
        ServiceError::Form(err.to_string()).into()
    }));
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Start a background ZeroMQ publisher used to hand campaigns to the emailer.
    let zmq_sender = crate::zmq::ZmqSender::start(&server_config.zmq_emailer_pub)
        .map_err(|e| std::io::Error::other(format!("Failed to start ZMQ sender: {e}")))?;
    let dispatcher: Arc<dyn EmailDispatcher> = Arc::new(zmq_sender);
    let dispatcher = web::Data::from(dispatcher);

    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);
    let tokens = UnsubscribeTokens::from_config(&server_config);

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .configure(extractor_config)
            .configure(routes::public)
            .service(web::scope("/api/v1").configure(routes::api_v1))
            .app_data(web::Data::new(repo.clone()))
            .app_data(dispatcher.clone())
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
