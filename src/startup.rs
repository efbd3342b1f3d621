use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::logger::RequestLogger;
use crate::middleware::{GatePolicy, RequestGate};
use crate::routes::{
    admin_session, health_check, json_error_handler, login, login_page, logout, refresh, verify,
};
use crate::state::AuthState;

pub fn run(
    listener: TcpListener,
    state: AuthState,
    policy: GatePolicy,
) -> Result<Server, std::io::Error> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            // Runs innermost: the loggers also see gate redirects
            .wrap(RequestGate::new(policy.clone()))
            .wrap(RequestLogger)
            .wrap(Logger::default())
            // Shared state
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/auth")
                    .route("/login", web::post().to(login))
                    .route("/logout", web::post().to(logout))
                    .route("/refresh", web::post().to(refresh))
                    .route("/verify", web::get().to(verify))
                    .route("/verify", web::post().to(verify)),
            )
            // Gated admin area; the login page must be registered first
            .route("/admin/login", web::get().to(login_page))
            .route("/admin/login/", web::get().to(login_page))
            .route("/admin", web::get().to(admin_session))
            .route("/admin/{tail:.*}", web::get().to(admin_session))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
