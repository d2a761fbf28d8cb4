use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use taskhub::{config::Config, routes, services::UserDirectory, AppError, AppState};

fn to_io(error: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error.to_string())
}

async fn bootstrap_superuser(state: &AppState, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (
        config.first_superuser.as_deref(),
        config.first_superuser_password.as_deref(),
    ) else {
        return Ok(());
    };

    let mut session = state.store.begin().await?;
    let user = UserDirectory::new(session.as_mut(), &state.hasher)
        .ensure_superuser(email, password)
        .await?;
    log::info!("first superuser is {}", user.id);
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;
    let state = web::Data::new(AppState::from_config(&config).await.map_err(to_io)?);
    bootstrap_superuser(&state, &config).await.map_err(to_io)?;

    log::info!("Starting taskhub server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure_app)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
