use axum::{
    middleware,
    routing::{get, get_service},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use fixerhub::services::fixer_api::FixerApi;
use fixerhub::state::AppState;
use fixerhub::web::middleware::auth as auth_middleware;
use fixerhub::web::routes::fixer;

#[tokio::main]
async fn main() {
    // Carga el archivo .env
    dotenv().ok();

    // 1. Logging
    tracing_subscriber::fmt::init();

    // 2. Base de datos local (solo para la identidad de desarrollo)
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    println!("Conectando a la base de datos: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("No se pudo conectar a la base de datos");

    let state = AppState::new(pool, FixerApi::from_env());

    // 3. Páginas que leen la identidad del usuario en sesión
    let page_routes = Router::new()
        .route("/fixers/:fixer_id", get(fixer::fixer_profile_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::attach_current_user,
        ));

    // 4. Aplicación completa
    let app = Router::new()
        .route("/", get(fixer::home_redirect))
        .merge(page_routes)
        // Static files
        .nest_service(
            "/assets",
            get_service(ServeDir::new("assets")).layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            )),
        )
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state);

    // 5. Arranque del servidor (con puerto de reserva)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("No se pudo interpretar host/puerto");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  No se pudo enlazar {}: {}. Probando reserva {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("No se pudo interpretar el puerto de reserva");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("No se pudo enlazar el puerto de reserva")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("🚀 Servidor corriendo en http://{}", bound_addr);
    println!(
        "📍 Perfil por defecto: http://{}/fixers/{}",
        bound_addr,
        fixer::DEFAULT_FIXER_ID
    );

    axum::serve(listener, app).await.unwrap();
}
