use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Extension,
};
use tracing::warn;

use crate::services::fixer_map_service::FixerMapView;
use crate::services::fixer_profile_service::{self, FixerProfileView};
use crate::state::AppState;
use crate::web::middleware::auth::CurrentUser;

// Profile shown for "/" until real navigation lands; same default the mobile
// app ships with.
pub const DEFAULT_FIXER_ID: &str = "691646c477c99dee64b21689";

#[derive(Template)]
#[template(path = "fixer_profile.html")]
struct FixerProfileTemplate {
    fixer: FixerProfileView,
    is_owner: bool,
    has_location: bool,
    map_html: String,
    build_id: String,
}

#[derive(Template)]
#[template(path = "fixer_map.html")]
struct FixerMapTemplate<'a> {
    map: &'a FixerMapView,
    config_json: String,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: String,
}

pub async fn home_redirect() -> Redirect {
    Redirect::to(&format!("/fixers/{}", DEFAULT_FIXER_ID))
}

pub async fn fixer_profile_handler(
    current_user: Option<Extension<CurrentUser>>,
    Path(fixer_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let view =
        match fixer_profile_service::load_fixer_profile_view(&state.fixer_api, &fixer_id).await {
            Ok(v) => v,
            Err(err) => {
                warn!(status = %err.status, fixer_id = %fixer_id, "fixer_profile_load_failed");
                return (
                    StatusCode::BAD_GATEWAY,
                    error_page("Error al cargar el perfil"),
                )
                    .into_response();
            }
        };

    let Some(view) = view else {
        return (
            StatusCode::NOT_FOUND,
            error_page("Error al cargar el perfil"),
        )
            .into_response();
    };

    let is_owner = current_user
        .map(|Extension(user)| user.id == view.id)
        .unwrap_or(false);

    let map_html = match &view.map {
        Some(map) => {
            let widget = FixerMapTemplate {
                config_json: map.boot_config_json(),
                map,
            };
            widget.render().unwrap()
        }
        None => String::new(),
    };

    let template = FixerProfileTemplate {
        has_location: view.map.is_some(),
        fixer: view,
        is_owner,
        map_html,
        build_id: std::env::var("FIXERHUB_BUILD_ID").unwrap_or_else(|_| "dev".to_string()),
    };
    Html(template.render().unwrap()).into_response()
}

fn error_page(message: &str) -> Html<String> {
    let template = ErrorTemplate {
        message: message.to_string(),
    };
    Html(template.render().unwrap_or_else(|_| message.to_string()))
}
