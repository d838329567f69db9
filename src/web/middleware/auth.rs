use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use crate::database::current_user_repo;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Deserialize)]
struct JwtPayload {
    sub: String,
}

// Attach the signed-in user's identity to request extensions when it can be
// determined. Profile pages are public, so requests without a usable token
// simply pass through anonymously.
pub async fn attach_current_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Extract cookies from request
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split("; ")
                .find(|c| c.starts_with("access_token="))
                .and_then(|c| c.strip_prefix("access_token="))
        });

    if let Some(token) = token {
        // Parse JWT payload (middle part)
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 3 {
            if let Ok(payload_bytes) = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]) {
                if let Ok(payload) = serde_json::from_slice::<JwtPayload>(&payload_bytes) {
                    request
                        .extensions_mut()
                        .insert(CurrentUser { id: payload.sub });
                    return next.run(request).await;
                }
            }
        }
    }

    // Fallback for offline/local usage: use the current_user table
    if let Ok(Some(user_id)) = current_user_repo::load_current_user_id(&state.pool).await {
        request.extensions_mut().insert(CurrentUser { id: user_id });
    }

    next.run(request).await
}
