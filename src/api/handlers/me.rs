use axum::Json;

use crate::api::{dto::me::MeResponse, extractors::CurrentUser, response::ApiResponse};

/// GET /me: the caller's identity and full claim set attached by the gate.
pub async fn me(CurrentUser(ctx): CurrentUser) -> Json<ApiResponse<MeResponse>> {
    let authorities = ctx.authorities.iter().map(|a| a.as_str()).collect();

    Json(ApiResponse::ok(MeResponse {
        principal: ctx.principal,
        subject: ctx.subject,
        display_name: ctx.display_name,
        picture: ctx.picture,
        authorities,
        claims: ctx.claims,
    }))
}
