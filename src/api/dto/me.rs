use serde::Serialize;

use crate::services::identity::Claims;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub principal: String,
    pub subject: String,
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub authorities: Vec<&'static str>,
    pub claims: Claims,
}
