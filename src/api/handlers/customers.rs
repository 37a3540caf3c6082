/*
 * Responsibility
 * - /api/customers 系 handler (create / get / list)
 * - Path/Query/Json を extractor で受け、rejection は AppError に変換
 * - DTO validation → repo 呼び出し → `{message, data}` で返す
 */
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use uuid::Uuid;

use crate::{
    api::{
        dto::customers::{CreateCustomerRequest, CustomerResponse, ListCustomersQuery},
        response::ApiResponse,
    },
    error::AppError,
    repos::customer_repo,
    state::AppState,
};

pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::Validation)?;

    let customer_id = Uuid::new_v4().to_string();
    let row =
        customer_repo::create(&state.db, &customer_id, req.name.trim(), req.email()).await?;

    tracing::info!(customer_id = %row.id, "customer created");
    Ok(Json(ApiResponse::new("created", row.id)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    customer_id: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let Path(customer_id) = customer_id?;
    if customer_id.trim().is_empty() {
        return Err(AppError::bad_request("id must not be blank"));
    }

    let row = customer_repo::get(&state.db, &customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {customer_id} not found")))?;

    Ok(Json(ApiResponse::new(
        "Customer fetched successfully",
        CustomerResponse::from(row),
    )))
}

pub async fn list_customers(
    State(state): State<AppState>,
    query: Result<Query<ListCustomersQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<CustomerResponse>>>, AppError> {
    let Query(query) = query?;
    let limit = query.limit().map_err(AppError::BadRequest)?;

    let rows = customer_repo::list(&state.db, limit).await?;
    let res = rows.into_iter().map(CustomerResponse::from).collect();

    Ok(Json(ApiResponse::ok(res)))
}
