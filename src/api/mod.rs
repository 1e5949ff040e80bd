use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{NewFoodItem, NewFoodLog, NewPlannedMeal};
use crate::database::{DatabaseError, SupabaseClient};
use crate::nutrition::{NutrientTotals, DAILY_RECOMMENDED};
use crate::recommendations::{build_recommendations, Recommendation, RecommendationSource};

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn RecommendationSource>,
    db: Arc<SupabaseClient>,
}

#[derive(Deserialize)]
struct RecommendationsRequest {
    nutrients: NutrientTotals,
}

#[derive(Serialize)]
struct RecommendationsResponse {
    recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

#[derive(Deserialize)]
struct FoodSearchParams {
    #[serde(default)]
    query: String,
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct DayParams {
    user_id: Uuid,
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct WeekParams {
    user_id: Uuid,
    week_start: NaiveDate,
}

#[derive(Deserialize)]
struct RecipeListParams {
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct ShoppingListRequest {
    split_into_runs: Option<i32>,
}

#[derive(Deserialize)]
struct PurchasedRequest {
    purchased: bool,
}

/// Create and configure the API router
pub fn create_api(source: Arc<dyn RecommendationSource>, db: Arc<SupabaseClient>) -> Router {
    let state = AppState { source, db };

    // Permissive CORS, preflight included
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/recommendations", post(recommendations_handler))
        .route("/foods", get(search_foods_handler).post(create_food_handler))
        .route("/food-logs", get(list_food_logs_handler).post(log_food_handler))
        .route("/food-logs/:id", delete(delete_food_log_handler))
        .route("/nutrients/summary", get(nutrient_summary_handler))
        .route("/meal-plans", get(meal_plan_handler))
        .route("/meal-plans/meals", post(upsert_meal_handler))
        .route("/meal-plans/meals/:id", delete(delete_meal_handler))
        .route("/recipes", get(list_recipes_handler))
        .route("/shopping-lists/:meal_plan_id", post(create_shopping_list_handler))
        .route("/shopping-list-items/:id", patch(set_item_purchased_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn db_error(e: DatabaseError) -> Response {
    error!("Database error: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| {
            value.starts_with("Bearer ") && value.len() > "Bearer ".len()
        })
}

/// The deficiency endpoint. The body is parsed by hand so a malformed
/// payload maps to a 500 with an error message, matching what callers of
/// the hosted function saw; per-nutrient fetch failures never fail the
/// request.
async fn recommendations_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !has_bearer(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Missing bearer credential");
    }

    let request: RecommendationsRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("Invalid recommendations payload: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Invalid request body: {}", e),
            );
        }
    };

    let recommendations = build_recommendations(&request.nutrients, state.source.as_ref()).await;

    Json(RecommendationsResponse { recommendations }).into_response()
}

async fn search_foods_handler(
    State(state): State<AppState>,
    Query(params): Query<FoodSearchParams>,
) -> Response {
    match state
        .db
        .search_food_items(&params.query, params.limit.unwrap_or(10))
        .await
    {
        Ok(items) => Json(items).into_response(),
        Err(e) => db_error(e),
    }
}

async fn create_food_handler(
    State(state): State<AppState>,
    Json(item): Json<NewFoodItem>,
) -> Response {
    if let Err(e) = item.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    match state.db.insert_food_item(&item).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => db_error(e),
    }
}

async fn log_food_handler(
    State(state): State<AppState>,
    Json(entry): Json<NewFoodLog>,
) -> Response {
    if let Err(e) = entry.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    match state.db.insert_food_log(&entry).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => db_error(e),
    }
}

async fn list_food_logs_handler(
    State(state): State<AppState>,
    Query(params): Query<DayParams>,
) -> Response {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
    match state.db.food_logs_for_date(params.user_id, date).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => db_error(e),
    }
}

async fn delete_food_log_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.db.delete_food_log(id).await {
        Ok(()) => Json(ApiResponse {
            status: "deleted".to_string(),
        })
        .into_response(),
        Err(e) => db_error(e),
    }
}

async fn nutrient_summary_handler(
    State(state): State<AppState>,
    Query(params): Query<DayParams>,
) -> Response {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
    match state.db.daily_totals(params.user_id, date).await {
        Ok(totals) => Json(serde_json::json!({
            "date": date,
            "totals": totals,
            "targets": DAILY_RECOMMENDED,
        }))
        .into_response(),
        Err(e) => db_error(e),
    }
}

/// Fetches the plan for the requested week, creating it on first access,
/// and returns it together with its planned meals.
async fn meal_plan_handler(
    State(state): State<AppState>,
    Query(params): Query<WeekParams>,
) -> Response {
    let plan = match state
        .db
        .meal_plan_for_week(params.user_id, params.week_start)
        .await
    {
        Ok(Some(plan)) => plan,
        Ok(None) => match state
            .db
            .create_meal_plan(params.user_id, params.week_start)
            .await
        {
            Ok(plan) => plan,
            Err(e) => return db_error(e),
        },
        Err(e) => return db_error(e),
    };

    match state.db.planned_meals(plan.id).await {
        Ok(meals) => Json(serde_json::json!({ "plan": plan, "meals": meals })).into_response(),
        Err(e) => db_error(e),
    }
}

async fn upsert_meal_handler(
    State(state): State<AppState>,
    Json(meal): Json<NewPlannedMeal>,
) -> Response {
    if let Err(e) = meal.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    match state.db.upsert_planned_meal(&meal).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => db_error(e),
    }
}

async fn delete_meal_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.db.delete_planned_meal(id).await {
        Ok(()) => Json(ApiResponse {
            status: "deleted".to_string(),
        })
        .into_response(),
        Err(e) => db_error(e),
    }
}

async fn list_recipes_handler(
    State(state): State<AppState>,
    Query(params): Query<RecipeListParams>,
) -> Response {
    match state.db.list_recipes(params.limit.unwrap_or(20)).await {
        Ok(recipes) => Json(recipes).into_response(),
        Err(e) => db_error(e),
    }
}

async fn create_shopping_list_handler(
    State(state): State<AppState>,
    Path(meal_plan_id): Path<Uuid>,
    Json(request): Json<ShoppingListRequest>,
) -> Response {
    match state
        .db
        .generate_shopping_list(meal_plan_id, request.split_into_runs.unwrap_or(1))
        .await
    {
        Ok(list) => (StatusCode::CREATED, Json(list)).into_response(),
        Err(e) => db_error(e),
    }
}

async fn set_item_purchased_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PurchasedRequest>,
) -> Response {
    match state.db.set_item_purchased(id, request.purchased).await {
        Ok(()) => Json(ApiResponse {
            status: "updated".to_string(),
        })
        .into_response(),
        Err(e) => db_error(e),
    }
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}
