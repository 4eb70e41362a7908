// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, exam, result},
    state::AppState,
    utils::jwt::{auth_middleware, staff_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * Public: login.
/// * Student: exam list, attempt admission and submission, own results.
/// * Teacher/admin: exam lifecycle, exam results, manual grading.
/// * Any authenticated role: result detail (ownership checked in the handler).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new().route("/api/auth/login", post(auth::login));

    let student_routes = Router::new()
        .route("/api/exams", get(exam::list_available))
        .route("/api/exams/{id}/attempt", get(exam::start_attempt))
        .route("/api/exams/{id}/submit", post(exam::submit_attempt))
        .route("/api/results", get(result::list_mine))
        .route_layer(middleware::from_fn(student_middleware));

    let staff_routes = Router::new()
        .route("/api/exams/{id}/status", put(exam::update_status))
        .route("/api/exams/{id}/results", get(exam::list_exam_results))
        .route("/api/results/{id}/grade", put(result::grade_result))
        .route_layer(middleware::from_fn(staff_middleware));

    // Auth runs first (outermost), then the role gates above.
    let protected_routes = Router::new()
        .merge(student_routes)
        .merge(staff_routes)
        .route("/api/results/{id}", get(result::get_result))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(auth_routes)
        .merge(protected_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
