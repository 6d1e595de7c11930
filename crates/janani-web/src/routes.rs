//! API 라우트 정의.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers;
use crate::AppState;

/// API 라우트 생성
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 병력
        .route("/history", post(handlers::history::save_history))
        .route(
            "/history/{user_id}",
            get(handlers::history::get_history)
                .put(handlers::history::replace_history)
                .delete(handlers::history::delete_history),
        )
        // 복약
        .route("/medications", post(handlers::medications::create_medication))
        // 첫 세그먼트는 GET/POST에서 사용자 ID, DELETE에서 복약 ID
        .route(
            "/medications/{user_id}",
            get(handlers::medications::list_medications)
                .post(handlers::medications::create_medication_for_user)
                .delete(handlers::medications::delete_medication_by_id),
        )
        .route(
            "/medications/{user_id}/toggle",
            patch(handlers::medications::toggle_medication_by_id),
        )
        .route(
            "/medications/{user_id}/{id}",
            delete(handlers::medications::delete_medication),
        )
        .route(
            "/medications/{user_id}/{id}/toggle",
            patch(handlers::medications::toggle_medication),
        )
        // 진료 예약
        .route("/appointments", post(handlers::appointments::create_appointment))
        .route(
            "/appointments/{user_id}",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment_for_user),
        )
        .route(
            "/appointments/{user_id}/{id}",
            put(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        // 원격 상담
        .route("/doctors", get(handlers::call::list_doctors))
        .route(
            "/consults",
            get(handlers::call::list_consults).post(handlers::call::schedule_consult),
        )
        .route("/consults/{id}/join", post(handlers::call::join_consult))
        // 통화
        .route("/call/status", get(handlers::call::call_status))
        .route("/call/start", post(handlers::call::start_call))
        .route("/call/emergency", post(handlers::call::emergency_call))
        .route("/call/end", post(handlers::call::end_call))
        .route("/call/mute", post(handlers::call::toggle_mute))
        .route("/call/video", post(handlers::call::toggle_video))
        // AI 건강 분석
        .route("/ai/risk", post(handlers::ai::assess_risk))
        .route("/ai/symptoms", post(handlers::ai::check_symptoms))
        .route("/ai/diet", post(handlers::ai::diet_plan))
        .route("/ai/chat", post(handlers::ai::chat))
}
