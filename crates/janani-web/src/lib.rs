//! # janani-web
//!
//! Janani REST API 서버.
//! Axum 기반으로 사용자별 건강 기록 문서와 원격 상담 통화 명령을 제공한다.
//!
//! ## 기능
//! - 병력 조회/저장/삭제
//! - 복약 항목 관리 및 복용 체크
//! - 진료 예약 관리
//! - 상담 예약, 참여, 응급 통화, 통화 상태 조회
//! - AI 위험도 평가, 증상 분석, 식단, 챗봇

pub mod error;
pub mod handlers;
pub mod routes;

use axum::routing::get;
use axum::Router;
use janani_call::ClinicalBridge;
use janani_core::config::WebConfig;
use janani_core::ports::advisor::HealthAdvisor;
use janani_core::ports::storage::HealthRecordStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 건강 기록 저장소
    pub store: Arc<dyn HealthRecordStore>,
    /// 클리닉 브리지 (통화 기능이 연결된 경우)
    pub bridge: Option<ClinicalBridge>,
    /// AI 건강 분석기 (API 키가 설정된 경우)
    pub advisor: Option<Arc<dyn HealthAdvisor>>,
}

/// 전체 라우터 구성 (`/health` + `/api/*`)
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", routes::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// REST API 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(store: Arc<dyn HealthRecordStore>, config: WebConfig) -> Self {
        Self {
            config,
            state: AppState {
                store,
                bridge: None,
                advisor: None,
            },
        }
    }

    /// 클리닉 브리지 설정
    pub fn with_bridge(mut self, bridge: ClinicalBridge) -> Self {
        self.state.bridge = Some(bridge);
        self
    }

    /// AI 건강 분석기 설정
    pub fn with_advisor(mut self, advisor: Arc<dyn HealthAdvisor>) -> Self {
        self.state.advisor = Some(advisor);
        self
    }

    /// 서버 실행
    ///
    /// 기본 포트에서 시작하여, 포트가 이미 사용 중이면 다음 포트를 시도한다.
    /// 최대 10개 포트를 시도한 후 실패하면 에러를 반환한다.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let app = app_router(self.state);

        let base_port = self.config.port;
        let mut last_error = None;

        for attempt in 0..MAX_PORT_ATTEMPTS {
            let port = base_port.saturating_add(attempt);

            if port < base_port && attempt > 0 {
                break;
            }

            let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
                Ok(a) => a,
                Err(e) => {
                    error!("잘못된 주소 {}:{}: {}", host, port, e);
                    continue;
                }
            };

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if attempt > 0 {
                        warn!("포트 {} 사용 불가, 대체 포트 {} 사용", base_port, port);
                    }
                    info!("API 서버 시작: http://{}", addr);

                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            loop {
                                if *shutdown_rx.borrow() {
                                    info!("API 서버 종료 신호 수신");
                                    break;
                                }
                                if shutdown_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        })
                        .await?;

                    info!("API 서버 종료");
                    return Ok(());
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::AddrInUse {
                        warn!("포트 {} 이미 사용 중, 다음 포트 시도...", port);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!(
                    "포트 {}-{} 모두 사용 불가",
                    base_port,
                    base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
                ),
            )
        }))
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }
}
