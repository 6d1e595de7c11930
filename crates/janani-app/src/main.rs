//! # janani-app
//!
//! Janani 바이너리 진입점.
//! DI 컨테이너 역할, 설정 로드, 라이프사이클 관리, 통화 데모.

mod demo;
mod lifecycle;
mod media;
mod notifier;
mod offline_summarizer;
mod settings;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use janani_call::consult::ConsultBook;
use janani_call::timer::TokioScheduler;
use janani_call::{CallController, CallPorts, CallSettings, ClinicalBridge};
use janani_core::config::AppConfig;
use janani_core::i18n::{DictionaryTranslator, Language};
use janani_core::models::call::CallKind;
use janani_core::paths::AppPaths;
use janani_core::ports::advisor::HealthAdvisor;
use janani_core::ports::summarizer::Summarizer;
use janani_network::{RemoteAdvisor, RemoteSummarizer};
use janani_storage::SqliteStorage;
use janani_web::WebServer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::demo::DemoOptions;
use crate::lifecycle::LifecycleManager;
use crate::media::SimulatedMediaCapture;
use crate::notifier::LogNotifier;
use crate::offline_summarizer::OfflineSummarizer;

/// 시뮬레이션 미디어 획득 지연
const MEDIA_LATENCY: Duration = Duration::from_millis(300);

/// Janani 모성 건강 도우미 백엔드
#[derive(Parser, Debug)]
#[command(name = "janani")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 오프라인 모드 (AI 요약 없이 대체 문구 사용)
    #[arg(long, short = 'o', global = true)]
    offline: bool,

    /// REST 서버 포트 (설정 파일보다 우선)
    #[arg(long, short = 'p', global = true)]
    port: Option<u16>,

    /// 데이터 저장 경로 (설정 파일과 DB 위치)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    /// 알림/요약 언어 (예: English, Hindi)
    #[arg(long, global = true)]
    language: Option<String>,

    /// 환자 표시 이름
    #[arg(long, default_value = "Patient", global = true)]
    patient: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// REST API 서버 실행 (기본)
    Serve,
    /// 의사와 데모 통화 실행
    Call {
        /// 의사 ID (D1, D2, D3)
        #[arg(long, default_value = "D1")]
        doctor: String,
        /// 상담 사유
        #[arg(long, default_value = "Routine follow-up on vitals")]
        reason: String,
        /// 음성 통화로 시작
        #[arg(long)]
        voice: bool,
        /// 연결 후 통화 유지 시간 (초)
        #[arg(long, default_value = "8")]
        seconds: u64,
    },
}

/// 파일 위치 결정 (`--data-dir` 또는 플랫폼별 기본 경로)
fn resolve_paths(data_dir: Option<&str>) -> AppPaths {
    if let Some(dir) = data_dir {
        return AppPaths::under(dir);
    }
    AppPaths::platform().unwrap_or_else(|e| {
        warn!("플랫폼 경로 확인 실패, 현재 디렉토리 사용: {e}");
        AppPaths::under(".")
    })
}

/// 요약기 선택 (API 키 없음/오프라인이면 오프라인 요약기)
fn build_summarizer(config: &AppConfig, offline: bool) -> Arc<dyn Summarizer> {
    if offline || !config.ai.is_configured() {
        info!("AI 요약 비활성화 (오프라인)");
        return Arc::new(OfflineSummarizer);
    }
    match RemoteSummarizer::new(&config.ai) {
        Ok(summarizer) => {
            info!("AI 요약 제공자: {}", summarizer.provider_name());
            Arc::new(summarizer)
        }
        Err(e) => {
            warn!("AI 요약기 생성 실패, 오프라인으로 전환: {e}");
            Arc::new(OfflineSummarizer)
        }
    }
}

/// AI 건강 분석기 (API 키 없음/오프라인이면 없음)
fn build_advisor(config: &AppConfig, offline: bool) -> Option<Arc<dyn HealthAdvisor>> {
    if offline || !config.ai.is_configured() {
        info!("AI 건강 분석 비활성화");
        return None;
    }
    match RemoteAdvisor::new(&config.ai) {
        Ok(advisor) => {
            info!("AI 건강 분석 제공자: {}", advisor.provider_name());
            Some(Arc::new(advisor))
        }
        Err(e) => {
            warn!("AI 건강 분석기 생성 실패: {e}");
            None
        }
    }
}

/// 통화 제어기 + 클리닉 브리지 와이어링
fn build_bridge(config: &AppConfig, args: &Args) -> Result<ClinicalBridge> {
    let notifier = Arc::new(LogNotifier::new());
    let translator = Arc::new(DictionaryTranslator::new());
    let scheduler = TokioScheduler::new()?;

    let controller = CallController::spawn(
        CallPorts {
            media: Arc::new(SimulatedMediaCapture::new(MEDIA_LATENCY)),
            summarizer: build_summarizer(config, args.offline),
            scheduler: Arc::new(scheduler),
            notifier: notifier.clone(),
            translator: translator.clone(),
        },
        CallSettings::from_config(&config.call),
    );

    Ok(ClinicalBridge::new(
        controller,
        ConsultBook::with_demo(&args.patient),
        notifier,
        translator,
    ))
}

async fn serve(config: AppConfig, paths: &AppPaths, args: &Args) -> Result<()> {
    let db_path = paths.db_path(&config);
    let storage = Arc::new(SqliteStorage::open(&db_path)?);
    info!("SQLite 저장소: {}", db_path.display());

    let bridge = build_bridge(&config, args)?;
    let controller = bridge.controller().clone();
    let lifecycle = LifecycleManager::new();

    let mut web_server = WebServer::new(storage, config.web.clone()).with_bridge(bridge);
    if let Some(advisor) = build_advisor(&config, args.offline) {
        web_server = web_server.with_advisor(advisor);
    }
    info!("REST API: {}", web_server.url());
    let web_shutdown_rx = lifecycle.subscribe();
    let web_handle = tokio::spawn(async move {
        if let Err(e) = web_server.run(web_shutdown_rx).await {
            error!("웹 서버 오류: {e}");
        }
    });

    lifecycle.wait_for_signal().await;
    lifecycle.shutdown_with(&controller).await;

    if let Err(e) = web_handle.await {
        error!("웹 서버 태스크 종료 실패: {e}");
    }
    info!("Janani 종료");
    Ok(())
}

async fn call_demo(config: AppConfig, args: &Args, options: DemoOptions) -> Result<()> {
    let bridge = build_bridge(&config, args)?;
    let doctor = bridge
        .doctors()
        .into_iter()
        .find(|d| d.id == options.doctor_id)
        .ok_or_else(|| anyhow!("알 수 없는 의사 ID: {}", options.doctor_id))?;

    println!();
    println!("📞 {} ({}) · {}", doctor.name, doctor.specialty, options.reason);

    let result = demo::run_demo_call(&bridge, &options).await;
    let controller = bridge.controller();
    controller.shutdown();
    controller.settle().await;

    let session = result?;
    println!("  ■ 통화 종료 · {}", session.elapsed_display());
    if let Some(summary) = &session.summary {
        println!();
        println!("📝 상담 요약");
        println!("{summary}");
    }
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "janani={lvl},janani_app={lvl},janani_core={lvl},janani_call={lvl},janani_network={lvl},janani_storage={lvl},janani_web={lvl},tower_http={lvl}",
        lvl = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    info!("Janani 시작");

    // 설정 로드: 파일 → JANANI_* 환경변수 → CLI
    let paths = resolve_paths(args.data_dir.as_deref());
    if let Err(e) = paths.seed_config() {
        warn!("기본 설정 파일 생성 실패: {e}");
    }
    info!("설정 파일: {}", paths.config_file().display());
    let mut config = settings::load_layered(paths.config_file())?;

    if let Some(port) = args.port {
        config.web.port = port;
    }
    if let Some(name) = args.language.as_deref() {
        match Language::from_name(name) {
            Some(language) => config.call.language = language,
            None => warn!("지원하지 않는 언어, 설정값 유지: {name}"),
        }
    }

    match &args.command {
        None | Some(Command::Serve) => serve(config, &paths, &args).await,
        Some(Command::Call {
            doctor,
            reason,
            voice,
            seconds,
        }) => {
            let kind = if *voice {
                CallKind::Voice
            } else {
                CallKind::Video
            };
            let talk_for = Duration::from_secs(*seconds);
            let options = DemoOptions {
                doctor_id: doctor.clone(),
                reason: reason.clone(),
                kind,
                talk_for,
                timeout: talk_for + Duration::from_secs(config.ai.timeout_secs + 30),
            };
            call_demo(config, &args, options).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn args_default_to_serve() {
        let args = Args::parse_from(["janani"]);
        assert!(args.command.is_none());
        assert_eq!(args.log_level, "info");
        assert!(!args.offline);
    }

    #[test]
    fn call_subcommand_parses() {
        let args = Args::parse_from(["janani", "call", "--doctor", "D3", "--voice", "--offline"]);
        assert!(args.offline);
        match args.command {
            Some(Command::Call {
                doctor,
                voice,
                seconds,
                ..
            }) => {
                assert_eq!(doctor, "D3");
                assert!(voice);
                assert_eq!(seconds, 8);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn data_dir_flag_places_config_and_db() {
        let paths = resolve_paths(Some("/data"));
        assert_eq!(paths.config_file(), PathBuf::from("/data").join("config.json"));

        let mut config = AppConfig::default_config();
        assert_eq!(paths.db_path(&config), PathBuf::from("/data").join("janani.db"));
        config.storage.db_path = Some(PathBuf::from("/tmp/custom.db"));
        assert_eq!(paths.db_path(&config), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn summarizer_offline_without_key() {
        let config = AppConfig::default_config();
        assert_eq!(build_summarizer(&config, false).provider_name(), "offline");

        let mut keyed = AppConfig::default_config();
        keyed.ai.api_key = "k".to_string();
        assert_eq!(build_summarizer(&keyed, true).provider_name(), "offline");
        assert_ne!(build_summarizer(&keyed, false).provider_name(), "offline");
    }

    #[test]
    fn advisor_requires_key_and_online() {
        let config = AppConfig::default_config();
        assert!(build_advisor(&config, false).is_none());

        let mut keyed = AppConfig::default_config();
        keyed.ai.api_key = "k".to_string();
        assert!(build_advisor(&keyed, true).is_none());
        assert!(build_advisor(&keyed, false).is_some());
    }
}
