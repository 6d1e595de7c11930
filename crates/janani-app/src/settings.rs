//! 설정 로드.
//!
//! 설정 파일(JSON) 위에 `JANANI_*` 환경변수를 덮어쓴다.
//! 예: `JANANI_WEB__PORT=8080`, `JANANI_AI__API_KEY=...`

use config::{Config, Environment, File, FileFormat};
use janani_core::config::AppConfig;
use janani_core::error::CoreError;
use std::path::Path;
use tracing::debug;

/// 환경변수 접두사
const ENV_PREFIX: &str = "JANANI";

/// 설정 파일 + 환경변수 계층 로드
///
/// 파일이 없으면 기본값 위에 환경변수만 적용한다.
pub fn load_layered(config_path: &Path) -> Result<AppConfig, CoreError> {
    load_with_env(config_path, Environment::with_prefix(ENV_PREFIX))
}

fn load_with_env(config_path: &Path, env: Environment) -> Result<AppConfig, CoreError> {
    let settings = Config::builder()
        .add_source(
            File::from(config_path)
                .format(FileFormat::Json)
                .required(false),
        )
        .add_source(
            env.prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| CoreError::Config(format!("설정 로드 실패: {e}")))?;

    let config: AppConfig = settings
        .try_deserialize()
        .map_err(|e| CoreError::Config(format!("설정 해석 실패: {e}")))?;

    debug!("설정 로드 완료: {}", config_path.display());
    Ok(config)
}
