//! 파일 위치.
//!
//! 설정 파일과 SQLite DB가 놓일 디렉토리를 정한다.
//! 설정 값 자체는 앱 크레이트가 파일 + 환경변수 계층으로 읽는다.

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 설정 파일 이름
pub const CONFIG_FILE_NAME: &str = "config.json";

/// DB 파일 이름
pub const DB_FILE_NAME: &str = "janani.db";

/// 설정 파일과 데이터 디렉토리 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    config_file: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    /// 플랫폼 기본 위치
    ///
    /// - macOS: `~/Library/Application Support/health.janani.janani/`
    /// - Windows: `%APPDATA%\janani\janani\`
    /// - Linux: 설정 `~/.config/janani/`, 데이터 `~/.local/share/janani/`
    pub fn platform() -> Result<Self, CoreError> {
        let dirs = ProjectDirs::from("health", "janani", "janani")
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))?;
        Ok(Self {
            config_file: dirs.config_dir().join(CONFIG_FILE_NAME),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// 한 디렉토리에 설정과 DB를 함께 둔다 (`--data-dir`)
    pub fn under(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            config_file: dir.join(CONFIG_FILE_NAME),
            data_dir: dir,
        }
    }

    /// 설정 파일 경로
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// 데이터 디렉토리
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// DB 경로: 설정의 `storage.db_path`가 있으면 그 값
    pub fn db_path(&self, config: &AppConfig) -> PathBuf {
        config
            .storage
            .db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DB_FILE_NAME))
    }

    /// 설정 파일이 없으면 기본값으로 만든다 · 새로 만들었으면 `true`
    ///
    /// 기존 파일은 건드리지 않는다.
    pub fn seed_config(&self) -> Result<bool, CoreError> {
        if self.config_file.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.config_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&AppConfig::default_config())?;
        fs::write(&self.config_file, content).map_err(|e| {
            CoreError::Config(format!(
                "설정 파일 저장 실패: {}: {e}",
                self.config_file.display()
            ))
        })?;
        info!("기본 설정 파일 생성: {}", self.config_file.display());
        Ok(true)
    }
}
