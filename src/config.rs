//! Configuration Module
//!
//! 모든 설정은 환경변수에서 읽는다 (`.env`는 main에서 dotenvy로 로드).
//! 필수 값이 빠지면 시작 시점에 실패한다.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// 개발용 관리자 토큰 (프로덕션에서는 사용 불가)
pub const DEV_ADMIN_TOKEN: &str = "tayo-admin-dev-token";

/// 개발용 관리자 비밀번호
pub const DEV_ADMIN_PASSWORD: &str = "tayo2025!";

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트 (기본값: 3000)
    pub port: u16,

    /// JSON 파일 저장 디렉터리 (기본값: ./data)
    pub data_dir: PathBuf,

    /// 관리자 API 토큰 (Bearer / x-admin-token / admin_token 쿠키)
    pub admin_token: String,

    /// 관리자 로그인 비밀번호
    pub admin_password: String,

    /// SMS 발송 설정
    pub sms: SmsConfig,

    /// 프로덕션 CORS 허용 도메인
    pub allowed_origins: Vec<String>,

    /// 환경 (development, staging, production)
    pub environment: Environment,
}

/// 문자 발송 업체(Aligo) 설정
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub sender: Option<String>,
    /// "Y" 이면 실제 발송 없이 테스트
    pub default_testmode: String,
}

impl SmsConfig {
    /// 키, 아이디, 발신번호가 모두 있어야 발송 가능
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.user_id.is_some() && self.sender.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Environment Variables
    ///
    /// - `PORT`: 서버 포트 (기본값: 3000)
    /// - `ENVIRONMENT`: development | staging | production
    /// - `TAYO_DATA_DIR`: 데이터 디렉터리
    /// - `ADMIN_TOKEN` (또는 `TAYO_ADMIN_TOKEN`): 프로덕션에서 필수
    /// - `ADMIN_PASSWORD`: 관리자 로그인 비밀번호
    /// - `ALIGO_BASE_URL`, `ALIGO_API_KEY`, `ALIGO_USER_ID`, `ALIGO_SENDER`,
    ///   `ALIGO_DEFAULT_TESTMODE`
    /// - `ALLOWED_ORIGINS`: 콤마 구분 도메인 목록
    pub fn from_env() -> Result<Self> {
        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let admin_token = match non_empty("ADMIN_TOKEN").or_else(|| non_empty("TAYO_ADMIN_TOKEN")) {
            Some(token) => token,
            None if environment == Environment::Production => {
                bail!("ADMIN_TOKEN must be set in production")
            }
            None => DEV_ADMIN_TOKEN.to_string(),
        };

        let admin_password = match non_empty("ADMIN_PASSWORD") {
            Some(pw) => pw,
            None if environment == Environment::Production => {
                bail!("ADMIN_PASSWORD must be set in production")
            }
            None => DEV_ADMIN_PASSWORD.to_string(),
        };

        let data_dir = match non_empty("TAYO_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()
                .context("cannot resolve current directory")?
                .join("data"),
        };

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            data_dir,
            admin_token,
            admin_password,

            sms: SmsConfig {
                base_url: non_empty("ALIGO_BASE_URL")
                    .unwrap_or_else(|| "https://apis.aligo.in".to_string()),
                api_key: non_empty("ALIGO_API_KEY"),
                user_id: non_empty("ALIGO_USER_ID"),
                sender: non_empty("ALIGO_SENDER"),
                default_testmode: non_empty("ALIGO_DEFAULT_TESTMODE")
                    .unwrap_or_else(|| "N".to_string()),
            },

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            environment,
        })
    }

    /// 테스트/임베딩용 설정 (데이터 디렉터리만 지정)
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            port: 0,
            data_dir: data_dir.into(),
            admin_token: DEV_ADMIN_TOKEN.to_string(),
            admin_password: DEV_ADMIN_PASSWORD.to_string(),
            sms: SmsConfig {
                base_url: "http://localhost:0".to_string(),
                api_key: None,
                user_id: None,
                sender: None,
                default_testmode: "Y".to_string(),
            },
            allowed_origins: Vec::new(),
            environment: Environment::Development,
        }
    }

    /// 프로덕션 환경인지 확인
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
