//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로
//! - `JWT_SECRET`: JWT 토큰 서명에 사용할 비밀키
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호
//! - `FRONTEND_DIST`: 빌드된 프론트엔드 정적 파일 디렉토리
//! - `WS_OUTBOUND_BUFFER`: 라이브 연결 하나당 송신 대기열 크기

use std::env;

/// 포트 기본값
const DEFAULT_PORT: u16 = 8881;
/// 연결 하나가 밀려 있을 수 있는 이벤트 수의 기본값
const DEFAULT_WS_OUTBOUND_BUFFER: usize = 32;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/retroboard.db?mode=rwc")
    pub database_url: String,
    /// JWT 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 8881)
    pub port: u16,
    /// 프론트엔드 빌드 결과물 경로 (기본값: "frontend/dist")
    pub frontend_dist: String,
    /// 연결별 송신 대기열 크기. 이 크기를 넘게 밀린 연결은 느린 연결로 보고 끊습니다.
    pub ws_outbound_buffer: usize,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없거나 파싱에 실패해도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러
            jwt_secret: env::var("JWT_SECRET")?,     // 필수: 없으면 에러
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or(env::var("PORT").ok(), DEFAULT_PORT),
            frontend_dist: env::var("FRONTEND_DIST")
                .unwrap_or_else(|_| "frontend/dist".to_string()),
            ws_outbound_buffer: parse_or(
                env::var("WS_OUTBOUND_BUFFER").ok(),
                DEFAULT_WS_OUTBOUND_BUFFER,
            )
            .max(1), // mpsc::channel(0)은 패닉하므로 최소 1
        })
    }
}

/// 값이 없거나 파싱에 실패하면 기본값을 돌려줍니다.
fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or::<u16>(Some("9000".into()), 8881), 9000);
        assert_eq!(parse_or::<u16>(Some("not-a-port".into()), 8881), 8881);
        assert_eq!(parse_or::<u16>(None, 8881), 8881);
        assert_eq!(parse_or::<usize>(Some(" 64 ".into()), 32), 64);
    }
}
