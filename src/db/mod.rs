//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 서비스 계층(services/)과 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `templates`: 템플릿과 템플릿 질문의 생성/조회/삭제
//! - `sessions`: 세션 생성(템플릿 복사), 질문·포스트잇을 포함한 조회, 연쇄 삭제
//! - `postits`: 포스트잇 CRUD와 투표
//! - `users`: 사용자 인증 관련 쿼리
//!
//! 여러 테이블을 함께 바꾸는 작업(세션 생성, 세션 삭제, 템플릿 생성/삭제)은
//! 하나의 트랜잭션 안에서 실행되어, 중간에 실패하면 아무 행도 남지 않습니다.

pub mod postits;
pub mod sessions;
pub mod templates;
pub mod users;

// 하위 모듈의 모든 공개 함수를 재공개(re-export)하여
// `crate::db::get_session`처럼 바로 접근할 수 있게 합니다.
pub use postits::*;
pub use sessions::*;
pub use templates::*;

/// 테스트용 인메모리 SQLite 풀을 만들고 마이그레이션을 적용합니다.
///
/// `sqlite::memory:`는 연결마다 별도의 DB가 생기므로 연결을 1개로 고정하고,
/// 유휴/수명 제한을 꺼서 테스트 도중 연결(=DB)이 사라지지 않게 합니다.
#[cfg(test)]
pub async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply");

    pool
}
