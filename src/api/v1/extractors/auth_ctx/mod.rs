/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認可ミドルウェアが解決した呼び出し元 (AuthCtx) を handler に渡す
 * - axum 依存は core、型定義は types に置く
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use self::types::AuthCtx;
