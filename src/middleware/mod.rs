/*
 * Responsibility
 * - middleware 層の公開窓口
 */
pub mod auth;
pub mod http;
