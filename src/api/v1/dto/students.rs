use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    pub id: i64,
    pub username: String,
    pub level: Option<i32>,
}
