pub async fn health_check() -> &'static str {
    "Upload Service is healthy"
}
