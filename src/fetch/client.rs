use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport for remote CSV exports, such as the sample dataset behind
/// `BLACKLIST_SAMPLE_URL` or batch sources given as URLs. Tests substitute
/// a stub so no request leaves the process.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
