//! Response handling shared by the Push and Search clients.

use crate::error::Result;
use reqwest::Response;

/// Split a response into success or `(status, body)`.
///
/// Only the body read of a failed response can error; the status itself is
/// never turned into an error here.
pub(crate) async fn check(
    response: Response,
) -> Result<std::result::Result<Response, (u16, String)>> {
    let status = response.status();
    if status.is_success() {
        return Ok(Ok(response));
    }
    let body = response.text().await?;
    Ok(Err((status.as_u16(), body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_check_splits_on_status() {
        let server = MockServer::start().await;
        Mock::given(path("/ok"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(path("/nope"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();

        let ok = client.get(format!("{}/ok", server.uri())).send().await.unwrap();
        assert!(check(ok).await.unwrap().is_ok());

        let nope = client.get(format!("{}/nope", server.uri())).send().await.unwrap();
        match check(nope).await.unwrap() {
            Err((status, body)) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            Ok(_) => panic!("429 should not count as success"),
        }
    }
}
