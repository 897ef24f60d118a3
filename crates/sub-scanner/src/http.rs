use crate::config::HTTP_REQUEST_TIMEOUT_MS;
use crate::Result;
use lazy_regex::regex_captures;
use reqwest::{Client, Response};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn url(&self, host: &str, port: u16, path: &str) -> String {
        format!("{}://{}:{}{}", self.as_str(), host, port, path)
    }
}

// requests go to the already resolved ip, certificates are not verified
pub fn pinned_client(host: &str, ip: IpAddr) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_millis(HTTP_REQUEST_TIMEOUT_MS))
        .danger_accept_invalid_certs(true)
        .resolve(host, SocketAddr::new(ip, 0))
        .build()?;
    Ok(client)
}

#[instrument(name = "HTTP_request", level = "debug", skip_all, fields(url = url))]
pub async fn http_request(http_client: &Client, url: &str) -> Result<Response> {
    match http_client.get(url).send().await {
        Ok(res) => {
            debug!("Receive with status: {}", res.status());
            Ok(res)
        }
        Err(err) => {
            debug!("Reason: {}", err);
            Err(err.into())
        }
    }
}

pub async fn read_prefix(res: &mut Response, limit: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while body.len() < limit {
        match res.chunk().await? {
            Some(chunk) => {
                let take = chunk.len().min(limit - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }
    Ok(body)
}

pub fn extract_title(body: &str) -> Option<String> {
    let (_, title) = regex_captures!(r"(?s)<title>(.*?)</title>", body)?;
    Some(title.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_urls() {
        assert_eq!(
            Scheme::Https.url("a.example.com", 8443, "/"),
            "https://a.example.com:8443/"
        );
        assert_eq!(
            Scheme::Http.url("a.example.com", 80, "/.env"),
            "http://a.example.com:80/.env"
        );
    }

    #[test]
    fn title_is_first_span_trimmed() {
        let body = "<html><head><title>\n  Home </title></head><title>Other</title>";
        assert_eq!(extract_title(body).as_deref(), Some("Home"));
    }

    #[test]
    fn title_absent_or_unclosed() {
        assert_eq!(extract_title("<html><body>hi</body></html>"), None);
        assert_eq!(extract_title("<title>never closed"), None);
    }
}
