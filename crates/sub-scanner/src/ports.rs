use crate::config::SOCKET_CON_TIMEOUT_MS;
use crate::http::{extract_title, http_request, pinned_client, read_prefix, Scheme};
use crate::model::ServiceResult;
use futures::{stream, StreamExt};
use reqwest::Client;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

const TITLE_SCAN_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct ServicePort {
    pub port: u16,
    pub label: &'static str,
    pub web: Option<Scheme>,
}

pub const COMMON_SERVICES: &[ServicePort] = &[
    ServicePort { port: 80, label: "HTTP", web: Some(Scheme::Http) },
    ServicePort { port: 443, label: "HTTPS", web: Some(Scheme::Https) },
    ServicePort { port: 21, label: "FTP", web: None },
    ServicePort { port: 22, label: "SSH", web: None },
    ServicePort { port: 25, label: "SMTP", web: None },
    ServicePort { port: 53, label: "DNS", web: None },
    ServicePort { port: 8080, label: "HTTP-ALT", web: Some(Scheme::Http) },
    ServicePort { port: 8443, label: "HTTPS-ALT", web: Some(Scheme::Https) },
];

#[derive(Debug, Default, PartialEq)]
pub struct WebInfo {
    pub status: Option<u16>,
    pub title: Option<String>,
    pub server: Option<String>,
}

impl WebInfo {
    /// `Status: 200 | Title: Home | Server: nginx`, absent parts omitted.
    pub fn to_info(&self) -> String {
        let mut parts = Vec::new();
        if let Some(status) = self.status {
            parts.push(format!("Status: {}", status));
        }
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            parts.push(format!("Title: {}", title));
        }
        if let Some(server) = self.server.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("Server: {}", server));
        }
        parts.join(" | ")
    }
}

pub struct ServiceProber {
    services: Vec<ServicePort>,
}

impl ServiceProber {
    pub fn new() -> Self {
        Self::with_services(COMMON_SERVICES.to_vec())
    }

    pub fn with_services(services: Vec<ServicePort>) -> Self {
        Self { services }
    }

    #[instrument(name = "services", level = "debug", skip_all, fields(host = host))]
    pub async fn probe(&self, host: &str, ip: IpAddr) -> Vec<ServiceResult> {
        let http_client = match pinned_client(host, ip) {
            Ok(client) => Some(client),
            Err(err) => {
                debug!("No HTTP client for enrichment: {}", err);
                None
            }
        };

        let concurrency = self.services.len().max(1);
        stream::iter(self.services.iter())
            .map(|service| {
                let http_client = http_client.as_ref();
                async move {
                    if !is_port_open(SocketAddr::new(ip, service.port)).await {
                        return None;
                    }
                    let info = match (service.web, http_client) {
                        (Some(scheme), Some(client)) => {
                            web_info(client, &scheme.url(host, service.port, "/"))
                                .await
                                .to_info()
                        }
                        _ => String::new(),
                    };
                    Some(ServiceResult::new(host, service.port, service.label, info))
                }
            })
            .buffered(concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await
    }
}

pub async fn is_port_open(socket_address: SocketAddr) -> bool {
    let timeout = Duration::from_millis(SOCKET_CON_TIMEOUT_MS);
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(&socket_address)).await,
        Ok(Ok(_))
    )
}

pub async fn web_info(http_client: &Client, url: &str) -> WebInfo {
    let mut res = match http_request(http_client, url).await {
        Ok(res) => res,
        Err(_) => return WebInfo::default(),
    };

    let status = Some(res.status().as_u16());
    let server = res
        .headers()
        .get(reqwest::header::SERVER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let title = read_prefix(&mut res, TITLE_SCAN_LIMIT)
        .await
        .ok()
        .and_then(|body| extract_title(&String::from_utf8_lossy(&body)));

    WebInfo {
        status,
        title,
        server,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn common_services_table() {
        let ports: Vec<u16> = COMMON_SERVICES.iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![80, 443, 21, 22, 25, 53, 8080, 8443]);
        assert!(COMMON_SERVICES
            .iter()
            .filter(|s| s.web.is_some())
            .all(|s| [80, 443, 8080, 8443].contains(&s.port)));
    }

    #[test]
    fn info_omits_missing_parts() {
        let info = WebInfo {
            status: Some(200),
            title: Some(String::new()),
            server: Some("nginx".into()),
        };
        assert_eq!(info.to_info(), "Status: 200 | Server: nginx");
        assert_eq!(WebInfo::default().to_info(), "");
    }

    #[tokio::test]
    async fn closed_port_yields_no_result() {
        let port = closed_port().await;
        let prober = ServiceProber::with_services(vec![ServicePort {
            port,
            label: "HTTP",
            web: Some(Scheme::Http),
        }]);

        assert!(prober.probe("localhost", LOCALHOST).await.is_empty());
    }

    #[tokio::test]
    async fn open_web_port_is_enriched_with_title_and_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Server", "nginx")
                    .set_body_string("<html><title>Home</title></html>"),
            )
            .mount(&server)
            .await;

        let prober = ServiceProber::with_services(vec![ServicePort {
            port: server.address().port(),
            label: "HTTP",
            web: Some(Scheme::Http),
        }]);
        let results = prober.probe("localhost", LOCALHOST).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].service, "HTTP");
        assert_eq!(results[0].info, "Status: 200 | Title: Home | Server: nginx");
    }

    #[tokio::test]
    async fn open_web_port_without_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain body"))
            .mount(&server)
            .await;

        let port = server.address().port();
        let prober = ServiceProber::with_services(vec![ServicePort {
            port,
            label: "HTTP",
            web: Some(Scheme::Http),
        }]);
        let results = prober.probe("localhost", LOCALHOST).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].port, port);
        assert!(!results[0].info.contains("Title"));
    }

    #[tokio::test]
    async fn failed_enrichment_keeps_open_port() {
        // plain HTTP server probed over TLS
        let server = MockServer::start().await;
        let prober = ServiceProber::with_services(vec![ServicePort {
            port: server.address().port(),
            label: "HTTPS-ALT",
            web: Some(Scheme::Https),
        }]);
        let results = prober.probe("localhost", LOCALHOST).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].service, "HTTPS-ALT");
        assert_eq!(results[0].info, "");
    }

    #[tokio::test]
    async fn results_follow_table_order() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        let closed = closed_port().await;
        let prober = ServiceProber::with_services(vec![
            ServicePort { port: second.address().port(), label: "B", web: None },
            ServicePort { port: closed, label: "X", web: None },
            ServicePort { port: first.address().port(), label: "A", web: None },
        ]);

        let labels: Vec<String> = prober
            .probe("localhost", LOCALHOST)
            .await
            .into_iter()
            .map(|r| r.service)
            .collect();
        assert_eq!(labels, vec!["B", "A"]);
    }
}
