use crate::http::{http_request, pinned_client, Scheme};
use crate::model::FileResult;
use crate::Result;
use reqwest::Client;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

pub const COMMON_PATHS: &[&str] = &[
    "/robots.txt",
    "/sitemap.xml",
    "/.git/HEAD",
    "/.env",
    "/wp-config.php",
    "/config.php",
    "/admin/",
    "/backup/",
    "/database/",
    "/api/",
];

pub const DEFAULT_ENDPOINTS: &[(Scheme, u16)] = &[(Scheme::Http, 80), (Scheme::Https, 443)];

pub struct FileExtractor {
    paths: Vec<String>,
    endpoints: Vec<(Scheme, u16)>,
    output_dir: Option<PathBuf>,
}

impl FileExtractor {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self {
            paths: COMMON_PATHS.iter().map(|p| p.to_string()).collect(),
            endpoints: DEFAULT_ENDPOINTS.to_vec(),
            output_dir,
        }
    }

    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<(Scheme, u16)>) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[instrument(name = "files", level = "debug", skip_all, fields(host = host))]
    pub async fn extract(&self, host: &str, ip: IpAddr) -> Vec<FileResult> {
        let http_client = match pinned_client(host, ip) {
            Ok(client) => Some(client),
            Err(err) => {
                debug!("No HTTP client for extraction: {}", err);
                None
            }
        };

        let mut results = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let mut size = None;
            if let Some(http_client) = &http_client {
                for (scheme, port) in &self.endpoints {
                    let url = scheme.url(host, *port, path);
                    match self.download(http_client, &url, host, path).await {
                        Ok(Some(written)) => {
                            size = Some(written);
                            break;
                        }
                        Ok(None) => {}
                        Err(err) => debug!("{:12} - {}: {}", "FETCH FAILED", url, err),
                    }
                }
            }
            results.push(FileResult::new(
                host,
                path,
                size.is_some(),
                size.unwrap_or_default(),
            ));
        }
        results
    }

    async fn download(
        &self,
        http_client: &Client,
        url: &str,
        host: &str,
        path: &str,
    ) -> Result<Option<u64>> {
        let res = http_request(http_client, url).await?;
        if res.status().as_u16() >= 400 {
            return Ok(None);
        }

        match &self.output_dir {
            Some(output_dir) => {
                let file_path = output_path(output_dir, host, path);
                if let Some(parent) = file_path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                let mut file = File::create(&file_path).await?;
                match stream_body(res, &mut file).await {
                    Ok(written) => Ok(Some(written)),
                    Err(err) => {
                        drop(file);
                        let _ = fs::remove_file(&file_path).await;
                        Err(err)
                    }
                }
            }
            None => Ok(Some(stream_body(res, &mut tokio::io::sink()).await?)),
        }
    }
}

pub fn output_path(output_dir: &Path, host: &str, path: &str) -> PathBuf {
    let relative = path.trim_matches('/');
    let relative = if relative.is_empty() { "index" } else { relative };
    output_dir.join(host).join(relative)
}

async fn stream_body<W>(mut res: reqwest::Response, writer: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = res.chunk().await? {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}
