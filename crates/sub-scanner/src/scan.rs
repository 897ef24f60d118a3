use crate::config::ScanConfig;
use crate::dns::{self, DnsResolver};
use crate::files::FileExtractor;
use crate::ports::ServiceProber;
use crate::results::{ResultManager, ScanSummary};
use crate::wordlist::{self, clean_domain, generate_candidates, is_valid_domain};
use crate::Result;
use futures::{stream, StreamExt};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

// region:        --- Scan main function

#[tokio::main]
#[instrument(name = "scan", level = "info", skip_all)]
pub async fn scan(config: &ScanConfig) -> Result<(ScanSummary, Result<()>)> {
    config.validate()?;

    let words = wordlist::load_wordlist(&config.wordlist_path()?)?;
    let targets = wordlist::load_targets(&config.target)?;

    let results = Arc::new(ResultManager::new(
        config.output_file.clone(),
        config.output_dir.clone(),
    ));
    let scanner = Scanner::new(
        dns::new_resolver(),
        ServiceProber::new(),
        FileExtractor::new(config.output_dir.clone()),
        Arc::clone(&results),
        config.threads,
    );

    for target in &targets {
        let domain = clean_domain(target);
        if !is_valid_domain(domain) {
            warn!("{:?} does not look like a domain, scanning anyway", domain);
        }
        info!("Scanning {} with {} words", domain, words.len());
        scanner.run(generate_candidates(domain, &words)).await;
    }

    Ok(finish(&results))
}

// the summary is reported even when some output could not be written
fn finish(results: &ResultManager) -> (ScanSummary, Result<()>) {
    let saved = results.save_all();
    if let Err(err) = &saved {
        error!("Saving results: {}", err);
    }
    (results.summary(), saved)
}

// endregion:     --- Scan main function

// region:        --- Scanner

pub struct Scanner {
    resolver: DnsResolver,
    prober: ServiceProber,
    extractor: FileExtractor,
    results: Arc<ResultManager>,
    concurrency: usize,
}

impl Scanner {
    pub fn new(
        resolver: DnsResolver,
        prober: ServiceProber,
        extractor: FileExtractor,
        results: Arc<ResultManager>,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            prober,
            extractor,
            results,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self, candidates: Vec<String>) {
        let (found_tx, found_rx) = mpsc::channel(self.concurrency);

        tokio::join!(
            self.resolve_all(candidates, found_tx),
            self.probe_all(found_rx)
        );
    }

    #[instrument(name = "resolves", level = "info", skip_all)]
    async fn resolve_all(&self, candidates: Vec<String>, found_tx: mpsc::Sender<(String, IpAddr)>) {
        info!("{} domains to resolve", candidates.len());

        let mut found = 0usize;
        stream::iter(candidates.into_iter())
            .map(|candidate| {
                let resolver = Arc::clone(&self.resolver);
                async move {
                    let ip = resolver.resolve(&candidate).await;
                    (candidate, ip)
                }
            })
            .buffer_unordered(self.concurrency)
            .for_each(|(candidate, ip)| {
                // recorded before probing starts, so every probe result has a found host
                self.results.add_subdomain_result(&candidate, ip);
                found += usize::from(ip.is_some());
                let found_tx = found_tx.clone();
                async move {
                    if let Some(ip) = ip {
                        let _ = found_tx.send((candidate, ip)).await;
                    }
                }
            })
            .await;

        info!("{} domains resolved", found);
    }

    #[instrument(name = "probes", level = "info", skip_all)]
    async fn probe_all(&self, found_rx: mpsc::Receiver<(String, IpAddr)>) {
        tokio_stream::wrappers::ReceiverStream::new(found_rx)
            .for_each_concurrent(self.concurrency, |(host, ip)| async move {
                debug!("Probing {} [{}]", host, ip);
                let (services, files) = tokio::join!(
                    self.prober.probe(&host, ip),
                    self.extractor.extract(&host, ip)
                );
                for service in services {
                    self.results.add_service_result(service);
                }
                for file in files {
                    self.results.add_file_result(file);
                }
            })
            .await;
    }
}

// endregion:     --- Scanner
