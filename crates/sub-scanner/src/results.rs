use crate::model::{FileResult, ServiceResult, SubdomainResult};
use crate::Result;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

pub const SERVICES_FILE: &str = "services.txt";
pub const FILES_FILE: &str = "files.txt";
pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Default, Serialize)]
struct Results {
    subdomains: Vec<SubdomainResult>,
    services: Vec<ServiceResult>,
    files: Vec<FileResult>,
}

pub struct ResultManager {
    results: Mutex<Results>,
    output_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

// region:        --- Constructors

impl ResultManager {
    pub fn new(output_file: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        Self {
            results: Mutex::new(Results::default()),
            output_file,
            output_dir,
        }
    }
}

// endregion:     --- Constructors

// region:        --- Recording

impl ResultManager {
    fn lock(&self) -> MutexGuard<'_, Results> {
        // every push completes under the lock, so a poisoned guard is still consistent
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_subdomain_result(&self, subdomain: &str, ip: Option<IpAddr>) {
        let mut results = self.lock();
        match ip {
            Some(ip) => info!("{:12} - {} [{}]", "FOUND", subdomain, ip),
            None => debug!("{:12} - {}", "NOT FOUND", subdomain),
        }
        results.subdomains.push(SubdomainResult::new(subdomain, ip));
    }

    pub fn add_service_result(&self, result: ServiceResult) {
        let mut results = self.lock();
        info!(
            "{:12} - {}:{} - {} - {}",
            "SERVICE", result.subdomain, result.port, result.service, result.info
        );
        results.services.push(result);
    }

    pub fn add_file_result(&self, result: FileResult) {
        let mut results = self.lock();
        if result.success {
            info!(
                "{:12} - {} - {} ({} bytes)",
                "FILE", result.subdomain, result.file_path, result.size
            );
        } else {
            debug!(
                "{:12} - {} - {}",
                "NO FILE", result.subdomain, result.file_path
            );
        }
        results.files.push(result);
    }

    pub fn results(&self) -> Vec<SubdomainResult> {
        self.lock().subdomains.clone()
    }

    pub fn found_results(&self) -> Vec<SubdomainResult> {
        self.lock()
            .subdomains
            .iter()
            .filter(|result| result.found())
            .cloned()
            .collect()
    }

    pub fn service_results(&self) -> Vec<ServiceResult> {
        self.lock().services.clone()
    }

    pub fn file_results(&self) -> Vec<FileResult> {
        self.lock().files.clone()
    }

    pub fn summary(&self) -> ScanSummary {
        let results = self.lock();
        ScanSummary {
            scanned: results.subdomains.len(),
            found: results.subdomains.iter().filter(|r| r.found()).count(),
            services: results.services.len(),
            files: results.files.iter().filter(|r| r.success).count(),
            output_file: self.output_file.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

// endregion:     --- Recording

// region:        --- Saving

impl ResultManager {
    pub fn save_results(&self) -> Result<()> {
        let Some(path) = &self.output_file else {
            return Ok(());
        };
        let results = self.lock();

        let mut file = create_output_file(path, "Results")?;
        for result in results.subdomains.iter().filter(|r| r.found()) {
            writeln!(file, "{},{}", result.subdomain, result.ip_string())?;
        }
        file.flush()?;

        info!("Results saved to {}", path.display());
        Ok(())
    }

    pub fn save_service_results(&self) -> Result<()> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        let results = self.lock();

        let path = dir.join(SERVICES_FILE);
        let mut file = create_output_file(&path, "Service Results")?;
        for result in &results.services {
            writeln!(
                file,
                "{}:{},{},{}",
                result.subdomain, result.port, result.service, result.info
            )?;
        }
        file.flush()?;

        info!("Service results saved to {}", path.display());
        Ok(())
    }

    pub fn save_file_results(&self) -> Result<()> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        let results = self.lock();

        let path = dir.join(FILES_FILE);
        let mut file = create_output_file(&path, "File Extraction Results")?;
        for result in results.files.iter().filter(|r| r.success) {
            writeln!(
                file,
                "{},{},{}",
                result.subdomain, result.file_path, result.size
            )?;
        }
        file.flush()?;

        info!("File results saved to {}", path.display());
        Ok(())
    }

    pub fn save_json_report(&self) -> Result<()> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        let results = self.lock();

        ensure_dir(dir)?;
        let path = dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(&*results)?;
        fs::write(&path, json)?;

        info!("JSON report saved to {}", path.display());
        Ok(())
    }

    #[instrument(name = "save", level = "info", skip_all)]
    pub fn save_all(&self) -> Result<()> {
        let steps = [
            self.save_results(),
            self.save_service_results(),
            self.save_file_results(),
            self.save_json_report(),
        ];
        steps.into_iter().collect()
    }
}

pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        Ok(false)
    } else {
        fs::create_dir_all(dir)?;
        Ok(true)
    }
}

fn create_output_file(path: &Path, title: &str) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let now = OffsetDateTime::now_utc()
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))?;

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "# Sub Scanner {} - Generated on {}", title, now)?;
    Ok(file)
}

// endregion:     --- Saving

// region:        --- Summary

#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub found: usize,
    pub services: usize,
    pub files: usize,
    pub output_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Sub Scanner Summary ===")?;
        writeln!(f, "Total subdomains scanned: {}", self.scanned)?;
        writeln!(f, "Subdomains found: {}", self.found)?;
        writeln!(f, "Services discovered: {}", self.services)?;
        writeln!(f, "Files extracted: {}", self.files)?;
        if let Some(path) = &self.output_file {
            writeln!(f, "Results saved to: {}", path.display())?;
        }
        if let Some(dir) = &self.output_dir {
            writeln!(f, "Service results saved to: {}", dir.join(SERVICES_FILE).display())?;
            writeln!(f, "File results saved to: {}", dir.join(FILES_FILE).display())?;
        }
        Ok(())
    }
}

// endregion:     --- Summary
