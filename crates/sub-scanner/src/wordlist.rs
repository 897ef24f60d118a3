use crate::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

// region:        --- Loading

pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    debug!("Loading wordlist from {}", path.display());
    let reader = BufReader::new(File::open(path)?);

    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() && !word.starts_with('#') {
            words.push(word.to_string());
        }
    }

    info!("Loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

pub fn load_targets(target: &str) -> Result<Vec<String>> {
    let path = Path::new(target);
    if path.is_file() {
        return load_wordlist(path);
    }
    Ok(vec![target.to_string()])
}

// endregion:     --- Loading

// region:        --- Candidates

/// Strips a leading `http://` or `https://` and anything after the first `/`.
pub fn clean_domain(domain: &str) -> &str {
    let domain = domain.strip_prefix("http://").unwrap_or(domain);
    let domain = domain.strip_prefix("https://").unwrap_or(domain);
    domain.split('/').next().unwrap_or(domain)
}

pub fn is_valid_domain(domain: &str) -> bool {
    domain.contains('.')
        && !domain.contains(' ')
        && !domain.contains("http://")
        && !domain.contains("https://")
}

pub fn generate_candidates(domain: &str, words: &[String]) -> Vec<String> {
    let domain = clean_domain(domain);
    words
        .iter()
        .map(|word| format!("{}.{}", word, domain))
        .collect()
}

// endregion:     --- Candidates

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn candidates_follow_wordlist_order() {
        let candidates = generate_candidates("example.com", &words(&["www", "mail"]));
        assert_eq!(candidates, vec!["www.example.com", "mail.example.com"]);
    }

    #[test]
    fn candidates_keep_duplicates() {
        let candidates = generate_candidates("example.com", &words(&["a", "b", "a"]));
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], candidates[2]);
    }

    #[test]
    fn candidates_use_cleaned_domain() {
        let candidates = generate_candidates("https://example.com/login", &words(&["api"]));
        assert_eq!(candidates, vec!["api.example.com"]);
    }

    #[test]
    fn empty_wordlist_yields_no_candidates() {
        assert!(generate_candidates("example.com", &[]).is_empty());
    }

    #[test]
    fn clean_domain_strips_scheme_and_path() {
        assert_eq!(clean_domain("http://example.com/path"), "example.com");
        assert_eq!(clean_domain("https://example.com/path"), "example.com");
        assert_eq!(clean_domain("example.com/"), "example.com");
    }

    #[test]
    fn clean_domain_is_idempotent() {
        for raw in ["example.com", "https://example.com/a/b", "http://sub.example.org"] {
            let once = clean_domain(raw);
            assert_eq!(clean_domain(once), once);
        }
    }

    #[test]
    fn domain_validity() {
        assert!(is_valid_domain("example.com"));
        assert!(!is_valid_domain("localhost"));
        assert!(!is_valid_domain("exa mple.com"));
        assert!(!is_valid_domain("http://example.com"));
    }

    #[test]
    fn wordlist_skips_blank_and_comment_lines() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "# common names\nwww\n\n  mail  \n#dev\napi")?;

        let words = load_wordlist(file.path())?;
        assert_eq!(words, vec!["www", "mail", "api"]);
        Ok(())
    }

    #[test]
    fn missing_wordlist_is_an_error() {
        assert!(load_wordlist(Path::new("/definitely/not/here.txt")).is_err());
    }

    #[test]
    fn targets_from_file_or_literal() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "example.com\n# skip\nexample.org")?;
        let path = file.path().to_string_lossy().to_string();

        assert_eq!(load_targets(&path)?, vec!["example.com", "example.org"]);
        assert_eq!(load_targets("example.net")?, vec!["example.net"]);
        Ok(())
    }
}
