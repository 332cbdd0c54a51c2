use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

/// Network dependency of the font resolver, injected so tests never touch the
/// network and callers can swap transports.
pub trait FontFetcher: Send + Sync {
    /// Download `url` and write the body to `dest`.
    fn fetch(&self, url: &str, dest: &Path) -> anyhow::Result<()>;
}

/// Blocking HTTP fetcher for the bundled-font fallback.
#[derive(Debug, Default)]
pub struct HttpFontFetcher;

impl FontFetcher for HttpFontFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> anyhow::Result<()> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;
        let bytes = client
            .get(url)
            .send()
            .with_context(|| format!("fetch '{url}'"))?
            .error_for_status()
            .with_context(|| format!("fetch '{url}'"))?
            .bytes()
            .context("read font body")?;
        std::fs::write(dest, &bytes).with_context(|| format!("write '{}'", dest.display()))?;
        Ok(())
    }
}

/// Fetch into `<dest>.part` and rename, so concurrent first-time fetches never
/// leave a torn font file behind.
pub(crate) fn fetch_atomic(
    fetcher: &dyn FontFetcher,
    url: &str,
    dest: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create font dir '{}'", parent.display()))?;
    }
    let tmp = dest.with_extension("part");
    fetcher.fetch(url, &tmp)?;
    std::fs::rename(&tmp, dest)
        .with_context(|| format!("rename '{}' into place", tmp.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher(&'static [u8]);

    impl FontFetcher for StaticFetcher {
        fn fetch(&self, _url: &str, dest: &Path) -> anyhow::Result<()> {
            std::fs::write(dest, self.0)?;
            Ok(())
        }
    }

    struct FailingFetcher;

    impl FontFetcher for FailingFetcher {
        fn fetch(&self, _url: &str, _dest: &Path) -> anyhow::Result<()> {
            anyhow::bail!("offline")
        }
    }

    #[test]
    fn fetch_atomic_creates_dir_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("fonts").join("fallback.otf");
        fetch_atomic(&StaticFetcher(b"font-bytes"), "http://unused", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"font-bytes");
        assert!(!dest.with_extension("part").exists());
    }

    #[test]
    fn fetch_atomic_propagates_fetcher_failure_without_dest() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("fallback.otf");
        assert!(fetch_atomic(&FailingFetcher, "http://unused", &dest).is_err());
        assert!(!dest.exists());
    }
}
