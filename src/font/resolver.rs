use std::path::{Path, PathBuf};

use crate::font::fetch::{FontFetcher, fetch_atomic};

/// Weight class the caller wants; resolution tables are keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Bold,
    Normal,
}

/// Host platform family, resolved once at startup. Anything that is not macOS
/// or Windows is treated as Linux.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Linux,
        }
    }
}

const FONT_PATHS_MAC_BOLD: &[&str] = &[
    "/System/Library/Fonts/ヒラギノ角ゴシック W8.ttc",
    "/System/Library/Fonts/ヒラギノ角ゴシック W7.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
];

const FONT_PATHS_MAC_NORMAL: &[&str] = &[
    "/System/Library/Fonts/ヒラギノ角ゴシック W6.ttc",
    "/System/Library/Fonts/ヒラギノ角ゴシック W4.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
];

const FONT_PATHS_WIN_BOLD: &[&str] = &[
    "C:/Windows/Fonts/YuGothB.ttc",
    "C:/Windows/Fonts/meiryob.ttc",
    "C:/Windows/Fonts/meiryo.ttc",
    "C:/Windows/Fonts/msgothic.ttc",
];

const FONT_PATHS_WIN_NORMAL: &[&str] = &[
    "C:/Windows/Fonts/YuGothM.ttc",
    "C:/Windows/Fonts/meiryo.ttc",
    "C:/Windows/Fonts/msgothic.ttc",
];

const FONT_PATHS_LINUX_BOLD: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/truetype/takao-gothic/TakaoGothic.ttf",
];

const FONT_PATHS_LINUX_NORMAL: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/takao-gothic/TakaoGothic.ttf",
];

/// Known-good CJK-capable bold face used when no system font is found.
pub const BUNDLED_FONT_URL: &str =
    "https://github.com/googlefonts/noto-cjk/raw/main/Sans/OTF/Japanese/NotoSansCJKjp-Bold.otf";

/// File name of the fetched fallback inside the bundled-fonts directory.
pub const BUNDLED_FONT_FILE: &str = "NotoSansCJKjp-Bold.otf";

fn candidate_paths(platform: Platform, style: FontStyle) -> &'static [&'static str] {
    match (platform, style) {
        (Platform::MacOs, FontStyle::Bold) => FONT_PATHS_MAC_BOLD,
        (Platform::MacOs, FontStyle::Normal) => FONT_PATHS_MAC_NORMAL,
        (Platform::Windows, FontStyle::Bold) => FONT_PATHS_WIN_BOLD,
        (Platform::Windows, FontStyle::Normal) => FONT_PATHS_WIN_NORMAL,
        (Platform::Linux, FontStyle::Bold) => FONT_PATHS_LINUX_BOLD,
        (Platform::Linux, FontStyle::Normal) => FONT_PATHS_LINUX_NORMAL,
    }
}

/// Where a resolved font file came from. `Fetched` means the resolver just
/// performed a network download and a disk write; `Bundled` means a previous
/// run already did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    System(PathBuf),
    Bundled(PathBuf),
    Fetched(PathBuf),
}

impl FontSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::System(p) | Self::Bundled(p) | Self::Fetched(p) => p,
        }
    }
}

/// Locates a usable text-rendering font: well-known system locations first,
/// then a previously fetched bundled font, then a one-time network fetch.
///
/// Resolution never fails hard; total failure is reported as `None` and the
/// caller degrades to whatever fonts the shaping engine can find.
pub struct FontResolver {
    platform: Platform,
    bundled_dir: PathBuf,
    fetcher: Box<dyn FontFetcher>,
}

impl FontResolver {
    pub fn new(bundled_dir: impl Into<PathBuf>, fetcher: Box<dyn FontFetcher>) -> Self {
        Self::with_platform(Platform::detect(), bundled_dir, fetcher)
    }

    pub fn with_platform(
        platform: Platform,
        bundled_dir: impl Into<PathBuf>,
        fetcher: Box<dyn FontFetcher>,
    ) -> Self {
        Self {
            platform,
            bundled_dir: bundled_dir.into(),
            fetcher,
        }
    }

    /// Resolve a font file for `style`, possibly fetching the bundled fallback.
    pub fn resolve(&self, style: FontStyle) -> Option<FontSource> {
        for candidate in candidate_paths(self.platform, style) {
            let path = Path::new(candidate);
            if path.exists() {
                return Some(FontSource::System(path.to_path_buf()));
            }
        }

        let bundled = self.bundled_dir.join(BUNDLED_FONT_FILE);
        if bundled.exists() {
            return Some(FontSource::Bundled(bundled));
        }

        tracing::debug!(url = BUNDLED_FONT_URL, "no system font found, fetching fallback");
        match fetch_atomic(self.fetcher.as_ref(), BUNDLED_FONT_URL, &bundled) {
            Ok(()) => Some(FontSource::Fetched(bundled)),
            Err(err) => {
                tracing::warn!(error = %err, "bundled font fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubFetcher {
        body: Option<&'static [u8]>,
    }

    impl FontFetcher for StubFetcher {
        fn fetch(&self, _url: &str, dest: &Path) -> anyhow::Result<()> {
            match self.body {
                Some(bytes) => {
                    std::fs::write(dest, bytes)?;
                    Ok(())
                }
                None => anyhow::bail!("offline"),
            }
        }
    }

    fn resolver(dir: &Path, body: Option<&'static [u8]>) -> FontResolver {
        // Windows tables: no `C:/Windows` on the unix test hosts, so system
        // lookup always misses and the fallback chain is what gets exercised.
        FontResolver::with_platform(Platform::Windows, dir, Box::new(StubFetcher { body }))
    }

    #[test]
    fn unknown_platform_maps_to_linux_tables() {
        assert_eq!(
            candidate_paths(Platform::Linux, FontStyle::Bold),
            FONT_PATHS_LINUX_BOLD
        );
        assert_eq!(
            candidate_paths(Platform::Linux, FontStyle::Normal),
            FONT_PATHS_LINUX_NORMAL
        );
    }

    #[test]
    fn bundled_font_short_circuits_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join(BUNDLED_FONT_FILE);
        std::fs::write(&bundled, b"cached").unwrap();

        let got = resolver(dir.path(), None).resolve(FontStyle::Bold);
        assert_eq!(got, Some(FontSource::Bundled(bundled)));
    }

    #[test]
    fn fetch_fallback_writes_bundled_file() {
        let dir = tempfile::tempdir().unwrap();
        let got = resolver(dir.path(), Some(b"fresh")).resolve(FontStyle::Bold);

        let bundled = dir.path().join(BUNDLED_FONT_FILE);
        assert_eq!(got, Some(FontSource::Fetched(bundled.clone())));
        assert_eq!(std::fs::read(bundled).unwrap(), b"fresh");
    }

    #[test]
    fn total_failure_returns_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolver(dir.path(), None).resolve(FontStyle::Normal), None);
    }

    #[test]
    fn second_resolve_reuses_fetched_font() {
        let dir = tempfile::tempdir().unwrap();
        let first = resolver(dir.path(), Some(b"fresh")).resolve(FontStyle::Bold);
        assert!(matches!(first, Some(FontSource::Fetched(_))));

        // Offline now, but the bundled file is on disk.
        let second = resolver(dir.path(), None).resolve(FontStyle::Bold);
        assert!(matches!(second, Some(FontSource::Bundled(_))));
    }
}
