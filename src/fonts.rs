//! Font discovery.
//!
//! Font names use the OpenSCAD notation `Family:style=Style`, e.g.
//! `Arial:style=Bold`, so the same name drives both the external kernel and
//! the in-process renderer.

use crate::io::IoError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Known font files per family, most specific first. Bold faces lead the
/// lists because labels default to a bold style.
const KNOWN_FONTS: &[(&str, &[&str])] = &[
    (
        "Arial",
        &[
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            "/Library/Fonts/Arial Bold.ttf",
            "/usr/share/fonts/truetype/msttcorefonts/Arial_Bold.ttf",
            "C:/Windows/Fonts/arialbd.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/Library/Fonts/Arial.ttf",
            "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
            "C:/Windows/Fonts/arial.ttf",
        ],
    ),
    (
        "Helvetica",
        &[
            "/System/Library/Fonts/Helvetica.ttc",
            "/Library/Fonts/Helvetica.ttc",
        ],
    ),
    (
        "Liberation Sans",
        &[
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
        ],
    ),
    (
        "DejaVu Sans",
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        ],
    ),
];

/// Families tried, in order, when the requested one is not installed.
const FALLBACK_FAMILIES: &[&str] = &["Liberation Sans", "DejaVu Sans", "Arial", "Helvetica"];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// How deep [`find_font`] descends below each font directory.
const SCAN_DEPTH: usize = 3;

/// A parsed font name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontQuery {
    pub family: String,
    pub style: Option<String>,
}

impl FontQuery {
    pub fn wants_bold(&self) -> bool {
        self.style
            .as_deref()
            .is_some_and(|s| s.to_ascii_lowercase().contains("bold"))
    }

    fn family_key(&self) -> String {
        normalize(&self.family)
    }
}

impl FromStr for FontQuery {
    type Err = std::convert::Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut parts = name.split(':');
        let family = parts.next().unwrap_or_default().trim().to_string();
        let style = parts
            .filter_map(|part| part.trim().strip_prefix("style="))
            .map(|s| s.trim().to_string())
            .next();
        Ok(FontQuery { family, style })
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Platform font directories plus the per-user one.
pub fn font_directories() -> Vec<PathBuf> {
    let mut dirs_found: Vec<PathBuf> = [
        "/Library/Fonts",
        "/System/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "C:/Windows/Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    if let Some(user) = dirs::font_dir() {
        dirs_found.push(user);
    }
    if let Some(home) = dirs::home_dir() {
        dirs_found.push(home.join(".fonts"));
    }
    dirs_found.retain(|d| d.is_dir());
    dirs_found
}

fn scan(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            if depth > 0 {
                scan(&path, depth - 1, out);
            }
        } else if is_font_file(&path) {
            out.push(path);
        }
    }
}

/// Locate a font file for `name`.
///
/// An existing file path is returned as is. Otherwise the table of known
/// install locations is consulted, then the font directories are scanned
/// for a file whose name contains the family, preferring a bold face when
/// the style asks for one.
pub fn find_font(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if is_font_file(direct) && direct.is_file() {
        return Some(direct.to_path_buf());
    }

    let query: FontQuery = name.parse().unwrap_or_else(|never| match never {});
    let key = query.family_key();
    if key.is_empty() {
        return None;
    }

    for (family, paths) in KNOWN_FONTS {
        let family_key = normalize(family);
        if !(key.contains(&family_key) || family_key.contains(&key)) {
            continue;
        }
        let mut candidates: Vec<&Path> = paths.iter().map(Path::new).collect();
        if !query.wants_bold() {
            // regular faces first for non-bold requests
            candidates.sort_by_key(|p| normalize(&p.to_string_lossy()).contains("bold"));
        }
        if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
            return Some(found.to_path_buf());
        }
    }

    let mut files = Vec::new();
    for dir in font_directories() {
        scan(&dir, SCAN_DEPTH, &mut files);
    }
    let mut matching: Vec<PathBuf> = files
        .into_iter()
        .filter(|p| {
            p.file_stem()
                .is_some_and(|stem| normalize(&stem.to_string_lossy()).contains(&key))
        })
        .collect();
    let bold = query.wants_bold();
    // exact style matches first, then the shortest name (the plain face)
    matching.sort_by_key(|p| {
        let stem = p
            .file_stem()
            .map(|s| normalize(&s.to_string_lossy()))
            .unwrap_or_default();
        (stem.contains("bold") != bold, stem.len())
    });
    matching.into_iter().next()
}

/// Resolves font names to files. Explicit overrides come first, then the
/// system fonts, then a common family installed on most systems.
#[derive(Clone, Debug, Default)]
pub struct FontLibrary {
    overrides: BTreeMap<String, PathBuf>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `path` whenever `name` is requested.
    pub fn with_override(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(name.into(), path.into());
        self
    }

    pub fn locate(&self, name: &str) -> Result<PathBuf, IoError> {
        if let Some(path) = self.overrides.get(name) {
            return Ok(path.clone());
        }
        if let Some(path) = find_font(name) {
            debug!(font = name, path = %path.display(), "resolved font");
            return Ok(path);
        }
        for family in FALLBACK_FAMILIES {
            if let Some(path) = find_font(family) {
                warn!(font = name, fallback = %path.display(), "font not found, using fallback");
                return Ok(path);
            }
        }
        Err(IoError::FontNotFound(name.to_string()))
    }

    #[cfg(feature = "truetype-text")]
    pub fn load(&self, name: &str) -> Result<crate::sketch::truetype::FontData, IoError> {
        crate::sketch::truetype::FontData::load(self.locate(name)?)
    }
}
