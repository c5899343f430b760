mod render;

pub use render::{KaraokeStyle, RenderConfig, SubtitleStyle};

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Bold faces tried when no font is configured, in order.
const SYSTEM_FONT_CANDIDATES: [&str; 8] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub assets_root: Option<PathBuf>,
}

impl AppConfig {
    /// An explicit override must exist; otherwise an `assets/` directory next
    /// to the binary is used when present.
    pub fn from_override(path: Option<PathBuf>) -> Result<Self> {
        let root = match path {
            Some(custom) => Some(canonicalize_dir(&custom)?),
            None => default_assets_root(),
        };
        Ok(Self { assets_root: root })
    }

    /// Font files to try, most specific first.
    pub fn font_candidates(&self, explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = explicit {
            candidates.push(path.to_path_buf());
        }
        if let Some(root) = &self.assets_root {
            candidates.extend(fonts_in(&root.join("fonts")));
        }
        candidates.extend(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));
        candidates
    }
}

fn canonicalize_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve assets directory at {:?}", path))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(anyhow!("assets path {:?} is not a directory", canonical))
    }
}

fn default_assets_root() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.ancestors().find_map(|dir| {
        let candidate = dir.join("assets");
        candidate.is_dir().then_some(candidate)
    })
}

fn fonts_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut fonts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
        })
        .collect();
    fonts.sort();
    fonts
}
