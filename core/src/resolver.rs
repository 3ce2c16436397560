/// Picks which language file to use
///
/// Order: persisted selection, system locale match, default signature match,
/// then the configured standard file.
use crate::config::LanguageConfig;
use crate::encoding;
use crate::extract::{parse_float_token, token_after};
use crate::parser::{self, ParsePolicy, ID_KEY};
use crate::record::LanguageHeader;
use crate::selection::{LanguageSelection, SelectionError};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("no language file found in {0}")]
    NotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageFileInfo {
    pub path: PathBuf,
    pub header: LanguageHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    Selection,
    Locale,
    Signature,
    StandardFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLanguage {
    pub path: PathBuf,
    pub language: String,
    pub source: ResolutionSource,
}

/// `*.txt` files in `dir`, sorted by file name so the pick is the same on
/// every platform.
pub fn language_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("txt"))
                .unwrap_or(false)
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn read_header(path: &Path) -> io::Result<LanguageHeader> {
    let (text, _) = encoding::read_text(path)?;
    let outcome = parser::parse_lines(text.lines().take(2), ParsePolicy::Lenient)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(outcome.header)
}

/// First file containing a line equal to `signature`.
pub fn find_default_language_file(dir: &Path, signature: &str) -> io::Result<Option<PathBuf>> {
    for path in language_files(dir)? {
        let (text, _) = match encoding::read_text(&path) {
            Ok(read) => read,
            Err(err) => {
                warn!("skipping unreadable language file {}: {}", path.display(), err);
                continue;
            }
        };
        if text.lines().any(|line| line.trim_end_matches('\r') == signature) {
            debug!("signature `{}` found in {}", signature, path.display());
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// First file whose locale header line equals `locale`.
pub fn find_language_file_for_locale(
    dir: &Path,
    locale: &str,
) -> io::Result<Option<LanguageFileInfo>> {
    for path in language_files(dir)? {
        let header = match read_header(&path) {
            Ok(header) => header,
            Err(err) => {
                warn!("skipping unreadable language file {}: {}", path.display(), err);
                continue;
            }
        };
        debug!("{} declares locale `{}`", path.display(), header.locale_name);
        if header.locale_name == locale {
            return Ok(Some(LanguageFileInfo { path, header }));
        }
    }
    Ok(None)
}

pub fn resolve_language_file(
    config: &LanguageConfig,
    system_locale: Option<&str>,
) -> Result<ResolvedLanguage, ResolveError> {
    let folder = &config.language_folder;
    let folder_error = |source: io::Error| ResolveError::Io {
        path: folder.clone(),
        source,
    };

    if let Some(selection) = LanguageSelection::load(&config.selection)? {
        if selection.file.exists() || !config.selection.revalidate {
            return Ok(ResolvedLanguage {
                path: selection.file,
                language: selection.language,
                source: ResolutionSource::Selection,
            });
        }
        warn!(
            "selected language file {} no longer exists; resolving again",
            selection.file.display()
        );
        LanguageSelection::clear(&config.selection)?;
    }

    if let Some(locale) = system_locale {
        if let Some(info) = find_language_file_for_locale(folder, locale).map_err(folder_error)? {
            let path = dunce::canonicalize(&info.path).unwrap_or(info.path);
            let selection = LanguageSelection::new(info.header.language_name.clone(), path.clone());
            selection.save(&config.selection)?;
            info!("selected {} for locale `{}`", path.display(), locale);
            return Ok(ResolvedLanguage {
                path,
                language: info.header.language_name,
                source: ResolutionSource::Locale,
            });
        }
    }

    if let Some(path) =
        find_default_language_file(folder, &config.default_signature).map_err(folder_error)?
    {
        let language = read_header(&path)
            .map(|header| header.language_name)
            .unwrap_or_default();
        return Ok(ResolvedLanguage {
            path,
            language,
            source: ResolutionSource::Signature,
        });
    }

    let standard = config.standard_file_path();
    if standard.is_file() {
        let language = read_header(&standard)
            .map(|header| header.language_name)
            .unwrap_or_default();
        return Ok(ResolvedLanguage {
            path: standard,
            language,
            source: ResolutionSource::StandardFile,
        });
    }

    Err(ResolveError::NotFound(folder.clone()))
}

/// Raw `id:` line for `id` in `file`, for consumers that run the extractors
/// themselves. The first matching line wins.
pub fn localized_line_by_id(id: f32, file: &Path) -> Result<Option<String>, ResolveError> {
    let (text, _) = encoding::read_text(file).map_err(|source| ResolveError::Io {
        path: file.to_path_buf(),
        source,
    })?;

    Ok(text
        .lines()
        .skip(2)
        .map(|line| line.trim_end_matches('\r').trim_start())
        .filter(|line| line.starts_with(ID_KEY))
        .find(|line| {
            token_after(line, ID_KEY)
                .and_then(parse_float_token)
                .map(|line_id| line_id == id)
                .unwrap_or(false)
        })
        .map(str::to_string))
}

/// Resolve the language file, then look up the line for `id` in it.
pub fn localized_line(
    id: f32,
    config: &LanguageConfig,
    system_locale: Option<&str>,
) -> Result<Option<String>, ResolveError> {
    let resolved = resolve_language_file(config, system_locale)?;
    localized_line_by_id(id, &resolved.path)
}
