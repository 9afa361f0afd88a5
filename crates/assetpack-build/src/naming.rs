//! Resource names and generated identifiers.

use std::path::{Path, PathBuf};

/// Derive a resource name from a file path.
///
/// The first prefix in `strip_prefixes` that `path` starts with is removed.
/// Separators become `/`, the name gets a leading `/`, and `prefix` is
/// attached in front.
///
/// ```
/// # use std::path::{Path, PathBuf};
/// # use assetpack_build::naming::resource_name;
/// let name = resource_name(
///     Path::new("/work/static/css/app.css"),
///     &[PathBuf::from("/work/static")],
///     "/assets",
/// );
/// assert_eq!(name, "/assets/css/app.css");
/// ```
pub fn resource_name(path: &Path, strip_prefixes: &[PathBuf], prefix: &str) -> String {
    let relative = strip_prefixes
        .iter()
        .find_map(|strip| path.strip_prefix(strip).ok())
        .unwrap_or(path);

    let mut name = String::new();
    for component in relative.components() {
        let part = component.as_os_str().to_string_lossy();
        if part == "/" || part.is_empty() {
            continue;
        }
        name.push('/');
        name.push_str(&part.replace('\\', "/"));
    }
    if name.is_empty() {
        name.push('/');
    }

    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name
    } else if prefix.starts_with('/') {
        format!("{prefix}{name}")
    } else {
        format!("/{prefix}{name}")
    }
}

/// Turn a resource name into a `SCREAMING_SNAKE_CASE` constant identifier.
///
/// Every run of characters outside `[A-Za-z0-9]` becomes one underscore
/// between words. Names that would start with a digit or be empty get a
/// leading underscore or the name `ROOT`.
pub fn const_ident(name: &str) -> String {
    let ident = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join("_");
    if ident.is_empty() {
        "ROOT".to_string()
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{ident}")
    } else {
        ident
    }
}
