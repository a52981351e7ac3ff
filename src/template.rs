//! Template rendering for intermediate files.
//!
//! Source files are rendered through [`minijinja`] with the module's
//! variable map as context: `theme={{ color }}` becomes `theme=solarized`.
//! Variables that are not defined render as an empty string (the engine's
//! lenient-undefined default); this is a fixed policy, not a runtime knob.
//! Files that sniff as binary are copied byte-for-byte instead.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use minijinja::Environment;

use crate::error::TemplateError;
use crate::fsops;

/// Render `source` into `out`.
///
/// Binary files (NUL byte within the first 4 KiB) are copied verbatim; text
/// files are treated as templates over `vars`.
///
/// # Errors
///
/// Returns [`TemplateError`] for unreadable sources, syntactically invalid
/// templates, or render failures.
pub fn render(
    source: &Path,
    out: &mut dyn Write,
    vars: &BTreeMap<String, String>,
) -> Result<()> {
    if !fsops::is_text_file(source)? {
        return fsops::copy_to_writer(source, out);
    }

    let text = fs::read_to_string(source).map_err(|e| TemplateError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;

    let env = Environment::new();
    let template = env
        .template_from_str(&text)
        .map_err(|e| TemplateError::Parse {
            path: source.to_path_buf(),
            source: e,
        })?;

    let rendered = template.render(vars).map_err(|e| TemplateError::Render {
        path: source.to_path_buf(),
        source: e,
    })?;

    out.write_all(rendered.as_bytes())?;
    Ok(())
}

/// Render `source` into a freshly created file at `dest`.
///
/// Parent directories are created as needed; a pre-existing file at `dest`
/// is truncated. The write is in place, not staged through a temp file: the
/// rendered intermediate is wholly owned by the engine and is rewritten on
/// every deploy.
///
/// # Errors
///
/// Returns an error if the destination cannot be created or rendering fails.
pub fn create_rendered(
    source: &Path,
    dest: &Path,
    vars: &BTreeMap<String, String>,
) -> Result<()> {
    fsops::ensure_parent_dir(dest)?;
    let mut out = fs::File::create(dest).map_err(|e| TemplateError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;
    render(source, &mut out, vars)
}
