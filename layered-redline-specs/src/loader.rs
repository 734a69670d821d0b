//! Fixture file loading.

use crate::{RedlineFixture, SpecError};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the bundled scenario fixtures.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load a single fixture file.
pub fn load_fixture(path: &Path) -> Result<RedlineFixture, SpecError> {
    let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    RedlineFixture::from_toml_str(&content).map_err(|source| SpecError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load all fixtures from a directory (glob: **/*.toml), sorted by relative path.
///
/// Files named `expected-failures.toml` are the failure ledger, not fixtures.
pub fn load_all_fixtures(dir: &Path) -> Result<Vec<(String, RedlineFixture)>, SpecError> {
    let mut fixtures = Vec::new();
    load_fixtures_recursive(dir, dir, &mut fixtures)?;
    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(fixtures)
}

fn load_fixtures_recursive(
    base: &Path,
    dir: &Path,
    fixtures: &mut Vec<(String, RedlineFixture)>,
) -> Result<(), SpecError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let read_error = |e: std::io::Error| SpecError::Load {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();

        if path.is_dir() {
            load_fixtures_recursive(base, &path, fixtures)?;
        } else if path.extension().map_or(false, |e| e == "toml")
            && path.file_name().map_or(true, |name| name != crate::failures::LEDGER_FILE)
        {
            let relative = path.strip_prefix(base).unwrap_or(&path);
            let fixture = load_fixture(&path)?;
            tracing::debug!(fixture = %relative.display(), title = %fixture.title, "loaded fixture");
            fixtures.push((relative.display().to_string(), fixture));
        }
    }

    Ok(())
}
