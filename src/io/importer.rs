// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Description file importer

use super::{parse_description, Description};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a `.xml` description file and parse it into declarations
pub fn import_description(path: impl AsRef<Path>) -> Result<Description> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read description file: {}", path.display()))?;

    parse_description(&source)
        .with_context(|| format!("Failed to parse description file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_import_description() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"<csg><solid name="ball" shape="sphere"><scale>2</scale></solid></csg>"#
        )?;

        let description = import_description(file.path())?;
        assert_eq!(description.declarations.len(), 1);
        assert_eq!(description.declarations[0].name(), "ball");

        Ok(())
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = import_description("/nonexistent/model.xml").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/model.xml"));
    }
}
