//! INI file plugin for the configuration chain.
//!
//! The plugin maps variable paths to `(section, entry)` pairs: the
//! first path segment selects the section (top-level names land in the
//! unnamed section). Values read from disk stay raw until the
//! application stores through the plugin, so saving an untouched file
//! reproduces it byte-for-byte.

use crate::config::plugins::{ConfigPlugin, PluginHit};
use crate::config::types::{VarDecl, VarPath, Variable};
use crate::ini::errors::IniError;
use crate::ini::types::IniDocument;
use crate::ini::{reader, writer};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default file extension for configuration files.
pub const DEFAULT_EXTENSION: &str = ".ini";

pub struct IniFilePlugin {
    path: PathBuf,
    doc: IniDocument,
    /// Save after every store. Failures are logged, not returned; use
    /// [`IniFilePlugin::save`] for checked persistence.
    pub auto_save: bool,
}

impl IniFilePlugin {
    /// Read the file at `path`. A missing file yields an empty document.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IniError> {
        let path = path.into();
        let doc = reader::read_document(&path)?;
        Ok(Self {
            path,
            doc,
            auto_save: false,
        })
    }

    /// The conventional per-user location: `~/.<app>/<app>.ini`.
    pub fn default_path(app: &str) -> PathBuf {
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join(format!(".{app}"))
            .join(format!("{app}{DEFAULT_EXTENSION}"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &IniDocument {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut IniDocument {
        &mut self.doc
    }

    /// Write the document back to its file.
    pub fn save(&self) -> Result<(), IniError> {
        writer::write_document(&self.doc, &self.path)
    }
}

impl ConfigPlugin for IniFilePlugin {
    fn name(&self) -> &str {
        "INI file"
    }

    fn get(&self, decl: &VarDecl) -> Option<PluginHit> {
        let entry = self.doc.entry(decl.path.section(), decl.path.name())?;
        Some(PluginHit::Values(entry.parsed_values(decl.delim)))
    }

    fn store(&mut self, variable: &Variable) -> bool {
        let section = self
            .doc
            .section_mut_or_create(variable.path.section(), "");
        if variable.values.is_empty() {
            section.remove_entry(variable.path.name());
        } else {
            let entry = section.entry_mut_or_create(variable.path.name());
            entry.set_values(variable.values.clone());
            entry.delim = variable.delim;
            entry.hints = variable.hints.clone();
            if !variable.comments.is_empty() {
                entry.comments = variable.comments.clone();
            }
        }
        if self.auto_save
            && let Err(e) = self.save()
        {
            warn!(
                event = "ini.file.auto_save_failed",
                path = %self.path.display(),
                error = %e,
            );
        }
        true
    }

    fn remove(&mut self, path: &VarPath) -> bool {
        let Some(section) = self.doc.section_mut(path.section()) else {
            return false;
        };
        section.remove_entry(path.name())
    }

    fn writable(&self) -> bool {
        true
    }

    fn section_paths(&self, section: &str) -> Vec<VarPath> {
        self.doc
            .section(section)
            .map(|s| {
                s.entries()
                    .iter()
                    .map(|e| VarPath::from_section_name(&s.name, &e.name))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{Priority, VarKind};
    use tempfile::TempDir;

    fn decl(path: &str) -> VarDecl {
        VarDecl::new(path, VarKind::String)
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let plugin = IniFilePlugin::open(dir.path().join("absent.ini")).unwrap();
        assert_eq!(plugin.document().entry_count(), 0);
    }

    #[test]
    fn test_get_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        std::fs::write(&path, "Name=Val\n[NET]\nPORT= 8080\n").unwrap();

        let plugin = IniFilePlugin::open(&path).unwrap();
        assert_eq!(
            plugin.get(&decl("Name")),
            Some(PluginHit::Values(vec!["Val".to_string()]))
        );
        assert_eq!(
            plugin.get(&decl("NET/PORT")),
            Some(PluginHit::Values(vec!["8080".to_string()]))
        );
        assert_eq!(plugin.get(&decl("NET/MISSING")), None);
    }

    #[test]
    fn test_store_and_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");

        let mut plugin = IniFilePlugin::open(&path).unwrap();
        let variable = Variable::new(
            VarPath::parse("net/host"),
            vec!["localhost".to_string()],
            Priority::File,
        );
        assert!(plugin.store(&variable));
        plugin.save().unwrap();

        let reopened = IniFilePlugin::open(&path).unwrap();
        assert_eq!(
            reopened.get(&decl("NET/HOST")),
            Some(PluginHit::Values(vec!["localhost".to_string()]))
        );
    }

    #[test]
    fn test_untouched_entries_preserved_on_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        let original = "# my config\n\nkept=   exactly  as written\n";
        std::fs::write(&path, original).unwrap();

        let mut plugin = IniFilePlugin::open(&path).unwrap();
        let variable = Variable::new(
            VarPath::parse("added"),
            vec!["new".to_string()],
            Priority::File,
        );
        plugin.store(&variable);
        plugin.save().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("kept=   exactly  as written\n"), "got: {written}");
        assert!(written.contains("added="), "got: {written}");
    }

    #[test]
    fn test_store_empty_removes_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        std::fs::write(&path, "gone= 1\n").unwrap();

        let mut plugin = IniFilePlugin::open(&path).unwrap();
        let variable = Variable::new(VarPath::parse("gone"), Vec::new(), Priority::File);
        plugin.store(&variable);
        assert_eq!(plugin.get(&decl("gone")), None);
    }

    #[test]
    fn test_section_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        std::fs::write(&path, "[S]\na=1\nb=2\n").unwrap();
        let plugin = IniFilePlugin::open(&path).unwrap();
        let paths = plugin.section_paths("s");
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].to_string(), "S/a");
    }

    #[test]
    fn test_default_path_shape() {
        let path = IniFilePlugin::default_path("skald");
        assert!(path.to_string_lossy().ends_with(".skald/skald.ini"));
    }
}
