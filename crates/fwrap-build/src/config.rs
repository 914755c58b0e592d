//! Build configuration types (fwrap.toml format).

use crate::error::{BuildError, Result};
use crate::typemaps::load_rules;
use fwrap_gen::{GenConfig, TypemapRule, TypemapTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "fwrap.toml";

/// Root build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Generator options.
    #[serde(default)]
    pub generator: GenConfig,

    /// Where the generated files go.
    #[serde(default)]
    pub output: OutputConfig,

    /// Typemap sources.
    #[serde(default)]
    pub typemaps: TypemapConfig,

    /// Typemap rules defined inline.
    #[serde(rename = "typemap", default)]
    pub rules: Vec<TypemapRule>,

    /// Directory relative paths are resolved against; the directory of the
    /// configuration file when loaded from disk.
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

/// Output location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output directory (default: next to the input graph).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Typemap sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypemapConfig {
    /// Start from the builtin rule set.
    #[serde(default = "default_true")]
    pub builtins: bool,

    /// Rule files (`.toml` or `.json`), applied in order after the builtins.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl Default for TypemapConfig {
    fn default() -> Self {
        Self {
            builtins: true,
            files: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl BuildConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: BuildConfig = toml::from_str(&content)?;
        config.root = path.parent().map(Path::to_path_buf);
        config.validate()?;
        tracing::debug!(path = %path.display(), rules = config.rules.len(), "loaded configuration");
        Ok(config)
    }

    /// Load `fwrap.toml` from `dir` if there is one, otherwise the defaults.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check option values the generator would only trip over later.
    pub fn validate(&self) -> Result<()> {
        let fext = &self.generator.fext;
        if fext.is_empty() || fext.starts_with('.') || fext.contains(['/', '\\']) {
            return Err(BuildError::Validation(format!(
                "invalid Fortran file extension '{}'",
                fext
            )));
        }
        Ok(())
    }

    /// Resolve `path` against the configuration root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The output directory, resolved against the configuration root.
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output.dir.as_deref().map(|dir| self.resolve(dir))
    }

    /// Build the typemap table: builtins (unless disabled), then every rule
    /// file in order, then the inline rules. Later rules replace earlier
    /// ones with the same method, type and name.
    pub fn typemap_table(&self) -> Result<TypemapTable> {
        let mut table = if self.typemaps.builtins {
            TypemapTable::with_builtins()
        } else {
            TypemapTable::new()
        };
        for file in &self.typemaps.files {
            table.extend(load_rules(&self.resolve(file))?);
        }
        table.extend(self.rules.iter().cloned());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwrap_decl::TypeSig;
    use fwrap_gen::{TypemapEngine, TypemapMethod, TypemapTarget};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config: BuildConfig = toml::from_str("").unwrap();
        assert!(config.generator.cppcast);
        assert_eq!(config.generator.fext, "f90");
        assert!(config.typemaps.builtins);
        assert!(config.rules.is_empty());
        assert!(config.output_dir().is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[generator]
cppcast = false
fext = "F90"

[output]
dir = "generated"

[typemaps]
builtins = false
files = ["maps/extra.toml"]

[[typemap]]
method = "ftype"
type = "real_t"
code = "real(C_DOUBLE)"
kwargs = { in = "real(C_DOUBLE), intent(in)" }
        "#;

        let config: BuildConfig = toml::from_str(toml).unwrap();
        assert!(!config.generator.cppcast);
        assert_eq!(config.generator.fext, "F90");
        assert_eq!(config.output.dir, Some(PathBuf::from("generated")));
        assert!(!config.typemaps.builtins);
        assert_eq!(config.typemaps.files, vec![PathBuf::from("maps/extra.toml")]);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].method, TypemapMethod::FType);
        assert_eq!(
            config.rules[0].kwargs.get("in").map(String::as_str),
            Some("real(C_DOUBLE), intent(in)")
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<BuildConfig>("[generator]\nfoo = 1\n").is_err());
        assert!(toml::from_str::<BuildConfig>("[nope]\n").is_err());
    }

    #[test]
    fn test_validate_extension() {
        let mut config = BuildConfig::default();
        assert!(config.validate().is_ok());
        config.generator.fext = ".f90".to_string();
        assert!(matches!(config.validate(), Err(BuildError::Validation(_))));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("maps")).unwrap();
        let mut rules = std::fs::File::create(dir.path().join("maps/extra.toml")).unwrap();
        writeln!(
            rules,
            "[[typemap]]\nmethod = \"imtype\"\ntype = \"real_t\"\ncode = \"real(C_DOUBLE)\""
        )
        .unwrap();

        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[output]\ndir = \"out\"\n\n[typemaps]\nfiles = [\"maps/extra.toml\"]\n",
        )
        .unwrap();

        let config = BuildConfig::discover(dir.path()).unwrap();
        assert_eq!(config.output_dir(), Some(dir.path().join("out")));

        let table = config.typemap_table().unwrap();
        let ty = TypeSig::parse("real_t").unwrap();
        let found = table.lookup(
            TypemapMethod::ImType,
            &TypemapTarget {
                ty: &ty,
                resolved: &ty,
                name: None,
                lname: "farg1",
            },
        );
        assert_eq!(found.unwrap().code, "real(C_DOUBLE)");
    }

    #[test]
    fn test_discover_without_file() {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig::discover(dir.path()).unwrap();
        assert!(config.root.is_none());
        assert!(config.typemaps.builtins);
    }
}
