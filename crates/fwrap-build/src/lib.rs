//! Build configuration for the fwrap binding generator.
//!
//! This crate provides:
//! - The project configuration format (`fwrap.toml`)
//! - Typemap rule files that extend or replace the builtin rules
//!
//! # Example
//!
//! ```toml
//! # fwrap.toml
//! [generator]
//! cppcast = true
//! fext = "f90"
//!
//! [output]
//! dir = "generated"
//!
//! [typemaps]
//! files = ["typemaps/vectors.toml"]
//!
//! [[typemap]]
//! method = "ftype"
//! type = "real_t"
//! code = "real(C_DOUBLE)"
//! kwargs = { in = "real(C_DOUBLE), intent(in)" }
//! ```

mod config;
mod error;
mod typemaps;

pub use config::{BuildConfig, OutputConfig, TypemapConfig, CONFIG_FILE_NAME};
pub use error::{BuildError, Result};
pub use typemaps::{load_rules, parse_json_rules, parse_toml_rules};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_config() {
        let toml = r#"
[generator]
fext = "F03"

[[typemap]]
method = "imtype"
type = "real_t"
code = "real(C_DOUBLE)"
        "#;

        let config: BuildConfig = toml::from_str(toml).expect("Failed to parse config");
        assert_eq!(config.generator.fext, "F03");
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.typemap_table().unwrap().len(), fwrap_gen::TypemapTable::with_builtins().len() + 1);
    }
}
