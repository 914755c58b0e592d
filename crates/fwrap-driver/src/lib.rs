use fwrap_build::BuildConfig;
use fwrap_decl::DeclGraph;
use fwrap_gen::{generate, Output};
use miette::Result;
use std::path::{Path, PathBuf};

/// Generation driver: reads a declaration graph, runs the generator with
/// the configured typemaps and writes the two output files.
#[derive(Debug, Default)]
pub struct Driver {
    config: BuildConfig,
}

/// Result of [`Driver::run`].
#[derive(Debug)]
pub struct Generated {
    pub output: Output,
    /// Files written; empty when the run reported errors.
    pub written: Vec<PathBuf>,
}

impl Generated {
    pub fn has_errors(&self) -> bool {
        self.output.diagnostics.has_errors()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Use the `fwrap.toml` found in `dir`, if any.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config = BuildConfig::discover(dir)
            .map_err(|e| miette::miette!("Failed to load configuration from {}: {}", dir.display(), e))?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BuildConfig {
        &mut self.config
    }

    /// Read and parse a declaration graph.
    pub fn load_graph(&self, path: impl AsRef<Path>) -> Result<DeclGraph> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
        let graph = fwrap_decl::load_graph(&content)
            .map_err(|e| miette::miette!("Failed to load {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), module = %graph.module().name, "loaded declaration graph");
        Ok(graph)
    }

    /// Run the generator on a graph file without writing anything.
    pub fn generate_file(&self, path: impl AsRef<Path>) -> Result<Output> {
        let graph = self.load_graph(path)?;
        self.generate(graph)
    }

    /// Run the generator on an in-memory graph.
    pub fn generate(&self, graph: DeclGraph) -> Result<Output> {
        self.config
            .validate()
            .map_err(|e| miette::miette!("Invalid configuration: {}", e))?;
        let typemaps = self
            .config
            .typemap_table()
            .map_err(|e| miette::miette!("Failed to load typemaps: {}", e))?;
        let output = generate(graph, &self.config.generator, &typemaps)?;
        tracing::info!(
            module = %output.module_name,
            warnings = output.diagnostics.warnings().count(),
            errors = output.diagnostics.errors().count(),
            "generated bindings"
        );
        Ok(output)
    }

    /// Write the wrapper and the module into `dir`, returning their paths.
    pub fn write_output(&self, output: &Output, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)
            .map_err(|e| miette::miette!("Failed to create {}: {}", dir.display(), e))?;

        let wrapper = dir.join(output.wrapper_file_name());
        let module = dir.join(output.module_file_name());
        for (path, text) in [(&wrapper, &output.wrapper), (&module, &output.module)] {
            std::fs::write(path, text)
                .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "wrote");
        }
        Ok((wrapper, module))
    }

    /// Output directory: `out_dir` if given, then the configured one, then
    /// the directory of the input graph.
    pub fn output_dir(&self, input: &Path, out_dir: Option<&Path>) -> PathBuf {
        out_dir
            .map(Path::to_path_buf)
            .or_else(|| self.config.output_dir())
            .unwrap_or_else(|| match input.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            })
    }

    /// Generate bindings for `input` and write them unless an error was
    /// reported.
    pub fn run(&self, input: impl AsRef<Path>, out_dir: Option<&Path>) -> Result<Generated> {
        let input = input.as_ref();
        let output = self.generate_file(input)?;
        if output.diagnostics.has_errors() {
            return Ok(Generated {
                output,
                written: Vec::new(),
            });
        }
        let dir = self.output_dir(input, out_dir);
        let (wrapper, module) = self.write_output(&output, &dir)?;
        Ok(Generated {
            output,
            written: vec![wrapper, module],
        })
    }
}
