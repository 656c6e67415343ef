/// Command line front end of the `shader_compiler` binary
///
/// Flags use a single dash (`-input`, `-graphicsapi`). Three modes:
/// - compile (default): one descriptor, bytecode written to `-output`
/// - `-metadata`: compile for SPIR-V, reflect, write `ShaderMetadata` code
///   into the `-output` directory
/// - `-builtin`: run the builtin batch over the `-input` manifest tree; with
///   `-metadata` it also generates embedding and binding metadata code
///
/// `run_cli` is the single error boundary: nothing below it exits the process.

use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::builtin::batch::{BuiltinBatch, BuiltinBatchOptions};
use crate::compile::config::{CompilerConfig, SpirvBackend};
use crate::compile::descriptor::CompilationDescriptor;
use crate::compile::shader_compiler::ShaderCompiler;
use crate::compile::shader_types::{GraphicsApi, Platform, ShaderStage};
use crate::error::{Error, Result};
use crate::log::{Log, LogSeverity};
use crate::metadata::emit::{write_emitted, OutputLanguage};
use crate::metadata::generator::generate_from_reflection;
use crate::reflection::sidecar::write_reflection_sidecar;
use crate::reflection::spirv_reflection::reflect_bytecode;
use crate::{compiler_bail, compiler_err, compiler_info, compiler_warn};

pub const USAGE: &str = "\
Usage: shader_compiler [options]

  -input <path>          HLSL source (manifest root with -builtin)
  -output <path>         bytecode file (output directory with -metadata / -builtin)
  -entrypoint <name>     entry point function
  -stage <name>          vertex | pixel | hull | domain | geometry | compute | rootsignature
  -platform <name>       windows | linux | macos | android
  -graphicsapi <name>    vulkan | d3d12 (repeatable with -builtin)
  -D <define>            NAME or NAME=VALUE (repeatable, -DNAME also accepted)
  -I <dir>               include directory (repeatable)
  -metadata              generate binding metadata code (and embedding code with -builtin)
  -reflection            write <output>.reflection.yaml
  -builtin               build every shader declared under -input
  -language <name>       cpp | rust (generated code, default cpp)
  -dxc <path>            DXC executable (default: $DXC_PATH or dxc)
  -spirvbackend <name>   dxc | glslang
  -timeout <seconds>     external compiler timeout
  -serial                compile builtin shaders one at a time
  -verbose               log debug messages
  -help                  print this text";

/// What the invocation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Help,
    Compile,
    Metadata,
    Builtin,
}

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub entry_point: Option<String>,
    pub stage: Option<ShaderStage>,
    pub platform: Option<Platform>,
    pub graphics_apis: Vec<GraphicsApi>,
    pub defines: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub metadata: bool,
    pub reflection: bool,
    pub builtin: bool,
    pub language: OutputLanguage,
    pub dxc: Option<PathBuf>,
    pub spirv_backend: Option<SpirvBackend>,
    pub timeout: Option<Duration>,
    pub serial: bool,
    pub verbose: bool,
    pub help: bool,
}

impl CliArgs {
    pub fn mode(&self) -> CliMode {
        if self.help {
            CliMode::Help
        } else if self.builtin {
            CliMode::Builtin
        } else if self.metadata {
            CliMode::Metadata
        } else {
            CliMode::Compile
        }
    }

    /// Environment defaults with command-line overrides applied
    pub fn compiler_config(&self) -> CompilerConfig {
        let mut config = CompilerConfig::from_env();
        if let Some(dxc) = &self.dxc {
            config.dxc_path = dxc.clone();
        }
        if let Some(backend) = self.spirv_backend {
            config.spirv_backend = backend;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.include_dirs = self.include_dirs.clone();
        config.parallel = !self.serial;
        config
    }
}

// ===== PARSING =====

/// Parse arguments (without the program name)
///
/// # Errors
///
/// `Error::Configuration` on an unknown flag, a flag missing its value, or
/// an unrecognized stage, platform, graphics API, language or backend.
pub fn parse_args<I, S>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter().map(Into::into);

    while let Some(flag) = args.next() {
        let mut value = |name: &str| -> Result<String> {
            args.next().ok_or_else(|| compiler_err!("galaxy3d::Cli", Configuration,
                "{} expects a value", name))
        };

        match flag.as_str() {
            "-input" => parsed.input = Some(PathBuf::from(value("-input")?)),
            "-output" => parsed.output = Some(PathBuf::from(value("-output")?)),
            "-entrypoint" => parsed.entry_point = Some(value("-entrypoint")?),
            "-stage" => {
                let name = value("-stage")?;
                parsed.stage = Some(ShaderStage::from_cli_name(&name)
                    .ok_or_else(|| unknown("stage", &name))?);
            }
            "-platform" => {
                let name = value("-platform")?;
                parsed.platform = Some(Platform::from_cli_name(&name)
                    .ok_or_else(|| unknown("platform", &name))?);
            }
            "-graphicsapi" => {
                let name = value("-graphicsapi")?;
                let api = GraphicsApi::from_cli_name(&name).ok_or_else(|| unknown("graphics API", &name))?;
                if !parsed.graphics_apis.contains(&api) {
                    parsed.graphics_apis.push(api);
                }
            }
            "-D" => parsed.defines.push(value("-D")?),
            "-I" => parsed.include_dirs.push(PathBuf::from(value("-I")?)),
            "-language" => {
                let name = value("-language")?;
                parsed.language = OutputLanguage::from_cli_name(&name)
                    .ok_or_else(|| unknown("language", &name))?;
            }
            "-dxc" => parsed.dxc = Some(PathBuf::from(value("-dxc")?)),
            "-spirvbackend" => {
                let name = value("-spirvbackend")?;
                parsed.spirv_backend = Some(SpirvBackend::from_cli_name(&name)
                    .ok_or_else(|| unknown("SPIR-V backend", &name))?);
            }
            "-timeout" => {
                let text = value("-timeout")?;
                match text.parse::<u64>() {
                    Ok(seconds) if seconds > 0 => parsed.timeout = Some(Duration::from_secs(seconds)),
                    _ => compiler_bail!("galaxy3d::Cli", Configuration,
                        "-timeout expects a positive number of seconds, got '{}'", text),
                }
            }
            "-metadata" => parsed.metadata = true,
            "-reflection" => parsed.reflection = true,
            "-builtin" => parsed.builtin = true,
            "-serial" => parsed.serial = true,
            "-verbose" => parsed.verbose = true,
            "-help" | "-h" | "--help" => parsed.help = true,
            other if other.starts_with("-D") => parsed.defines.push(other[2..].to_string()),
            other => compiler_bail!("galaxy3d::Cli", Configuration, "Unknown option '{}'", other),
        }
    }
    Ok(parsed)
}

fn unknown(what: &str, name: &str) -> Error {
    compiler_err!("galaxy3d::Cli", Configuration, "Unknown {} '{}'", what, name)
}

// ===== MODES =====

/// Run a parsed command line
pub fn run(args: &CliArgs) -> Result<()> {
    match args.mode() {
        CliMode::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliMode::Compile => run_compile(args),
        CliMode::Metadata => run_metadata(args),
        CliMode::Builtin => run_builtin(args),
    }
}

/// Parse, run, and report; returns the process exit code
///
/// On failure prints `Error: <message>` to stderr and returns 1. Output is
/// flushed either way.
pub fn run_cli<I, S>(args: I) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let result = parse_args(args).and_then(|parsed| {
        Log::set_min_severity(if parsed.verbose { LogSeverity::Debug } else { LogSeverity::Info });
        run(&parsed)
    });
    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e.message());
            1
        }
    };
    Log::flush();
    code
}

/// Single descriptor from the command line; `api` overrides `-graphicsapi`
fn descriptor(args: &CliArgs, api: Option<GraphicsApi>, output: Option<&Path>) -> Result<CompilationDescriptor> {
    let mut builder = CompilationDescriptor::builder()
        .defines(args.defines.iter().cloned())
        .build_reflection(args.reflection);
    if let Some(entry_point) = &args.entry_point {
        builder = builder.entry_point(entry_point);
    }
    if let Some(input) = &args.input {
        builder = builder.input_path(input);
    }
    if let Some(output) = output.or(args.output.as_deref()) {
        builder = builder.output_path(output);
    }
    if let Some(stage) = args.stage {
        builder = builder.stage(stage);
    }
    if let Some(platform) = args.platform {
        builder = builder.platform(platform);
    }
    if let Some(api) = api.or_else(|| args.graphics_apis.first().copied()) {
        builder = builder.graphics_api(api);
    }
    builder.build()
}

fn run_compile(args: &CliArgs) -> Result<()> {
    let desc = descriptor(args, None, None)?;
    if args.graphics_apis.len() > 1 {
        compiler_bail!("galaxy3d::Cli", Configuration,
            "-graphicsapi was given {} times; only -builtin accepts several", args.graphics_apis.len());
    }

    let compiler = ShaderCompiler::new(args.compiler_config());
    let bytecode = compiler.compile(&desc)?;
    compiler_info!("galaxy3d::Cli", "Wrote {} ({} bytes)", desc.output_path().display(), bytecode.len());

    if desc.build_reflection() {
        if bytecode.is_spirv() {
            let reflection = reflect_bytecode(&bytecode)?;
            let (path, _) = write_reflection_sidecar(desc.output_path(), &reflection)?;
            compiler_info!("galaxy3d::Cli", "Wrote {}", path.display());
        } else {
            compiler_warn!("galaxy3d::Cli", "Reflection needs SPIR-V; no sidecar for {} output",
                desc.graphics_api());
        }
    }
    Ok(())
}

fn run_metadata(args: &CliArgs) -> Result<()> {
    // Validate the user's flags before touching the file system
    let desc = descriptor(args, Some(GraphicsApi::Vulkan), None)?;
    let output_dir = desc.output_path().to_path_buf();

    let stem = desc.input_path().file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let scratch = desc.temp_path().join(format!(
        "galaxy3d_{}_{}_{}.spv", stem, desc.entry_point(), std::process::id()));
    let desc = descriptor(args, Some(GraphicsApi::Vulkan), Some(&scratch))?;

    let compiler = ShaderCompiler::new(args.compiler_config());
    let bytecode = compiler.compile(&desc);
    let _ = std::fs::remove_file(&scratch);
    let reflection = reflect_bytecode(&bytecode?)?;

    if args.reflection {
        let (path, _) = write_reflection_sidecar(&output_dir.join(&stem), &reflection)?;
        compiler_info!("galaxy3d::Cli", "Wrote {}", path.display());
    }

    let files = generate_from_reflection(&reflection)?;
    let emitted = args.language.emitter().emit_all(&files)?;
    let written = write_emitted(&output_dir, &emitted)?;
    compiler_info!("galaxy3d::Cli", "{} metadata file(s) in {}", written.len(), output_dir.display());
    Ok(())
}

/// Builtin batch options for a parsed command line
pub fn builtin_options(args: &CliArgs) -> Result<BuiltinBatchOptions> {
    let Some(input) = &args.input else {
        compiler_bail!("galaxy3d::Cli", Configuration, "no input directory specified");
    };
    let Some(output) = &args.output else {
        compiler_bail!("galaxy3d::Cli", Configuration, "no output directory specified");
    };

    let mut options = BuiltinBatchOptions::new(input, output);
    if !args.graphics_apis.is_empty() {
        options.apis = args.graphics_apis.clone();
    }
    if let Some(platform) = args.platform {
        options.platform = platform;
    }
    options.language = args.language;
    options.build_metadata = args.metadata;
    Ok(options)
}

fn run_builtin(args: &CliArgs) -> Result<()> {
    let options = builtin_options(args)?;
    let compiler = ShaderCompiler::new(args.compiler_config());
    let report = BuiltinBatch::new(&compiler, options).run()?;
    compiler_info!("galaxy3d::Cli", "Built {} builtin shader variant(s)", report.shaders.len());
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
