/// DXC backend - external `dxc` process producing DXIL or SPIR-V
///
/// The command line mirrors what the engine build scripts use:
/// `dxc -E <entry> -T <profile> -Fo <output> [-spirv ...] [-D X]* [-I dir]* <input>`.
/// The process runs under a wall-clock timeout; a hung compiler is killed and
/// reported as `Error::Timeout`.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use crate::error::Result;
use crate::compile::bytecode::Bytecode;
use crate::compile::config::CompilerConfig;
use crate::compile::descriptor::CompilationDescriptor;
use crate::compile::shader_types::ShaderStage;
use crate::{compiler_bail, compiler_debug, compiler_err, compiler_warn};

/// Shader model used for every DXC profile
pub const SHADER_MODEL: &str = "6_0";

/// Root signature version used for `RootSignature` jobs
pub const ROOT_SIGNATURE_PROFILE: &str = "rootsig_1_1";

/// SPIR-V target environment passed to DXC
pub const SPIRV_TARGET_ENV: &str = "vulkan1.1";

/// Interval between two child-process status polls
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Output format requested from DXC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DxcTarget {
    Dxil,
    Spirv,
}

/// DXC `-T` profile for a stage
///
/// # Errors
///
/// `Error::Compilation` for `RootSignature` with a SPIR-V target (Vulkan has
/// no root signatures).
pub fn shader_profile(stage: ShaderStage, target: DxcTarget) -> Result<String> {
    let prefix = match stage {
        ShaderStage::Vertex => "vs",
        ShaderStage::Pixel => "ps",
        ShaderStage::Hull => "hs",
        ShaderStage::Domain => "ds",
        ShaderStage::Geometry => "gs",
        ShaderStage::Compute => "cs",
        ShaderStage::RootSignature => {
            if target == DxcTarget::Spirv {
                compiler_bail!("galaxy3d::Dxc", Compilation,
                    "stage RootSignature has no SPIR-V profile");
            }
            return Ok(ROOT_SIGNATURE_PROFILE.to_string());
        }
    };
    Ok(format!("{}_{}", prefix, SHADER_MODEL))
}

/// Captured result of a finished child process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// stdout and stderr joined, trimmed (the full diagnostic text)
    pub fn diagnostics(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{}\n{}", stdout, stderr),
        }
    }
}

/// Run `program` with `args`, capturing its output
///
/// Blocks until the child exits or `timeout` elapses. On timeout the child is
/// killed and reaped.
///
/// # Errors
///
/// - `Error::Configuration` if the program cannot be launched
/// - `Error::Timeout` if it does not finish within `timeout`
pub fn run_process(program: &Path, args: &[OsString], timeout: Duration) -> Result<ProcessOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| compiler_err!("galaxy3d::Process", Configuration,
            "Cannot launch '{}': {}", program.display(), e))?;

    // Drain both pipes concurrently so a chatty compiler never blocks on a full pipe
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                terminate(&mut child);
                compiler_bail!("galaxy3d::Process", Io,
                    "Cannot wait for '{}': {}", program.display(), e);
            }
        }
        if Instant::now() >= deadline {
            terminate(&mut child);
            compiler_bail!("galaxy3d::Process", Timeout,
                "'{}' did not finish within {} s and was killed",
                program.display(), timeout.as_secs_f32());
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(ProcessOutput {
        status,
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
    })
}

/// Kill and reap, so no zombie is left behind
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn join_reader(reader: Option<thread::JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// External DXC compiler
#[derive(Debug, Clone)]
pub struct DxcBackend {
    executable: PathBuf,
    include_dirs: Vec<PathBuf>,
    timeout: Duration,
}

impl DxcBackend {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            executable: config.dxc_path.clone(),
            include_dirs: config.include_dirs.clone(),
            timeout: config.timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments passed to DXC for `desc` (program name excluded)
    pub fn command_line(&self, desc: &CompilationDescriptor, target: DxcTarget) -> Result<Vec<OsString>> {
        let profile = shader_profile(desc.stage(), target)?;

        let mut args: Vec<OsString> = vec![
            "-E".into(), desc.entry_point().into(),
            "-T".into(), profile.into(),
            "-Fo".into(), desc.output_path().into(),
        ];
        if target == DxcTarget::Spirv {
            args.push("-spirv".into());
            args.push(format!("-fspv-target-env={}", SPIRV_TARGET_ENV).into());
        }
        for define in desc.defines() {
            args.push("-D".into());
            args.push(define.trim().into());
        }
        for dir in &self.include_dirs {
            args.push("-I".into());
            args.push(dir.into());
        }
        args.push(desc.input_path().into());
        Ok(args)
    }

    /// Compile `desc`, writing `output_path` and reading it back
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the input is missing or the output cannot be read back
    /// - `Error::Compilation` with DXC's full diagnostics on a non-zero exit
    /// - `Error::Timeout` / `Error::Configuration` from `run_process`
    pub fn compile(&self, desc: &CompilationDescriptor, target: DxcTarget) -> Result<Bytecode> {
        if !desc.input_path().is_file() {
            compiler_bail!("galaxy3d::Dxc", Io,
                "Input file '{}' does not exist", desc.input_path().display());
        }
        let args = self.command_line(desc, target)?;

        if let Some(parent) = desc.output_path().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| compiler_err!("galaxy3d::Dxc", Io,
                    "Cannot create output directory '{}': {}", parent.display(), e))?;
            }
        }

        compiler_debug!("galaxy3d::Dxc", "{} {}", self.executable.display(),
            args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" "));

        let output = run_process(&self.executable, &args, self.timeout)?;
        let diagnostics = output.diagnostics();

        if !output.status.success() {
            let diagnostics = if diagnostics.is_empty() {
                format!("dxc exited with {} and no output", output.status)
            } else {
                diagnostics
            };
            compiler_bail!("galaxy3d::Dxc", Compilation,
                "{} ({}): {}", desc.input_path().display(), desc.entry_point(), diagnostics);
        }
        if !diagnostics.is_empty() {
            compiler_warn!("galaxy3d::Dxc", "{} ({}): {}",
                desc.input_path().display(), desc.entry_point(), diagnostics);
        }

        let bytes = std::fs::read(desc.output_path()).map_err(|e| compiler_err!("galaxy3d::Dxc", Io,
            "Cannot read compiled output '{}': {}", desc.output_path().display(), e))?;
        Bytecode::new(bytes, desc.entry_point(), desc.stage())
    }
}

#[cfg(test)]
#[path = "dxc_tests.rs"]
mod tests;
