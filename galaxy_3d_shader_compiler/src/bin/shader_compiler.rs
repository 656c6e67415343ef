//! `shader_compiler` - standalone HLSL compiler and metadata generator
//!
//! See `galaxy_3d_shader_compiler::cli::USAGE` for the flags.

use galaxy_3d_shader_compiler::cli::run_cli;

fn main() {
    std::process::exit(run_cli(std::env::args().skip(1)));
}
