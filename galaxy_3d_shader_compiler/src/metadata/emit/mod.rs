/// Emitters - render code IR as C++ or Rust source

pub mod cpp;
pub mod rust;

pub use cpp::CppEmitter;
pub use rust::RustEmitter;

use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::metadata::ir::{CodeFile, COUNT_VARIANT};
use crate::metadata::writer::{write_if_changed, WriteOutcome};

/// First line of every generated file
pub const GENERATED_BANNER: &str = "// Generated by galaxy_3d_shader_compiler. Do not edit.";

/// One rendered file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub file_name: String,
    pub contents: String,
}

/// Renders `CodeFile`s for one target language
pub trait Emitter: Send + Sync {
    /// Target language of this emitter
    fn language(&self) -> OutputLanguage;

    /// Render one IR file (C++ produces a header and usually a source file)
    fn emit(&self, file: &CodeFile) -> Result<Vec<EmittedFile>>;

    /// Render several files, keeping their order
    fn emit_all(&self, files: &[CodeFile]) -> Result<Vec<EmittedFile>> {
        let mut out = Vec::new();
        for file in files {
            out.extend(self.emit(file)?);
        }
        Ok(out)
    }
}

/// Language of generated code (`-language`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLanguage {
    #[default]
    Cpp,
    Rust,
}

impl OutputLanguage {
    pub fn from_cli_name(name: &str) -> Option<Self> {
        match name {
            "cpp" => Some(OutputLanguage::Cpp),
            "rust" => Some(OutputLanguage::Rust),
            _ => None,
        }
    }

    pub fn cli_name(&self) -> &'static str {
        match self {
            OutputLanguage::Cpp => "cpp",
            OutputLanguage::Rust => "rust",
        }
    }

    pub fn emitter(&self) -> Box<dyn Emitter> {
        match self {
            OutputLanguage::Cpp => Box::new(CppEmitter),
            OutputLanguage::Rust => Box::new(RustEmitter),
        }
    }

    /// File name of a generated file's entry point (`.h` / `.rs`)
    pub fn primary_file_name(&self, name: &str) -> String {
        match self {
            OutputLanguage::Cpp => format!("{}.h", name),
            OutputLanguage::Rust => format!("{}.rs", snake_case(name)),
        }
    }
}

/// Write rendered files into `dir`, skipping unchanged ones
pub fn write_emitted(dir: &Path, files: &[EmittedFile]) -> Result<Vec<(PathBuf, WriteOutcome)>> {
    files
        .iter()
        .map(|file| {
            let path = dir.join(&file.file_name);
            write_if_changed(&path, &file.contents).map(|outcome| (path, outcome))
        })
        .collect()
}

/// Line buffer with brace-aware indentation
#[derive(Debug, Default)]
pub(crate) struct SourceWriter {
    buffer: String,
    indent: usize,
}

impl SourceWriter {
    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buffer.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.buffer.push_str("    ");
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Blank separator line, never doubled
    pub(crate) fn blank(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with("\n\n") && !self.buffer.ends_with("{\n") {
            self.buffer.push('\n');
        }
    }

    pub(crate) fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    pub(crate) fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        // Drop a separator left just before the closing brace
        if self.buffer.ends_with("\n\n") {
            self.buffer.pop();
        }
        self.line(text);
    }

    pub(crate) fn finish(mut self) -> String {
        while self.buffer.ends_with("\n\n") {
            self.buffer.pop();
        }
        self.buffer
    }
}

/// Hex rows of a byte blob, `per_row` bytes each
pub(crate) fn hex_rows(bytes: &[u8], per_row: usize) -> Vec<String> {
    bytes
        .chunks(per_row)
        .map(|row| {
            row.iter()
                .map(|b| format!("0x{:02x},", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

// ===== RESERVED NAMES =====

const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

/// C++ keyword; unlike Rust there is no raw-identifier escape for these
pub fn is_cpp_keyword(name: &str) -> bool {
    CPP_KEYWORDS.contains(&name)
}

/// Name a generated enum variant cannot take (`Count` or a C++ keyword)
pub fn is_reserved_identifier(name: &str) -> bool {
    name == COUNT_VARIANT || is_cpp_keyword(name)
}

/// `BuiltinShaders_D3D12` -> `builtin_shaders_d3d12`, `RWTextureMetadata` -> `rw_texture_metadata`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            // Digits bind to the uppercase run that follows them (`D3D12`, `Texture2DArray`)
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() => true,
                Some(p) if p.is_ascii_uppercase() || p.is_ascii_digit() => {
                    next.is_some_and(|n| n.is_ascii_lowercase())
                }
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
