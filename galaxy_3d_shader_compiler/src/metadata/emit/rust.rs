/// Rust emitter
///
/// One `.rs` file per `CodeFile`, named in snake_case. A header-only file is
/// the crate-facing root: it pulls its siblings in with `include!` and
/// re-exports them, so users only `include!` the root file. Other files refer
/// to their siblings through `super::`.

use crate::error::Result;
use crate::metadata::emit::{hex_rows, snake_case, EmittedFile, Emitter, OutputLanguage, SourceWriter, GENERATED_BANNER};
use crate::metadata::ir::{
    BlobDecl, CodeFile, DispatcherDecl, EnumDecl, Field, FieldType, Import, InstanceDecl, Item,
    StructDecl, TableDecl, TableKind, ValueExpr, WrapperDecl, COUNT_VARIANT,
};
use crate::reflection::types::ScalarKind;

/// Lints generated names routinely trip
const ALLOW: &str = "#[allow(non_snake_case, non_camel_case_types, non_upper_case_globals, dead_code)]";

/// Renders plain-data Rust with `#[repr(C)]` structs
#[derive(Debug, Clone, Copy, Default)]
pub struct RustEmitter;

impl Emitter for RustEmitter {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Rust
    }

    fn emit(&self, file: &CodeFile) -> Result<Vec<EmittedFile>> {
        let mut w = SourceWriter::default();
        w.line(GENERATED_BANNER);
        w.blank();

        for import in &file.imports {
            let Import::Sibling(name) = import else { continue };
            let module = snake_case(name);
            if file.header_only {
                w.line(ALLOW);
                w.open(format!("pub mod {} {{", module));
                w.line(format!("include!(\"{}.rs\");", module));
                w.close("}");
                w.line(format!("pub use {}::*;", module));
            } else {
                w.line("#[allow(unused_imports)]");
                w.line(format!("use super::{}::*;", module));
            }
        }
        w.blank();

        emit_items(&mut w, &file.items);

        Ok(vec![EmittedFile {
            file_name: format!("{}.rs", snake_case(&file.name)),
            contents: w.finish(),
        }])
    }
}

// ===== NAMES AND TYPES =====

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Identifier usable in Rust source (`type` -> `r#type`, `self` -> `self_`)
pub(crate) fn ident(name: &str) -> String {
    match name {
        "self" | "Self" | "super" | "crate" | "_" => format!("{}_", name),
        n if KEYWORDS.contains(&n) => format!("r#{}", n),
        n => n.to_string(),
    }
}

pub(crate) fn scalar_type(scalar: ScalarKind) -> &'static str {
    match scalar {
        ScalarKind::Float => "f32",
        ScalarKind::Int => "i32",
        ScalarKind::UInt => "u32",
        ScalarKind::Bool => "u32",
        ScalarKind::Half => "u16",
        ScalarKind::Double => "f64",
        ScalarKind::Int64 => "i64",
        ScalarKind::UInt64 => "u64",
    }
}

/// `[[f32; 4]; 4]`
pub(crate) fn field_type(field: &Field) -> String {
    let base = match &field.ty {
        FieldType::Scalar(scalar) => scalar_type(*scalar).to_string(),
        FieldType::Vector { scalar, size } => format!("[{}; {}]", scalar_type(*scalar), size),
        FieldType::Matrix { scalar, rows, cols } => format!("[[{}; {}]; {}]", scalar_type(*scalar), cols, rows),
        FieldType::UInt32 => "u32".to_string(),
        FieldType::Str => "&'static str".to_string(),
        FieldType::Bytes => "&'static [u8]".to_string(),
        FieldType::Enum(name) | FieldType::Named(name) => ident(name),
    };
    field.array_dims.iter().rev().fold(base, |inner, dim| format!("[{}; {}]", inner, dim))
}

pub(crate) fn value(expr: &ValueExpr) -> String {
    match expr {
        ValueExpr::UInt(v) => v.to_string(),
        ValueExpr::MaxU32 => "u32::MAX".to_string(),
        ValueExpr::EnumVariant { enum_name, variant } => format!("{}::{}", ident(enum_name), ident(variant)),
        ValueExpr::EnumIndex { enum_name, variant } => format!("{}::{} as u32", ident(enum_name), ident(variant)),
        ValueExpr::SizeOf(ty) => format!("::core::mem::size_of::<{}>() as u32", ident(ty)),
        ValueExpr::Str(s) => format!("{:?}", s),
        ValueExpr::Blob(name) => format!("&{}", ident(name)),
        ValueExpr::BlobLen { len, .. } => len.to_string(),
        ValueExpr::NullBlob => "&[]".to_string(),
    }
}

// ===== ITEMS =====

fn emit_items(w: &mut SourceWriter, items: &[Item]) {
    for item in items {
        match item {
            Item::Comment(text) => w.line(format!("// {}", text)),
            Item::Enum(decl) => enum_decl(w, decl),
            Item::Struct(decl) => struct_decl(w, decl),
            Item::Wrapper(decl) => wrapper(w, decl),
            Item::Instance(decl) => instance(w, decl),
            Item::Table(decl) => table(w, decl),
            Item::Blob(decl) => blob(w, decl),
            Item::Module(module) => {
                w.line(ALLOW);
                w.open(format!("pub mod {} {{", ident(&module.name)));
                w.line("#[allow(unused_imports)]");
                w.line("use super::*;");
                w.blank();
                emit_items(w, &module.items);
                w.close("}");
                w.blank();
            }
            Item::Dispatcher(decl) => dispatcher(w, decl),
        }
    }
}

fn enum_decl(w: &mut SourceWriter, decl: &EnumDecl) {
    w.line(ALLOW);
    w.line("#[repr(u32)]");
    w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
    w.open(format!("pub enum {} {{", ident(&decl.name)));
    for (i, variant) in decl.variants.iter().enumerate() {
        w.line(format!("{} = {},", ident(variant), i));
    }
    w.line(format!("{} = {},", COUNT_VARIANT, decl.variants.len()));
    w.close("}");
    w.blank();
}

fn struct_decl(w: &mut SourceWriter, decl: &StructDecl) {
    w.line(ALLOW);
    w.line("#[repr(C)]");
    w.line("#[derive(Debug, Clone, Copy)]");
    w.open(format!("pub struct {} {{", ident(&decl.name)));
    for field in &decl.fields {
        let line = format!("pub {}: {},", ident(&field.name), field_type(field));
        match &field.source_type {
            Some(source) => w.line(format!("{} // {}", line, source)),
            None => w.line(line),
        }
    }
    w.close("}");
    w.blank();
}

fn wrapper(w: &mut SourceWriter, decl: &WrapperDecl) {
    let name = ident(&decl.name);
    w.line(ALLOW);
    w.line("#[repr(C)]");
    w.line("#[derive(Debug, Clone, Copy)]");
    w.open(format!("pub struct {} {{", name));
    w.line(format!("pub data: {},", ident(&decl.base)));
    w.close("}");
    w.blank();
    w.line(ALLOW);
    w.open(format!("impl {} {{", name));
    w.line(format!("pub const index: u32 = {};", value(&decl.index)));
    w.line(format!("pub const size: u32 = {};", value(&decl.size)));
    w.line(format!("pub const stride: u32 = {};", value(&decl.stride)));
    w.close("}");
    w.blank();
}

fn instance(w: &mut SourceWriter, decl: &InstanceDecl) {
    let ty = ident(&decl.ty);
    w.line(ALLOW);
    w.open(format!("pub static {}: {} = {} {{", ident(&decl.name), ty, ty));
    for (field, expr) in &decl.values {
        w.line(format!("{}: {},", ident(field), value(expr)));
    }
    w.close("};");
    w.blank();
}

fn blob(w: &mut SourceWriter, decl: &BlobDecl) {
    w.line(ALLOW);
    w.open(format!("pub static {}: [u8; {}] = [", ident(&decl.name), decl.bytes.len()));
    for row in hex_rows(&decl.bytes, 16) {
        w.line(row);
    }
    w.close("];");
    w.blank();
}

fn table(w: &mut SourceWriter, decl: &TableDecl) {
    let element = ident(&decl.element_type);
    let fallback = ident(&decl.fallback);
    match &decl.kind {
        TableKind::ById | TableKind::ByEnum(_) => {
            let (param, index) = match &decl.kind {
                TableKind::ByEnum(key) => (format!("key: {}", ident(key)), "key as usize"),
                _ => ("id: u32".to_string(), "id as usize"),
            };
            w.line(ALLOW);
            w.open(format!("pub static {}: [&{}; {}] = [", ident(&decl.name), element, decl.entries.len()));
            for entry in &decl.entries {
                w.line(format!("&{},", ident(&entry.instance)));
            }
            w.close("];");
            w.blank();
            w.line(ALLOW);
            w.open(format!("pub fn {}({}) -> &'static {} {{", ident(&decl.lookup_fn), param, element));
            w.line(format!("{}.get({}).copied().unwrap_or(&{})", ident(&decl.name), index, fallback));
            w.close("}");
        }
        TableKind::ByName => {
            w.line(ALLOW);
            w.open(format!("pub static {}: [(&str, &{}); {}] = [", ident(&decl.name), element, decl.entries.len()));
            for entry in &decl.entries {
                w.line(format!("({:?}, &{}),", entry.key, ident(&entry.instance)));
            }
            w.close("];");
            w.blank();
            w.line(ALLOW);
            w.open(format!("pub fn {}(name: &str) -> &'static {} {{", ident(&decl.lookup_fn), element));
            w.open("match name {");
            for entry in &decl.entries {
                w.line(format!("{:?} => &{},", entry.key, ident(&entry.instance)));
            }
            w.line(format!("_ => &{},", fallback));
            w.close("}");
            w.close("}");
        }
    }
    w.blank();
}

fn dispatcher(w: &mut SourceWriter, decl: &DispatcherDecl) {
    let selector = ident(&decl.selector_enum);
    let name = ident(&decl.name);
    w.line(ALLOW);
    w.open(format!("pub fn {}(key: {}, selector: {}) -> &'static {} {{",
        name, ident(&decl.key_enum), selector, ident(&decl.return_type)));
    w.open("match selector {");
    for (variant, module) in &decl.routes {
        w.line(format!("{}::{} => {}::{}(key),", selector, ident(variant), ident(module), name));
    }
    w.line(format!("_ => &{},", ident(&decl.fallback)));
    w.close("}");
    w.close("}");
    w.blank();
}

#[cfg(test)]
#[path = "rust_tests.rs"]
mod tests;
