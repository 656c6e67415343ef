/// C++ emitter
///
/// Every `CodeFile` becomes a `.h`/`.cpp` pair, or a single `.h` with
/// `inline` definitions when the file is header only. Enums are wrapped in a
/// namespace of their own name (`Textures::Albedo`, type `Textures::Type`)
/// so enumerators never collide across buckets.

use crate::error::Result;
use crate::metadata::emit::{hex_rows, EmittedFile, Emitter, OutputLanguage, SourceWriter, GENERATED_BANNER};
use crate::metadata::ir::{
    BlobDecl, CodeFile, DispatcherDecl, EnumDecl, Field, FieldType, Import, InstanceDecl, Item,
    StructDecl, TableDecl, TableKind, ValueExpr, WrapperDecl, COUNT_VARIANT,
};
use crate::reflection::types::ScalarKind;
use crate::compiler_bail;

/// Renders Allman-braced C++17
#[derive(Debug, Clone, Copy, Default)]
pub struct CppEmitter;

impl Emitter for CppEmitter {
    fn language(&self) -> OutputLanguage {
        OutputLanguage::Cpp
    }

    fn emit(&self, file: &CodeFile) -> Result<Vec<EmittedFile>> {
        let mut unit = CppUnit::new(file);
        unit.items(&file.items)?;
        Ok(unit.finish(file))
    }
}

// ===== TYPE RENDERING =====

pub(crate) fn scalar_type(scalar: ScalarKind) -> &'static str {
    match scalar {
        ScalarKind::Float => "float",
        ScalarKind::Int => "int32_t",
        ScalarKind::UInt => "uint32_t",
        // HLSL bools are 32-bit in buffers
        ScalarKind::Bool => "uint32_t",
        ScalarKind::Half => "uint16_t",
        ScalarKind::Double => "double",
        ScalarKind::Int64 => "int64_t",
        ScalarKind::UInt64 => "uint64_t",
    }
}

fn enum_type(enum_name: &str) -> String {
    format!("{}::Type", enum_name)
}

/// `float viewProj[4][4]`
pub(crate) fn declarator(field: &Field) -> String {
    let mut dims: Vec<u32> = field.array_dims.clone();
    let base = match &field.ty {
        FieldType::Scalar(scalar) => scalar_type(*scalar).to_string(),
        FieldType::Vector { scalar, size } => {
            dims.push(*size);
            scalar_type(*scalar).to_string()
        }
        FieldType::Matrix { scalar, rows, cols } => {
            dims.push(*rows);
            dims.push(*cols);
            scalar_type(*scalar).to_string()
        }
        FieldType::UInt32 => "uint32_t".to_string(),
        FieldType::Str => "const char*".to_string(),
        FieldType::Bytes => "const uint8_t*".to_string(),
        FieldType::Enum(name) => enum_type(name),
        FieldType::Named(name) => name.clone(),
    };
    let suffix: String = dims.iter().map(|d| format!("[{}]", d)).collect();
    format!("{} {}{}", base, field.name, suffix)
}

pub(crate) fn value(expr: &ValueExpr) -> String {
    match expr {
        ValueExpr::UInt(v) => format!("{}u", v),
        ValueExpr::MaxU32 => "UINT32_MAX".to_string(),
        ValueExpr::EnumVariant { enum_name, variant } => format!("{}::{}", enum_name, variant),
        ValueExpr::EnumIndex { enum_name, variant } => {
            format!("static_cast<uint32_t>({}::{})", enum_name, variant)
        }
        ValueExpr::SizeOf(ty) => format!("static_cast<uint32_t>(sizeof({}))", ty),
        ValueExpr::Str(s) => string_literal(s),
        ValueExpr::Blob(name) => name.clone(),
        ValueExpr::BlobLen { name, .. } => format!("static_cast<uint32_t>(sizeof({}))", name),
        ValueExpr::NullBlob => "nullptr".to_string(),
    }
}

pub(crate) fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\x{:02x}\"\"", b));
                }
            }
        }
    }
    out.push('"');
    out
}

// ===== UNIT =====

/// Header and source being written for one `CodeFile`
struct CppUnit {
    header: SourceWriter,
    source: SourceWriter,
    header_only: bool,
}

impl CppUnit {
    fn new(file: &CodeFile) -> Self {
        let mut header = SourceWriter::default();
        header.line(GENERATED_BANNER);
        header.line("#pragma once");
        header.blank();
        for import in &file.imports {
            match import {
                Import::Std(name) => header.line(format!("#include <{}>", name)),
                Import::Sibling(name) => header.line(format!("#include \"{}.h\"", name)),
            }
        }
        header.blank();

        let mut source = SourceWriter::default();
        if !file.header_only {
            source.line(GENERATED_BANNER);
            source.line(format!("#include \"{}.h\"", file.name));
            source.blank();
        }

        Self { header, source, header_only: file.header_only }
    }

    fn finish(self, file: &CodeFile) -> Vec<EmittedFile> {
        let mut out = vec![EmittedFile {
            file_name: format!("{}.h", file.name),
            contents: self.header.finish(),
        }];
        if !self.header_only {
            out.push(EmittedFile {
                file_name: format!("{}.cpp", file.name),
                contents: self.source.finish(),
            });
        }
        out
    }

    /// Writer receiving definitions
    fn defs(&mut self) -> &mut SourceWriter {
        if self.header_only { &mut self.header } else { &mut self.source }
    }

    /// `inline ` in header-only mode, nothing otherwise
    fn linkage(&self) -> &'static str {
        if self.header_only { "inline " } else { "" }
    }

    fn items(&mut self, items: &[Item]) -> Result<()> {
        for item in items {
            match item {
                Item::Comment(text) => self.header.line(format!("// {}", text)),
                Item::Enum(decl) => self.enum_decl(decl),
                Item::Struct(decl) => self.struct_decl(decl),
                Item::Wrapper(decl) => self.wrapper(decl),
                Item::Instance(decl) => self.instance(decl),
                Item::Table(decl) => self.table(decl),
                Item::Blob(decl) => self.blob(decl)?,
                Item::Module(module) => {
                    self.header.line(format!("namespace {}", module.name));
                    self.header.open("{");
                    if !self.header_only {
                        self.source.line(format!("namespace {}", module.name));
                        self.source.open("{");
                    }
                    self.items(&module.items)?;
                    self.header.close(format!("}} // namespace {}", module.name));
                    self.header.blank();
                    if !self.header_only {
                        self.source.close(format!("}} // namespace {}", module.name));
                        self.source.blank();
                    }
                }
                Item::Dispatcher(decl) => self.dispatcher(decl),
            }
        }
        Ok(())
    }

    fn enum_decl(&mut self, decl: &EnumDecl) {
        let h = &mut self.header;
        h.line(format!("namespace {}", decl.name));
        h.open("{");
        h.line("enum Type : uint32_t");
        h.open("{");
        for (i, variant) in decl.variants.iter().enumerate() {
            h.line(format!("{} = {},", variant, i));
        }
        h.line(format!("{} = {}", COUNT_VARIANT, decl.variants.len()));
        h.close("};");
        h.close(format!("}} // namespace {}", decl.name));
        h.blank();
    }

    fn struct_decl(&mut self, decl: &StructDecl) {
        let h = &mut self.header;
        h.line(format!("struct {}", decl.name));
        h.open("{");
        for field in &decl.fields {
            match &field.source_type {
                Some(source) => h.line(format!("{}; // {}", declarator(field), source)),
                None => h.line(format!("{};", declarator(field))),
            }
        }
        h.close("};");
        h.blank();
    }

    fn wrapper(&mut self, decl: &WrapperDecl) {
        let h = &mut self.header;
        h.line(format!("struct {} : public {}", decl.name, decl.base));
        h.open("{");
        h.line(format!("static constexpr uint32_t index = {};", value(&decl.index)));
        h.line(format!("static constexpr uint32_t size = {};", value(&decl.size)));
        h.line(format!("static constexpr uint32_t stride = {};", value(&decl.stride)));
        h.close("};");
        h.blank();
    }

    fn instance(&mut self, decl: &InstanceDecl) {
        if !self.header_only {
            self.header.line(format!("extern const {} {};", decl.ty, decl.name));
            self.header.blank();
        }
        let linkage = self.linkage();
        let d = self.defs();
        d.line(format!("{}const {} {} =", linkage, decl.ty, decl.name));
        d.open("{");
        for (field, expr) in &decl.values {
            d.line(format!("{}, // {}", value(expr), field));
        }
        d.close("};");
        d.blank();
    }

    fn blob(&mut self, decl: &BlobDecl) -> Result<()> {
        if decl.bytes.is_empty() {
            compiler_bail!("galaxy3d::CppEmitter", Generation,
                "blob '{}' is empty; zero-sized arrays are not valid C++", decl.name);
        }
        if !self.header_only {
            self.header.line(format!("extern const uint8_t {}[{}];", decl.name, decl.bytes.len()));
            self.header.blank();
        }
        let linkage = self.linkage();
        let d = self.defs();
        d.line(format!("{}const uint8_t {}[{}] =", linkage, decl.name, decl.bytes.len()));
        d.open("{");
        for row in hex_rows(&decl.bytes, 16) {
            d.line(row);
        }
        d.close("};");
        d.blank();
        Ok(())
    }

    fn table(&mut self, decl: &TableDecl) {
        let (param, index) = match &decl.kind {
            TableKind::ById => ("uint32_t id".to_string(), "id".to_string()),
            TableKind::ByEnum(key) => (format!("{} key", enum_type(key)), "static_cast<uint32_t>(key)".to_string()),
            TableKind::ByName => ("std::string_view name".to_string(), String::new()),
        };
        let signature = format!("const {}& {}({})", decl.element_type, decl.lookup_fn, param);
        if !self.header_only {
            self.header.line(format!("{};", signature));
            self.header.blank();
        }

        let linkage = self.linkage();
        let storage = if self.header_only { "inline" } else { "static" };
        let d = self.defs();
        match &decl.kind {
            TableKind::ById | TableKind::ByEnum(_) => {
                d.line(format!("{} const std::array<const {}*, {}> {} =",
                    storage, decl.element_type, decl.entries.len(), decl.name));
                d.open("{");
                for entry in &decl.entries {
                    d.line(format!("&{},", entry.instance));
                }
                d.close("};");
                d.blank();
                d.line(format!("{}{}", linkage, signature));
                d.open("{");
                d.line(format!("return {} < {}.size() ? *{}[{}] : {};",
                    index, decl.name, decl.name, index, decl.fallback));
                d.close("}");
            }
            TableKind::ByName => {
                d.line(format!("{} const std::unordered_map<std::string_view, const {}*> {} =",
                    storage, decl.element_type, decl.name));
                d.open("{");
                for entry in &decl.entries {
                    d.line(format!("{{ {}, &{} }},", string_literal(&entry.key), entry.instance));
                }
                d.close("};");
                d.blank();
                d.line(format!("{}{}", linkage, signature));
                d.open("{");
                d.line(format!("const auto it = {}.find(name);", decl.name));
                d.line(format!("return it != {}.end() ? *it->second : {};", decl.name, decl.fallback));
                d.close("}");
            }
        }
        d.blank();
    }

    fn dispatcher(&mut self, decl: &DispatcherDecl) {
        let signature = format!("const {}& {}({} key, {} selector)",
            decl.return_type, decl.name, enum_type(&decl.key_enum), enum_type(&decl.selector_enum));
        if !self.header_only {
            self.header.line(format!("{};", signature));
            self.header.blank();
        }
        let linkage = self.linkage();
        let d = self.defs();
        d.line(format!("{}{}", linkage, signature));
        d.open("{");
        d.line("switch (selector)");
        d.open("{");
        for (variant, module) in &decl.routes {
            d.line(format!("case {}::{}:", decl.selector_enum, variant));
            d.line(format!("    return {}::{}(key);", module, decl.name));
        }
        d.line("default:");
        d.line(format!("    return {};", decl.fallback));
        d.close("}");
        d.close("}");
        d.blank();
    }
}

#[cfg(test)]
#[path = "cpp_tests.rs"]
mod tests;
