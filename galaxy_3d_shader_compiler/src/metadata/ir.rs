/// Code IR - language-neutral description of generated source files
///
/// The generator builds `CodeFile`s out of a handful of declaration kinds;
/// emitters turn them into C++ or Rust text. Tests assert on this structure
/// rather than on rendered strings.

use crate::reflection::types::ScalarKind;

/// One generated compilation unit (a `.h`/`.cpp` pair or a `.rs` file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFile {
    /// Base name, in CamelCase (`ConstantBufferMetadata`)
    pub name: String,
    pub imports: Vec<Import>,
    pub items: Vec<Item>,
    /// Emit declarations and definitions together (C++: header only)
    pub header_only: bool,
}

impl CodeFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            items: Vec::new(),
            header_only: false,
        }
    }

    /// Struct declared at the top level of this file
    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> {
        self.items.iter().find_map(|item| match item {
            Item::Struct(decl) if decl.name == name => Some(decl),
            _ => None,
        })
    }

    /// Enum declared anywhere in this file
    pub fn find_enum(&self, name: &str) -> Option<&EnumDecl> {
        find_in_items(&self.items, &|item| match item {
            Item::Enum(decl) if decl.name == name => Some(decl),
            _ => None,
        })
    }

    /// Table declared anywhere in this file
    pub fn find_table(&self, name: &str) -> Option<&TableDecl> {
        find_in_items(&self.items, &|item| match item {
            Item::Table(decl) if decl.name == name => Some(decl),
            _ => None,
        })
    }

    /// Instance declared anywhere in this file
    pub fn find_instance(&self, name: &str) -> Option<&InstanceDecl> {
        find_in_items(&self.items, &|item| match item {
            Item::Instance(decl) if decl.name == name => Some(decl),
            _ => None,
        })
    }

    /// C layout size of a struct declared in this file
    pub fn packed_struct_size(&self, name: &str) -> Option<u32> {
        packed_struct_size_in(std::slice::from_ref(self), name)
    }
}

/// C layout size of a struct declared in any of `files`
///
/// Matches `sizeof` of the emitted struct: every emitted field type is
/// 2, 4 or 8 bytes wide and the generator inserts explicit padding fields,
/// so the compiler never adds its own.
pub fn packed_struct_size_in(files: &[CodeFile], name: &str) -> Option<u32> {
    let decl = files.iter().find_map(|f| f.find_struct(name))?;
    decl.fields.iter().try_fold(0u32, |total, field| {
        let element = match &field.ty {
            FieldType::Named(nested) => packed_struct_size_in(files, nested)?,
            other => other.packed_size()?,
        };
        total.checked_add(element.checked_mul(field.element_count())?)
    })
}

fn find_in_items<'a, T>(items: &'a [Item], pick: &dyn Fn(&'a Item) -> Option<&'a T>) -> Option<&'a T> {
    for item in items {
        if let Some(found) = pick(item) {
            return Some(found);
        }
        if let Item::Module(module) = item {
            if let Some(found) = find_in_items(&module.items, pick) {
                return Some(found);
            }
        }
    }
    None
}

/// Dependency of a generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// Standard library header (C++ only; `cstdint`, `array`, ...)
    Std(String),
    /// Another generated file, by `CodeFile::name`
    Sibling(String),
}

/// Top-level or module-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Comment(String),
    Enum(EnumDecl),
    Struct(StructDecl),
    Wrapper(WrapperDecl),
    Instance(InstanceDecl),
    Table(TableDecl),
    Blob(BlobDecl),
    Module(ModuleDecl),
    Dispatcher(DispatcherDecl),
}

/// Enumeration with values `0..N-1` and a trailing `Count = N`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumDecl {
    /// Number of declared values including `Count`
    pub fn cardinality(&self) -> usize {
        self.variants.len() + 1
    }

    /// Value of a variant (`Count` included)
    pub fn value_of(&self, variant: &str) -> Option<u32> {
        if variant == COUNT_VARIANT {
            return Some(self.variants.len() as u32);
        }
        self.variants.iter().position(|v| v == variant).map(|i| i as u32)
    }
}

/// Trailing sentinel of every generated enum
pub const COUNT_VARIANT: &str = "Count";

/// Plain-data struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    /// Outer array dimensions, outermost first
    pub array_dims: Vec<u32>,
    /// Source-level type, rendered as a trailing comment (`float4x4`)
    pub source_type: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self { name: name.into(), ty, array_dims: Vec::new(), source_type: None }
    }

    /// Product of the array dimensions (1 for a non-array)
    pub fn element_count(&self) -> u32 {
        self.array_dims.iter().product()
    }
}

/// Field types understood by every emitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarKind),
    Vector { scalar: ScalarKind, size: u32 },
    /// Source-level shape, already corrected for the source language
    Matrix { scalar: ScalarKind, rows: u32, cols: u32 },
    /// Fixed 32-bit unsigned (IDs, sizes)
    UInt32,
    /// Static string
    Str,
    /// Static byte blob
    Bytes,
    /// Value of a generated enum
    Enum(String),
    /// Nested generated struct
    Named(String),
}

impl FieldType {
    /// Packed size in bytes; `None` for pointer-like and named types
    pub fn packed_size(&self) -> Option<u32> {
        match self {
            FieldType::Scalar(scalar) => Some(scalar.size_bytes()),
            FieldType::Vector { scalar, size } => Some(scalar.size_bytes() * size),
            FieldType::Matrix { scalar, rows, cols } => Some(scalar.size_bytes() * rows * cols),
            FieldType::UInt32 | FieldType::Enum(_) => Some(4),
            FieldType::Str | FieldType::Bytes | FieldType::Named(_) => None,
        }
    }
}

/// Metadata struct composing a data struct with its static properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperDecl {
    pub name: String,
    /// Data struct wrapped (C++ base class)
    pub base: String,
    /// Enum value of the resource
    pub index: ValueExpr,
    /// Bytes of one element; `sizeof(base)`
    pub size: ValueExpr,
    pub stride: ValueExpr,
}

/// Static constant of a generated struct type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDecl {
    pub name: String,
    pub ty: String,
    /// Values in struct field order
    pub values: Vec<(String, ValueExpr)>,
}

/// Value expression used in instances and wrappers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExpr {
    UInt(u32),
    /// `UINT32_MAX` / `u32::MAX`
    MaxU32,
    /// Typed enum value (field of enum type)
    EnumVariant { enum_name: String, variant: String },
    /// Integer value of an enum variant (field of `UInt32` type)
    EnumIndex { enum_name: String, variant: String },
    /// `sizeof(T)` / `size_of::<T>()`
    SizeOf(String),
    Str(String),
    /// Address of a blob
    Blob(String),
    /// Length of a blob in bytes
    BlobLen { name: String, len: u32 },
    /// No bytecode (null pointer / empty slice)
    NullBlob,
}

/// Lookup table over instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDecl {
    /// Table object name (`ConstantBufferMetadataTable`)
    pub name: String,
    /// Instance type
    pub element_type: String,
    pub kind: TableKind,
    /// Instances, in ID order; keys are the resource names
    pub entries: Vec<TableEntry>,
    /// Lookup function name
    pub lookup_fn: String,
    /// Instance returned on a miss
    pub fallback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKind {
    /// Flat array indexed by `u32` ID
    ById,
    /// Flat array indexed by a generated enum
    ByEnum(String),
    /// Name-keyed map
    ByName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub key: String,
    pub instance: String,
}

/// Raw byte array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDecl {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Nested namespace / module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub name: String,
    pub items: Vec<Item>,
}

/// Function routing `(key, selector)` to a per-selector lookup function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherDecl {
    pub name: String,
    pub return_type: String,
    /// Enum of the first argument, forwarded unchanged
    pub key_enum: String,
    /// Enum selecting the route
    pub selector_enum: String,
    /// (selector variant, module holding the routed `name` function)
    pub routes: Vec<(String, String)>,
    pub fallback: String,
}

#[cfg(test)]
#[path = "ir_tests.rs"]
mod tests;
