/// Builtin shader code generation
///
/// Three tiers of files:
/// - `BuiltinShaderTypes`: shader enum, stage enum, metadata struct and the
///   invalid sentinel, shared by every API
/// - `BuiltinShaders_<Api>`: bytecode blobs, one metadata instance per
///   shader and an enum-indexed table, inside a module named after the API
/// - `BuiltinShaders`: header-only dispatcher routing `(shader, api)` to the
///   per-API table

use crate::builtin::batch::CompiledShader;
use crate::compile::shader_types::{GraphicsApi, ShaderStage};
use crate::error::Result;
use crate::metadata::ir::{
    BlobDecl, CodeFile, DispatcherDecl, EnumDecl, Field, FieldType, Import, InstanceDecl, Item,
    ModuleDecl, StructDecl, TableDecl, TableEntry, TableKind, ValueExpr, COUNT_VARIANT,
};
use crate::compiler_bail;

pub const BUILTIN_TYPES_FILE: &str = "BuiltinShaderTypes";
pub const BUILTIN_DISPATCHER_FILE: &str = "BuiltinShaders";
/// Zero-byte file rewritten after every complete pass
pub const UPTODATE_MARKER: &str = "BuiltinShaders.uptodate";

const SHADER_ENUM: &str = "BuiltinShaders";
const STAGE_ENUM: &str = "ShaderStage";
const API_ENUM: &str = "GraphicsApi";
const METADATA_STRUCT: &str = "BuiltinShaderMetadata";
const INVALID_INSTANCE: &str = "BuiltinShaderMetadataInvalid";
const TABLE_NAME: &str = "BuiltinShaderMetadataTable";
const LOOKUP_FN: &str = "GetBuiltinShaderMetadata";

/// `BuiltinShaders_Vulkan`
pub fn per_api_file_name(api: GraphicsApi) -> String {
    format!("{}_{}", BUILTIN_DISPATCHER_FILE, api.name())
}

/// Types file, one file per API, then the dispatcher
///
/// Shader enum order is first appearance in `shaders`, which the batch
/// keeps in declaration order.
///
/// # Errors
///
/// `Error::Generation` if a shader has no entry for one of `apis`.
pub fn generate_builtin_files(shaders: &[CompiledShader], apis: &[GraphicsApi]) -> Result<Vec<CodeFile>> {
    let mut names: Vec<&str> = Vec::new();
    for shader in shaders {
        if !names.contains(&shader.name.as_str()) {
            names.push(&shader.name);
        }
    }

    let mut files = vec![types_file(&names)];
    for &api in apis {
        files.push(api_file(shaders, &names, api)?);
    }
    files.push(dispatcher_file(apis));
    Ok(files)
}

fn types_file(names: &[&str]) -> CodeFile {
    let mut file = CodeFile::new(BUILTIN_TYPES_FILE);
    file.imports = vec![Import::Std("cstdint".to_string())];

    file.items.push(Item::Enum(EnumDecl {
        name: SHADER_ENUM.to_string(),
        variants: names.iter().map(|n| n.to_string()).collect(),
    }));
    file.items.push(Item::Enum(EnumDecl {
        name: STAGE_ENUM.to_string(),
        variants: ShaderStage::ALL.iter().map(|s| s.name().to_string()).collect(),
    }));
    file.items.push(Item::Struct(StructDecl {
        name: METADATA_STRUCT.to_string(),
        fields: vec![
            Field::new("name", FieldType::Str),
            Field::new("entryPoint", FieldType::Str),
            Field::new("uniqueBinaryName", FieldType::Str),
            Field::new("shaderStage", FieldType::Enum(STAGE_ENUM.to_string())),
            Field::new("bytecode", FieldType::Bytes),
            Field::new("bytecodeSize", FieldType::UInt32),
        ],
    }));
    file.items.push(Item::Instance(InstanceDecl {
        name: INVALID_INSTANCE.to_string(),
        ty: METADATA_STRUCT.to_string(),
        values: vec![
            ("name".to_string(), ValueExpr::Str(String::new())),
            ("entryPoint".to_string(), ValueExpr::Str(String::new())),
            ("uniqueBinaryName".to_string(), ValueExpr::Str(String::new())),
            ("shaderStage".to_string(), ValueExpr::EnumVariant {
                enum_name: STAGE_ENUM.to_string(),
                variant: COUNT_VARIANT.to_string(),
            }),
            ("bytecode".to_string(), ValueExpr::NullBlob),
            ("bytecodeSize".to_string(), ValueExpr::UInt(0)),
        ],
    }));
    file
}

fn api_file(shaders: &[CompiledShader], names: &[&str], api: GraphicsApi) -> Result<CodeFile> {
    let mut file = CodeFile::new(per_api_file_name(api));
    file.imports = vec![
        Import::Std("cstdint".to_string()),
        Import::Std("array".to_string()),
        Import::Sibling(BUILTIN_TYPES_FILE.to_string()),
    ];

    let mut items = Vec::new();
    let mut entries = Vec::with_capacity(names.len());
    for &name in names {
        let Some(shader) = shaders.iter().find(|s| s.name == name && s.api == api) else {
            compiler_bail!("galaxy3d::BuiltinCodegen", Generation,
                "Shader '{}' was not built for {}", name, api);
        };

        let (bytecode, size) = match &shader.bytecode {
            Some(code) => {
                let blob = format!("Bytecode_{}", name);
                items.push(Item::Blob(BlobDecl { name: blob.clone(), bytes: code.as_bytes().to_vec() }));
                let len = code.len() as u32;
                (ValueExpr::Blob(blob.clone()), ValueExpr::BlobLen { name: blob, len })
            }
            None => (ValueExpr::NullBlob, ValueExpr::UInt(0)),
        };

        let instance = format!("{}_{}", METADATA_STRUCT, name);
        items.push(Item::Instance(InstanceDecl {
            name: instance.clone(),
            ty: METADATA_STRUCT.to_string(),
            values: vec![
                ("name".to_string(), ValueExpr::Str(name.to_string())),
                ("entryPoint".to_string(), ValueExpr::Str(shader.entry_point.clone())),
                ("uniqueBinaryName".to_string(), ValueExpr::Str(shader.unique_binary_name.clone())),
                ("shaderStage".to_string(), ValueExpr::EnumVariant {
                    enum_name: STAGE_ENUM.to_string(),
                    variant: shader.stage.name().to_string(),
                }),
                ("bytecode".to_string(), bytecode),
                ("bytecodeSize".to_string(), size),
            ],
        }));
        entries.push(TableEntry { key: name.to_string(), instance });
    }

    items.push(Item::Table(TableDecl {
        name: TABLE_NAME.to_string(),
        element_type: METADATA_STRUCT.to_string(),
        kind: TableKind::ByEnum(SHADER_ENUM.to_string()),
        entries,
        lookup_fn: LOOKUP_FN.to_string(),
        fallback: INVALID_INSTANCE.to_string(),
    }));

    file.items.push(Item::Module(ModuleDecl { name: api.name().to_string(), items }));
    Ok(file)
}

fn dispatcher_file(apis: &[GraphicsApi]) -> CodeFile {
    let mut file = CodeFile::new(BUILTIN_DISPATCHER_FILE);
    file.header_only = true;
    file.imports = vec![
        Import::Std("cstdint".to_string()),
        Import::Sibling(BUILTIN_TYPES_FILE.to_string()),
    ];
    file.imports.extend(apis.iter().map(|&api| Import::Sibling(per_api_file_name(api))));

    // Every known API gets a value so callers can name one that was not built
    file.items.push(Item::Enum(EnumDecl {
        name: API_ENUM.to_string(),
        variants: GraphicsApi::ALL.iter().map(|a| a.name().to_string()).collect(),
    }));
    file.items.push(Item::Dispatcher(DispatcherDecl {
        name: LOOKUP_FN.to_string(),
        return_type: METADATA_STRUCT.to_string(),
        key_enum: SHADER_ENUM.to_string(),
        selector_enum: API_ENUM.to_string(),
        routes: apis.iter().map(|a| (a.name().to_string(), a.name().to_string())).collect(),
        fallback: INVALID_INSTANCE.to_string(),
    }));
    file
}

#[cfg(test)]
#[path = "codegen_tests.rs"]
mod tests;
