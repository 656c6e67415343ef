/// Hand-assembled SPIR-V modules for reflection tests

use crate::compile::bytecode::SPIRV_MAGIC;
use crate::reflection::spirv_reflection::OP_SOURCE;

const OP_CAPABILITY: u32 = 17;
const OP_MEMORY_MODEL: u32 = 14;
const OP_ENTRY_POINT: u32 = 15;
const OP_EXECUTION_MODE: u32 = 16;
const OP_NAME: u32 = 5;
const OP_MEMBER_NAME: u32 = 6;
const OP_DECORATE: u32 = 71;
const OP_MEMBER_DECORATE: u32 = 72;
const OP_TYPE_VOID: u32 = 19;
const OP_TYPE_FLOAT: u32 = 22;
const OP_TYPE_VECTOR: u32 = 23;
const OP_TYPE_MATRIX: u32 = 24;
const OP_TYPE_IMAGE: u32 = 25;
const OP_TYPE_SAMPLER: u32 = 26;
const OP_TYPE_STRUCT: u32 = 30;
const OP_TYPE_POINTER: u32 = 32;
const OP_TYPE_FUNCTION: u32 = 33;
const OP_FUNCTION: u32 = 54;
const OP_FUNCTION_END: u32 = 56;
const OP_VARIABLE: u32 = 59;
const OP_LABEL: u32 = 248;
const OP_RETURN: u32 = 253;

const DECORATION_BLOCK: u32 = 2;
const DECORATION_COL_MAJOR: u32 = 5;
const DECORATION_MATRIX_STRIDE: u32 = 7;
const DECORATION_BINDING: u32 = 33;
const DECORATION_DESCRIPTOR_SET: u32 = 34;
const DECORATION_OFFSET: u32 = 35;

const EXECUTION_MODE_ORIGIN_UPPER_LEFT: u32 = 7;

const STORAGE_UNIFORM_CONSTANT: u32 = 0;
const STORAGE_UNIFORM: u32 = 2;

pub(crate) const MODEL_VERTEX: u32 = 0;
pub(crate) const MODEL_FRAGMENT: u32 = 4;

/// Member of a test struct: name, type id, offset, is matrix
pub(crate) type TestMember<'a> = (&'a str, u32, u32, bool);

/// Minimal SPIR-V assembler emitting sections in logical layout order
pub(crate) struct ModuleBuilder {
    next_id: u32,
    /// (execution model, name, function id)
    entry_points: Vec<(u32, String, u32)>,
    language: u32,
    debug: Vec<u32>,
    annotations: Vec<u32>,
    types: Vec<u32>,
    float: Option<u32>,
}

fn encode_string(text: &str) -> Vec<u32> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes.chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn push_op(section: &mut Vec<u32>, opcode: u32, operands: &[u32]) {
    section.push(((operands.len() as u32 + 1) << 16) | opcode);
    section.extend_from_slice(operands);
}

impl ModuleBuilder {
    pub(crate) fn new(exec_model: u32, entry_point: &str, language: u32) -> Self {
        Self {
            next_id: 2,
            entry_points: vec![(exec_model, entry_point.to_string(), 1)],
            language,
            debug: Vec::new(),
            annotations: Vec::new(),
            types: Vec::new(),
            float: None,
        }
    }

    /// Another entry point with its own empty function
    pub(crate) fn entry_point(&mut self, exec_model: u32, name: &str) {
        let function = self.id();
        self.entry_points.push((exec_model, name.to_string(), function));
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn name(&mut self, id: u32, name: &str) {
        let mut operands = vec![id];
        operands.extend(encode_string(name));
        push_op(&mut self.debug, OP_NAME, &operands);
    }

    fn float(&mut self) -> u32 {
        if let Some(id) = self.float {
            return id;
        }
        let id = self.id();
        push_op(&mut self.types, OP_TYPE_FLOAT, &[id, 32]);
        self.float = Some(id);
        id
    }

    pub(crate) fn vector(&mut self, size: u32) -> u32 {
        let float = self.float();
        let id = self.id();
        push_op(&mut self.types, OP_TYPE_VECTOR, &[id, float, size]);
        id
    }

    pub(crate) fn matrix(&mut self, column: u32, count: u32) -> u32 {
        let id = self.id();
        push_op(&mut self.types, OP_TYPE_MATRIX, &[id, column, count]);
        id
    }

    pub(crate) fn block(&mut self, name: Option<&str>, members: &[TestMember]) -> u32 {
        let id = self.id();
        if let Some(name) = name {
            self.name(id, name);
        }
        push_op(&mut self.annotations, OP_DECORATE, &[id, DECORATION_BLOCK]);
        let mut operands = vec![id];
        for (index, (member_name, ty, offset, is_matrix)) in members.iter().enumerate() {
            let index = index as u32;
            let mut name_operands = vec![id, index];
            name_operands.extend(encode_string(member_name));
            push_op(&mut self.debug, OP_MEMBER_NAME, &name_operands);
            push_op(&mut self.annotations, OP_MEMBER_DECORATE, &[id, index, DECORATION_OFFSET, *offset]);
            if *is_matrix {
                push_op(&mut self.annotations, OP_MEMBER_DECORATE, &[id, index, DECORATION_COL_MAJOR]);
                push_op(&mut self.annotations, OP_MEMBER_DECORATE, &[id, index, DECORATION_MATRIX_STRIDE, 16]);
            }
            operands.push(*ty);
        }
        push_op(&mut self.types, OP_TYPE_STRUCT, &operands);
        id
    }

    fn variable(&mut self, name: Option<&str>, pointee: u32, storage: u32, set: u32, binding: u32) -> u32 {
        let pointer = self.id();
        let var = self.id();
        if let Some(name) = name {
            self.name(var, name);
        }
        push_op(&mut self.annotations, OP_DECORATE, &[var, DECORATION_DESCRIPTOR_SET, set]);
        push_op(&mut self.annotations, OP_DECORATE, &[var, DECORATION_BINDING, binding]);
        push_op(&mut self.types, OP_TYPE_POINTER, &[pointer, storage, pointee]);
        push_op(&mut self.types, OP_VARIABLE, &[pointer, var, storage]);
        var
    }

    pub(crate) fn uniform_buffer(&mut self, var_name: Option<&str>, block: u32, set: u32, binding: u32) {
        self.variable(var_name, block, STORAGE_UNIFORM, set, binding);
    }

    pub(crate) fn texture_2d(&mut self, name: &str, set: u32, binding: u32) {
        let float = self.float();
        let image = self.id();
        push_op(&mut self.types, OP_TYPE_IMAGE, &[image, float, 1, 0, 0, 0, 1, 0]);
        self.variable(Some(name), image, STORAGE_UNIFORM_CONSTANT, set, binding);
    }

    pub(crate) fn sampler(&mut self, name: &str, set: u32, binding: u32) {
        let sampler = self.id();
        push_op(&mut self.types, OP_TYPE_SAMPLER, &[sampler]);
        self.variable(Some(name), sampler, STORAGE_UNIFORM_CONSTANT, set, binding);
    }

    pub(crate) fn finish(mut self) -> Vec<u32> {
        let void = self.id();
        let function_type = self.id();
        push_op(&mut self.types, OP_TYPE_VOID, &[void]);
        push_op(&mut self.types, OP_TYPE_FUNCTION, &[function_type, void]);
        let labels: Vec<u32> = (0..self.entry_points.len()).map(|_| self.id()).collect();

        let mut module = vec![SPIRV_MAGIC, 0x0001_0000, 0, self.next_id, 0];
        push_op(&mut module, OP_CAPABILITY, &[1]);
        push_op(&mut module, OP_MEMORY_MODEL, &[0, 1]);
        for (exec_model, name, function) in &self.entry_points {
            let mut entry = vec![*exec_model, *function];
            entry.extend(encode_string(name));
            push_op(&mut module, OP_ENTRY_POINT, &entry);
        }
        for (exec_model, _, function) in &self.entry_points {
            if *exec_model == MODEL_FRAGMENT {
                push_op(&mut module, OP_EXECUTION_MODE, &[*function, EXECUTION_MODE_ORIGIN_UPPER_LEFT]);
            }
        }
        push_op(&mut module, OP_SOURCE, &[self.language, 600]);
        module.extend(self.debug);
        module.extend(self.annotations);
        module.extend(self.types);
        for ((_, _, function), label) in self.entry_points.iter().zip(labels) {
            push_op(&mut module, OP_FUNCTION, &[void, *function, 0, function_type]);
            push_op(&mut module, OP_LABEL, &[label]);
            push_op(&mut module, OP_RETURN, &[]);
            push_op(&mut module, OP_FUNCTION_END, &[]);
        }
        module
    }
}

/// `cbuffer CameraData { float4x4 viewProj; float3 position; }` at set 0 binding 0
pub(crate) fn camera_module(var_name: Option<&str>, language: u32) -> Vec<u32> {
    let mut builder = ModuleBuilder::new(MODEL_FRAGMENT, "main", language);
    let float3 = builder.vector(3);
    let float4 = builder.vector(4);
    let float4x4 = builder.matrix(float4, 4);
    let block = builder.block(Some("type.CameraData"), &[
        ("viewProj", float4x4, 0, true),
        ("position", float3, 64, false),
    ]);
    builder.uniform_buffer(var_name, block, 0, 0);
    builder.finish()
}
