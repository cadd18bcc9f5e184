use serde::Serialize;

use crate::{
    attributes::Attributes, matches_cp_info, parser::Parser, serialize_hex, ClassAccessFlags,
    ConstantPool, CpIndex, MethodAccessFlags, Result,
};

#[derive(Debug, Serialize)]
pub struct ClassFile {
    #[serde(serialize_with = "serialize_hex")]
    pub magic: [u8; 4],
    pub minor: i16,
    pub major: i16,
    #[serde(rename = "constants_pool")]
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: String,
    pub super_class: String,
    pub interfaces_count: u16,
    pub fields_count: u16,
    pub methods: Vec<MethodInfo>,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn class_name(&self) -> &str {
        &self.this_class
    }

    pub fn super_class(&self) -> &str {
        &self.super_class
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.resolve_utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        let descriptor = matches_cp_info!(self.constant_pool, method.descriptor_index, Utf8)?;

        Ok(&descriptor.text)
    }

    pub fn method_by_name(&self, name: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| self.method_name(method).map_or(false, |n| n == name))
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MethodInfo {
    pub access_flags: MethodAccessFlags,
    pub name_index: CpIndex,
    pub descriptor_index: CpIndex,
    pub attributes: Attributes,
}
