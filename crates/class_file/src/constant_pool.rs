use std::fmt;

use serde::Serialize;

use crate::{ClassFileError, Result};

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index: $crate::constant_pool::CpIndex = $index;
        match $cp.get(index)? {
            $crate::constant_pool::CpInfo::$i(n) => Ok(n),
            c => Err($crate::ClassFileError::TypeMismatch {
                index: index.raw(),
                expected: stringify!($i),
                found: c.kind(),
            }),
        }
    }};
}

/// A raw 1-based constant pool index as read from the class file.
///
/// Nothing about the range is trusted until it goes through [`ConstantPool::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CpIndex(u16);

impl CpIndex {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<u16> for CpIndex {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CpIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// Number of slots, which is `constant_pool_count - 1`.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CpInfo> {
        self.cp_infos.iter()
    }

    /// Looks up the slot at `index`, failing for 0 and for anything past the last slot.
    pub fn get(&self, index: CpIndex) -> Result<&CpInfo> {
        match index.raw() {
            0 => Err(ClassFileError::UnresolvedIndex(0)),
            i => self
                .cp_infos
                .get(i as usize - 1)
                .ok_or(ClassFileError::UnresolvedIndex(i)),
        }
    }

    pub fn resolve_utf8(&self, index: CpIndex) -> Result<&str> {
        let utf8 = matches_cp_info!(self, index, Utf8)?;

        Ok(&utf8.text)
    }

    /// Follows a `CONSTANT_Class` entry to the name it points at.
    pub fn resolve_class_name(&self, index: CpIndex) -> Result<&str> {
        // The constant_pool entry at that index must be a CONSTANT_Class_info structure, whose
        // name_index in turn must point at a CONSTANT_Utf8_info structure.
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;

        self.resolve_utf8(*name_index)
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}
impl ConstantTag {
    pub fn name(self) -> &'static str {
        match self {
            ConstantTag::Utf8 => "CONSTANT_Utf8",
            ConstantTag::Integer => "CONSTANT_Integer",
            ConstantTag::Float => "CONSTANT_Float",
            ConstantTag::Long => "CONSTANT_Long",
            ConstantTag::Double => "CONSTANT_Double",
            ConstantTag::Class => "CONSTANT_Class",
            ConstantTag::String => "CONSTANT_String",
            ConstantTag::FieldRef => "CONSTANT_Fieldref",
            ConstantTag::MethodRef => "CONSTANT_Methodref",
            ConstantTag::InterfaceMethodRef => "CONSTANT_InterfaceMethodref",
            ConstantTag::NameAndType => "CONSTANT_NameAndType",
            ConstantTag::MethodHandle => "CONSTANT_MethodHandle",
            ConstantTag::MethodType => "CONSTANT_MethodType",
            ConstantTag::Dynamic => "CONSTANT_Dynamic",
            ConstantTag::InvokeDynamic => "CONSTANT_InvokeDynamic",
            ConstantTag::Module => "CONSTANT_Module",
            ConstantTag::Package => "CONSTANT_Package",
        }
    }

    /// Long and Double take up two slots of the pool, the second one is unusable.
    pub fn slot_size(self) -> usize {
        match self {
            ConstantTag::Long | ConstantTag::Double => 2,
            _ => 1,
        }
    }
}

impl TryFrom<u8> for ConstantTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ConstantTag::Utf8),
            3 => Ok(ConstantTag::Integer),
            4 => Ok(ConstantTag::Float),
            5 => Ok(ConstantTag::Long),
            6 => Ok(ConstantTag::Double),
            7 => Ok(ConstantTag::Class),
            8 => Ok(ConstantTag::String),
            9 => Ok(ConstantTag::FieldRef),
            10 => Ok(ConstantTag::MethodRef),
            11 => Ok(ConstantTag::InterfaceMethodRef),
            12 => Ok(ConstantTag::NameAndType),
            15 => Ok(ConstantTag::MethodHandle),
            16 => Ok(ConstantTag::MethodType),
            17 => Ok(ConstantTag::Dynamic),
            18 => Ok(ConstantTag::InvokeDynamic),
            19 => Ok(ConstantTag::Module),
            20 => Ok(ConstantTag::Package),
            _ => Err(value),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "tag")]
pub enum CpInfo {
    #[serde(rename = "CONSTANT_Utf8")]
    Utf8(Utf8Info),
    #[serde(rename = "CONSTANT_Integer")]
    Integer(IntegerInfo),
    #[serde(rename = "CONSTANT_Float")]
    Float(FloatInfo),
    #[serde(rename = "CONSTANT_Long")]
    Long(LongInfo),
    #[serde(rename = "CONSTANT_Double")]
    Double(DoubleInfo),
    #[serde(rename = "CONSTANT_Class")]
    Class(ClassInfo),
    #[serde(rename = "CONSTANT_String")]
    String { string_index: CpIndex },
    #[serde(rename = "CONSTANT_Fieldref")]
    FieldRef(RefInfo),
    #[serde(rename = "CONSTANT_Methodref")]
    MethodRef(RefInfo),
    #[serde(rename = "CONSTANT_InterfaceMethodref")]
    InterfaceMethodRef(RefInfo),
    #[serde(rename = "CONSTANT_NameAndType")]
    NameAndType(NameAndTypeInfo),
    #[serde(rename = "CONSTANT_MethodHandle")]
    MethodHandle(MethodHandleInfo),
    #[serde(rename = "CONSTANT_MethodType")]
    MethodType(MethodTypeInfo),
    #[serde(rename = "CONSTANT_Dynamic")]
    Dynamic(DynamicInfo),
    #[serde(rename = "CONSTANT_InvokeDynamic")]
    InvokeDynamic(DynamicInfo),
    #[serde(rename = "CONSTANT_Module")]
    Module { name_index: CpIndex },
    #[serde(rename = "CONSTANT_Package")]
    Package { name_index: CpIndex },
    /// The slot following a Long or Double.
    #[serde(rename = "CONSTANT_Unusable")]
    Unusable,
}
impl CpInfo {
    /// The wire tag of this entry, `None` for the placeholder after a Long or Double.
    pub fn tag(&self) -> Option<ConstantTag> {
        let tag = match self {
            CpInfo::Utf8(_) => ConstantTag::Utf8,
            CpInfo::Integer(_) => ConstantTag::Integer,
            CpInfo::Float(_) => ConstantTag::Float,
            CpInfo::Long(_) => ConstantTag::Long,
            CpInfo::Double(_) => ConstantTag::Double,
            CpInfo::Class(_) => ConstantTag::Class,
            CpInfo::String { .. } => ConstantTag::String,
            CpInfo::FieldRef(_) => ConstantTag::FieldRef,
            CpInfo::MethodRef(_) => ConstantTag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => ConstantTag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => ConstantTag::NameAndType,
            CpInfo::MethodHandle(_) => ConstantTag::MethodHandle,
            CpInfo::MethodType(_) => ConstantTag::MethodType,
            CpInfo::Dynamic(_) => ConstantTag::Dynamic,
            CpInfo::InvokeDynamic(_) => ConstantTag::InvokeDynamic,
            CpInfo::Module { .. } => ConstantTag::Module,
            CpInfo::Package { .. } => ConstantTag::Package,
            CpInfo::Unusable => return None,
        };
        Some(tag)
    }

    /// Variant name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self.tag() {
            Some(tag) => &tag.name()["CONSTANT_".len()..],
            None => "Unusable",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Utf8Info {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    #[serde(rename = "bytesAsString")]
    pub text: String,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct IntegerInfo {
    pub bytes: i32,
}
impl IntegerInfo {
    pub fn value(&self) -> i32 {
        self.bytes
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct FloatInfo {
    pub bytes: i32,
}
impl FloatInfo {
    pub fn value(&self) -> f32 {
        f32::from_bits(self.bytes as u32)
    }
}

fn join_halves(high_bytes: i32, low_bytes: i32) -> u64 {
    (high_bytes as u32 as u64) << 32 | low_bytes as u32 as u64
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LongInfo {
    pub high_bytes: i32,
    pub low_bytes: i32,
}
impl LongInfo {
    pub fn value(&self) -> i64 {
        join_halves(self.high_bytes, self.low_bytes) as i64
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct DoubleInfo {
    pub high_bytes: i32,
    pub low_bytes: i32,
}
impl DoubleInfo {
    pub fn value(&self) -> f64 {
        f64::from_bits(join_halves(self.high_bytes, self.low_bytes))
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct RefInfo {
    pub class_index: CpIndex,
    pub name_and_type_index: CpIndex,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ClassInfo {
    pub name_index: CpIndex,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct NameAndTypeInfo {
    pub name_index: CpIndex,
    pub descriptor_index: CpIndex,
}

/// Shared shape of `CONSTANT_Dynamic` and `CONSTANT_InvokeDynamic`.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: CpIndex,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct MethodHandleInfo {
    pub reference_kind: ReferenceKind,
    pub reference_index: CpIndex,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct MethodTypeInfo {
    pub descriptor_index: CpIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceKind {
    #[serde(rename = "REF_getField")]
    GetField = 1,
    #[serde(rename = "REF_getStatic")]
    GetStatic = 2,
    #[serde(rename = "REF_putField")]
    PutField = 3,
    #[serde(rename = "REF_putStatic")]
    PutStatic = 4,
    #[serde(rename = "REF_invokeVirtual")]
    InvokeVirtual = 5,
    #[serde(rename = "REF_invokeStatic")]
    InvokeStatic = 6,
    #[serde(rename = "REF_invokeSpecial")]
    InvokeSpecial = 7,
    #[serde(rename = "REF_newInvokeSpecial")]
    NewInvokeSpecial = 8,
    #[serde(rename = "REF_invokeInterface")]
    InvokeInterface = 9,
}

impl TryFrom<u8> for ReferenceKind {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ReferenceKind::GetField),
            2 => Ok(ReferenceKind::GetStatic),
            3 => Ok(ReferenceKind::PutField),
            4 => Ok(ReferenceKind::PutStatic),
            5 => Ok(ReferenceKind::InvokeVirtual),
            6 => Ok(ReferenceKind::InvokeStatic),
            7 => Ok(ReferenceKind::InvokeSpecial),
            8 => Ok(ReferenceKind::NewInvokeSpecial),
            9 => Ok(ReferenceKind::InvokeInterface),
            _ => Err(value),
        }
    }
}


#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn it_should_combine_long_halves() {
        let long = LongInfo {
            high_bytes: 0x0000_0001,
            low_bytes: 0xffff_fffe_u32 as i32,
        };

        assert_eq!(long.value(), 0x0000_0001_ffff_fffe);
    }

    #[test]
    fn it_should_reinterpret_float_bits() {
        let float = FloatInfo {
            bytes: 1.5f32.to_bits() as i32,
        };

        assert_eq!(float.value(), 1.5);
    }

    #[test]
    fn it_should_reinterpret_double_bits() {
        let bits = (-2.25f64).to_bits();
        let double = DoubleInfo {
            high_bytes: (bits >> 32) as u32 as i32,
            low_bytes: bits as u32 as i32,
        };

        assert_eq!(double.value(), -2.25);
    }

    #[test]
    fn it_should_name_every_tag() {
        for tag in (0..=u8::MAX).filter_map(|t| ConstantTag::try_from(t).ok()) {
            assert!(tag.name().starts_with("CONSTANT_"));
            assert_eq!(ConstantTag::try_from(tag as u8), Ok(tag));
        }
    }
}
