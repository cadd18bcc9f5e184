// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
pub mod constant_pool;
mod cursor;
mod error;
mod parser;

use std::fmt;

use serde::{Serialize, Serializer};

pub use self::class_file::{ClassFile, MethodInfo};
pub use access_flags::{ClassAccessFlags, MethodAccessFlags};
pub use constant_pool::{ConstantPool, CpIndex, CpInfo};
pub use cursor::ByteCursor;
pub use error::ClassFileError;
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

#[derive(PartialEq, Serialize)]
pub struct Attribute {
    pub attribute_name_index: CpIndex,
    #[serde(serialize_with = "serialize_hex")]
    pub info: Vec<u8>,
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

/// Renders raw bytes as one lowercase hex string.
pub(crate) fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    let hex = bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>();
    serializer.serialize_str(&hex)
}
