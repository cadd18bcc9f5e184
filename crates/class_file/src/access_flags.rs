use bitflags::bitflags;
use serde::{ser::SerializeSeq, Serialize, Serializer};

bitflags! {
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

bitflags! {
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

const CLASS_FLAG_NAMES: [(ClassAccessFlags, &str); 9] = [
    (ClassAccessFlags::PUBLIC, "PUBLIC"),
    (ClassAccessFlags::FINAL, "FINAL"),
    (ClassAccessFlags::SUPER, "SUPER"),
    (ClassAccessFlags::INTERFACE, "INTERFACE"),
    (ClassAccessFlags::ABSTRACT, "ABSTRACT"),
    (ClassAccessFlags::SYNTHETIC, "SYNTHETIC"),
    (ClassAccessFlags::ANNOTATION, "ANNOTATION"),
    (ClassAccessFlags::ENUM, "ENUM"),
    (ClassAccessFlags::MODULE, "MODULE"),
];

const METHOD_FLAG_NAMES: [(MethodAccessFlags, &str); 12] = [
    (MethodAccessFlags::PUBLIC, "PUBLIC"),
    (MethodAccessFlags::PRIVATE, "PRIVATE"),
    (MethodAccessFlags::PROTECTED, "PROTECTED"),
    (MethodAccessFlags::STATIC, "STATIC"),
    (MethodAccessFlags::FINAL, "FINAL"),
    (MethodAccessFlags::SYNCHRONIZED, "SYNCHRONIZED"),
    (MethodAccessFlags::BRIDGE, "BRIDGE"),
    (MethodAccessFlags::VARARGS, "VARARGS"),
    (MethodAccessFlags::NATIVE, "NATIVE"),
    (MethodAccessFlags::ABSTRACT, "ABSTRACT"),
    (MethodAccessFlags::STRICT, "STRICT"),
    (MethodAccessFlags::SYNTHETIC, "SYNTHETIC"),
];

impl ClassAccessFlags {
    /// Names of the set flags, in table order.
    pub fn names(&self) -> Vec<&'static str> {
        CLASS_FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl MethodAccessFlags {
    /// Names of the set flags, in table order.
    pub fn names(&self) -> Vec<&'static str> {
        METHOD_FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

fn serialize_names<S: Serializer>(names: Vec<&'static str>, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(names.len()))?;
    for name in names {
        seq.serialize_element(name)?;
    }
    seq.end()
}

impl Serialize for ClassAccessFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_names(self.names(), serializer)
    }
}

impl Serialize for MethodAccessFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_names(self.names(), serializer)
    }
}
