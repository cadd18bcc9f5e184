use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ClassFileError {
    #[error("Read of {wanted} bytes at offset {position} is out of bounds (length {len})")]
    OutOfBounds {
        position: usize,
        wanted: usize,
        len: usize,
    },
    #[error("Unsupported cp info tag {tag} at offset {position}")]
    UnsupportedTag { tag: u8, position: usize },
    #[error("Constant pool index {0} is unresolved")]
    UnresolvedIndex(u16),
    #[error("Expected {expected} at constant pool index {index}, found {found}")]
    TypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Unsupported feature: {count} {feature}")]
    UnsupportedFeature { feature: &'static str, count: u16 },
    #[error("Invalid method handle reference kind: {0}")]
    InvalidReferenceKind(u8),
}
