use crate::{
    attributes::Attributes,
    class_file::MethodInfo,
    constant_pool::{
        ClassInfo, ConstantTag, DoubleInfo, DynamicInfo, FloatInfo, IntegerInfo, LongInfo,
        MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo, RefInfo, ReferenceKind, Utf8Info,
    },
};

use super::{constant_pool::CpInfo, *};

const MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// Single forward pass over a class file image.
pub struct Parser<'a> {
    r: ByteCursor<'a>,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: ByteCursor::new(buf),
        }
    }

    /// Offset of the next byte to be read.
    pub fn position(&self) -> usize {
        self.r.position()
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.parse_magic_identifier()?;
        let (minor, major) = self.parse_version()?;
        log::debug!("class file version {}.{}", major, minor);

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = ClassAccessFlags::from_bits_truncate(self.r.read_u2()?);
        let this_class = constant_pool
            .resolve_class_name(self.parse_index()?)?
            .to_owned();
        let super_class = constant_pool
            .resolve_class_name(self.parse_index()?)?
            .to_owned();
        log::debug!("decoding {} extends {}", this_class, super_class);

        let interfaces_count = self.parse_unsupported_count("interfaces")?;
        let fields_count = self.parse_unsupported_count("fields")?;

        let methods_count = self.r.read_u2()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        if !self.r.is_empty() {
            log::debug!(
                "{} bytes of class attributes left undecoded",
                self.r.remaining()
            );
        }

        Ok(ClassFile {
            magic,
            minor,
            major,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces_count,
            fields_count,
            methods,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<[u8; 4]> {
        let magic = self.r.read_u4_raw()?;
        if magic != MAGIC {
            log::warn!(
                "Invalid magic identifier: 0x{:X}",
                u32::from_be_bytes(magic)
            );
        }
        Ok(magic)
    }

    fn parse_version(&mut self) -> Result<(i16, i16)> {
        let minor = self.r.read_i2()?;
        let major = self.r.read_i2()?;
        Ok((minor, major))
    }

    fn parse_index(&mut self) -> Result<CpIndex> {
        Ok(CpIndex::new(self.r.read_u2()?))
    }

    /// Reads the count of a table this decoder has no support for, which therefore has to be empty.
    fn parse_unsupported_count(&mut self, feature: &'static str) -> Result<u16> {
        match self.r.read_u2()? {
            0 => Ok(0),
            count => Err(ClassFileError::UnsupportedFeature { feature, count }),
        }
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.r.read_u2()?;

        let count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while res.len() < count {
            let (cp_info, slot_size) = self.parse_cp_info()?;
            log::trace!("#{} = {:?}", res.len() + 1, cp_info);
            res.push(cp_info);

            let padding = (slot_size - 1).min(count - res.len());
            res.extend((0..padding).map(|_| CpInfo::Unusable));
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self) -> Result<(CpInfo, usize)> {
        let position = self.r.position();
        let tag = ConstantTag::try_from(self.r.read_u1()?)
            .map_err(|tag| ClassFileError::UnsupportedTag { tag, position })?;

        let cp_info = match tag {
            ConstantTag::Utf8 => self.parse_utf8()?,
            ConstantTag::Integer => self.parse_integer()?,
            ConstantTag::Float => self.parse_float()?,
            ConstantTag::Long => self.parse_long()?,
            ConstantTag::Double => self.parse_double()?,
            ConstantTag::Class => self.parse_class_info()?,
            ConstantTag::String => self.parse_string()?,
            ConstantTag::FieldRef => CpInfo::FieldRef(self.parse_ref_info()?),
            ConstantTag::MethodRef => CpInfo::MethodRef(self.parse_ref_info()?),
            ConstantTag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            ConstantTag::NameAndType => self.parse_name_and_type_info()?,
            ConstantTag::MethodHandle => self.parse_method_handle()?,
            ConstantTag::MethodType => self.parse_method_type_info()?,
            ConstantTag::Dynamic => CpInfo::Dynamic(self.parse_dynamic_info()?),
            ConstantTag::InvokeDynamic => CpInfo::InvokeDynamic(self.parse_dynamic_info()?),
            ConstantTag::Module => CpInfo::Module {
                name_index: self.parse_index()?,
            },
            ConstantTag::Package => CpInfo::Package {
                name_index: self.parse_index()?,
            },
        };

        Ok((cp_info, tag.slot_size()))
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.r.read_u2()?;
        let (bytes, text) = self.r.read_string(length as usize)?;

        Ok(CpInfo::Utf8(Utf8Info {
            bytes: bytes.to_vec(),
            text,
        }))
    }

    fn parse_integer(&mut self) -> Result<CpInfo> {
        let bytes = self.r.read_i4()?;

        Ok(CpInfo::Integer(IntegerInfo { bytes }))
    }

    fn parse_float(&mut self) -> Result<CpInfo> {
        let bytes = self.r.read_i4()?;

        Ok(CpInfo::Float(FloatInfo { bytes }))
    }

    fn parse_long(&mut self) -> Result<CpInfo> {
        let high_bytes = self.r.read_i4()?;
        let low_bytes = self.r.read_i4()?;

        Ok(CpInfo::Long(LongInfo {
            high_bytes,
            low_bytes,
        }))
    }

    fn parse_double(&mut self) -> Result<CpInfo> {
        let high_bytes = self.r.read_i4()?;
        let low_bytes = self.r.read_i4()?;

        Ok(CpInfo::Double(DoubleInfo {
            high_bytes,
            low_bytes,
        }))
    }

    fn parse_class_info(&mut self) -> Result<CpInfo> {
        let name_index = self.parse_index()?;

        Ok(CpInfo::Class(ClassInfo { name_index }))
    }

    fn parse_string(&mut self) -> Result<CpInfo> {
        let string_index = self.parse_index()?;

        Ok(CpInfo::String { string_index })
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.parse_index()?;
        let descriptor_index = self.parse_index()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = ReferenceKind::try_from(self.r.read_u1()?)
            .map_err(ClassFileError::InvalidReferenceKind)?;
        let reference_index = self.parse_index()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_method_type_info(&mut self) -> Result<CpInfo> {
        let descriptor_index = self.parse_index()?;

        Ok(CpInfo::MethodType(MethodTypeInfo { descriptor_index }))
    }

    fn parse_dynamic_info(&mut self) -> Result<DynamicInfo> {
        let bootstrap_method_attr_index = self.r.read_u2()?;
        let name_and_type_index = self.parse_index()?;

        Ok(DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.parse_index()?;
        let name_and_type_index = self.parse_index()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = MethodAccessFlags::from_bits_truncate(self.r.read_u2()?);
        let name_index = self.parse_index()?;
        let descriptor_index = self.parse_index()?;
        let attributes_count = self.r.read_u2()?;
        let attributes = self.parse_attributes(attributes_count)?;
        log::trace!(
            "method name {} descriptor {} with {} attributes",
            name_index,
            descriptor_index,
            attributes.len()
        );

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.parse_index()?;
        let attribute_length = self.r.read_u4()?;
        let info = self.r.read_bytes(attribute_length as usize)?.to_vec();

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    fn parse_attributes(&mut self, attributes_count: u16) -> Result<Attributes> {
        (0..attributes_count)
            .map(|_| self.parse_attribute())
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }
}


#[cfg(test)]
mod parse_constant_pool_tests {
    use super::*;

    #[test]
    fn it_should_produce_count_minus_one_slots() {
        let mut parser = Parser::new(&[
            0x00, 0x04, // constant_pool_count
            0x07, 0x00, 0x02, // #1 Class
            0x01, 0x00, 0x01, b'A', // #2 Utf8
            0x08, 0x00, 0x02, // #3 String
        ]);
        let pool = parser.parse_constant_pool().unwrap();

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.resolve_class_name(CpIndex::new(1)).unwrap(), "A");
    }

    #[test]
    fn it_should_leave_the_slot_after_a_double_unusable() {
        let mut parser = Parser::new(&[
            0x00, 0x04, // constant_pool_count
            0x06, 0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // #1 Double, #2 unusable
            0x01, 0x00, 0x01, b'B', // #3 Utf8
        ]);
        let pool = parser.parse_constant_pool().unwrap();

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(CpIndex::new(2)).unwrap(), &CpInfo::Unusable);
        assert_eq!(pool.resolve_utf8(CpIndex::new(3)).unwrap(), "B");
        let CpInfo::Double(double) = pool.get(CpIndex::new(1)).unwrap() else {
            panic!("expected a double");
        };
        assert_eq!(double.value(), 1.0);
    }

    #[test]
    fn it_should_be_empty_for_a_count_of_one() {
        let mut parser = Parser::new(&[0x00, 0x01]);

        assert!(parser.parse_constant_pool().unwrap().is_empty());
    }
}

#[cfg(test)]
mod parse_attribute_tests {
    use super::*;

    #[test]
    fn it_should_keep_the_payload_as_is() {
        let mut parser = Parser::new(&[0x00, 0x07, 0x00, 0x00, 0x00, 0x02, 0xb1, 0x00, 0xff]);

        assert_eq!(
            parser.parse_attribute().unwrap(),
            Attribute {
                attribute_name_index: CpIndex::new(7),
                info: vec![0xb1, 0x00],
            }
        );
        assert_eq!(parser.r.remaining(), 1);
    }

    #[test]
    fn it_should_fail_if_the_payload_is_truncated() {
        let mut parser = Parser::new(&[0x00, 0x07, 0x00, 0x00, 0x00, 0x05, 0x01, 0x02, 0x03]);

        assert_eq!(
            parser.parse_attribute(),
            Err(ClassFileError::OutOfBounds {
                position: 6,
                wanted: 5,
                len: 9
            })
        );
    }
}

#[cfg(test)]
mod parse_version_tests {
    use super::*;

    #[test]
    fn it_should_read_minor_then_major() {
        assert_eq!(
            Parser::new(&[0x00, 0x03, 0x00, 0x2d]).parse_version().unwrap(),
            (3, 45)
        );
    }

    #[test]
    fn it_should_read_the_versions_as_signed() {
        assert_eq!(
            Parser::new(&[0xff, 0xff, 0x80, 0x00]).parse_version().unwrap(),
            (-1, i16::MIN)
        );
    }
}

#[cfg(test)]
mod parse_magic_identifier_tests {
    use super::*;

    #[test]
    fn it_should_be_able_to_parse_the_correct_identifier() {
        assert_eq!(
            Parser::new(&[0xca, 0xfe, 0xba, 0xbe])
                .parse_magic_identifier()
                .unwrap(),
            MAGIC
        );
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(Parser::new(&[0xca, 0xfe, 0xba])
            .parse_magic_identifier()
            .is_err());
    }

    #[test]
    fn it_should_keep_an_unexpected_identifier() {
        assert_eq!(
            Parser::new(&[0xde, 0xad, 0xbe, 0xef])
                .parse_magic_identifier()
                .unwrap(),
            [0xde, 0xad, 0xbe, 0xef]
        );
    }
}
