use serde::Serialize;

use crate::{constant_pool::CpInfo, Attribute, ConstantPool};

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        for a in &self.0 {
            let Ok(CpInfo::Utf8(utf8)) = constant_pool.get(a.attribute_name_index) else {
                continue;
            };

            if utf8.text == name {
                return Some(a);
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod find_by_name_tests {
    use super::*;
    use crate::{
        constant_pool::{ClassInfo, Utf8Info},
        CpIndex,
    };

    fn utf8(s: &str) -> CpInfo {
        CpInfo::Utf8(Utf8Info {
            bytes: s.as_bytes().to_vec(),
            text: s.to_owned(),
        })
    }

    fn attribute(name_index: u16, info: &[u8]) -> Attribute {
        Attribute {
            attribute_name_index: CpIndex::new(name_index),
            info: info.to_vec(),
        }
    }

    #[test]
    fn it_should_find_an_attribute_by_its_name() {
        let pool = ConstantPool::new(vec![utf8("Code"), utf8("Signature")]);
        let attributes = Attributes(vec![attribute(2, &[0x00, 0x01]), attribute(1, &[0xb1])]);

        let code = attributes.find_by_name("Code", &pool).unwrap();

        assert_eq!(code.info, vec![0xb1]);
    }

    #[test]
    fn it_should_skip_names_that_do_not_resolve_to_utf8() {
        let pool = ConstantPool::new(vec![
            CpInfo::Class(ClassInfo {
                name_index: CpIndex::new(2),
            }),
            utf8("Code"),
        ]);
        let attributes = Attributes(vec![attribute(1, &[]), attribute(7, &[]), attribute(2, &[0x2a])]);

        assert_eq!(attributes.find_by_name("Code", &pool).unwrap().info, vec![0x2a]);
        assert!(attributes.find_by_name("Exceptions", &pool).is_none());
    }
}
