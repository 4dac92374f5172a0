//! Runtime name/tag-keyed field access over a statically typed field set.
//!
//! This is not a dynamic schema: the set of fields a message can be asked
//! about is fixed at compile time by the message's own `Message` impl.
//! `Reflect` only lets a caller pick one of those known fields by a runtime
//! string or integer instead of a compile-time field access, returning an
//! owned, type-erased [`FieldValue`] snapshot. There is no reflection over
//! foreign types outside a message's own declared fields.

/// An owned snapshot of one field's current value, type-erased across the
/// scalar kinds a message can declare.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    /// A nested message's own re-encoded bytes; re-decoding them requires
    /// knowing the nested message's concrete type, which `Reflect` does not
    /// expose (doing so would mean reflecting into a type this message's
    /// author didn't declare as part of its own field set).
    Message(Vec<u8>),
    Repeated(Vec<FieldValue>),
}

/// Runtime-keyed read access into a message's statically declared fields.
///
/// `#[derive(Message)]` implements this alongside `Message` by emitting one
/// match arm per field tag and per field name.
pub trait Reflect {
    /// Look up a field by its wire tag. Returns `None` if no field of this
    /// message declares that tag.
    fn field_by_tag(&self, tag: u32) -> Option<FieldValue>;

    /// Look up a field by its declared name. Returns `None` if no field of
    /// this message declares that name.
    fn field_by_name(&self, name: &str) -> Option<FieldValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i32,
        y: i32,
    }

    impl Reflect for Point {
        fn field_by_tag(&self, tag: u32) -> Option<FieldValue> {
            match tag {
                1 => Some(FieldValue::I32(self.x)),
                2 => Some(FieldValue::I32(self.y)),
                _ => None,
            }
        }

        fn field_by_name(&self, name: &str) -> Option<FieldValue> {
            match name {
                "x" => Some(FieldValue::I32(self.x)),
                "y" => Some(FieldValue::I32(self.y)),
                _ => None,
            }
        }
    }

    #[test]
    fn unknown_tag_and_name_return_none() {
        let p = Point { x: 1, y: 2 };
        assert_eq!(p.field_by_tag(1), Some(FieldValue::I32(1)));
        assert_eq!(p.field_by_name("y"), Some(FieldValue::I32(2)));
        assert_eq!(p.field_by_tag(99), None);
        assert_eq!(p.field_by_name("z"), None);
    }
}
