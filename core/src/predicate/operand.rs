use compact_str::CompactString;

use crate::accessor::Field;
use crate::metadata::EntityType;
use crate::value::Value;

/// A literal convertible to a parameter compared against a column of type `T`.
pub trait IntoValue<T> {
    fn into_value(self) -> Value;
}

/// The right-hand side of a comparison against a column of type `T`: a literal
/// or another column of a compatible type.
pub trait Operand<T> {
    fn into_operand(self) -> OperandKind;
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperandKind {
    Value(Value),
    Field {
        owner: EntityType,
        member: &'static str,
        slot: Option<usize>,
    },
}

impl<E: 'static, T> Operand<T> for Field<E, T> {
    fn into_operand(self) -> OperandKind {
        OperandKind::Field {
            owner: EntityType::of::<E>(),
            member: self.name(),
            slot: self.slot(),
        }
    }
}

impl<E: 'static, T> Operand<Option<T>> for Field<E, T> {
    fn into_operand(self) -> OperandKind {
        OperandKind::Field {
            owner: EntityType::of::<E>(),
            member: self.name(),
            slot: self.slot(),
        }
    }
}

impl<E: 'static, T> Operand<T> for Field<E, Option<T>> {
    fn into_operand(self) -> OperandKind {
        OperandKind::Field {
            owner: EntityType::of::<E>(),
            member: self.name(),
            slot: self.slot(),
        }
    }
}

impl<T> IntoValue<T> for Value {
    #[inline]
    fn into_value(self) -> Value {
        self
    }
}

impl<T> Operand<T> for Value {
    #[inline]
    fn into_operand(self) -> OperandKind {
        OperandKind::Value(self)
    }
}

/// Implements `IntoValue` / `Operand` for each `source` against column type
/// `target` and `Option<target>`.
macro_rules! impl_operand {
    ($($target:ty => [$($source:ty),* $(,)?]);* $(;)?) => {
        $(
            $(
                impl IntoValue<$target> for $source {
                    #[inline]
                    fn into_value(self) -> Value {
                        Value::from(self)
                    }
                }

                impl IntoValue<Option<$target>> for $source {
                    #[inline]
                    fn into_value(self) -> Value {
                        Value::from(self)
                    }
                }

                impl Operand<$target> for $source {
                    #[inline]
                    fn into_operand(self) -> OperandKind {
                        OperandKind::Value(Value::from(self))
                    }
                }

                impl Operand<Option<$target>> for $source {
                    #[inline]
                    fn into_operand(self) -> OperandKind {
                        OperandKind::Value(Value::from(self))
                    }
                }
            )*

            impl IntoValue<Option<$target>> for Option<$target> {
                #[inline]
                fn into_value(self) -> Value {
                    Value::from(self)
                }
            }

            impl Operand<Option<$target>> for Option<$target> {
                #[inline]
                fn into_operand(self) -> OperandKind {
                    OperandKind::Value(Value::from(self))
                }
            }
        )*
    };
}

impl_operand! {
    i8 => [i8];
    i16 => [i16];
    i32 => [i32];
    i64 => [i64];
    isize => [isize];
    u8 => [u8];
    u16 => [u16];
    u32 => [u32];
    u64 => [u64];
    usize => [usize];
    f32 => [f32];
    f64 => [f64];
    bool => [bool];
    String => [String, &str, &String, CompactString];
    CompactString => [CompactString, &str, String];
    Vec<u8> => [Vec<u8>, &[u8]];
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item;

    fn operand<T, V: Operand<T>>(_field: Field<Item, T>, value: V) -> OperandKind {
        value.into_operand()
    }

    #[test]
    fn test_literals_follow_column_type() {
        let qty: Field<Item, i32> = Field::new("qty");
        let label: Field<Item, Option<String>> = Field::new("label");

        assert_eq!(operand(qty, 3), OperandKind::Value(Value::Integer(3)));
        assert_eq!(operand(label, "x"), OperandKind::Value(Value::from("x")));
        assert_eq!(operand(label, None::<String>), OperandKind::Value(Value::Null));
    }

    #[test]
    fn test_columns_as_operands() {
        let id: Field<Item, i64> = Field::new("id");
        let parent: Field<Item, Option<i64>> = Field::new("parent_id");

        assert_eq!(
            operand(parent, id),
            OperandKind::Field {
                owner: EntityType::of::<Item>(),
                member: "id",
                slot: None,
            }
        );
        assert!(matches!(operand(parent, id.at(0)), OperandKind::Field { slot: Some(0), .. }));
        assert!(matches!(operand(id, parent), OperandKind::Field { member: "parent_id", .. }));
    }
}
