#![macro_use]

use crate::types::Error;
use crate::types::Result;
use byteorder::LittleEndian;
use num_traits::FromPrimitive;
use zerocopy::U32;

/// Converts a raw on-disk field into the user-visible type.  FIELD is
/// only used for error reporting.
pub(crate) trait Getter<T> {
    fn get1(self, field: &'static str) -> T;
}
impl<T: FromPrimitive> Getter<Result<T>> for U32<LittleEndian> {
    fn get1(self, field: &'static str) -> Result<T> {
        let value = self.get();
        T::from_u32(value).ok_or(Error::InvalidField { field, value })
    }
}
impl<T: FromPrimitive> Getter<Result<T>> for u8 {
    fn get1(self, field: &'static str) -> Result<T> {
        T::from_u8(self).ok_or(Error::InvalidField { field, value: self.into() })
    }
}
impl<const N: usize> Getter<Result<[u8; N]>> for [u8; N] {
    fn get1(self, _field: &'static str) -> Result<[u8; N]> {
        Ok(self)
    }
}

pub(crate) trait Setter<T> {
    fn set1(&mut self, value: T);
}
impl Setter<u32> for U32<LittleEndian> {
    fn set1(&mut self, value: u32) {
        self.set(value)
    }
}
impl Setter<u8> for u8 {
    fn set1(&mut self, value: u8) {
        *self = value
    }
}
impl<const N: usize> Setter<[u8; N]> for [u8; N] {
    fn set1(&mut self, value: [u8; N]) {
        *self = value
    }
}

/// Defines the struct and, for each field marked with "get" (and "set"),
/// a getter returning Result (and a setter as well as a builder-style
/// "with_" function).
/// Field syntax:   NAME: TYPE [: pub get TYPE [: pub set TYPE]]
macro_rules! make_accessors {(
    $(#[$struct_meta:meta])*
    $struct_vis:vis
    struct $StructName:ident {
        $(
            $(#[$field_meta:meta])*
            $field_vis:vis
            $field_name:ident : $field_ty:ty $(: $getter_vis:vis get $field_user_ty:ty $(: $setter_vis:vis set $field_setter_user_ty:ty)?)?
        ),* $(,)?
    }
) => (
    $(#[$struct_meta])*
    $struct_vis
    struct $StructName {
        $(
            $(#[$field_meta])*
            $field_vis
            $field_name: $field_ty,
        )*
    }

    impl $StructName {
        $($(
            #[inline]
            $getter_vis
            fn $field_name(self: &'_ Self)
                -> $crate::types::Result<$field_user_ty>
            {
                self.$field_name.get1(concat!(
                    stringify!($StructName),
                    "::",
                    stringify!($field_name)
                ))
            }
            $(
              ::paste::paste! {
                  #[inline]
                  $setter_vis
                  fn [<set_ $field_name>](self: &'_ mut Self, value: $field_setter_user_ty)
                  {
                      self.$field_name.set1(value)
                  }
                  #[inline]
                  #[must_use]
                  $setter_vis
                  fn [<with_ $field_name>](mut self: Self, value: $field_setter_user_ty) -> Self
                  {
                      self.[<set_ $field_name>](value);
                      self
                  }
              }
            )?
        )?)*
    }
)}

pub(crate) use make_accessors;
