//! The per-record bit codec — the heart of the crate.
//!
//! `DataStruct` is the trait every generated record implements, covering
//! full serialize/deserialize, masked serialize/deserialize, and diff.
//!
//! `data_struct!` is the code generator itself: given a struct body
//! tagged per-field with its wire kind (`primitive`, `enum`, or
//! `composite`) and a replication role, it expands to the struct
//! definition plus an `impl DataStruct` block implementing every routine
//! and its edge cases as ordinary functions, with no reflection or
//! runtime field walk involved.

use crate::bits::{BitReader, BitWriter};
use crate::layout::Role;

/// Implemented by every generated record. `FIELD_COUNT` is the
/// declared field count `N` (`1 ≤ N ≤ 32`, checked at macro-expansion
/// time by a `const` assertion); `ROLE` is the tag assigned at the
/// `data_struct!` call site and consumed by `registry::Registry::register`.
pub trait DataStruct: Sized + Clone + Default + PartialEq + 'static {
    const FIELD_COUNT: u32;
    const ROLE: Role;

    /// Write every field in declaration order.
    fn serialize_full(&self, writer: &mut dyn BitWriter);

    /// Write the mask-selected subset of fields.
    fn serialize_mask(&self, writer: &mut dyn BitWriter, mask: u32);

    /// Read every field in declaration order into a fresh value.
    fn deserialize_full(reader: &mut dyn BitReader) -> Self;

    /// Same as `deserialize_full`, but stores into a borrowed target.
    fn deserialize_full_ref(&mut self, reader: &mut dyn BitReader);

    /// Read the mask prefix (if any) and the fields it selects into a
    /// borrowed target, returning the mask that was read.
    fn deserialize_mask_ref(&mut self, reader: &mut dyn BitReader) -> u32;

    /// Bit `i` set iff `a`'s field `i` differs from `b`'s.
    fn diff(a: &Self, b: &Self) -> u32;
}

/// Per-field write dispatch, keyed by the literal `primitive` / `enum` /
/// `composite` token forwarded from `data_struct!`. Kept as a separate
/// macro so `data_struct!` itself stays readable.
#[doc(hidden)]
#[macro_export]
macro_rules! __bitrecord_field_write {
    (primitive, $field_ty:ty, $self:ident, $field:ident, $writer:expr) => {
        $crate::layout::WirePrimitive::write_wire($self.$field, $writer)
    };
    (enum, $field_ty:ty, $self:ident, $field:ident, $writer:expr) => {{
        let __width = $crate::layout::wire_enum_width::<$field_ty>();
        $writer.write_bits($crate::layout::WireEnum::to_wire($self.$field), __width);
    }};
    (composite, $field_ty:ty, $self:ident, $field:ident, $writer:expr) => {
        <$field_ty as $crate::layout::CompositeCodec>::write($writer, &$self.$field)
    };
}

/// Per-field read dispatch, the read-side counterpart of
/// `__bitrecord_field_write`.
#[doc(hidden)]
#[macro_export]
macro_rules! __bitrecord_field_read {
    (primitive, $field_ty:ty, $reader:expr) => {
        <$field_ty as $crate::layout::WirePrimitive>::read_wire($reader)
    };
    (enum, $field_ty:ty, $reader:expr) => {{
        let __width = $crate::layout::wire_enum_width::<$field_ty>();
        <$field_ty as $crate::layout::WireEnum>::from_wire($reader.read_bits(__width))
    }};
    (composite, $field_ty:ty, $reader:expr) => {
        <$field_ty as $crate::layout::CompositeCodec>::read($reader)
    };
}

/// Generates a record type and its full `DataStruct` implementation.
/// See the module doc for the shape this expands to.
///
/// ```ignore
/// data_struct! {
///     role Predicted;
///     pub struct PlayerPosition {
///         pub counter: i32 as primitive,
///         pub ability: Ability as enum,
///         pub position: Position as composite,
///     }
/// }
/// ```
///
/// Every field type must implement the trait matching its declared
/// kind (`WirePrimitive`, `WireEnum`, or `CompositeCodec`), plus
/// `Default` (all three trait bounds already require it transitively)
/// so the generated struct can derive `Default`.
#[macro_export]
macro_rules! data_struct {
    (
        role $role:ident;
        $(#[$struct_meta:meta])*
        $svis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $fvis:vis $field:ident : $field_ty:ty as $kind:ident
            ),* $(,)?
        }
    ) => {
        $(#[$struct_meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        $svis struct $name {
            $(
                $(#[$field_meta])*
                $fvis $field: $field_ty,
            )*
        }

        // Compile-time enforcement of the `1 <= N <= 32` field-count bound —
        // a true build error, not a runtime `Result`. Anonymous `const _`
        // items are evaluated unconditionally, unlike named-but-unused
        // consts, which is why this isn't folded into an inherent impl.
        const _: () = {
            let count = <$name as $crate::record::DataStruct>::FIELD_COUNT;
            assert!(count <= 32, "data_struct record exceeds 32 fields");
        };

        impl $crate::record::DataStruct for $name {
            const FIELD_COUNT: u32 = {
                let fields: &[()] = &[$( $crate::data_struct!(@unit $field) ),*];
                fields.len() as u32
            };
            const ROLE: $crate::layout::Role = $crate::layout::Role::$role;

            fn serialize_full(&self, writer: &mut dyn $crate::bits::BitWriter) {
                $(
                    $crate::__bitrecord_field_write!($kind, $field_ty, self, $field, writer);
                )*
            }

            fn serialize_mask(&self, writer: &mut dyn $crate::bits::BitWriter, mask: u32) {
                const N: u32 = <$name as $crate::record::DataStruct>::FIELD_COUNT;
                if N > 1 {
                    writer.write_bits(mask, N);
                }
                #[allow(unused_mut, unused_variables)]
                let mut __bit: u32 = 0;
                $(
                    {
                        let __present = N <= 1 || (mask >> __bit) & 1 == 1;
                        if __present {
                            $crate::__bitrecord_field_write!($kind, $field_ty, self, $field, writer);
                        }
                        __bit += 1;
                    }
                )*
            }

            fn deserialize_full(reader: &mut dyn $crate::bits::BitReader) -> Self {
                Self {
                    $(
                        $field: $crate::__bitrecord_field_read!($kind, $field_ty, reader),
                    )*
                }
            }

            fn deserialize_full_ref(&mut self, reader: &mut dyn $crate::bits::BitReader) {
                *self = <Self as $crate::record::DataStruct>::deserialize_full(reader);
            }

            fn deserialize_mask_ref(&mut self, reader: &mut dyn $crate::bits::BitReader) -> u32 {
                const N: u32 = <$name as $crate::record::DataStruct>::FIELD_COUNT;
                let mask: u32 = if N > 1 {
                    reader.read_bits(N)
                } else if N == 1 {
                    1
                } else {
                    0
                };
                #[allow(unused_mut, unused_variables)]
                let mut __bit: u32 = 0;
                $(
                    {
                        if (mask >> __bit) & 1 == 1 {
                            self.$field = $crate::__bitrecord_field_read!($kind, $field_ty, reader);
                        }
                        __bit += 1;
                    }
                )*
                mask
            }

            fn diff(a: &Self, b: &Self) -> u32 {
                #[allow(unused_mut, unused_variables)]
                let mut __bit: u32 = 0;
                #[allow(unused_mut)]
                let mut __mask: u32 = 0;
                $(
                    {
                        if a.$field != b.$field {
                            __mask |= 1 << __bit;
                        }
                        __bit += 1;
                    }
                )*
                __mask
            }
        }
    };

    // Turns a captured field-name token into a zero-sized array element,
    // purely to drive `$(...)* ` repetition for a field count.
    (@unit $field:ident) => {
        ()
    };
}
