//! Field-layout classification and the bit-width oracle.
//!
//! A field's wire shape is exactly one of three kinds:
//! a blittable primitive, an integer-backed enum, or a single-level
//! composite with an externally supplied codec. This module defines the
//! traits that make each kind concrete on the Rust side, plus the one
//! piece of arithmetic the whole crate hinges on: `bits_for_enum`.

use std::{error, fmt};

use crate::bits::{BitReader, BitWriter};

/// Fatal, build-time layout violations. Most of the field-count check is
/// instead enforced by a `const` assertion inside `data_struct!`, which is a
/// true compile error; this type exists for the handful of checks that
/// can only be made once field values are in hand (e.g. an enum
/// reporting zero variants at a call site that assumed otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// A record declared more than 32 fields.
    TooManyFields { field_count: u32 },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyFields { field_count } => {
                write!(f, "record has {field_count} fields, maximum is 32")
            }
        }
    }
}

impl error::Error for BuildError {}

/// Checks the `1 ≤ N ≤ 32` field-count bound. `data_struct!`
/// calls this from a `const` context for fields it lays out, but it is
/// also exposed for hosts building layouts dynamically (e.g. from a
/// side-file registry instead of a macro).
pub const fn check_field_count(field_count: u32) -> Result<(), BuildError> {
    if field_count > 32 {
        Err(BuildError::TooManyFields { field_count })
    } else {
        Ok(())
    }
}

/// Replication role a record is tagged with.
/// `ShortLivedEvent` records still receive a type-id but are not placed
/// in any of the three `ids_by_role` buckets — only `Predicted`, `Ghost`,
/// and `Input` are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Predicted,
    Ghost,
    Input,
    ShortLivedEvent,
}

/// `f(V) = 0` if `V == 0`, else `1` if `V == 1`, else `⌈log₂ V⌉`.
#[must_use]
pub const fn bits_for_enum(variant_count: u32) -> u32 {
    match variant_count {
        0 => 0,
        1 => 1,
        v => {
            // ⌈log2 v⌉ for v > 1: the position of the highest set bit of
            // (v - 1), plus one.
            32 - (v - 1).leading_zeros()
        }
    }
}

/// A blittable primitive field.
///
/// `u64`/`i64` are not forbidden: they split into two 32-bit halves on
/// the wire (high word first, then low word), since the rest of this
/// crate's bit port only ever reads or writes up to 32 bits at a time.
pub trait WirePrimitive: Copy + PartialEq + Default {
    /// Exact wire width for this primitive.
    const WIDTH: u32;

    fn write_wire(self, writer: &mut dyn BitWriter);
    fn read_wire(reader: &mut dyn BitReader) -> Self;
}

impl WirePrimitive for bool {
    const WIDTH: u32 = 1;

    fn write_wire(self, writer: &mut dyn BitWriter) {
        // Normalize truthy to exactly 1 before writing.
        writer.write_bits(u32::from(self), 1);
    }

    fn read_wire(reader: &mut dyn BitReader) -> Self {
        reader.read_bits(1) != 0
    }
}

macro_rules! impl_wire_primitive_narrow {
    ($ty:ty, $width:literal) => {
        impl WirePrimitive for $ty {
            const WIDTH: u32 = $width;

            fn write_wire(self, writer: &mut dyn BitWriter) {
                writer.write_bits(self as u32, $width);
            }

            fn read_wire(reader: &mut dyn BitReader) -> Self {
                // Reader zero-extends then bitcasts into the signed
                // destination.
                reader.read_bits($width) as Self
            }
        }
    };
}

impl_wire_primitive_narrow!(u8, 8);
impl_wire_primitive_narrow!(i8, 8);
impl_wire_primitive_narrow!(u16, 16);
impl_wire_primitive_narrow!(i16, 16);
impl_wire_primitive_narrow!(u32, 32);
impl_wire_primitive_narrow!(i32, 32);

macro_rules! impl_wire_primitive_wide {
    ($ty:ty, $unsigned:ty) => {
        impl WirePrimitive for $ty {
            const WIDTH: u32 = 64;

            fn write_wire(self, writer: &mut dyn BitWriter) {
                let bits = self as $unsigned;
                writer.write_bits((bits >> 32) as u32, 32);
                writer.write_bits(bits as u32, 32);
            }

            fn read_wire(reader: &mut dyn BitReader) -> Self {
                let high = u64::from(reader.read_bits(32));
                let low = u64::from(reader.read_bits(32));
                (((high << 32) | low) as $unsigned) as Self
            }
        }
    };
}

impl_wire_primitive_wide!(u64, u64);
impl_wire_primitive_wide!(i64, u64);

/// An integer-backed enum field. Implementors report
/// their variant count; `data_struct!` uses `bits_for_enum` on that
/// count to compute the field's wire width.
pub trait WireEnum: Copy + PartialEq {
    const VARIANT_COUNT: u32;

    fn to_wire(self) -> u32;
    fn from_wire(value: u32) -> Self;
}

/// Bit width a `WireEnum` occupies on the wire.
#[must_use]
pub const fn wire_enum_width<E: WireEnum>() -> u32 {
    bits_for_enum(E::VARIANT_COUNT)
}

/// A single-level composite field.
///
/// The codec is "discovered" by the compiler resolving this bound at
/// the `data_struct!` call site — a missing `impl CompositeCodec for X`
/// is a compile error naming `X`.
///
/// `diff` needs to compare the composite's own primitive sub-fields one
/// by one, setting the owning field's bit on any mismatch — for a
/// composite whose own fields are all primitives (the only shape
/// single-level nesting allows), plain structural equality *is* that
/// comparison, so the bound is `PartialEq` rather than a bespoke method.
pub trait CompositeCodec: Sized + Clone + PartialEq + Default {
    fn write(writer: &mut dyn BitWriter, value: &Self);
    fn read(reader: &mut dyn BitReader) -> Self;
}

/// Implements `WireEnum` for a `num_enum`-backed enum in one line.
///
/// `$ty` must derive `num_enum::IntoPrimitive` and
/// `num_enum::TryFromPrimitive` over `$repr`, plus `Default` (typically
/// via `#[derive(Default)]` with `#[default]` on one variant) — that
/// combination is what lets `to_wire`/`from_wire` round-trip through a
/// plain integer without any hand-written `match`.
///
/// ```ignore
/// #[derive(Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
/// #[repr(u8)]
/// enum Ability {
///     #[default]
///     Idle = 0,
///     Running = 1,
/// }
/// wire_enum!(Ability, u8, 2);
/// ```
#[macro_export]
macro_rules! wire_enum {
    ($ty:ty, $repr:ty, $variant_count:expr) => {
        impl $crate::layout::WireEnum for $ty {
            const VARIANT_COUNT: u32 = $variant_count;

            fn to_wire(self) -> u32 {
                <$repr as ::core::convert::From<$ty>>::from(self) as u32
            }

            fn from_wire(value: u32) -> Self {
                <$ty as ::core::convert::TryFrom<$repr>>::try_from(value as $repr)
                    .unwrap_or_default()
            }
        }
    };
}
