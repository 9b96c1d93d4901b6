//! Code generator for bit-level serialization of fixed-layout
//! replication records ("data structs").
//!
//! A record declares a small, ordered set of fields and one of four
//! replication roles (`Predicted`, `Ghost`, `Input`, `ShortLivedEvent`).
//! `data_struct!` expands a tagged field list into six routines —
//! `serialize_full`, `serialize_mask`, `deserialize_full`,
//! `deserialize_full_ref`, `deserialize_mask_ref`, and `diff` — over a
//! bit-level port (`bits::BitReader` / `bits::BitWriter`). A
//! `registry::Registry<R>` assigns each record a stable `u16` type-id in
//! discovery order and builds the `new` / `update` / `destroy` switch
//! tables `dispatch` routes wire messages through, forwarding to a
//! host-supplied `receiver::Receiver`.

pub mod bits;
pub mod dispatch;
pub mod layout;
pub mod receiver;
pub mod record;
pub mod registry;

pub use bits::{BitReader, BitWriter, BufBitReader, BufBitWriter};
pub use layout::{bits_for_enum, CompositeCodec, Role, WireEnum, WirePrimitive};
pub use receiver::Receiver;
pub use record::DataStruct;
pub use registry::{GlobalRegistry, InitError, Registry};
