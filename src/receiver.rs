//! The receiver abstraction — the user-supplied sink for dispatched
//! `new` / `update` / `destroy` messages.
//!
//! The engine never owns instance storage; the receiver does, keyed by
//! `entity_id`. This trait has generic methods rather than being made
//! into a trait object: that keeps every per-type dispatch call
//! statically monomorphized, since the steady-state path is meant to
//! stay synchronous and wait-free, which rules out the extra
//! indirection a `dyn Receiver` would need for its generic methods.

use crate::record::DataStruct;

/// Owns instance storage for every `DataStruct` type, keyed by
/// `entity_id`. Implemented once by the host application.
pub trait Receiver {
    /// A brand-new instance arrived.
    fn receive_new<T: DataStruct>(&mut self, entity_id: u32, value: T);

    /// An update mask arrived for an existing (or freshly defaulted)
    /// instance. `mask` has the same bit layout `deserialize_mask_ref`
    /// returns.
    fn update<T: DataStruct>(&mut self, mask: u32, entity_id: u32, value: T);

    /// Returns the existing instance for `entity_id`, or a freshly
    /// default-initialized one if none exists yet.
    fn grab_or_create<T: DataStruct>(&mut self, entity_id: u32) -> T;

    /// The instance for `entity_id` was destroyed.
    fn destroy_component<T: DataStruct>(&mut self, entity_id: u32);
}
