//! The dispatch driver.
//!
//! Three stateless entry points that decode `(entity_id, data_type_id)`
//! pairs off the wire and route to the generated per-type routine
//! through the `Registry`'s switch tables. An unknown `data_type_id` is
//! a silent no-op: no bits are read and nothing is called, beyond a
//! `debug`-level log line (see `Registry::dispatch_new` and friends).

use crate::bits::BitReader;
use crate::receiver::Receiver;
use crate::registry::Registry;

/// A brand-new instance arrived on the wire.
///
/// Reads exactly the bits the registered type's `deserialize_full`
/// consumes; reads nothing for an unknown `data_type_id`.
pub fn receive_new<R: Receiver>(
    reader: &mut dyn BitReader,
    entity_id: u32,
    data_type_id: u32,
    registry: &Registry<R>,
    receiver: &mut R,
) {
    registry.dispatch_new(reader, entity_id, data_type_id, receiver);
}

/// An update mask arrived on the wire.
///
/// Reads exactly the bits the registered type's `deserialize_mask_ref`
/// consumes; reads nothing for an unknown `data_type_id`.
pub fn receive_update<R: Receiver>(
    reader: &mut dyn BitReader,
    entity_id: u32,
    data_type_id: u32,
    registry: &Registry<R>,
    receiver: &mut R,
) {
    registry.dispatch_update(reader, entity_id, data_type_id, receiver);
}

/// A destroy notice arrived on the wire.
///
/// This is the three-argument form (`destroy_component<T>(entity_id)`);
/// a reader-carrying four-argument overload is left for a host to add
/// on top of this crate, not implemented here.
pub fn receive_destroy<R: Receiver>(
    entity_id: u32,
    data_type_id: u32,
    registry: &Registry<R>,
    receiver: &mut R,
) {
    registry.dispatch_destroy(entity_id, data_type_id, receiver);
}
