//! Type-id allocation, dispatch tables, and runtime registration.
//!
//! A `Registry<R>` is a process-wide, write-once structure: built once
//! (by repeated calls to `register::<T>()`, in discovery order) ahead
//! of any dispatch traffic, then read-only for the rest of the
//! process's life. `id_of[T]` becomes a `TypeId`-keyed map; per-type
//! serialize/deserialize/diff functions need no runtime slot at all,
//! because Rust's trait system already gives O(1) static dispatch to
//! `T::serialize_full` and friends — a trait bound already *is* a
//! generic slot indexed by type.
//!
//! What *does* need a runtime table is the part that is keyed by a
//! runtime integer rather than a compile-time type parameter: the
//! `new` / `update` / `destroy` switches dispatch.rs calls into.

use std::any::TypeId;
use std::{error, fmt};

use crate::bits::BitReader;
use crate::layout::Role;
use crate::receiver::Receiver;
use crate::record::DataStruct;

/// Raised when the same record type is registered twice in one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitError {
    pub type_name: &'static str,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type `{}` was registered twice", self.type_name)
    }
}

impl error::Error for InitError {}

type DispatchWithReader<R> = fn(&mut dyn BitReader, u32, &mut R);
type DispatchWithoutReader<R> = fn(u32, &mut R);

fn dispatch_new<T: DataStruct, R: Receiver>(reader: &mut dyn BitReader, entity_id: u32, receiver: &mut R) {
    let value = T::deserialize_full(reader);
    receiver.receive_new::<T>(entity_id, value);
}

fn dispatch_update<T: DataStruct, R: Receiver>(reader: &mut dyn BitReader, entity_id: u32, receiver: &mut R) {
    let mut value = receiver.grab_or_create::<T>(entity_id);
    let mask = value.deserialize_mask_ref(reader);
    receiver.update::<T>(mask, entity_id, value);
}

fn dispatch_destroy<T: DataStruct, R: Receiver>(entity_id: u32, receiver: &mut R) {
    receiver.destroy_component::<T>(entity_id);
}

/// Role buckets: `Predicted`, `Ghost`, and `Input` each get a fixed
/// array of ids; `ShortLivedEvent` has no array of its own.
const ROLE_BUCKETS: usize = 3;

fn role_bucket(role: Role) -> Option<usize> {
    match role {
        Role::Predicted => Some(0),
        Role::Ghost => Some(1),
        Role::Input => Some(2),
        Role::ShortLivedEvent => None,
    }
}

/// Type-id allocator and dispatch tables for one receiver type `R`.
///
/// Built once, ahead of any traffic; after that, every method here is
/// a read.
pub struct Registry<R: Receiver> {
    id_of: std::collections::HashMap<TypeId, u16>,
    next_id: u16,
    ids_by_role: [Vec<u32>; ROLE_BUCKETS],
    switch_new: Vec<Option<DispatchWithReader<R>>>,
    switch_update: Vec<Option<DispatchWithReader<R>>>,
    switch_destroy: Vec<Option<DispatchWithoutReader<R>>>,
}

impl<R: Receiver> Default for Registry<R> {
    fn default() -> Self {
        Self {
            id_of: std::collections::HashMap::new(),
            next_id: 1,
            ids_by_role: [Vec::new(), Vec::new(), Vec::new()],
            switch_new: Vec::new(),
            switch_update: Vec::new(),
            switch_destroy: Vec::new(),
        }
    }
}

impl<R: Receiver> Registry<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a build closure once, at process start, to populate a fresh
    /// registry. A fresh `Registry` is built from scratch each call, so
    /// re-running `build` with the same closure is idempotent in effect
    /// even though a second `register::<T>()` call for the *same* type
    /// within one run is rejected.
    pub fn build(f: impl FnOnce(&mut Self) -> Result<(), InitError>) -> Result<Self, InitError> {
        let mut registry = Self::new();
        f(&mut registry)?;
        Ok(registry)
    }

    /// Assigns the next `u16` id (starting at 1, in call order) to `T`,
    /// places it in its role's bucket, and installs its `new` / `update`
    /// / `destroy` dispatch entries.
    pub fn register<T: DataStruct>(&mut self) -> Result<u16, InitError> {
        let type_id = TypeId::of::<T>();
        if self.id_of.contains_key(&type_id) {
            return Err(InitError {
                type_name: std::any::type_name::<T>(),
            });
        }

        let id = self.next_id;
        self.next_id = self
            .next_id
            .checked_add(1)
            .expect("exhausted u16 type-id space");
        self.id_of.insert(type_id, id);

        if let Some(bucket) = role_bucket(T::ROLE) {
            self.ids_by_role[bucket].push(u32::from(id));
        }

        let index = id as usize;
        if self.switch_new.len() <= index {
            self.switch_new.resize(index + 1, None);
            self.switch_update.resize(index + 1, None);
            self.switch_destroy.resize(index + 1, None);
        }
        self.switch_new[index] = Some(dispatch_new::<T, R>);
        self.switch_update[index] = Some(dispatch_update::<T, R>);
        self.switch_destroy[index] = Some(dispatch_destroy::<T, R>);

        log::debug!(
            "registered {} as id {} (role {:?})",
            std::any::type_name::<T>(),
            id,
            T::ROLE,
        );

        Ok(id)
    }

    /// `T`'s assigned type-id, stable for the lifetime of this `Registry`.
    #[must_use]
    pub fn id_of<T: 'static>(&self) -> Option<u16> {
        self.id_of.get(&TypeId::of::<T>()).copied()
    }

    /// One of the three `ids_by_role` arrays. Returns an empty slice for
    /// `ShortLivedEvent`, which has no bucket.
    #[must_use]
    pub fn ids_by_role(&self, role: Role) -> &[u32] {
        role_bucket(role).map_or(&[], |bucket| self.ids_by_role[bucket].as_slice())
    }

    pub(crate) fn dispatch_new(
        &self,
        reader: &mut dyn BitReader,
        entity_id: u32,
        data_type_id: u32,
        receiver: &mut R,
    ) {
        match self.switch_new.get(data_type_id as usize).and_then(|f| *f) {
            Some(f) => f(reader, entity_id, receiver),
            None => log::debug!("receive_new: unknown data_type_id {data_type_id}, ignored"),
        }
    }

    pub(crate) fn dispatch_update(
        &self,
        reader: &mut dyn BitReader,
        entity_id: u32,
        data_type_id: u32,
        receiver: &mut R,
    ) {
        match self.switch_update.get(data_type_id as usize).and_then(|f| *f) {
            Some(f) => f(reader, entity_id, receiver),
            None => log::debug!("receive_update: unknown data_type_id {data_type_id}, ignored"),
        }
    }

    pub(crate) fn dispatch_destroy(&self, entity_id: u32, data_type_id: u32, receiver: &mut R) {
        match self.switch_destroy.get(data_type_id as usize).and_then(|f| *f) {
            Some(f) => f(entity_id, receiver),
            None => log::debug!("receive_destroy: unknown data_type_id {data_type_id}, ignored"),
        }
    }
}

/// A once-initialized global `Registry<R>`, for hosts that want a
/// process-wide static instead of threading an owned `Registry<R>`
/// through their call stack.
pub struct GlobalRegistry<R: Receiver + 'static> {
    cell: std::sync::OnceLock<Registry<R>>,
}

impl<R: Receiver + 'static> GlobalRegistry<R> {
    pub const fn new() -> Self {
        Self {
            cell: std::sync::OnceLock::new(),
        }
    }

    /// Runs `f` exactly once for this process (subsequent calls are
    /// no-ops). Returns `false` if it had already been initialized.
    pub fn init(&self, f: impl FnOnce(&mut Registry<R>) -> Result<(), InitError>) -> bool {
        let mut set = false;
        let _ = self.cell.get_or_init(|| {
            set = true;
            Registry::build(f).expect("registry init failed")
        });
        set
    }

    #[must_use]
    pub fn get(&self) -> &Registry<R> {
        self.cell
            .get()
            .expect("GlobalRegistry used before init() was called")
    }
}
