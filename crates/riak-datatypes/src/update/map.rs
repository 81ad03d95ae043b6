use super::{DatatypeUpdate, FieldUpdate};
use riak_core::crdt::{FieldRef, FieldType, MapOp};
use riak_core::BinaryValue;
use std::collections::{BTreeMap, BTreeSet};

/// Map update
///
/// Fields are identified by (name, type). Updating the same pair twice
/// replaces the earlier update; updating the same name with a different type
/// addresses a different field. Removing and updating the same field in one
/// request is allowed and passed through unchanged.
///
/// ```
/// use riak_datatypes::update::{CounterUpdate, MapUpdate, SetUpdate};
///
/// let update = MapUpdate::new()
///     .update("logins", CounterUpdate::new(1))
///     .update("cart", SetUpdate::new().add("apple"));
/// assert_eq!(update.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapUpdate {
    removes: BTreeSet<FieldRef>,
    updates: BTreeMap<FieldRef, FieldUpdate>,
}

impl MapUpdate {
    /// An empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the update for the field `(name, type of update)`
    pub fn update(mut self, name: impl Into<BinaryValue>, update: impl Into<FieldUpdate>) -> Self {
        let update = update.into();
        let field = FieldRef::new(name, update.field_type());
        self.updates.insert(field, update);
        self
    }

    /// Remove a field of any type
    pub fn remove(mut self, name: impl Into<BinaryValue>, field_type: FieldType) -> Self {
        self.removes.insert(FieldRef::new(name, field_type));
        self
    }

    /// Remove a counter field
    pub fn remove_counter(self, name: impl Into<BinaryValue>) -> Self {
        self.remove(name, FieldType::Counter)
    }

    /// Remove a set field
    pub fn remove_set(self, name: impl Into<BinaryValue>) -> Self {
        self.remove(name, FieldType::Set)
    }

    /// Remove a register field
    pub fn remove_register(self, name: impl Into<BinaryValue>) -> Self {
        self.remove(name, FieldType::Register)
    }

    /// Remove a flag field
    pub fn remove_flag(self, name: impl Into<BinaryValue>) -> Self {
        self.remove(name, FieldType::Flag)
    }

    /// Remove a nested map field
    pub fn remove_map(self, name: impl Into<BinaryValue>) -> Self {
        self.remove(name, FieldType::Map)
    }

    /// The pending update for a field, if any
    pub fn field_update(&self, field: &FieldRef) -> Option<&FieldUpdate> {
        self.updates.get(field)
    }

    /// Fields scheduled for removal
    pub fn removes(&self) -> &BTreeSet<FieldRef> {
        &self.removes
    }

    /// Field updates keyed by field identity
    pub fn updates(&self) -> &BTreeMap<FieldRef, FieldUpdate> {
        &self.updates
    }

    /// Number of field updates
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Whether the update neither updates nor removes anything
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.removes.is_empty()
    }
}

impl DatatypeUpdate for MapUpdate {
    type Op = MapOp;

    fn to_op(&self) -> MapOp {
        let mut op = MapOp {
            removes: self.removes.clone(),
            ..MapOp::default()
        };
        for (field, update) in &self.updates {
            op = op.update(field.clone(), update.to_op());
        }
        op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::{CounterUpdate, FlagUpdate, RegisterUpdate, SetUpdate};
    use riak_core::crdt::{CounterOp, FieldOp, RegisterOp};

    #[test]
    fn same_name_different_type_are_distinct_fields() {
        let op = MapUpdate::new()
            .update("x", CounterUpdate::new(1))
            .update("x", RegisterUpdate::new("v"))
            .to_op();

        assert_eq!(op.updates.len(), 2);
        let counter = FieldRef::new("x", FieldType::Counter);
        let register = FieldRef::new("x", FieldType::Register);
        assert_eq!(
            op.updates_for(&counter).collect::<Vec<_>>(),
            vec![&FieldOp::Counter(CounterOp { delta: 1 })]
        );
        assert_eq!(
            op.updates_for(&register).collect::<Vec<_>>(),
            vec![&FieldOp::Register(RegisterOp("v".into()))]
        );
    }

    #[test]
    fn repeated_update_of_same_field_replaces() {
        let update = MapUpdate::new()
            .update("logins", CounterUpdate::new(1))
            .update("logins", CounterUpdate::new(5));
        let field = FieldRef::new("logins", FieldType::Counter);

        assert_eq!(update.len(), 1);
        assert_eq!(
            update.field_update(&field),
            Some(&FieldUpdate::Counter(CounterUpdate::new(5)))
        );
    }

    #[test]
    fn nested_maps_compile_recursively() {
        let op = MapUpdate::new()
            .update(
                "profile",
                MapUpdate::new()
                    .update("verified", FlagUpdate::new(true))
                    .remove_set("tags"),
            )
            .to_op();

        let profile = FieldRef::new("profile", FieldType::Map);
        let nested = match op.updates_for(&profile).next() {
            Some(FieldOp::Map(nested)) => nested.clone(),
            other => panic!("expected nested map op, got {other:?}"),
        };
        assert!(nested.removes.contains(&FieldRef::new("tags", FieldType::Set)));
        assert_eq!(nested.updates.len(), 1);
    }

    #[test]
    fn remove_and_update_same_field_pass_through() {
        let op = MapUpdate::new()
            .remove_set("cart")
            .update("cart", SetUpdate::new().add("pear"))
            .to_op();
        let cart = FieldRef::new("cart", FieldType::Set);
        assert!(op.removes.contains(&cart));
        assert_eq!(op.updates_for(&cart).count(), 1);
    }
}
