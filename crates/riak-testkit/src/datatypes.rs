//! Simulated datatype storage
//!
//! Applies operation trees the way a Riak node would for a single replica.
//! Values carry a version that is bumped on every write; the opaque context
//! handed to clients is derived from it.

use riak_core::crdt::{FieldOp, FlagOp, MapOp};
use riak_core::{
    BinaryValue, CausalContext, CrdtElement, DtOp, FieldRef, FieldType, Location, RiakError,
    RiakResult,
};
use std::collections::{BTreeMap, BTreeSet};

/// Server-side value, with HLLs kept as their exact member set
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    Counter(i64),
    Set(BTreeSet<BinaryValue>),
    GSet(BTreeSet<BinaryValue>),
    Map(BTreeMap<FieldRef, StoredValue>),
    Register(BinaryValue),
    Flag(bool),
    Hll(BTreeSet<BinaryValue>),
}

impl StoredValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Counter(_) => "counter",
            Self::Set(_) => "set",
            Self::GSet(_) => "gset",
            Self::Map(_) => "map",
            Self::Register(_) => "register",
            Self::Flag(_) => "flag",
            Self::Hll(_) => "hll",
        }
    }

    fn empty_for(op: &DtOp) -> Self {
        match op {
            DtOp::Counter(_) => Self::Counter(0),
            DtOp::Set(_) => Self::Set(BTreeSet::new()),
            DtOp::GSet(_) => Self::GSet(BTreeSet::new()),
            DtOp::Map(_) => Self::Map(BTreeMap::new()),
            DtOp::Hll(_) => Self::Hll(BTreeSet::new()),
        }
    }

    fn empty_field(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Counter => Self::Counter(0),
            FieldType::Set => Self::Set(BTreeSet::new()),
            FieldType::Register => Self::Register(BinaryValue::default()),
            FieldType::Flag => Self::Flag(false),
            FieldType::Map => Self::Map(BTreeMap::new()),
        }
    }

    fn from_element(element: CrdtElement) -> Self {
        match element {
            CrdtElement::Counter(value) => Self::Counter(value),
            CrdtElement::Set(members) => Self::Set(members),
            CrdtElement::GSet(members) => Self::GSet(members),
            CrdtElement::Map(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(field, element)| (field, Self::from_element(element)))
                    .collect(),
            ),
            CrdtElement::Register(value) => Self::Register(value),
            CrdtElement::Flag(enabled) => Self::Flag(enabled),
            // Only the estimate is known; seed that many placeholder members.
            CrdtElement::Hll(cardinality) => Self::Hll(
                (0..cardinality)
                    .map(|i| BinaryValue::from(format!("__seed_{i}")))
                    .collect(),
            ),
        }
    }

    fn to_element(&self) -> CrdtElement {
        match self {
            Self::Counter(value) => CrdtElement::Counter(*value),
            Self::Set(members) => CrdtElement::Set(members.clone()),
            Self::GSet(members) => CrdtElement::GSet(members.clone()),
            Self::Map(entries) => CrdtElement::Map(
                entries
                    .iter()
                    .map(|(field, value)| (field.clone(), value.to_element()))
                    .collect(),
            ),
            Self::Register(value) => CrdtElement::Register(value.clone()),
            Self::Flag(enabled) => CrdtElement::Flag(*enabled),
            Self::Hll(members) => CrdtElement::Hll(members.len() as u64),
        }
    }

    fn apply(&mut self, op: &DtOp) -> RiakResult<()> {
        match (self, op) {
            (Self::Counter(value), DtOp::Counter(op)) => {
                *value = value.wrapping_add(op.delta);
            }
            (Self::Set(members), DtOp::Set(op)) => {
                apply_set(members, &op.adds, &op.removes);
            }
            (Self::GSet(members), DtOp::GSet(op)) => {
                members.extend(op.adds.iter().cloned());
            }
            (Self::Hll(members), DtOp::Hll(op)) => {
                members.extend(op.adds.iter().cloned());
            }
            (Self::Map(entries), DtOp::Map(op)) => apply_map(entries, op)?,
            (current, op) => {
                return Err(RiakError::mismatch(current.type_name(), op.type_name()));
            }
        }
        Ok(())
    }
}

// Removes first, so an element both added and removed ends up present.
fn apply_set(
    members: &mut BTreeSet<BinaryValue>,
    adds: &BTreeSet<BinaryValue>,
    removes: &BTreeSet<BinaryValue>,
) {
    for value in removes {
        members.remove(value);
    }
    members.extend(adds.iter().cloned());
}

fn apply_map(entries: &mut BTreeMap<FieldRef, StoredValue>, op: &MapOp) -> RiakResult<()> {
    for field in &op.removes {
        entries.remove(field);
    }
    for update in &op.updates {
        let value = entries
            .entry(update.field.clone())
            .or_insert_with(|| StoredValue::empty_field(update.field.field_type));
        apply_field(value, &update.op)?;
    }
    Ok(())
}

fn apply_field(value: &mut StoredValue, op: &FieldOp) -> RiakResult<()> {
    match (value, op) {
        (StoredValue::Counter(current), FieldOp::Counter(op)) => {
            *current = current.wrapping_add(op.delta);
        }
        (StoredValue::Set(members), FieldOp::Set(op)) => {
            apply_set(members, &op.adds, &op.removes);
        }
        (StoredValue::Register(current), FieldOp::Register(op)) => {
            *current = op.0.clone();
        }
        (StoredValue::Flag(current), FieldOp::Flag(op)) => {
            *current = matches!(op, FlagOp::Enable);
        }
        (StoredValue::Map(entries), FieldOp::Map(op)) => apply_map(entries, op)?,
        (current, op) => {
            return Err(RiakError::mismatch(
                current.type_name(),
                op.field_type().as_str(),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct StoredDatatype {
    value: StoredValue,
    version: u64,
}

/// Datatype values keyed by location
#[derive(Debug, Default)]
pub struct DatatypeStore {
    objects: BTreeMap<Location, StoredDatatype>,
}

impl DatatypeStore {
    /// Current value and context of an object
    pub fn fetch(&self, location: &Location) -> Option<(CrdtElement, CausalContext)> {
        self.objects
            .get(location)
            .map(|stored| (stored.value.to_element(), context_for(location, stored.version)))
    }

    /// Apply an operation, creating the object if needed
    pub fn apply(
        &mut self,
        location: &Location,
        op: &DtOp,
    ) -> RiakResult<(CrdtElement, CausalContext)> {
        let mut stored = self
            .objects
            .get(location)
            .cloned()
            .unwrap_or_else(|| StoredDatatype {
                value: StoredValue::empty_for(op),
                version: 0,
            });
        // Applied to a copy so a failed op leaves the stored value untouched.
        stored.value.apply(op)?;
        stored.version += 1;
        let result = (stored.value.to_element(), context_for(location, stored.version));
        self.objects.insert(location.clone(), stored);
        Ok(result)
    }

    /// Replace an object's value outright
    pub fn put(&mut self, location: Location, element: CrdtElement) {
        let version = self.objects.get(&location).map_or(1, |stored| stored.version + 1);
        self.objects.insert(
            location,
            StoredDatatype {
                value: StoredValue::from_element(element),
                version,
            },
        );
    }

    /// Keys stored under each location, for `$bucket`/`$key` queries
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.objects.keys()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn context_for(location: &Location, version: u64) -> CausalContext {
    CausalContext::new(format!(
        "{}/{}@{version}",
        location.namespace(),
        location.key()
    ))
}
