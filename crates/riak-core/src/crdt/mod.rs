//! CRDT wire model
//!
//! The operation tree sent to the server on update, and the element tagged
//! union the server returns on fetch or return-body.

pub mod element;
pub mod ops;

pub use element::{CrdtElement, FieldRef, FieldType};
pub use ops::{
    CounterOp, DtOp, FieldOp, FlagOp, GSetOp, HllOp, MapFieldOp, MapOp, RegisterOp, SetOp,
};
