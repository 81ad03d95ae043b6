//! Command options
//!
//! Closed option sets for the datatype commands. Each option carries its own
//! value and is keyed by a fieldless kind, so setting the same option twice
//! keeps the last value. Options that are never set are left out of the
//! request entirely.

use riak_core::{DtFetchRequest, DtUpdateRequest, Quorum};
use std::collections::BTreeMap;
use std::time::Duration;

/// Identity of a fetch option
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FetchOptionKind {
    /// Read quorum
    R,
    /// Primary read quorum
    Pr,
    /// Basic quorum
    BasicQuorum,
    /// Not-found-ok
    NotFoundOk,
    /// Server-side timeout
    Timeout,
    /// Sloppy quorum
    SloppyQuorum,
    /// Replica count
    NVal,
    /// Include causal context
    IncludeContext,
}

/// Fetch option with its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOption {
    /// Read quorum
    R(Quorum),
    /// Primary read quorum
    Pr(Quorum),
    /// Return early once a quorum of not-found answers is reached
    BasicQuorum(bool),
    /// Treat not-found as a successful read
    NotFoundOk(bool),
    /// Server-side timeout
    Timeout(Duration),
    /// Allow fallback replicas
    SloppyQuorum(bool),
    /// Replica count
    NVal(u32),
    /// Return the causal context with the value
    IncludeContext(bool),
}

impl FetchOption {
    /// The option's identity
    pub fn kind(&self) -> FetchOptionKind {
        match self {
            Self::R(_) => FetchOptionKind::R,
            Self::Pr(_) => FetchOptionKind::Pr,
            Self::BasicQuorum(_) => FetchOptionKind::BasicQuorum,
            Self::NotFoundOk(_) => FetchOptionKind::NotFoundOk,
            Self::Timeout(_) => FetchOptionKind::Timeout,
            Self::SloppyQuorum(_) => FetchOptionKind::SloppyQuorum,
            Self::NVal(_) => FetchOptionKind::NVal,
            Self::IncludeContext(_) => FetchOptionKind::IncludeContext,
        }
    }

    fn apply(self, request: &mut DtFetchRequest) {
        match self {
            Self::R(q) => request.r = Some(q),
            Self::Pr(q) => request.pr = Some(q),
            Self::BasicQuorum(v) => request.basic_quorum = Some(v),
            Self::NotFoundOk(v) => request.notfound_ok = Some(v),
            Self::Timeout(t) => request.timeout = Some(t),
            Self::SloppyQuorum(v) => request.sloppy_quorum = Some(v),
            Self::NVal(n) => request.n_val = Some(n),
            Self::IncludeContext(v) => request.include_context = Some(v),
        }
    }
}

/// Identity of an update option
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UpdateOptionKind {
    /// Durable write quorum
    Dw,
    /// Replica count
    NVal,
    /// Primary write quorum
    Pw,
    /// Return body
    ReturnBody,
    /// Sloppy quorum
    SloppyQuorum,
    /// Server-side timeout
    Timeout,
    /// Write quorum
    W,
}

/// Update option with its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOption {
    /// Durable write quorum
    Dw(Quorum),
    /// Replica count
    NVal(u32),
    /// Primary write quorum
    Pw(Quorum),
    /// Return the merged value
    ReturnBody(bool),
    /// Allow fallback replicas
    SloppyQuorum(bool),
    /// Server-side timeout
    Timeout(Duration),
    /// Write quorum
    W(Quorum),
}

impl UpdateOption {
    /// The option's identity
    pub fn kind(&self) -> UpdateOptionKind {
        match self {
            Self::Dw(_) => UpdateOptionKind::Dw,
            Self::NVal(_) => UpdateOptionKind::NVal,
            Self::Pw(_) => UpdateOptionKind::Pw,
            Self::ReturnBody(_) => UpdateOptionKind::ReturnBody,
            Self::SloppyQuorum(_) => UpdateOptionKind::SloppyQuorum,
            Self::Timeout(_) => UpdateOptionKind::Timeout,
            Self::W(_) => UpdateOptionKind::W,
        }
    }

    fn apply(self, request: &mut DtUpdateRequest) {
        match self {
            Self::Dw(q) => request.dw = Some(q),
            Self::NVal(n) => request.n_val = Some(n),
            Self::Pw(q) => request.pw = Some(q),
            Self::ReturnBody(v) => request.return_body = Some(v),
            Self::SloppyQuorum(v) => request.sloppy_quorum = Some(v),
            Self::Timeout(t) => request.timeout = Some(t),
            Self::W(q) => request.w = Some(q),
        }
    }
}

/// Accumulated fetch options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions(BTreeMap<FetchOptionKind, FetchOption>);

impl FetchOptions {
    /// Set an option, replacing any earlier value of the same kind
    pub fn set(&mut self, option: FetchOption) {
        self.0.insert(option.kind(), option);
    }

    /// Value of an option, if set
    pub fn get(&self, kind: FetchOptionKind) -> Option<&FetchOption> {
        self.0.get(&kind)
    }

    /// Number of options set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no option is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn apply_to(&self, request: &mut DtFetchRequest) {
        for option in self.0.values() {
            option.apply(request);
        }
    }
}

/// Accumulated update options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions(BTreeMap<UpdateOptionKind, UpdateOption>);

impl UpdateOptions {
    /// Set an option, replacing any earlier value of the same kind
    pub fn set(&mut self, option: UpdateOption) {
        self.0.insert(option.kind(), option);
    }

    /// Value of an option, if set
    pub fn get(&self, kind: UpdateOptionKind) -> Option<&UpdateOption> {
        self.0.get(&kind)
    }

    /// Whether the merged value was requested
    pub fn return_body(&self) -> bool {
        matches!(self.get(UpdateOptionKind::ReturnBody), Some(UpdateOption::ReturnBody(true)))
    }

    /// Number of options set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no option is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn apply_to(&self, request: &mut DtUpdateRequest) {
        for option in self.0.values() {
            option.apply(request);
        }
    }
}
