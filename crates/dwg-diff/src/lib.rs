//! Comparison of two extracted label sets.
//!
//! Two independent analyses share the [`dwg_label::TextLabel`] input:
//!
//! * [`diff`] — bucket labels by tolerance-quantized position and
//!   reconcile old/new multisets per bucket into unchanged, changed,
//!   added and removed records.
//! * [`offset`] — pair common labels across the two sets, cluster their
//!   positional deltas and detect a dominant global shift, which lets a
//!   reviewer tell a re-based origin apart from real content changes.
//!
//! Both are pure functions of their inputs; nothing is cached across
//! calls and empty inputs are valid, information-bearing cases.

pub mod diff;
pub mod offset;

pub use diff::{ChangeRecord, LabelDiff, UnchangedEntry, diff_labels, translate};
pub use offset::{
    DOMINANT_SHARE_THRESHOLD, DominantShift, OffsetCluster, OffsetReport, OffsetSample,
    analyze_offsets, cluster_samples, collect_samples,
};
