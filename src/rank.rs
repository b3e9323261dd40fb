//! rank.rs — report ordering and the item cap.

use crate::report::Signal;

/// Authority items strictly before velocity items; within each group by
/// `primary_metric` descending. Equal keys keep their input order.
pub fn rank(signals: &mut [Signal]) {
    signals.sort_by(|a, b| {
        a.signal_type
            .cmp(&b.signal_type)
            .then_with(|| b.candidate.primary_metric.cmp(&a.candidate.primary_metric))
    });
}

/// Rank and keep the first `cap` items. Returns the slice to report and the
/// untruncated count.
pub fn rank_and_truncate(mut signals: Vec<Signal>, cap: usize) -> (Vec<Signal>, usize) {
    let total = signals.len();
    rank(&mut signals);
    signals.truncate(cap);
    (signals, total)
}
