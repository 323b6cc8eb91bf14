//! Vertical spreading of external device labels.

/// Returns label positions, in input order, such that consecutive labels are at least `spacing`
/// apart and every label stays within `[min_y, max_y]` whenever the column is tall enough.
/// Otherwise the stack starts at `min_y` and runs past `max_y`.
///
/// Labels keep their desired position when there is room. Crowded labels are pushed down in
/// order of their desired position; if that overruns `max_y`, the stack is pushed back up from
/// the bottom. Ties keep input order, so the result is deterministic.
pub fn spread_labels(desired: &[f64], spacing: f64, min_y: f64, max_y: f64) -> Vec<f64> {
    if desired.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..desired.len()).collect();
    order.sort_by(|&a, &b| desired[a].total_cmp(&desired[b]).then(a.cmp(&b)));

    let mut placed: Vec<f64> = order.iter().map(|&i| desired[i].max(min_y)).collect();
    for i in 1..placed.len() {
        placed[i] = placed[i].max(placed[i - 1] + spacing);
    }

    let last = placed.len() - 1;
    if placed[last] > max_y {
        placed[last] = max_y;
        for i in (0..last).rev() {
            placed[i] = placed[i].min(placed[i + 1] - spacing);
        }
        // Column too short for every label: keep the top one inside and let the stack run past
        // `max_y` rather than overlap.
        if placed[0] < min_y {
            placed[0] = min_y;
            for i in 1..placed.len() {
                placed[i] = placed[i - 1] + spacing;
            }
        }
    }

    let mut out = vec![0.0; desired.len()];
    for (slot, &idx) in order.iter().enumerate() {
        out[idx] = placed[slot];
    }
    out
}
