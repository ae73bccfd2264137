//! Connected component extraction
//!
//! BFS-based component analysis over byte masks with array-backed queues.
//! All traversal here is 4-way: the selection algorithms treat diagonal
//! contact as "not connected" when deciding what to keep or merge.

use crate::error::{MorphError, MorphResult};
use maskforge_core::{MASK_OFF, MASK_ON, Mask};

/// Keep only the largest 4-connected foreground component.
///
/// An empty mask stays empty. Idempotent; the output is always a subset of
/// the input.
pub fn largest_component(mask: &Mask) -> Mask {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let pixel_count = width * height;
    let data = mask.data();

    let mut visited = vec![false; pixel_count];
    let mut queue = vec![0usize; pixel_count];
    let mut best: Vec<usize> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for start in 0..pixel_count {
        if data[start] == 0 || visited[start] {
            continue;
        }
        current.clear();

        let mut head = 0usize;
        let mut tail = 0usize;
        queue[tail] = start;
        tail += 1;
        visited[start] = true;

        while head < tail {
            let idx = queue[head];
            head += 1;
            current.push(idx);
            let x = idx % width;
            let y = idx / width;

            for (nx, ny) in four_neighbors(x, y, width, height) {
                let n = ny * width + nx;
                if !visited[n] && data[n] != 0 {
                    visited[n] = true;
                    queue[tail] = n;
                    tail += 1;
                }
            }
        }

        if current.len() > best.len() {
            std::mem::swap(&mut best, &mut current);
        }
    }

    let mut out = Mask::new(mask.width(), mask.height()).expect("source mask has valid dims");
    for &idx in &best {
        out.data_mut()[idx] = MASK_ON;
    }
    out
}

/// Keep only the 4-connected component containing the given flat index.
///
/// Returns `None` when the anchor pixel itself is background.
pub fn keep_component_containing(mask: &Mask, anchor: usize) -> Option<Mask> {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let pixel_count = width * height;
    let data = mask.data();

    if anchor >= pixel_count || data[anchor] == 0 {
        return None;
    }

    let mut keep = vec![false; pixel_count];
    let mut queue = vec![0usize; pixel_count];
    let mut head = 0usize;
    let mut tail = 0usize;
    queue[tail] = anchor;
    tail += 1;
    keep[anchor] = true;

    while head < tail {
        let idx = queue[head];
        head += 1;
        let x = idx % width;
        let y = idx / width;

        for (nx, ny) in four_neighbors(x, y, width, height) {
            let n = ny * width + nx;
            if !keep[n] && data[n] != 0 {
                keep[n] = true;
                queue[tail] = n;
                tail += 1;
            }
        }
    }

    let mut out = Mask::new(mask.width(), mask.height()).expect("source mask has valid dims");
    let out_data = out.data_mut();
    for idx in 0..pixel_count {
        out_data[idx] = if keep[idx] { MASK_ON } else { MASK_OFF };
    }
    Some(out)
}

/// Merge candidate components that touch an anchor zone.
///
/// Walks every 4-connected component of `candidate`; a component with at
/// least one pixel inside `anchor_zone` is stamped into both `base` and
/// `anchor_zone`, so later components may chain off earlier merges.
/// Components with no anchor contact are ignored.
pub fn merge_touching_components(
    base: &mut Mask,
    anchor_zone: &mut Mask,
    candidate: &Mask,
) -> MorphResult<()> {
    let pixel_count = candidate.len();
    if base.len() != pixel_count || anchor_zone.len() != pixel_count {
        return Err(MorphError::SizeMismatch {
            expected: pixel_count,
            actual: base.len().min(anchor_zone.len()),
        });
    }

    let width = candidate.width() as usize;
    let height = candidate.height() as usize;
    let cand = candidate.data();

    let mut visited = vec![false; pixel_count];
    let mut queue = vec![0usize; pixel_count];
    let mut component: Vec<usize> = Vec::with_capacity(1024);

    for start in 0..pixel_count {
        if cand[start] == 0 || visited[start] {
            continue;
        }

        component.clear();
        let mut touches_anchor = false;
        let mut head = 0usize;
        let mut tail = 0usize;
        queue[tail] = start;
        tail += 1;
        visited[start] = true;

        while head < tail {
            let idx = queue[head];
            head += 1;
            component.push(idx);
            if anchor_zone.data()[idx] != 0 {
                touches_anchor = true;
            }

            let x = idx % width;
            let y = idx / width;
            for (nx, ny) in four_neighbors(x, y, width, height) {
                let n = ny * width + nx;
                if !visited[n] && cand[n] != 0 {
                    visited[n] = true;
                    queue[tail] = n;
                    tail += 1;
                }
            }
        }

        if !touches_anchor {
            continue;
        }

        for &idx in &component {
            base.data_mut()[idx] = MASK_ON;
            anchor_zone.data_mut()[idx] = MASK_ON;
        }
    }

    Ok(())
}

#[inline]
fn four_neighbors(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let mut neighbors = [(0usize, 0usize); 4];
    let mut n = 0;
    if x > 0 {
        neighbors[n] = (x - 1, y);
        n += 1;
    }
    if x + 1 < width {
        neighbors[n] = (x + 1, y);
        n += 1;
    }
    if y > 0 {
        neighbors[n] = (x, y - 1);
        n += 1;
    }
    if y + 1 < height {
        neighbors[n] = (x, y + 1);
        n += 1;
    }
    neighbors.into_iter().take(n)
}
