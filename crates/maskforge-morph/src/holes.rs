//! Hole filling
//!
//! Fills interior holes: background regions with no 4-connected path to the
//! plane border. Uses a multi-source BFS from every border background pixel
//! with an array-backed queue; never recursive.

use maskforge_core::{MASK_ON, Mask};

/// Fill enclosed holes in a mask.
///
/// Every background pixel reachable from the border (4-way) is exterior;
/// all remaining background pixels are enclosed holes and are promoted to
/// foreground. Idempotent: filling an already-filled mask is a no-op.
pub fn fill_holes(mask: &Mask) -> Mask {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let pixel_count = width * height;

    let mut out = mask.clone();
    let data = out.data_mut();

    let mut exterior = vec![false; pixel_count];
    let mut queue = vec![0usize; pixel_count];
    let mut head = 0usize;
    let mut tail = 0usize;

    let mut enqueue_if_background =
        |x: i64, y: i64, exterior: &mut [bool], queue: &mut [usize], tail: &mut usize| {
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                return;
            }
            let idx = y as usize * width + x as usize;
            if exterior[idx] || data[idx] != 0 {
                return;
            }
            exterior[idx] = true;
            queue[*tail] = idx;
            *tail += 1;
        };

    for x in 0..width as i64 {
        enqueue_if_background(x, 0, &mut exterior, &mut queue, &mut tail);
        enqueue_if_background(x, height as i64 - 1, &mut exterior, &mut queue, &mut tail);
    }
    for y in 1..height as i64 - 1 {
        enqueue_if_background(0, y, &mut exterior, &mut queue, &mut tail);
        enqueue_if_background(width as i64 - 1, y, &mut exterior, &mut queue, &mut tail);
    }

    while head < tail {
        let idx = queue[head];
        head += 1;
        let x = (idx % width) as i64;
        let y = (idx / width) as i64;

        enqueue_if_background(x - 1, y, &mut exterior, &mut queue, &mut tail);
        enqueue_if_background(x + 1, y, &mut exterior, &mut queue, &mut tail);
        enqueue_if_background(x, y - 1, &mut exterior, &mut queue, &mut tail);
        enqueue_if_background(x, y + 1, &mut exterior, &mut queue, &mut tail);
    }

    for idx in 0..pixel_count {
        if data[idx] == 0 && !exterior[idx] {
            data[idx] = MASK_ON;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskforge_core::MASK_OFF;

    #[test]
    fn test_fill_single_enclosed_pixel() {
        // Foreground rectangle with one interior background pixel
        let mut mask = Mask::new(6, 6).unwrap();
        for y in 1..5 {
            for x in 1..5 {
                mask.set(x, y, MASK_ON);
            }
        }
        mask.set(3, 3, MASK_OFF);

        let filled = fill_holes(&mask);
        assert_eq!(filled.get(3, 3), MASK_ON);
        // Exterior background stays untouched
        assert_eq!(filled.get(0, 0), MASK_OFF);
        assert_eq!(filled.get(5, 5), MASK_OFF);
        assert_eq!(filled.count_nonzero(), 16);
    }

    #[test]
    fn test_open_bay_is_not_a_hole() {
        // A notch reaching the border is exterior background, not a hole
        let mut mask = Mask::new(5, 5).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                mask.set(x, y, MASK_ON);
            }
        }
        mask.set(2, 0, MASK_OFF);
        mask.set(2, 1, MASK_OFF);
        mask.set(2, 2, MASK_OFF);

        let filled = fill_holes(&mask);
        assert_eq!(filled.get(2, 0), MASK_OFF);
        assert_eq!(filled.get(2, 2), MASK_OFF);
    }

    #[test]
    fn test_fill_holes_idempotent() {
        let mut mask = Mask::new(8, 8).unwrap();
        for y in 1..7 {
            for x in 1..7 {
                mask.set(x, y, MASK_ON);
            }
        }
        mask.set(3, 3, MASK_OFF);
        mask.set(4, 4, MASK_OFF);

        let once = fill_holes(&mask);
        let twice = fill_holes(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blank_mask_unchanged() {
        let mask = Mask::new(4, 3).unwrap();
        assert!(fill_holes(&mask).is_blank());
    }
}
