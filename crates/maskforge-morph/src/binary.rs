//! Binary morphological operations
//!
//! Implements 3×3 erosion, dilation, opening, and closing over byte mask
//! planes, parameterized by 4- or 8-way connectivity. Pixels outside the
//! plane count as background, so erosion removes foreground touching the
//! border.

use maskforge_core::{Connectivity, MASK_ON, Mask};

/// Dilate with a 3×3 structuring element.
///
/// 4-way connectivity uses the cross (center + orthogonal neighbors);
/// 8-way uses the full 3×3 box. Dilation expands foreground regions.
pub fn dilate(mask: &Mask, connectivity: Connectivity) -> Mask {
    let width = mask.width() as i64;
    let height = mask.height() as i64;
    let mut out = Mask::new(mask.width(), mask.height()).expect("source mask has valid dims");
    let src = mask.data();
    let dst = out.data_mut();

    for y in 0..height {
        let row = (y * width) as usize;
        for x in 0..width {
            let idx = row + x as usize;
            if src[idx] == 0 {
                continue;
            }

            dst[idx] = MASK_ON;
            if x > 0 {
                dst[idx - 1] = MASK_ON;
            }
            if x + 1 < width {
                dst[idx + 1] = MASK_ON;
            }
            if y > 0 {
                dst[idx - width as usize] = MASK_ON;
            }
            if y + 1 < height {
                dst[idx + width as usize] = MASK_ON;
            }

            if connectivity == Connectivity::EightWay {
                if x > 0 && y > 0 {
                    dst[idx - width as usize - 1] = MASK_ON;
                }
                if x + 1 < width && y > 0 {
                    dst[idx - width as usize + 1] = MASK_ON;
                }
                if x > 0 && y + 1 < height {
                    dst[idx + width as usize - 1] = MASK_ON;
                }
                if x + 1 < width && y + 1 < height {
                    dst[idx + width as usize + 1] = MASK_ON;
                }
            }
        }
    }

    out
}

/// Erode with a 3×3 structuring element.
///
/// A pixel survives only when every in-bounds neighbor under the
/// connectivity is foreground. Out-of-bounds neighbors are ignored
/// (border replication), so a fully selected plane erodes to itself.
pub fn erode(mask: &Mask, connectivity: Connectivity) -> Mask {
    let width = mask.width() as i64;
    let height = mask.height() as i64;
    let mut out = Mask::new(mask.width(), mask.height()).expect("source mask has valid dims");
    let dst = out.data_mut();

    let on_or_outside = |x: i64, y: i64| -> bool {
        if x < 0 || y < 0 || x >= width || y >= height {
            return true;
        }
        mask.data()[(y * width + x) as usize] != 0
    };

    for y in 0..height {
        let row = (y * width) as usize;
        for x in 0..width {
            let idx = row + x as usize;
            if mask.data()[idx] == 0 {
                continue;
            }

            let mut keep = on_or_outside(x - 1, y)
                && on_or_outside(x + 1, y)
                && on_or_outside(x, y - 1)
                && on_or_outside(x, y + 1);

            if keep && connectivity == Connectivity::EightWay {
                keep = on_or_outside(x - 1, y - 1)
                    && on_or_outside(x + 1, y - 1)
                    && on_or_outside(x - 1, y + 1)
                    && on_or_outside(x + 1, y + 1);
            }

            if keep {
                dst[idx] = MASK_ON;
            }
        }
    }

    out
}

/// Open a mask: erosion followed by dilation.
///
/// Removes small foreground speckle and smooths contours.
pub fn open(mask: &Mask, connectivity: Connectivity) -> Mask {
    let eroded = erode(mask, connectivity);
    dilate(&eroded, connectivity)
}

/// Close a mask: dilation followed by erosion.
///
/// Bridges small gaps and fills thin holes between nearby objects.
pub fn close(mask: &Mask, connectivity: Connectivity) -> Mask {
    let dilated = dilate(mask, connectivity);
    erode(&dilated, connectivity)
}

/// Iterated 8-way dilation. Used to build anchor zones around an existing
/// selection before component merging.
pub fn dilate_n(mask: &Mask, iterations: u32) -> Mask {
    let mut current = mask.clone();
    current.binarize();
    for _ in 0..iterations {
        current = dilate(&current, Connectivity::EightWay);
    }
    current
}

/// Count neighbors that are fully selected (`MASK_ON`). The pixel must not
/// sit on the plane border; callers iterate interior pixels only.
pub(crate) fn count_selected_neighbors(
    data: &[u8],
    width: usize,
    idx: usize,
    connectivity: Connectivity,
) -> usize {
    let mut count = 0;

    if data[idx - width] == MASK_ON {
        count += 1;
    }
    if data[idx + width] == MASK_ON {
        count += 1;
    }
    if data[idx - 1] == MASK_ON {
        count += 1;
    }
    if data[idx + 1] == MASK_ON {
        count += 1;
    }

    if connectivity == Connectivity::EightWay {
        if data[idx - width - 1] == MASK_ON {
            count += 1;
        }
        if data[idx - width + 1] == MASK_ON {
            count += 1;
        }
        if data[idx + width - 1] == MASK_ON {
            count += 1;
        }
        if data[idx + width + 1] == MASK_ON {
            count += 1;
        }
    }

    count
}

/// Count fully selected (`MASK_ON`) neighbors of an interior pixel.
pub fn selected_neighbor_count(
    mask: &Mask,
    x: u32,
    y: u32,
    connectivity: Connectivity,
) -> usize {
    debug_assert!(x >= 1 && y >= 1 && x + 1 < mask.width() && y + 1 < mask.height());
    count_selected_neighbors(
        mask.data(),
        mask.width() as usize,
        mask.index(x, y),
        connectivity,
    )
}
