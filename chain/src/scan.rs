//! Block-window chunking for bounded log scans.

/// Split the inclusive range `[from, to]` into windows of at most
/// `interval` blocks.
///
/// Backends cap how many blocks one log query may cover; scans iterate the
/// returned windows and merge the results. An empty range yields no windows.
pub fn block_windows(from: u64, to: u64, interval: u64) -> Vec<(u64, u64)> {
    let interval = interval.max(1);
    let mut windows = Vec::new();
    let mut start = from;
    while start <= to {
        let end = to.min(start.saturating_add(interval - 1));
        windows.push((start, end));
        if end == u64::MAX {
            break;
        }
        start = end + 1;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_window_when_range_fits() {
        assert_eq!(block_windows(100, 150, 1000), vec![(100, 150)]);
    }

    #[test]
    fn exact_multiple_splits_cleanly() {
        assert_eq!(
            block_windows(0, 29, 10),
            vec![(0, 9), (10, 19), (20, 29)]
        );
    }

    #[test]
    fn remainder_window_is_short() {
        assert_eq!(
            block_windows(5, 27, 10),
            vec![(5, 14), (15, 24), (25, 27)]
        );
    }

    #[test]
    fn empty_range_yields_nothing() {
        assert!(block_windows(10, 9, 100).is_empty());
    }

    #[test]
    fn single_block_range() {
        assert_eq!(block_windows(7, 7, 10), vec![(7, 7)]);
    }

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(block_windows(1, 3, 0), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn windows_tile_the_range() {
        let windows = block_windows(1000, 2500, 300);
        assert_eq!(windows.first().unwrap().0, 1000);
        assert_eq!(windows.last().unwrap().1, 2500);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0);
        }
    }
}
