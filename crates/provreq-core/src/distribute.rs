//! Splits a total VM count across templates.

use crate::error::{ProvisionError, ProvisionResult};

/// Distribute `total` VMs over `buckets` templates as evenly as possible.
///
/// Every bucket gets `total / buckets`; the first `total % buckets` buckets
/// (by index) get one more.
pub fn distribute_vm_count(total: u32, buckets: usize) -> ProvisionResult<Vec<u32>> {
    if buckets == 0 {
        return Err(ProvisionError::invalid_input(
            "Cannot distribute VMs over zero templates",
        ));
    }
    let total = u64::from(total);
    let n = buckets as u64;
    let base = total / n;
    let remainder = total % n;

    let allocation = (0..n)
        .map(|idx| {
            let count = if idx < remainder { base + 1 } else { base };
            // count <= total, which came from a u32
            count as u32
        })
        .collect();
    Ok(allocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ten_over_three() {
        assert_eq!(distribute_vm_count(10, 3).unwrap(), vec![4, 3, 3]);
    }

    #[test]
    fn five_over_two() {
        assert_eq!(distribute_vm_count(5, 2).unwrap(), vec![3, 2]);
    }

    #[test]
    fn fewer_vms_than_templates() {
        assert_eq!(distribute_vm_count(2, 4).unwrap(), vec![1, 1, 0, 0]);
    }

    #[test]
    fn zero_total_yields_zeros() {
        assert_eq!(distribute_vm_count(0, 3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn zero_buckets_is_invalid_input() {
        let err = distribute_vm_count(4, 0).unwrap_err();
        assert_eq!(err.kind, crate::error::ProvisionErrorKind::InvalidInput);
    }

    proptest! {
        #[test]
        fn allocation_is_even_and_complete(total in 0u32..10_000, buckets in 1usize..64) {
            let alloc = distribute_vm_count(total, buckets).unwrap();
            prop_assert_eq!(alloc.len(), buckets);
            prop_assert_eq!(alloc.iter().map(|&c| u64::from(c)).sum::<u64>(), u64::from(total));
            for pair in alloc.windows(2) {
                let diff = pair[0] - pair[1];
                prop_assert!(diff == 0 || diff == 1);
            }
            let extra = total as usize % buckets;
            let base = total / buckets as u32;
            for (idx, count) in alloc.iter().enumerate() {
                let expected = if idx < extra { base + 1 } else { base };
                prop_assert_eq!(*count, expected);
            }
        }
    }
}
