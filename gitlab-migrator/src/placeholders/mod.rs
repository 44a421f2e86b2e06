//! Numbering alignment.
//!
//! GitHub numbers issues, pull requests and milestones sequentially as they
//! are created. To keep references like `#12` valid after the migration, the
//! records must be created in iid order with no holes, so every gap in the
//! GitLab numbering is filled with a placeholder.

mod milestones;

pub use milestones::{align_milestones, AlignedMilestones, MilestoneSlot, NumberingMap};

use crate::records::Record;

/// Anything that occupies a slot in a per-project number sequence.
pub trait Sequenced {
    /// The slot number, starting at 1.
    fn iid(&self) -> u64;
}

impl Sequenced for Record {
    fn iid(&self) -> u64 {
        Record::iid(self)
    }
}

/// Fills every gap in `records` with a placeholder.
///
/// See [`fill_gaps_with`].
pub fn fill_gaps<T, F>(records: Vec<T>, make_placeholder: F) -> Vec<T>
where
    T: Sequenced,
    F: FnMut(u64, &T) -> T,
{
    fill_gaps_with(records, make_placeholder, |_, _| {})
}

/// Fills every gap in `records` with a placeholder, reporting each one.
///
/// `records` must be sorted ascending by iid without duplicates. The result
/// is the contiguous sequence `1..=max(iid)`: every input record keeps its
/// identity and lands at position `iid - 1`. For each missing number,
/// `make_placeholder` is called with that number and the next real record,
/// then `on_placeholder` is notified with the same arguments.
pub fn fill_gaps_with<T, F, C>(
    records: Vec<T>,
    mut make_placeholder: F,
    mut on_placeholder: C,
) -> Vec<T>
where
    T: Sequenced,
    F: FnMut(u64, &T) -> T,
    C: FnMut(u64, &T),
{
    debug_assert!(
        records.windows(2).all(|pair| pair[0].iid() < pair[1].iid()),
        "records must be sorted by iid without duplicates"
    );

    let mut filled = Vec::with_capacity(records.len());
    let mut expected = 1;

    for record in records {
        while expected < record.iid() {
            filled.push(make_placeholder(expected, &record));
            on_placeholder(expected, &record);
            expected += 1;
        }
        filled.push(record);
        expected += 1;
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{EntityKind, RecordState, SourceRecord};

    #[derive(Debug, Clone, PartialEq)]
    struct Slot {
        iid: u64,
        placeholder: bool,
    }

    impl Sequenced for Slot {
        fn iid(&self) -> u64 {
            self.iid
        }
    }

    fn real(iids: &[u64]) -> Vec<Slot> {
        iids.iter()
            .map(|&iid| Slot {
                iid,
                placeholder: false,
            })
            .collect()
    }

    fn placeholder(iid: u64, _: &Slot) -> Slot {
        Slot {
            iid,
            placeholder: true,
        }
    }

    fn iids(slots: &[Slot]) -> Vec<u64> {
        slots.iter().map(|s| s.iid).collect()
    }

    #[test]
    fn fills_single_gap() {
        let mut reported = Vec::new();
        let result = fill_gaps_with(real(&[1, 3]), placeholder, |idx, next| {
            reported.push((idx, next.iid))
        });

        assert_eq!(iids(&result), vec![1, 2, 3]);
        assert!(result[1].placeholder);
        assert_eq!(reported, vec![(2, 3)]);
    }

    #[test]
    fn leaves_contiguous_input_unchanged() {
        let mut calls = 0;
        let input = real(&[1, 2, 3]);
        let result = fill_gaps_with(input.clone(), placeholder, |_, _| calls += 1);

        assert_eq!(result, input);
        assert_eq!(calls, 0);
    }

    #[test]
    fn fills_large_gap_in_ascending_order() {
        let mut reported = Vec::new();
        let result = fill_gaps_with(real(&[1, 5]), placeholder, |idx, _| reported.push(idx));

        assert_eq!(iids(&result), vec![1, 2, 3, 4, 5]);
        assert_eq!(reported, vec![2, 3, 4]);
        assert!(result[1..4].iter().all(|s| s.placeholder));
        assert!(!result[4].placeholder);
    }

    #[test]
    fn gap_sized_output_grows_beyond_input_length() {
        let result = fill_gaps(real(&[2, 40]), placeholder);

        assert_eq!(result.len(), 40);
        assert_eq!(result[1].iid, 2);
        assert!(!result[39].placeholder);
        assert_eq!(result.iter().filter(|s| s.placeholder).count(), 38);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let result = fill_gaps(Vec::<Slot>::new(), placeholder);
        assert!(result.is_empty());
    }

    #[test]
    fn fills_leading_gap() {
        let result = fill_gaps(real(&[3]), placeholder);
        assert_eq!(iids(&result), vec![1, 2, 3]);
        assert!(result[0].placeholder && result[1].placeholder);
    }

    #[test]
    fn output_is_contiguous_for_arbitrary_sorted_input() {
        let inputs: [&[u64]; 5] = [&[1], &[1, 2, 9], &[2, 4, 6, 8], &[1, 10, 11, 30], &[5, 6, 7]];
        for input in inputs {
            let result = fill_gaps(real(input), placeholder);
            let max = *input.last().unwrap();

            assert_eq!(result.len() as u64, max);
            assert!(result
                .iter()
                .enumerate()
                .all(|(pos, slot)| slot.iid == pos as u64 + 1));
            for &iid in input {
                assert!(!result[iid as usize - 1].placeholder);
            }
        }
    }

    #[test]
    fn redaction_happens_before_gap_filling() {
        let web_url = |iid: u64| format!("https://gitlab.test/acme/widgets/-/issues/{iid}");
        let mut confidential =
            SourceRecord::new(EntityKind::Issue, 4, "Secret", RecordState::Open, web_url(4));
        confidential.confidential = true;
        let source = vec![
            SourceRecord::new(EntityKind::Issue, 1, "One", RecordState::Open, web_url(1)),
            SourceRecord::new(EntityKind::Issue, 2, "Two", RecordState::Open, web_url(2)),
            confidential,
        ];

        let records: Vec<Record> = source.into_iter().map(Record::from).collect();
        let mut gaps = Vec::new();
        let aligned = fill_gaps_with(
            records,
            |idx, _| Record::placeholder(EntityKind::Issue, idx),
            |idx, _| gaps.push(idx),
        );

        assert_eq!(
            aligned.iter().map(Record::iid).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(gaps, vec![3]);
        assert!(matches!(aligned[2], Record::Placeholder(_)));
        assert!(matches!(aligned[3], Record::RedactedConfidential(_)));
        assert_eq!(aligned[3].web_url(), Some(web_url(4).as_str()));
    }
}
