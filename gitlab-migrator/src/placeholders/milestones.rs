//! Milestone alignment and the resulting numbering map.

use super::fill_gaps_with;
use crate::records::{EntityKind, Record, TargetMilestone};
use std::collections::BTreeMap;
use tracing::info;

/// The number a milestone is expected to receive on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneSlot {
    /// Expected target number.
    pub number: u64,

    /// Milestone title.
    pub title: String,
}

/// Maps source milestone iids to the target numbers they are expected to get.
///
/// Built once per migration and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingMap {
    slots: BTreeMap<u64, MilestoneSlot>,
}

impl NumberingMap {
    /// Builds a map from milestones that already exist on the target.
    #[must_use]
    pub fn from_target(milestones: &[TargetMilestone]) -> Self {
        let slots = milestones
            .iter()
            .map(|m| {
                (
                    m.number,
                    MilestoneSlot {
                        number: m.number,
                        title: m.title.clone(),
                    },
                )
            })
            .collect();
        Self { slots }
    }

    /// Expected slot for a source iid.
    #[must_use]
    pub fn get(&self, iid: u64) -> Option<&MilestoneSlot> {
        self.slots.get(&iid)
    }

    /// Target number of the milestone with the given title.
    ///
    /// Titles are unique on GitHub, so this is how issues find their
    /// milestone, including milestones inherited from a parent group.
    #[must_use]
    pub fn number_for_title(&self, title: &str) -> Option<u64> {
        self.slots
            .values()
            .find(|slot| slot.title == title)
            .map(|slot| slot.number)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn insert(&mut self, iid: u64, slot: MilestoneSlot) {
        self.slots.insert(iid, slot);
    }
}

/// Milestones in creation order plus their expected numbering.
#[derive(Debug, Clone)]
pub struct AlignedMilestones {
    /// Milestones to create, in order.
    pub milestones: Vec<Record>,

    /// Expected target number for every milestone, keyed by (synthetic) iid.
    pub numbering: NumberingMap,

    /// How many placeholders were inserted.
    pub placeholders: usize,
}

/// Orders milestones for creation.
///
/// Project milestones are sorted by iid and, when `use_placeholders` is set,
/// gap-filled. Milestones inherited from a parent group take no part in gap
/// detection: they get synthetic iids starting right after the highest
/// project milestone iid and are appended in their original relative order.
#[must_use]
pub fn align_milestones(records: Vec<Record>, use_placeholders: bool) -> AlignedMilestones {
    let (ancestors, mut project): (Vec<Record>, Vec<Record>) = records
        .into_iter()
        .partition(|r| r.as_real().is_some_and(|real| real.ancestor));
    project.sort_by_key(Record::iid);

    let last_project_iid = project.last().map_or(0, Record::iid);

    let mut placeholders = 0;
    let mut milestones = if use_placeholders {
        fill_gaps_with(
            project,
            |idx, _| Record::placeholder(EntityKind::Milestone, idx),
            |idx, _| {
                placeholders += 1;
                info!(iid = idx, "Added placeholder milestone");
            },
        )
    } else {
        project
    };

    let mut next_iid = last_project_iid + 1;
    for ancestor in ancestors {
        if let Record::Real(mut real) = ancestor {
            real.iid = next_iid;
            milestones.push(Record::Real(real));
            next_iid += 1;
        }
    }

    let mut numbering = NumberingMap::default();
    for (position, milestone) in milestones.iter().enumerate() {
        numbering.insert(
            milestone.iid(),
            MilestoneSlot {
                number: position as u64 + 1,
                title: milestone.title().to_string(),
            },
        );
    }

    AlignedMilestones {
        milestones,
        numbering,
        placeholders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RecordState, SourceRecord};

    fn milestone(iid: u64, title: &str, ancestor: bool) -> Record {
        let mut record = SourceRecord::new(
            EntityKind::Milestone,
            iid,
            title,
            RecordState::Open,
            format!("https://gitlab.test/acme/widgets/-/milestones/{iid}"),
        );
        record.ancestor = ancestor;
        Record::Real(record)
    }

    #[test]
    fn fills_gaps_between_project_milestones() {
        let aligned = align_milestones(
            vec![milestone(3, "v3", false), milestone(1, "v1", false)],
            true,
        );

        assert_eq!(aligned.placeholders, 1);
        assert_eq!(
            aligned
                .milestones
                .iter()
                .map(|m| m.title().to_string())
                .collect::<Vec<_>>(),
            vec!["v1", "[PLACEHOLDER] - for milestone #2", "v3"]
        );
        assert_eq!(aligned.numbering.get(3).unwrap().number, 3);
        assert_eq!(aligned.numbering.number_for_title("v3"), Some(3));
    }

    #[test]
    fn appends_ancestors_after_highest_project_iid() {
        let aligned = align_milestones(
            vec![
                milestone(1, "v1", false),
                milestone(7, "group-b", true),
                milestone(2, "v2", false),
                milestone(1, "group-a", true),
            ],
            true,
        );

        let order: Vec<(u64, &str)> = aligned
            .milestones
            .iter()
            .map(|m| (m.iid(), m.title()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "v1"), (2, "v2"), (3, "group-b"), (4, "group-a")]
        );
        assert_eq!(aligned.placeholders, 0);
        assert_eq!(aligned.numbering.number_for_title("group-a"), Some(4));
    }

    #[test]
    fn without_placeholders_numbers_follow_creation_order() {
        let aligned = align_milestones(
            vec![milestone(2, "v2", false), milestone(5, "v5", false)],
            false,
        );

        assert_eq!(aligned.milestones.len(), 2);
        assert_eq!(aligned.placeholders, 0);
        assert_eq!(aligned.numbering.get(2).unwrap().number, 1);
        assert_eq!(aligned.numbering.get(5).unwrap().number, 2);
    }

    #[test]
    fn ancestors_only_start_at_one() {
        let aligned = align_milestones(vec![milestone(9, "group", true)], true);

        assert_eq!(aligned.milestones[0].iid(), 1);
        assert_eq!(aligned.numbering.get(1).unwrap().number, 1);
    }

    #[test]
    fn numbering_from_target_resolves_titles() {
        let map = NumberingMap::from_target(&[TargetMilestone {
            number: 4,
            title: "v4".to_string(),
        }]);

        assert_eq!(map.number_for_title("v4"), Some(4));
        assert_eq!(map.number_for_title("v5"), None);
        assert_eq!(map.len(), 1);
    }
}
