use smallvec::SmallVec;

/// One group's ordered selection: option indices for a contest,
/// character option indices for a write-in.
pub(crate) type Selection = SmallVec<[usize; 4]>;

/// Per-session mutable selection state.
///
/// One bounded, ordered sequence of option indices per group, created
/// empty at session start and mutated only through the action
/// interpreter. Contest sequences never hold duplicates; write-in
/// sequences may repeat characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    groups: Vec<Selection>,
}

impl SelectionState {
    /// Empty selections for `group_count` groups.
    pub(crate) fn new(group_count: usize) -> Self {
        Self {
            groups: (0..group_count).map(|_| Selection::new()).collect(),
        }
    }

    /// Selected option indices of a group, in selection order.
    pub fn group(&self, group_i: usize) -> &[usize] {
        &self.groups[group_i]
    }

    /// Number of selections a group holds.
    pub fn count(&self, group_i: usize) -> usize {
        self.groups[group_i].len()
    }

    /// `true` when the option is currently selected in the group.
    pub fn selected(&self, group_i: usize, option_i: usize) -> bool {
        self.groups[group_i].contains(&option_i)
    }

    pub(crate) fn push(&mut self, group_i: usize, option_i: usize) {
        self.groups[group_i].push(option_i);
    }

    pub(crate) fn remove(&mut self, group_i: usize, option_i: usize) {
        self.groups[group_i].retain(|o| *o != option_i);
    }

    pub(crate) fn pop(&mut self, group_i: usize) {
        self.groups[group_i].pop();
    }

    pub(crate) fn clear(&mut self, group_i: usize) {
        self.groups[group_i].clear();
    }
}
