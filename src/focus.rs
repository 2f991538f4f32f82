//! Focus navigation engine.
//!
//! Each tab exposes a *virtual field space*: a single 0-based cursor range
//! spanning static inputs, action buttons and the entries of its dynamic
//! lists. The cursor wraps at both ends. [`resolve`] maps a cursor position
//! to a [`Slot`] so the rest of the code never does raw index arithmetic
//! against the cursor.

/// The six form tabs. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Main,
    UcoTransfers,
    TokenTransfers,
    Recipients,
    Ownerships,
    Content,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Main,
        Section::UcoTransfers,
        Section::TokenTransfers,
        Section::Recipients,
        Section::Ownerships,
        Section::Content,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Main => "Main",
            Section::UcoTransfers => "UCO Transfers",
            Section::TokenTransfers => "Token Transfers",
            Section::Recipients => "Recipients",
            Section::Ownerships => "Ownerships",
            Section::Content => "Content",
        }
    }

    pub fn index(&self) -> usize {
        Section::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Next tab, clamped at the last one.
    pub fn next(self) -> Self {
        let i = (self.index() + 1).min(Section::ALL.len() - 1);
        Section::ALL[i]
    }

    /// Previous tab, clamped at the first one.
    pub fn prev(self) -> Self {
        Section::ALL[self.index().saturating_sub(1)]
    }

    /// Number of static input fields addressed by `Slot::Field` on this tab.
    pub fn field_count(&self) -> usize {
        match self {
            Section::Main | Section::Content => 0,
            Section::UcoTransfers | Section::Ownerships => 2,
            Section::TokenTransfers => 4,
            Section::Recipients => 1,
        }
    }
}

/// Number of endpoint presets on the Main tab.
pub const PRESET_COUNT: usize = 4;

/// Number of selectable transaction kinds on the Main tab.
pub const KIND_COUNT: usize = 9;

/// Number of free-text areas on the Content tab.
pub const TEXT_AREA_COUNT: usize = 2;

/// Dynamic sizes the virtual space of the active section depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dims {
    /// Main only: endpoint/seed region removed when set.
    pub service_mode: bool,
    /// Ownerships only: pending authorized keys not yet committed.
    pub pending: usize,
    /// Committed entries of the section's list.
    pub entries: usize,
}

impl Dims {
    pub fn main(service_mode: bool) -> Self {
        Self {
            service_mode,
            ..Self::default()
        }
    }

    pub fn list(entries: usize) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn ownerships(pending: usize, entries: usize) -> Self {
        Self {
            pending,
            entries,
            ..Self::default()
        }
    }
}

/// Semantic target of a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    EndpointPreset(usize),
    EndpointField,
    SeedField,
    Kind(usize),
    Submit,
    /// Static input field of a list section.
    Field(usize),
    /// The "[ Add ]" action of a list section.
    Add,
    /// Pending authorized key awaiting commit (Ownerships).
    PendingKey(usize),
    AddAuthorizedKey,
    LoadNetworkKey,
    CommitOwnership,
    /// Committed entry of the section's list.
    Entry(usize),
    TextArea(usize),
}

/// Direction of a single focus move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDir {
    Forward,
    Backward,
}

/// Size of the virtual field space for `section` under `dims`.
///
/// Always at least the number of fixed controls of the section.
pub fn virtual_space(section: Section, dims: &Dims) -> usize {
    match section {
        Section::Main => {
            if dims.service_mode {
                KIND_COUNT + 1
            } else {
                PRESET_COUNT + 2 + KIND_COUNT + 1
            }
        }
        Section::UcoTransfers | Section::TokenTransfers | Section::Recipients => {
            section.field_count() + 1 + dims.entries
        }
        Section::Ownerships => section.field_count() + dims.pending + 3 + dims.entries,
        Section::Content => TEXT_AREA_COUNT,
    }
}

/// Maps `cursor` to its semantic slot. `cursor` must satisfy
/// `cursor < virtual_space(section, dims)`; out-of-range positions resolve
/// to the last valid slot rather than panicking.
pub fn resolve(section: Section, cursor: usize, dims: &Dims) -> Slot {
    let space = virtual_space(section, dims);
    let cursor = cursor.min(space.saturating_sub(1));
    match section {
        Section::Main => resolve_main(cursor, dims.service_mode),
        Section::UcoTransfers | Section::TokenTransfers | Section::Recipients => {
            let fields = section.field_count();
            if cursor < fields {
                Slot::Field(cursor)
            } else if cursor == fields {
                Slot::Add
            } else {
                Slot::Entry(cursor - fields - 1)
            }
        }
        Section::Ownerships => resolve_ownerships(cursor, dims),
        Section::Content => Slot::TextArea(cursor),
    }
}

fn resolve_main(cursor: usize, service_mode: bool) -> Slot {
    // In service mode the endpoint region does not exist and the cursor is
    // 0-based over the reduced domain.
    let cursor = if service_mode {
        cursor + PRESET_COUNT + 2
    } else {
        cursor
    };
    if cursor < PRESET_COUNT {
        Slot::EndpointPreset(cursor)
    } else if cursor == PRESET_COUNT {
        Slot::EndpointField
    } else if cursor == PRESET_COUNT + 1 {
        Slot::SeedField
    } else if cursor < PRESET_COUNT + 2 + KIND_COUNT {
        Slot::Kind(cursor - PRESET_COUNT - 2)
    } else {
        Slot::Submit
    }
}

fn resolve_ownerships(cursor: usize, dims: &Dims) -> Slot {
    let fields = Section::Ownerships.field_count();
    if cursor < fields {
        return Slot::Field(cursor);
    }
    let after_fields = cursor - fields;
    if after_fields < dims.pending {
        return Slot::PendingKey(after_fields);
    }
    match after_fields - dims.pending {
        0 => Slot::AddAuthorizedKey,
        1 => Slot::LoadNetworkKey,
        2 => Slot::CommitOwnership,
        n => Slot::Entry(n - 3),
    }
}

/// Moves the cursor one step with wraparound over a space of `space` slots.
pub fn step(cursor: usize, dir: MoveDir, space: usize) -> usize {
    if space == 0 {
        return 0;
    }
    match dir {
        MoveDir::Forward => {
            if cursor + 1 >= space {
                0
            } else {
                cursor + 1
            }
        }
        MoveDir::Backward => {
            if cursor == 0 {
                space - 1
            } else {
                cursor - 1
            }
        }
    }
}

/// Re-clamps a possibly stale cursor after the space shrank.
pub fn clamp(cursor: usize, space: usize) -> usize {
    cursor.min(space.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Section::Main, Dims::main(false), 16)]
    #[case(Section::Main, Dims::main(true), 10)]
    #[case(Section::UcoTransfers, Dims::list(0), 3)]
    #[case(Section::UcoTransfers, Dims::list(4), 7)]
    #[case(Section::TokenTransfers, Dims::list(2), 7)]
    #[case(Section::Recipients, Dims::list(0), 2)]
    #[case(Section::Ownerships, Dims::ownerships(0, 0), 5)]
    #[case(Section::Ownerships, Dims::ownerships(2, 3), 10)]
    #[case(Section::Content, Dims::default(), 2)]
    fn virtual_space_sizes(
        #[case] section: Section,
        #[case] dims: Dims,
        #[case] expected: usize,
    ) {
        assert_eq!(virtual_space(section, &dims), expected);
    }

    #[rstest]
    #[case(Section::Main, Dims::main(false))]
    #[case(Section::Main, Dims::main(true))]
    #[case(Section::UcoTransfers, Dims::list(3))]
    #[case(Section::TokenTransfers, Dims::list(0))]
    #[case(Section::Recipients, Dims::list(5))]
    #[case(Section::Ownerships, Dims::ownerships(2, 1))]
    #[case(Section::Content, Dims::default())]
    fn wraparound_is_closed(#[case] section: Section, #[case] dims: Dims) {
        let space = virtual_space(section, &dims);
        for start in 0..space {
            let mut cursor = start;
            for _ in 0..space {
                cursor = step(cursor, MoveDir::Forward, space);
                assert!(cursor < space);
            }
            assert_eq!(cursor, start, "forward closure from {start}");
            for _ in 0..space {
                cursor = step(cursor, MoveDir::Backward, space);
                assert!(cursor < space);
            }
            assert_eq!(cursor, start, "backward closure from {start}");
        }
    }

    #[test]
    fn service_mode_never_visits_endpoint_region() {
        let dims = Dims::main(true);
        let space = virtual_space(Section::Main, &dims);
        for cursor in 0..space {
            let slot = resolve(Section::Main, cursor, &dims);
            assert!(
                !matches!(
                    slot,
                    Slot::EndpointPreset(_) | Slot::EndpointField | Slot::SeedField
                ),
                "cursor {cursor} resolved to {slot:?}"
            );
        }
    }

    #[test]
    fn full_mode_visits_endpoint_region() {
        let dims = Dims::main(false);
        let space = virtual_space(Section::Main, &dims);
        let slots: Vec<Slot> = (0..space)
            .map(|c| resolve(Section::Main, c, &dims))
            .collect();
        assert!(slots.contains(&Slot::EndpointPreset(0)));
        assert!(slots.contains(&Slot::EndpointField));
        assert!(slots.contains(&Slot::SeedField));
        assert_eq!(slots[space - 1], Slot::Submit);
    }

    #[test]
    fn main_service_mode_starts_at_kinds() {
        let dims = Dims::main(true);
        assert_eq!(resolve(Section::Main, 0, &dims), Slot::Kind(0));
        assert_eq!(
            resolve(Section::Main, KIND_COUNT - 1, &dims),
            Slot::Kind(KIND_COUNT - 1)
        );
        assert_eq!(resolve(Section::Main, KIND_COUNT, &dims), Slot::Submit);
    }

    #[test]
    fn list_section_addressing() {
        let dims = Dims::list(2);
        assert_eq!(resolve(Section::UcoTransfers, 0, &dims), Slot::Field(0));
        assert_eq!(resolve(Section::UcoTransfers, 1, &dims), Slot::Field(1));
        assert_eq!(resolve(Section::UcoTransfers, 2, &dims), Slot::Add);
        assert_eq!(resolve(Section::UcoTransfers, 3, &dims), Slot::Entry(0));
        assert_eq!(resolve(Section::UcoTransfers, 4, &dims), Slot::Entry(1));
    }

    #[test]
    fn ownerships_interleaves_pending_keys_and_actions() {
        let dims = Dims::ownerships(2, 1);
        let slots: Vec<Slot> = (0..virtual_space(Section::Ownerships, &dims))
            .map(|c| resolve(Section::Ownerships, c, &dims))
            .collect();
        assert_eq!(
            slots,
            vec![
                Slot::Field(0),
                Slot::Field(1),
                Slot::PendingKey(0),
                Slot::PendingKey(1),
                Slot::AddAuthorizedKey,
                Slot::LoadNetworkKey,
                Slot::CommitOwnership,
                Slot::Entry(0),
            ]
        );
    }

    #[test]
    fn resolve_clamps_out_of_range_cursor() {
        let dims = Dims::list(0);
        assert_eq!(resolve(Section::Recipients, 99, &dims), Slot::Add);
    }

    #[test]
    fn section_cycling_clamps_at_ends() {
        assert_eq!(Section::Main.prev(), Section::Main);
        assert_eq!(Section::Content.next(), Section::Content);
        assert_eq!(Section::Main.next(), Section::UcoTransfers);
        assert_eq!(Section::Content.prev(), Section::Ownerships);
    }
}
