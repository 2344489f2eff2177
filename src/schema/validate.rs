//! Exhaustive load-time validation of a ballot definition.
//!
//! Every structural invariant is checked in one pass over the whole
//! definition; violations are collected, never short-circuited, so the
//! authoring tool sees the complete list. Once `validate_ballot`
//! passes, every index the interpreter, resolver, or frame assembler
//! dereferences at runtime is in range by construction and is never
//! re-checked.

use crate::ballot::model::{
    ActionDef, BallotDef, GroupDef, GroupKind, ImageDef, PageDef, SegmentDef, SegmentKind,
    SelectOp, SequenceDef, StateDef,
};
use crate::ballot::slots::walk_page;
use crate::foundation::core::{RectDef, SpriteSize, opt_index};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One element of a violation's index path.
pub enum PathElem {
    /// Named field.
    Field(&'static str),
    /// Collection index.
    Index(usize),
}

#[derive(Debug, Clone)]
/// A single broken invariant: the offending entity and the rule.
pub struct Violation {
    /// Entity kind the rule applies to (`"option"`, `"segment"`, ...).
    pub entity: &'static str,
    /// Index path from the ballot root to the offending entity.
    pub path: Vec<PathElem>,
    /// Human-readable rule description.
    pub message: String,
}

impl Violation {
    fn at(entity: &'static str, path: &[PathElem], message: impl Into<String>) -> Self {
        Self {
            entity,
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.entity,
            format_path(&self.path),
            self.message
        )
    }
}

fn format_path(path: &[PathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            PathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
/// The complete, ordered list of violations found in one pass.
pub struct Violations {
    /// Violations in discovery order.
    pub violations: Vec<Violation>,
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

/// Sequence-resolution context available at a given sequence site.
#[derive(Clone, Copy, Default)]
struct SeqCtx {
    /// Group of the owning state's option area, when the state has one.
    state_group: Option<usize>,
    /// Group of the owning action's option area, when the action has one.
    action_group: Option<usize>,
}

/// Validate a full ballot definition, collecting every violation.
#[tracing::instrument(skip(def))]
pub fn validate_ballot(def: &BallotDef) -> Result<(), Violations> {
    let mut errors = Vec::new();

    validate_structure(def, &mut errors);
    validate_media(def, &mut errors);
    validate_groups(def, &mut errors);
    for (page_i, page) in def.model.pages.iter().enumerate() {
        validate_page(def, page_i, page, &mut errors);
    }
    validate_area_census(def, &mut errors);
    validate_size_classes(def, &mut errors);
    validate_geometry(def, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Violations { violations: errors })
    }
}

fn validate_structure(def: &BallotDef, errors: &mut Vec<Violation>) {
    if def.model.pages.is_empty() {
        errors.push(Violation::at(
            "model",
            &[PathElem::Field("model"), PathElem::Field("pages")],
            "a ballot must have at least one page",
        ));
    }
    if def.video.layouts.len() != def.model.pages.len() {
        errors.push(Violation::at(
            "video",
            &[PathElem::Field("video"), PathElem::Field("layouts")],
            format!(
                "layout count {} must equal page count {}",
                def.video.layouts.len(),
                def.model.pages.len()
            ),
        ));
    }
}

fn validate_media(def: &BallotDef, errors: &mut Vec<Violation>) {
    if def.video.width == 0 || def.video.height == 0 {
        errors.push(Violation::at(
            "video",
            &[PathElem::Field("video")],
            "canvas width and height must be non-zero",
        ));
    }
    if def.audio.sample_rate == 0 {
        errors.push(Violation::at(
            "audio",
            &[PathElem::Field("audio"), PathElem::Field("sample_rate")],
            "sample rate must be non-zero",
        ));
    }

    for (i, layout) in def.video.layouts.iter().enumerate() {
        let path = [
            PathElem::Field("video"),
            PathElem::Field("layouts"),
            PathElem::Index(i),
            PathElem::Field("screen"),
        ];
        validate_image(&layout.screen, "layout", &path, errors);
        if layout.screen.width != def.video.width || layout.screen.height != def.video.height {
            errors.push(Violation::at(
                "layout",
                &path,
                format!(
                    "screen image {}x{} must match canvas {}x{}",
                    layout.screen.width, layout.screen.height, def.video.width, def.video.height
                ),
            ));
        }
    }

    for (i, sprite) in def.video.sprites.iter().enumerate() {
        let path = [
            PathElem::Field("video"),
            PathElem::Field("sprites"),
            PathElem::Index(i),
        ];
        validate_image(sprite, "sprite", &path, errors);
    }
}

fn validate_image(
    image: &ImageDef,
    entity: &'static str,
    path: &[PathElem],
    errors: &mut Vec<Violation>,
) {
    let expected = image.width as usize * image.height as usize;
    if image.pixels.len() != expected {
        errors.push(Violation::at(
            entity,
            path,
            format!(
                "pixel array length {} must equal width * height = {expected}",
                image.pixels.len()
            ),
        ));
    }
}

fn validate_groups(def: &BallotDef, errors: &mut Vec<Violation>) {
    let groups = &def.model.groups;
    let sprites = def.video.sprites.len();
    let clips = def.audio.clips.len();

    for (group_i, group) in groups.iter().enumerate() {
        let gpath = [
            PathElem::Field("model"),
            PathElem::Field("groups"),
            PathElem::Index(group_i),
        ];

        if group.kind == GroupKind::WriteIn && group.max_chars != 0 {
            errors.push(Violation::at(
                "group",
                &gpath,
                "a write-in group must have max_chars == 0",
            ));
        }

        for (option_i, option) in group.options.iter().enumerate() {
            let opath = [
                gpath.as_slice(),
                &[PathElem::Field("options"), PathElem::Index(option_i)],
            ]
            .concat();

            match group.kind {
                GroupKind::WriteIn => {
                    if option.unsel_sprite_i != -1 {
                        errors.push(Violation::at(
                            "option",
                            &opath,
                            "a write-in group option must have unsel_sprite_i == -1",
                        ));
                    }
                    if option.writein_group_i != -1 {
                        errors.push(Violation::at(
                            "option",
                            &opath,
                            "a write-in group option must have writein_group_i == -1",
                        ));
                    }
                }
                GroupKind::Contest => {
                    if !index_ok(option.unsel_sprite_i, sprites, false) {
                        errors.push(Violation::at(
                            "option",
                            &opath,
                            format!(
                                "unsel_sprite_i {} out of sprite range {sprites}",
                                option.unsel_sprite_i
                            ),
                        ));
                    }
                    validate_writein_ref(groups, group, option.writein_group_i, &opath, errors);
                }
            }

            if !index_ok(option.sel_sprite_i, sprites, false) {
                errors.push(Violation::at(
                    "option",
                    &opath,
                    format!(
                        "sel_sprite_i {} out of sprite range {sprites}",
                        option.sel_sprite_i
                    ),
                ));
            }
            if !index_ok(option.clip_i, clips, false) {
                errors.push(Violation::at(
                    "option",
                    &opath,
                    format!("clip_i {} out of clip range {clips}", option.clip_i),
                ));
            }
        }
    }
}

fn validate_writein_ref(
    groups: &[GroupDef],
    owner: &GroupDef,
    writein_group_i: i32,
    opath: &[PathElem],
    errors: &mut Vec<Violation>,
) {
    if writein_group_i == -1 {
        return;
    }
    let Some(sub) = opt_index(writein_group_i).and_then(|g| groups.get(g)) else {
        errors.push(Violation::at(
            "option",
            opath,
            format!(
                "writein_group_i {writein_group_i} out of group range {}",
                groups.len()
            ),
        ));
        return;
    };
    if sub.kind != GroupKind::WriteIn {
        errors.push(Violation::at(
            "option",
            opath,
            format!("writein_group_i {writein_group_i} must reference a write-in group"),
        ));
        return;
    }
    if owner.max_chars == 0 {
        errors.push(Violation::at(
            "option",
            opath,
            "an option with a write-in sub-group requires max_chars > 0 on its contest",
        ));
    }
    if sub.max_sels != owner.max_chars {
        errors.push(Violation::at(
            "option",
            opath,
            format!(
                "write-in sub-group max_sels {} must equal the contest's max_chars {}",
                sub.max_sels, owner.max_chars
            ),
        ));
    }
}

fn validate_page(def: &BallotDef, page_i: usize, page: &PageDef, errors: &mut Vec<Violation>) {
    let groups = &def.model.groups;
    let sprites = def.video.sprites.len();
    let ppath = [
        PathElem::Field("model"),
        PathElem::Field("pages"),
        PathElem::Index(page_i),
    ];

    if page.states.is_empty() {
        errors.push(Violation::at(
            "page",
            &[ppath.as_slice(), &[PathElem::Field("states")]].concat(),
            "a page must have at least one state",
        ));
    }

    let layout = def.video.layouts.get(page_i);
    if let Some(layout) = layout {
        if page.target_bindings.len() != layout.targets.len() {
            errors.push(Violation::at(
                "page",
                &[ppath.as_slice(), &[PathElem::Field("target_bindings")]].concat(),
                format!(
                    "target binding count {} must equal layout target count {}",
                    page.target_bindings.len(),
                    layout.targets.len()
                ),
            ));
        }
        let walk = walk_page(groups, page);
        if layout.slots.len() != walk.total {
            errors.push(Violation::at(
                "layout",
                &[
                    PathElem::Field("video"),
                    PathElem::Field("layouts"),
                    PathElem::Index(page_i),
                    PathElem::Field("slots"),
                ],
                format!(
                    "slot count {} must equal the page's slot-walk total {}",
                    layout.slots.len(),
                    walk.total
                ),
            ));
        }
    }

    for (state_i, state) in page.states.iter().enumerate() {
        validate_state(def, page_i, page, state_i, state, errors);
    }

    for (i, binding) in page.key_bindings.iter().enumerate() {
        let path = [
            ppath.as_slice(),
            &[
                PathElem::Field("key_bindings"),
                PathElem::Index(i),
                PathElem::Field("action"),
            ],
        ]
        .concat();
        validate_action(def, page_i, page, &path, &binding.action, None, errors);
    }
    for (i, binding) in page.target_bindings.iter().enumerate() {
        let path = [
            ppath.as_slice(),
            &[
                PathElem::Field("target_bindings"),
                PathElem::Index(i),
                PathElem::Field("action"),
            ],
        ]
        .concat();
        validate_action(def, page_i, page, &path, &binding.action, None, errors);
    }

    for (i, area) in page.option_areas.iter().enumerate() {
        let path = [
            ppath.as_slice(),
            &[PathElem::Field("option_areas"), PathElem::Index(i)],
        ]
        .concat();
        match opt_index(area.group_i).and_then(|g| groups.get(g)) {
            Some(group) => {
                if !index_ok(area.option_i, group.options.len(), true) {
                    errors.push(Violation::at(
                        "option_area",
                        &path,
                        format!(
                            "option_i {} out of option range {}",
                            area.option_i,
                            group.options.len()
                        ),
                    ));
                }
            }
            None => errors.push(Violation::at(
                "option_area",
                &path,
                format!("group_i {} out of group range {}", area.group_i, groups.len()),
            )),
        }
    }

    let walk = walk_page(groups, page);
    for (i, area) in page.counter_areas.iter().enumerate() {
        let path = [
            ppath.as_slice(),
            &[PathElem::Field("counter_areas"), PathElem::Index(i)],
        ]
        .concat();
        let Some(group) = opt_index(area.group_i).and_then(|g| groups.get(g)) else {
            errors.push(Violation::at(
                "counter_area",
                &path,
                format!("group_i {} out of group range {}", area.group_i, groups.len()),
            ));
            continue;
        };
        let top = i64::from(area.sprite_i) + i64::from(group.max_sels);
        if area.sprite_i < 0 || top >= sprites as i64 {
            errors.push(Violation::at(
                "counter_area",
                &path,
                format!(
                    "count sprite range {}..={top} out of sprite range {sprites}",
                    area.sprite_i
                ),
            ));
            continue;
        }
        // Every count sprite must fit the counter's slot.
        let slot_size = layout
            .and_then(|l| l.slots.get(walk.counter_areas[i]))
            .map(|r| r.size());
        if let Some(slot_size) = slot_size {
            for n in 0..=group.max_sels as usize {
                let sprite = &def.video.sprites[area.sprite_i as usize + n];
                if sprite.size() != slot_size {
                    errors.push(Violation::at(
                        "counter_area",
                        &path,
                        format!(
                            "count sprite {} is {}x{} but the counter slot is {}x{}",
                            area.sprite_i as usize + n,
                            sprite.width,
                            sprite.height,
                            slot_size.width,
                            slot_size.height
                        ),
                    ));
                }
            }
        }
    }

    for (i, area) in page.review_areas.iter().enumerate() {
        let path = [
            ppath.as_slice(),
            &[PathElem::Field("review_areas"), PathElem::Index(i)],
        ]
        .concat();
        if opt_index(area.group_i).and_then(|g| groups.get(g)).is_none() {
            errors.push(Violation::at(
                "review_area",
                &path,
                format!("group_i {} out of group range {}", area.group_i, groups.len()),
            ));
        }
        if !index_ok(area.cursor_sprite_i, sprites, true) {
            errors.push(Violation::at(
                "review_area",
                &path,
                format!(
                    "cursor_sprite_i {} out of sprite range {sprites}",
                    area.cursor_sprite_i
                ),
            ));
        }
    }
}

fn validate_state(
    def: &BallotDef,
    page_i: usize,
    page: &PageDef,
    state_i: usize,
    state: &StateDef,
    errors: &mut Vec<Violation>,
) {
    let spath = [
        PathElem::Field("model"),
        PathElem::Field("pages"),
        PathElem::Index(page_i),
        PathElem::Field("states"),
        PathElem::Index(state_i),
    ];
    let sprites = def.video.sprites.len();

    if !index_ok(state.sprite_i, sprites, true) {
        errors.push(Violation::at(
            "state",
            &spath,
            format!("sprite_i {} out of sprite range {sprites}", state.sprite_i),
        ));
    } else if let Some(sprite_i) = opt_index(state.sprite_i) {
        // Highlight sprite must fit the state's positional slot.
        let slot = def
            .video
            .layouts
            .get(page_i)
            .and_then(|l| l.slots.get(state_i));
        if let Some(slot) = slot {
            let sprite = &def.video.sprites[sprite_i];
            if sprite.size() != slot.size() {
                errors.push(Violation::at(
                    "state",
                    &spath,
                    format!(
                        "highlight sprite {}x{} must match slot {}x{}",
                        sprite.width, sprite.height, slot.width, slot.height
                    ),
                ));
            }
        }
    }

    if !index_ok(state.option_area_i, page.option_areas.len(), true) {
        errors.push(Violation::at(
            "state",
            &spath,
            format!(
                "option_area_i {} out of option area range {}",
                state.option_area_i,
                page.option_areas.len()
            ),
        ));
    }

    validate_goto(
        def,
        page_i,
        "state",
        &spath,
        state.timeout_page_i,
        state.timeout_state_i,
        errors,
    );

    let ctx = SeqCtx {
        state_group: state_area_group(def, page, state),
        action_group: None,
    };
    validate_sequence(
        def,
        &[spath.as_slice(), &[PathElem::Field("entry_sequence")]].concat(),
        &state.entry_sequence,
        ctx,
        errors,
    );
    validate_sequence(
        def,
        &[spath.as_slice(), &[PathElem::Field("timeout_sequence")]].concat(),
        &state.timeout_sequence,
        ctx,
        errors,
    );

    for (i, binding) in state.key_bindings.iter().enumerate() {
        let path = [
            spath.as_slice(),
            &[
                PathElem::Field("key_bindings"),
                PathElem::Index(i),
                PathElem::Field("action"),
            ],
        ]
        .concat();
        validate_action(
            def,
            page_i,
            page,
            &path,
            &binding.action,
            ctx.state_group,
            errors,
        );
    }
}

/// Group of the option area a state designates as its current option.
fn state_area_group(def: &BallotDef, page: &PageDef, state: &StateDef) -> Option<usize> {
    let area = opt_index(state.option_area_i).and_then(|i| page.option_areas.get(i))?;
    let group_i = opt_index(area.group_i)?;
    def.model.groups.get(group_i).map(|_| group_i)
}

fn validate_action(
    def: &BallotDef,
    page_i: usize,
    page: &PageDef,
    apath: &[PathElem],
    action: &ActionDef,
    state_group: Option<usize>,
    errors: &mut Vec<Violation>,
) {
    let groups = &def.model.groups;

    for (i, group_i) in action.clear_group_is.iter().enumerate() {
        if opt_index(*group_i).and_then(|g| groups.get(g)).is_none() {
            errors.push(Violation::at(
                "action",
                &[
                    apath,
                    &[PathElem::Field("clear_group_is"), PathElem::Index(i)],
                ]
                .concat(),
                format!("group_i {group_i} out of group range {}", groups.len()),
            ));
        }
    }

    if action.option_op.is_some() != !action.option_refs.is_empty() {
        errors.push(Violation::at(
            "action",
            apath,
            "option_op and option_refs must be present together",
        ));
    }
    for (i, option_ref) in action.option_refs.iter().enumerate() {
        let rpath = [
            apath,
            &[PathElem::Field("option_refs"), PathElem::Index(i)],
        ]
        .concat();
        match opt_index(option_ref.group_i).and_then(|g| groups.get(g)) {
            Some(group) => {
                if !index_ok(option_ref.option_i, group.options.len(), false) {
                    errors.push(Violation::at(
                        "action",
                        &rpath,
                        format!(
                            "option_i {} out of option range {}",
                            option_ref.option_i,
                            group.options.len()
                        ),
                    ));
                }
                if let Some(op) = action.option_op {
                    validate_op_kind(op, group.kind, &rpath, errors);
                }
            }
            None => errors.push(Violation::at(
                "action",
                &rpath,
                format!(
                    "group_i {} out of group range {}",
                    option_ref.group_i,
                    groups.len()
                ),
            )),
        }
    }

    if !index_ok(action.option_area_i, page.option_areas.len(), true) {
        errors.push(Violation::at(
            "action",
            apath,
            format!(
                "option_area_i {} out of option area range {}",
                action.option_area_i,
                page.option_areas.len()
            ),
        ));
    }
    if let Some(op) = action.option_area_op {
        match opt_index(action.option_area_i).and_then(|i| page.option_areas.get(i)) {
            Some(area) => {
                if let Some(group) = opt_index(area.group_i).and_then(|g| groups.get(g)) {
                    validate_op_kind(op, group.kind, apath, errors);
                }
            }
            None => errors.push(Violation::at(
                "action",
                apath,
                "option_area_op requires a valid option_area_i",
            )),
        }
    }

    validate_goto(
        def,
        page_i,
        "action",
        apath,
        action.next_page_i,
        action.next_state_i,
        errors,
    );

    let ctx = SeqCtx {
        state_group,
        action_group: action_area_group(def, page, action),
    };
    for (field, seq) in [
        ("default_feedback", &action.default_feedback),
        ("toggle_off_feedback", &action.toggle_off_feedback),
        ("no_effect_feedback", &action.no_effect_feedback),
        ("full_feedback", &action.full_feedback),
        ("empty_feedback", &action.empty_feedback),
    ] {
        validate_sequence(
            def,
            &[apath, &[PathElem::Field(field)]].concat(),
            seq,
            ctx,
            errors,
        );
    }
}

/// Group of the option area an action designates as its current option.
fn action_area_group(def: &BallotDef, page: &PageDef, action: &ActionDef) -> Option<usize> {
    let area = opt_index(action.option_area_i).and_then(|i| page.option_areas.get(i))?;
    let group_i = opt_index(area.group_i)?;
    def.model.groups.get(group_i).map(|_| group_i)
}

fn validate_op_kind(op: SelectOp, kind: GroupKind, path: &[PathElem], errors: &mut Vec<Violation>) {
    let ok = match op {
        SelectOp::Add | SelectOp::Remove | SelectOp::Toggle => kind == GroupKind::Contest,
        SelectOp::Append | SelectOp::Append2 | SelectOp::Pop => kind == GroupKind::WriteIn,
    };
    if !ok {
        errors.push(Violation::at(
            "action",
            path,
            format!("operator {op:?} does not apply to a {kind:?} group"),
        ));
    }
}

fn validate_goto(
    def: &BallotDef,
    owning_page_i: usize,
    entity: &'static str,
    path: &[PathElem],
    page_i: i32,
    state_i: i32,
    errors: &mut Vec<Violation>,
) {
    let pages = &def.model.pages;
    match opt_index(page_i) {
        Some(target_page) => match pages.get(target_page) {
            Some(page) => {
                if !index_ok(state_i, page.states.len(), false) {
                    errors.push(Violation::at(
                        entity,
                        path,
                        format!(
                            "target state {state_i} out of state range {} of page {target_page}",
                            page.states.len()
                        ),
                    ));
                }
            }
            None => errors.push(Violation::at(
                entity,
                path,
                format!("target page {page_i} out of page range {}", pages.len()),
            )),
        },
        None => {
            // Staying on the owning page; the state may still change.
            let states = pages.get(owning_page_i).map_or(0, |p| p.states.len());
            if !index_ok(state_i, states, true) {
                errors.push(Violation::at(
                    entity,
                    path,
                    format!("target state {state_i} out of state range {states}"),
                ));
            }
        }
    }
}

fn validate_sequence(
    def: &BallotDef,
    path: &[PathElem],
    seq: &SequenceDef,
    ctx: SeqCtx,
    errors: &mut Vec<Violation>,
) {
    for (i, segment) in seq.segments.iter().enumerate() {
        let spath = [path, &[PathElem::Field("segments"), PathElem::Index(i)]].concat();
        validate_segment(def, &spath, segment, ctx, errors);
    }
}

fn validate_segment(
    def: &BallotDef,
    path: &[PathElem],
    segment: &SegmentDef,
    ctx: SeqCtx,
    errors: &mut Vec<Violation>,
) {
    let groups = &def.model.groups;
    let clips = def.audio.clips.len();

    if segment.clip_i < 0 {
        errors.push(Violation::at(
            "segment",
            path,
            format!("clip_i {} must be non-negative", segment.clip_i),
        ));
        return;
    }

    let explicit_ref = || -> Option<(usize, usize)> {
        let group_i = opt_index(segment.group_i)?;
        let group = groups.get(group_i)?;
        let option_i = opt_index(segment.option_i)?;
        if option_i < group.options.len() {
            Some((group_i, option_i))
        } else {
            None
        }
    };
    let explicit_group = || opt_index(segment.group_i).filter(|g| *g < groups.len());

    match segment.kind {
        SegmentKind::Clip => {
            check_clip(segment.clip_i as usize, clips, path, errors);
        }
        SegmentKind::Option => match explicit_ref() {
            Some((group_i, option_i)) => {
                let option = &groups[group_i].options[option_i];
                check_option_offset(def, group_i, option, segment.clip_i, path, errors);
            }
            None => push_bad_ref(segment, groups.len(), path, errors),
        },
        SegmentKind::StateOption => {
            check_group_closure(def, ctx.state_group, segment, "state", path, errors);
        }
        SegmentKind::ActionOption => {
            check_group_closure(def, ctx.action_group, segment, "action", path, errors);
        }
        SegmentKind::OptionSelected => {
            if explicit_ref().is_none() {
                push_bad_ref(segment, groups.len(), path, errors);
            }
            check_clip(segment.clip_i as usize + 1, clips, path, errors);
        }
        SegmentKind::StateOptionSelected => {
            if ctx.state_group.is_none() {
                push_missing_ctx("state", path, errors);
            }
            check_clip(segment.clip_i as usize + 1, clips, path, errors);
        }
        SegmentKind::ActionOptionSelected => {
            if ctx.action_group.is_none() {
                push_missing_ctx("action", path, errors);
            }
            check_clip(segment.clip_i as usize + 1, clips, path, errors);
        }
        SegmentKind::GroupSelections => match explicit_group() {
            Some(group_i) => {
                for option in &groups[group_i].options {
                    check_option_offset(def, group_i, option, segment.clip_i, path, errors);
                }
            }
            None => push_bad_ref(segment, groups.len(), path, errors),
        },
        SegmentKind::SelectionCount | SegmentKind::MaxSels => match explicit_group() {
            Some(group_i) => {
                let top = segment.clip_i as usize + groups[group_i].max_sels as usize;
                check_clip(top, clips, path, errors);
            }
            None => push_bad_ref(segment, groups.len(), path, errors),
        },
    }
}

/// Closure for the current-option segment kinds: the current option
/// varies at runtime (and rotation may refill areas), so every option
/// of the contextual group must support the authored offset.
fn check_group_closure(
    def: &BallotDef,
    group: Option<usize>,
    segment: &SegmentDef,
    role: &str,
    path: &[PathElem],
    errors: &mut Vec<Violation>,
) {
    let Some(group_i) = group else {
        push_missing_ctx(role, path, errors);
        return;
    };
    for option in &def.model.groups[group_i].options {
        check_option_offset(def, group_i, option, segment.clip_i, path, errors);
    }
}

fn check_option_offset(
    def: &BallotDef,
    group_i: usize,
    option: &crate::ballot::model::OptionDef,
    offset: i32,
    path: &[PathElem],
    errors: &mut Vec<Violation>,
) {
    let clips = def.audio.clips.len();
    if option.clip_i < 0 {
        // Flagged by the group checks already.
        return;
    }
    let pick = option.clip_i as usize + offset as usize;
    if pick >= clips {
        errors.push(Violation::at(
            "segment",
            path,
            format!(
                "option clip {} + offset {offset} out of clip range {clips} (group {group_i})",
                option.clip_i
            ),
        ));
    }
    // Write-in expansion plays each character's base clip, which the
    // per-option clip_i bound already covers.
}

fn check_clip(pick: usize, clips: usize, path: &[PathElem], errors: &mut Vec<Violation>) {
    if pick >= clips {
        errors.push(Violation::at(
            "segment",
            path,
            format!("clip pick {pick} out of clip range {clips}"),
        ));
    }
}

fn push_bad_ref(segment: &SegmentDef, groups: usize, path: &[PathElem], errors: &mut Vec<Violation>) {
    errors.push(Violation::at(
        "segment",
        path,
        format!(
            "invalid (group_i {}, option_i {}) reference (group range {groups})",
            segment.group_i, segment.option_i
        ),
    ));
}

fn push_missing_ctx(role: &str, path: &[PathElem], errors: &mut Vec<Violation>) {
    errors.push(Violation::at(
        "segment",
        path,
        format!("segment requires a current {role} option but none is bound"),
    ));
}

/// Per-group option-area census and the explicit-area rule for
/// write-in-carrying options.
fn validate_area_census(def: &BallotDef, errors: &mut Vec<Violation>) {
    let groups = &def.model.groups;
    let mut counts = vec![0usize; groups.len()];
    for page in &def.model.pages {
        for area in &page.option_areas {
            if let Some(g) = opt_index(area.group_i).filter(|g| *g < groups.len()) {
                counts[g] += 1;
            }
        }
    }
    for (group_i, group) in groups.iter().enumerate() {
        if counts[group_i] != group.options.len() {
            errors.push(Violation::at(
                "group",
                &[
                    PathElem::Field("model"),
                    PathElem::Field("groups"),
                    PathElem::Index(group_i),
                ],
                format!(
                    "option area count {} must equal option count {}",
                    counts[group_i],
                    group.options.len()
                ),
            ));
        }

        for (option_i, option) in group.options.iter().enumerate() {
            if option.writein_group_i == -1 {
                continue;
            }
            let bound = def.model.pages.iter().any(|page| {
                page.option_areas.iter().any(|area| {
                    area.group_i == group_i as i32 && area.option_i == option_i as i32
                })
            });
            if !bound {
                errors.push(Violation::at(
                    "option",
                    &[
                        PathElem::Field("model"),
                        PathElem::Field("groups"),
                        PathElem::Index(group_i),
                        PathElem::Field("options"),
                        PathElem::Index(option_i),
                    ],
                    "an option with a write-in sub-group must be bound by an option area",
                ));
            }
        }
    }
}

/// A size-class member: the measured size plus where it came from.
struct Measured {
    size: SpriteSize,
    what: String,
}

/// Size-equality classes per group: option sprites, option-area base
/// slots, review base slots and cursors form one class; character
/// slots and character sprites form a second class on contests with
/// write-ins.
fn validate_size_classes(def: &BallotDef, errors: &mut Vec<Violation>) {
    let groups = &def.model.groups;
    let mut option_sizes: Vec<Vec<Measured>> = (0..groups.len()).map(|_| Vec::new()).collect();
    let mut char_sizes: Vec<Vec<Measured>> = (0..groups.len()).map(|_| Vec::new()).collect();

    for (group_i, group) in groups.iter().enumerate() {
        for (option_i, option) in group.options.iter().enumerate() {
            for (field, sprite_i) in [
                ("unsel_sprite", option.unsel_sprite_i),
                ("sel_sprite", option.sel_sprite_i),
            ] {
                if let Some(sprite) = opt_index(sprite_i).and_then(|i| def.video.sprites.get(i)) {
                    option_sizes[group_i].push(Measured {
                        size: sprite.size(),
                        what: format!("{field} of option {option_i}"),
                    });
                }
            }
            if let Some(sub) = opt_index(option.writein_group_i)
                .and_then(|g| groups.get(g))
                .filter(|g| g.kind == GroupKind::WriteIn)
                && let Some(first) = sub.options.first()
                && let Some(sprite) =
                    opt_index(first.sel_sprite_i).and_then(|i| def.video.sprites.get(i))
            {
                char_sizes[group_i].push(Measured {
                    size: sprite.size(),
                    what: format!("character sprite of option {option_i}'s write-in group"),
                });
            }
        }
    }

    for (page_i, page) in def.model.pages.iter().enumerate() {
        let Some(layout) = def.video.layouts.get(page_i) else {
            continue;
        };
        let walk = walk_page(groups, page);

        for (i, area) in page.option_areas.iter().enumerate() {
            let Some(group_i) = opt_index(area.group_i).filter(|g| *g < groups.len()) else {
                continue;
            };
            let slots = &walk.option_areas[i];
            if let Some(slot) = layout.slots.get(slots.base) {
                option_sizes[group_i].push(Measured {
                    size: slot.size(),
                    what: format!("option area {i} slot on page {page_i}"),
                });
            }
            for c in 0..slots.chars_len {
                if let Some(slot) = layout.slots.get(slots.chars_start + c) {
                    char_sizes[group_i].push(Measured {
                        size: slot.size(),
                        what: format!("option area {i} character slot {c} on page {page_i}"),
                    });
                }
            }
        }

        for (i, area) in page.review_areas.iter().enumerate() {
            let Some(group_i) = opt_index(area.group_i).filter(|g| *g < groups.len()) else {
                continue;
            };
            if let Some(sprite) =
                opt_index(area.cursor_sprite_i).and_then(|s| def.video.sprites.get(s))
            {
                option_sizes[group_i].push(Measured {
                    size: sprite.size(),
                    what: format!("cursor sprite of review area {i} on page {page_i}"),
                });
            }
            let slots = &walk.review_areas[i];
            for block in 0..slots.blocks {
                let base = slots.start + block * slots.block_len;
                if let Some(slot) = layout.slots.get(base) {
                    option_sizes[group_i].push(Measured {
                        size: slot.size(),
                        what: format!("review area {i} block {block} slot on page {page_i}"),
                    });
                }
                for c in 1..slots.block_len {
                    if let Some(slot) = layout.slots.get(base + c) {
                        char_sizes[group_i].push(Measured {
                            size: slot.size(),
                            what: format!(
                                "review area {i} block {block} character slot {} on page {page_i}",
                                c - 1
                            ),
                        });
                    }
                }
            }
        }
    }

    for (group_i, class) in option_sizes.iter().enumerate() {
        report_size_class(group_i, class, errors);
    }
    for (group_i, class) in char_sizes.iter().enumerate() {
        report_size_class(group_i, class, errors);
    }
}

fn report_size_class(group_i: usize, class: &[Measured], errors: &mut Vec<Violation>) {
    let Some(anchor) = class.first() else {
        return;
    };
    for member in &class[1..] {
        if member.size != anchor.size {
            errors.push(Violation::at(
                "group",
                &[
                    PathElem::Field("model"),
                    PathElem::Field("groups"),
                    PathElem::Index(group_i),
                ],
                format!(
                    "{} is {}x{} but {} is {}x{}",
                    member.what,
                    member.size.width,
                    member.size.height,
                    anchor.what,
                    anchor.size.width,
                    anchor.size.height
                ),
            ));
        }
    }
}

fn validate_geometry(def: &BallotDef, errors: &mut Vec<Violation>) {
    for (layout_i, layout) in def.video.layouts.iter().enumerate() {
        let lpath = [
            PathElem::Field("video"),
            PathElem::Field("layouts"),
            PathElem::Index(layout_i),
        ];
        for (field, rects) in [("targets", &layout.targets), ("slots", &layout.slots)] {
            for (i, rect) in rects.iter().enumerate() {
                if u64::from(rect.left) + u64::from(rect.width) > u64::from(def.video.width)
                    || u64::from(rect.top) + u64::from(rect.height) > u64::from(def.video.height)
                {
                    errors.push(Violation::at(
                        "layout",
                        &[lpath.as_slice(), &[PathElem::Field(field), PathElem::Index(i)]]
                            .concat(),
                        "rectangle extends outside the canvas",
                    ));
                }
            }
            validate_no_overlap(&lpath, field, rects, errors);
        }
    }
}

fn validate_no_overlap(
    lpath: &[PathElem],
    field: &'static str,
    rects: &[RectDef],
    errors: &mut Vec<Violation>,
) {
    for (i, a) in rects.iter().enumerate() {
        for (j, b) in rects.iter().enumerate().skip(i + 1) {
            if a.overlaps(*b) {
                errors.push(Violation::at(
                    "layout",
                    &[lpath, &[PathElem::Field(field), PathElem::Index(j)]].concat(),
                    format!("rectangle overlaps {field}[{i}]"),
                ));
            }
        }
    }
}

fn index_ok(i: i32, len: usize, allow_none: bool) -> bool {
    match opt_index(i) {
        Some(i) => i < len,
        None => allow_none && i == -1,
    }
}
