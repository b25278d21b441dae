#![forbid(unsafe_code)]

//! Connectors between chains that share identifiers.
//!
//! A [`Band`] links the end of one chain (source) to the end of another
//! (target) and can be shown at three granularities:
//!
//! | mode | routes |
//! |------|--------|
//! | [`BandMode::Overview`] | one route over all shared ids |
//! | [`BandMode::Groups`] | one route per (source group, target group) pair with shared ids |
//! | [`BandMode::Detail`] | one route per shared id, only if both ends can locate single ids |
//!
//! Every route carries the ids it covers on both sides and a placement
//! rectangle spanning the rows it touches at either end, which is what
//! region queries test against.

use std::fmt;

use domino_core::logging::TARGET_BAND;
use domino_core::{Axis, Rect};
use domino_typed::{IdType, TypedGroup, TypedGroupList, TypedSet};

use crate::node::NodeId;

/// Granularity of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BandMode {
    /// One route over every shared id.
    Overview,
    /// One route per pair of groups.
    #[default]
    Groups,
    /// One route per shared id.
    Detail,
}

impl BandMode {
    /// One step finer. Saturates at `Detail`.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Self::Overview => Self::Groups,
            Self::Groups | Self::Detail => Self::Detail,
        }
    }

    /// One step coarser. Saturates at `Overview`.
    #[inline]
    pub fn prev(self) -> Self {
        match self {
            Self::Detail => Self::Groups,
            Self::Groups | Self::Overview => Self::Overview,
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Groups => "groups",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for BandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    #[inline]
    pub fn select<T>(self, source: T, target: T) -> T {
        match self {
            Self::Source => source,
            Self::Target => target,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Source => 0,
            Self::Target => 1,
        }
    }
}

/// One end of a band: the node whose grouped ordering it reads and where
/// that ordering is laid out.
#[derive(Debug, Clone)]
pub struct BandEnd {
    pub node: NodeId,
    pub label: String,
    pub data: TypedGroupList,
    /// Absolute bounds the rows are spread over.
    pub bounds: Rect,
    /// Axis the rows run along.
    pub axis: Axis,
    /// Whether single ids can be located at this end.
    pub detail: bool,
}

impl BandEnd {
    /// Rectangle covering the rows holding any of `ids`.
    fn segment(&self, ids: &TypedSet) -> Option<Rect> {
        let list = self.data.list();
        let rows = list.len();
        let mut hit = list
            .iter()
            .enumerate()
            .filter(|&(_, id)| ids.contains(id))
            .map(|(i, _)| i);
        let first = hit.next()?;
        let last = hit.last().unwrap_or(first);
        let b = self.bounds;
        let step = b.size().along(self.axis) / rows as f32;
        let start = b.origin().along(self.axis) + first as f32 * step;
        let len = (last - first + 1) as f32 * step;
        Some(match self.axis {
            Axis::Horizontal => Rect::new(start, b.y, len, b.height),
            Axis::Vertical => Rect::new(b.x, start, b.width, len),
        })
    }
}

/// A single drawable connection of a band.
#[derive(Debug, Clone)]
pub struct BandRoute {
    label: String,
    ids: [TypedSet; 2],
    placement: Rect,
}

impl BandRoute {
    fn new(label: String, source: TypedSet, target: TypedSet, ends: &[BandEnd; 2]) -> Self {
        let placement = match (ends[0].segment(&source), ends[1].segment(&target)) {
            (Some(s), Some(t)) => s.union(&t),
            (Some(s), None) => s,
            (None, Some(t)) => t,
            (None, None) => ends[0].bounds.union(&ends[1].bounds),
        };
        Self {
            label,
            ids: [source, target],
            placement,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ids(&self, side: Side) -> &TypedSet {
        &self.ids[side.index()]
    }

    pub fn placement(&self) -> Rect {
        self.placement
    }

    pub fn intersects(&self, region: &Rect) -> bool {
        self.placement.intersects(region)
    }
}

/// Connector between two chain ends with a chosen granularity.
#[derive(Debug, Clone)]
pub struct Band {
    identifier: String,
    ends: [BandEnd; 2],
    mode: BandMode,
    overview: BandRoute,
    groups: Vec<BandRoute>,
    details: Vec<BandRoute>,
}

impl Band {
    /// Build a band, or `None` if the ends are incompatible or share no ids.
    ///
    /// Starts at `Groups` if either end has more than one group, else at
    /// `Detail` if both ends can locate single ids, else at `Overview`.
    pub fn create(identifier: impl Into<String>, source: BandEnd, target: BandEnd) -> Option<Band> {
        let s_tag = source.data.id_type().clone();
        let t_tag = target.data.id_type().clone();
        if !s_tag.is_compatible(&t_tag) {
            return None;
        }
        let s_all = source.data.list().as_set();
        let t_all = target.data.list().as_set();
        let shared = s_all.intersect(&t_all);
        if shared.is_empty() {
            return None;
        }
        let ends = [source, target];

        let label = format!("{} x {}", ends[0].label, ends[1].label);
        let overview = BandRoute::new(
            label,
            shared.clone().retag(s_tag.clone()),
            shared.clone().retag(t_tag.clone()),
            &ends,
        );

        let mut groups = Vec::new();
        for sg in ends[0].data.groups() {
            let s_group = sg.list().as_set();
            if s_group.is_empty() {
                continue;
            }
            for tg in ends[1].data.groups() {
                let common = s_group.intersect(&tg.list().as_set());
                if common.is_empty() {
                    continue;
                }
                groups.push(BandRoute::new(
                    format!("{} x {}", sg.label(), tg.label()),
                    common.clone().retag(s_tag.clone()),
                    common.retag(t_tag.clone()),
                    &ends,
                ));
            }
        }

        let details = shared
            .iter()
            .map(|id| {
                let one = TypedSet::from_ids([id], s_tag.clone());
                BandRoute::new(id.to_string(), one.clone(), one.retag(t_tag.clone()), &ends)
            })
            .collect();

        let mode = if ends[0].data.group_count() > 1 || ends[1].data.group_count() > 1 {
            BandMode::Groups
        } else if ends[0].detail && ends[1].detail {
            BandMode::Detail
        } else {
            BandMode::Overview
        };

        let band = Band {
            identifier: identifier.into(),
            ends,
            mode,
            overview,
            groups,
            details,
        };
        domino_core::trace!(
            target: TARGET_BAND,
            id = %band.identifier,
            shared = shared.len(),
            groups = band.groups.len(),
            mode = %band.mode,
            "band created"
        );
        Some(band)
    }

    /// Stable key: `"{a}X{b}"` between blocks, `"{s}D{t}"` for gaps.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn label(&self) -> &str {
        self.overview.label()
    }

    pub fn mode(&self) -> BandMode {
        self.mode
    }

    /// Jump to `mode`. `Detail` falls back to `Groups` unless both ends
    /// support detail.
    pub fn set_mode(&mut self, mode: BandMode) {
        self.mode = self.clamped(mode);
    }

    fn clamped(&self, mode: BandMode) -> BandMode {
        match mode {
            BandMode::Detail if !self.can_have_detail() => BandMode::Groups,
            mode => mode,
        }
    }

    pub fn end(&self, side: Side) -> &BandEnd {
        &self.ends[side.index()]
    }

    pub fn id_type(&self, side: Side) -> &IdType {
        self.overview.ids(side).id_type()
    }

    pub fn overview(&self) -> &BandRoute {
        &self.overview
    }

    /// Both ends can locate single ids.
    pub fn can_have_detail(&self) -> bool {
        self.ends[0].detail && self.ends[1].detail
    }

    /// Step one level finer or coarser. Refuses to go below `Overview`,
    /// past `Detail`, or past `Groups` without detail support on both ends.
    /// Returns whether the mode changed.
    pub fn change_level(&mut self, increase: bool) -> bool {
        let target = if increase {
            match self.mode {
                BandMode::Groups if !self.can_have_detail() => return false,
                BandMode::Detail => return false,
                mode => mode.next(),
            }
        } else {
            match self.mode {
                BandMode::Overview => return false,
                mode => mode.prev(),
            }
        };
        domino_core::debug!(
            target: TARGET_BAND,
            id = %self.identifier,
            from = %self.mode,
            to = %target,
            "band level changed"
        );
        self.mode = target;
        true
    }

    pub fn increase(&mut self) -> bool {
        self.change_level(true)
    }

    pub fn decrease(&mut self) -> bool {
        self.change_level(false)
    }

    /// Routes of `mode`, without demotion.
    pub fn routes_at(&self, mode: BandMode) -> &[BandRoute] {
        match mode {
            BandMode::Overview => std::slice::from_ref(&self.overview),
            BandMode::Groups => &self.groups,
            BandMode::Detail => &self.details,
        }
    }

    /// Routes to draw. A mode with no routes demotes one level and the
    /// request is retried.
    pub fn routes(&mut self) -> &[BandRoute] {
        while self.mode != BandMode::Overview && self.routes_at(self.mode).is_empty() {
            let demoted = self.mode.prev();
            domino_core::warn!(
                target: TARGET_BAND,
                id = %self.identifier,
                from = %self.mode,
                to = %demoted,
                "empty routes, demoting band"
            );
            self.mode = demoted;
        }
        self.routes_at(self.mode)
    }

    fn route(&self, sub_index: usize) -> Option<&BandRoute> {
        match self.mode {
            BandMode::Overview => Some(&self.overview),
            mode => self.routes_at(mode).get(sub_index),
        }
    }

    /// Ids of route `sub_index` in the current mode, or of the overview
    /// route if there is no such route.
    pub fn ids(&self, side: Side, sub_index: usize) -> &TypedSet {
        self.route(sub_index).unwrap_or(&self.overview).ids(side)
    }

    /// Label of route `sub_index`, empty if there is no such route.
    pub fn label_of(&self, sub_index: usize) -> &str {
        self.route(sub_index).map_or("", BandRoute::label)
    }

    pub fn intersects(&self, region: &Rect) -> bool {
        self.overview.intersects(region)
    }

    /// Source- and target-side ids of every route of the current mode whose
    /// placement intersects `region`.
    pub fn intersecting_ids(&self, region: &Rect) -> (TypedSet, TypedSet) {
        let empty = || {
            (
                TypedSet::empty(self.id_type(Side::Source).clone()),
                TypedSet::empty(self.id_type(Side::Target).clone()),
            )
        };
        if !self.overview.intersects(region) {
            return empty();
        }
        if self.mode == BandMode::Overview {
            return (
                self.overview.ids(Side::Source).clone(),
                self.overview.ids(Side::Target).clone(),
            );
        }
        let hits: Vec<&BandRoute> = self
            .routes_at(self.mode)
            .iter()
            .filter(|r| r.intersects(region))
            .collect();
        let (s_empty, t_empty) = empty();
        let source = TypedSet::union_all(hits.iter().map(|&r| r.ids(Side::Source))).unwrap_or(s_empty);
        let target = TypedSet::union_all(hits.iter().map(|&r| r.ids(Side::Target))).unwrap_or(t_empty);
        (source, target)
    }

    /// Carry the granularity over from the band this one replaces.
    pub fn init_from(&mut self, previous: &Band) {
        self.mode = self.clamped(previous.mode);
    }
}
