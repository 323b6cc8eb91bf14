//! Rack canvas: unit-space to drawing-space mapping and placement admission.
//!
//! Rack space has its origin at the bottom edge of unit 1 and grows upwards; unit `N` covers
//! `[(N-1) * unit_height, N * unit_height)`. Canvas space is the SVG convention (y grows down).

use crate::model::{Bounds, Rect};
use crate::settings::LayoutSettings;
use rackdraw_core::{DeviceKind, DeviceRecord, HeightClass, RACK_UNITS, RejectReason, UnitIndex};
use serde::{Deserialize, Serialize};

/// Half-open vertical interval in rack space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSpan {
    pub lo: f64,
    pub hi: f64,
}

impl UnitSpan {
    pub fn height(&self) -> f64 {
        self.hi - self.lo
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RackGeometry {
    pub unit_height: f64,
    pub inner_width: f64,
    pub rail_width: f64,
    /// Thickness of the top and bottom frame bars.
    pub cap_height: f64,
    /// Outer left edge of the left rail.
    pub frame_left: f64,
    /// Outer top edge of the top frame bar.
    pub frame_top: f64,
    /// Canvas y of the top edge of unit 42.
    pub units_top: f64,
    /// Canvas y of the bottom edge of unit 1.
    pub units_bottom: f64,
    /// Left label column: text is right-aligned on `left_labels_x`.
    pub left_labels_x: f64,
    /// Right label column: text is left-aligned on `right_labels_x`.
    pub right_labels_x: f64,
    pub title_y: Option<f64>,
    pub width: f64,
    pub height: f64,
}

impl RackGeometry {
    pub fn new(
        settings: &LayoutSettings,
        left_label_width: f64,
        right_label_width: f64,
        has_title: bool,
    ) -> Self {
        let pad = settings.padding;
        let gap = settings.label_gap;
        let cap_height = settings.rail_width / 2.0;
        let title_block = if has_title { settings.title_height } else { 0.0 };

        let frame_left = pad + left_label_width + gap;
        let frame_top = pad + title_block;
        let units_top = frame_top + cap_height;
        let units_bottom = units_top + f64::from(RACK_UNITS) * settings.unit_height;
        let frame_right = frame_left + settings.rail_width * 2.0 + settings.inner_width;

        Self {
            unit_height: settings.unit_height,
            inner_width: settings.inner_width,
            rail_width: settings.rail_width,
            cap_height,
            frame_left,
            frame_top,
            units_top,
            units_bottom,
            left_labels_x: pad + left_label_width,
            right_labels_x: frame_right + gap,
            title_y: has_title.then(|| pad + title_block / 2.0),
            width: frame_right + gap + right_label_width + pad,
            height: units_bottom + cap_height + pad,
        }
    }

    pub fn view_box(&self) -> Bounds {
        Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: self.width,
            max_y: self.height,
        }
    }

    /// Grows the drawing downwards so content reaching canvas y `bottom` keeps `margin` below it.
    pub fn extend_below(&mut self, bottom: f64, margin: f64) {
        if bottom.is_finite() {
            self.height = self.height.max(bottom + margin);
        }
    }

    pub fn inner_left(&self) -> f64 {
        self.frame_left + self.rail_width
    }

    pub fn inner_right(&self) -> f64 {
        self.inner_left() + self.inner_width
    }

    pub fn frame_right(&self) -> f64 {
        self.inner_right() + self.rail_width
    }

    pub fn frame_bottom(&self) -> f64 {
        self.units_bottom + self.cap_height
    }

    /// Rack-space interval of a single unit.
    pub fn unit_span(&self, unit: UnitIndex) -> UnitSpan {
        self.device_span(unit, 1)
    }

    /// Rack-space interval of `units` consecutive units starting at `bottom`.
    pub fn device_span(&self, bottom: UnitIndex, units: u8) -> UnitSpan {
        let lo = f64::from(bottom.get() - 1) * self.unit_height;
        UnitSpan {
            lo,
            hi: lo + f64::from(units) * self.unit_height,
        }
    }

    pub fn to_canvas_y(&self, rack_y: f64) -> f64 {
        self.units_bottom - rack_y
    }

    /// Canvas rectangle covering the rack's inner width over the given unit span.
    pub fn body_rect(&self, bottom: UnitIndex, units: u8) -> Rect {
        let span = self.device_span(bottom, units);
        Rect {
            x: self.inner_left(),
            y: self.to_canvas_y(span.hi),
            width: self.inner_width,
            height: span.height(),
        }
    }
}

/// An admitted device: its bottom unit plus height fully describe the units it claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub kind: DeviceKind,
    pub model: String,
    pub status: String,
    pub bottom_unit: UnitIndex,
    pub height: HeightClass,
}

impl Placement {
    pub fn top_unit(&self) -> u8 {
        self.bottom_unit.get() + self.height.units() - 1
    }

    pub fn units(&self) -> std::ops::RangeInclusive<u8> {
        self.bottom_unit.get()..=self.top_unit()
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.kind.display_name(), self.id)
    }
}

/// Bottom unit of a device of `height` whose top unit is `top`, when it fits in the rack.
pub fn candidate_bottom(top: UnitIndex, height: HeightClass) -> Result<UnitIndex, RejectReason> {
    let out_of_bounds = || RejectReason::OutOfBounds {
        top_unit: top.get(),
        height_units: height.units(),
    };
    let bottom = top
        .get()
        .checked_sub(height.units() - 1)
        .ok_or_else(out_of_bounds)?;
    UnitIndex::new(bottom).ok_or_else(out_of_bounds)
}

/// Claimed units of the rack, filled first-come first-served.
#[derive(Debug, Clone)]
pub struct RackOccupancy {
    holders: [Option<usize>; RACK_UNITS as usize],
    admitted: Vec<Placement>,
}

impl Default for RackOccupancy {
    fn default() -> Self {
        Self::new()
    }
}

impl RackOccupancy {
    pub fn new() -> Self {
        Self {
            holders: [None; RACK_UNITS as usize],
            admitted: Vec::new(),
        }
    }

    /// Admits `record` with its top edge at `top` when every unit of its span is free.
    pub fn admit(
        &mut self,
        kind: DeviceKind,
        record: &DeviceRecord,
        top: UnitIndex,
        height: HeightClass,
    ) -> Result<&Placement, RejectReason> {
        let bottom = candidate_bottom(top, height)?;
        for unit in (bottom.get()..=top.get()).filter_map(UnitIndex::new) {
            if let Some(holder) = self.holder_of(unit) {
                return Err(RejectReason::Overlap {
                    unit: unit.get(),
                    holder: holder.label(),
                });
            }
        }

        let idx = self.admitted.len();
        for unit in bottom.get()..=top.get() {
            self.holders[usize::from(unit - 1)] = Some(idx);
        }
        self.admitted.push(Placement {
            id: record.id.clone(),
            kind,
            model: record.model.clone(),
            status: record.status.clone(),
            bottom_unit: bottom,
            height,
        });
        Ok(&self.admitted[idx])
    }

    pub fn holder_of(&self, unit: UnitIndex) -> Option<&Placement> {
        self.holders[usize::from(unit.get() - 1)].map(|idx| &self.admitted[idx])
    }

    pub fn placements(&self) -> &[Placement] {
        &self.admitted
    }

    pub fn free_units(&self) -> usize {
        self.holders.iter().filter(|h| h.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(n: u8) -> UnitIndex {
        UnitIndex::new(n).unwrap()
    }

    fn record(id: &str) -> DeviceRecord {
        DeviceRecord::new(id, "m", "", "ACTIVE")
    }

    #[test]
    fn unit_spans_follow_bottom_up_convention() {
        let g = RackGeometry::new(&LayoutSettings::default(), 100.0, 100.0, false);
        assert_eq!(g.unit_span(unit(1)), UnitSpan { lo: 0.0, hi: 20.0 });
        assert_eq!(g.unit_span(unit(42)), UnitSpan { lo: 820.0, hi: 840.0 });
        assert_eq!(g.device_span(unit(16), 2), UnitSpan { lo: 300.0, hi: 340.0 });

        // Unit 1 sits on the bottom edge, unit 42 touches the top edge.
        assert_eq!(g.body_rect(unit(1), 1).bottom(), g.units_bottom);
        assert_eq!(g.body_rect(unit(42), 1).y, g.units_top);
        assert_eq!(g.units_bottom - g.units_top, 840.0);
    }

    #[test]
    fn drawing_grows_only_downwards() {
        let mut g = RackGeometry::new(&LayoutSettings::default(), 100.0, 100.0, false);
        let natural = g.height;
        g.extend_below(natural - 50.0, 16.0);
        assert_eq!(g.height, natural);
        g.extend_below(natural + 40.0, 16.0);
        assert_eq!(g.height, natural + 56.0);
        g.extend_below(f64::NAN, 16.0);
        assert_eq!(g.height, natural + 56.0);
    }

    #[test]
    fn two_u_device_claims_the_unit_below() {
        let mut occ = RackOccupancy::new();
        let p = occ
            .admit(DeviceKind::Storage, &record("s1"), unit(17), HeightClass::TwoU)
            .unwrap();
        assert_eq!(p.bottom_unit, unit(16));
        assert_eq!(p.units(), 16..=17);
        assert_eq!(occ.holder_of(unit(16)).map(|p| p.id.as_str()), Some("s1"));
        assert_eq!(occ.free_units(), 40);
    }

    #[test]
    fn two_u_device_at_unit_one_is_out_of_bounds() {
        let mut occ = RackOccupancy::new();
        let err = occ
            .admit(DeviceKind::Compute, &record("c1"), unit(1), HeightClass::TwoU)
            .unwrap_err();
        assert_eq!(
            err,
            RejectReason::OutOfBounds {
                top_unit: 1,
                height_units: 2
            }
        );
        assert!(occ.placements().is_empty());
    }

    #[test]
    fn first_come_wins_contested_units() {
        let mut occ = RackOccupancy::new();
        occ.admit(DeviceKind::Compute, &record("a"), unit(10), HeightClass::OneU)
            .unwrap();
        let err = occ
            .admit(DeviceKind::Compute, &record("b"), unit(10), HeightClass::OneU)
            .unwrap_err();
        assert_eq!(
            err,
            RejectReason::Overlap {
                unit: 10,
                holder: "Compute-a".to_string()
            }
        );

        // A 2U device whose lower half hits the claimed unit is rejected as well.
        let err = occ
            .admit(DeviceKind::Storage, &record("c"), unit(11), HeightClass::TwoU)
            .unwrap_err();
        assert!(matches!(err, RejectReason::Overlap { unit: 10, .. }));
        assert_eq!(occ.placements().len(), 1);
    }

    #[test]
    fn admitted_spans_never_share_a_unit() {
        let mut occ = RackOccupancy::new();
        for (i, top) in (1..=42u8).rev().enumerate() {
            let height = if i % 3 == 0 {
                HeightClass::TwoU
            } else {
                HeightClass::OneU
            };
            let _ = occ.admit(
                DeviceKind::Compute,
                &record(&i.to_string()),
                unit(top),
                height,
            );
        }
        let mut seen = [false; 42];
        for p in occ.placements() {
            for u in p.units() {
                assert!(!seen[usize::from(u - 1)], "unit {u} claimed twice");
                seen[usize::from(u - 1)] = true;
            }
        }
    }
}
