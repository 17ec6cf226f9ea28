use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug + Copy + PartialEq {}

/// Corner plus extent: `[left, top, width, height]`
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Two corners: `[x1, y1, x2, y2]`, the layout detectors report
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// Four pixel coordinates tagged with their layout.
///
/// Serialized as a plain `[f32; 4]` array.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

impl<F: BBoxFormat> From<BBox<F>> for [f32; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.0
    }
}

// The array is taken as already being in layout `F`.
impl<F: BBoxFormat> From<[f32; 4]> for BBox<F> {
    #[inline]
    fn from(arr: [f32; 4]) -> Self {
        BBox(arr, PhantomData)
    }
}

impl BBox<Ltwh> {
    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], PhantomData)
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    /// Area in square pixels, zero for inverted boxes.
    #[inline]
    pub fn area(&self) -> f32 {
        (self.right() - self.left()).max(0.) * (self.bottom() - self.top()).max(0.)
    }

    /// Intersection over union, always in `[0, 1]`.
    ///
    /// Returns `0` when the union is empty.
    pub fn iou(&self, other: &BBox<Ltrb>) -> f32 {
        let i_left = self.left().max(other.left());
        let i_top = self.top().max(other.top());
        let i_right = self.right().min(other.right());
        let i_bottom = self.bottom().min(other.bottom());
        let i_area = (i_right - i_left).max(0.) * (i_bottom - i_top).max(0.);

        let union = self.area() + other.area() - i_area;
        if union > 0. {
            i_area / union
        } else {
            0.
        }
    }
}

impl<'a> From<&'a BBox<Ltwh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Ltwh>) -> Self {
        let [left, top, width, height] = v.0;

        Self([left, top, left + width, top + height], PhantomData)
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        let [x1, y1, x2, y2] = v.0;

        Self([x1, y1, x2 - x1, y2 - y1], PhantomData)
    }
}
