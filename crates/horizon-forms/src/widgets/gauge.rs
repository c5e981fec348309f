//! Radial gauge with scales and pointers.
//!
//! A [`RadialGauge`] tracks two registries: its [`GaugeScale`]s and the
//! [`GaugeScalePointer`]s drawn on them. Children report every committed
//! change; the gauge derives geometry (scale radius and centre, value→angle
//! mapping, tick positions, pointer length and width) from its own size and
//! the last observed child state, and reloads. A reload is broadcast to
//! every scale and pointer as well, so children that render their own
//! parts see a pending refresh too.

use std::fmt;
use std::sync::{Arc, Weak};

use serde::Deserialize;

use horizon_forms_core::{
    ChildChange, ChildProps, ObjectId, ParentLink, RefreshSignal, Registry, SelectionMode,
};

use crate::coercion::{DisplayFormat, NumberFormat};

/// Upper bound on generated ticks per scale.
const MAX_TICKS: usize = 1000;

/// Font size of tick labels, used when reserving room for outside labels.
const TICK_LABEL_FONT_SIZE: f64 = 16.0;

// ============================================================================
// Text Measurement
// ============================================================================

/// Measures label text for layout.
pub trait TextMeasurer: Send + Sync {
    /// Width of `text` at `font_size`.
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Width estimate from average glyph advances of a proportional sans font.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTextMeasurer;

impl TextMeasurer for ApproximateTextMeasurer {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let em: f64 = text
            .chars()
            .map(|c| match c {
                '0'..='9' => 0.556,
                '.' | ',' => 0.278,
                '-' => 0.333,
                ' ' => 0.278,
                _ => 0.6,
            })
            .sum();
        em * font_size
    }
}

// ============================================================================
// Specs
// ============================================================================

/// Where ticks are drawn relative to the scale arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GaugeTickPosition {
    /// Inside the arc.
    Inside,
    /// Outside the arc; room is reserved for labels.
    #[default]
    Outside,
    /// No ticks.
    None,
}

/// Custom tick label text.
#[derive(Clone)]
pub struct TickFormatter(Arc<dyn Fn(f64) -> String + Send + Sync>);

impl TickFormatter {
    /// Wrap a label function.
    pub fn new(f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Label of `value`.
    pub fn label(&self, value: f64) -> String {
        (self.0)(value)
    }
}

impl PartialEq for TickFormatter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for TickFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TickFormatter(..)")
    }
}

/// Configuration of a [`GaugeScale`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScaleSpec {
    /// Lowest value.
    pub min: f64,
    /// Highest value.
    pub max: f64,
    /// Interval between major ticks.
    pub step: f64,
    /// Interval between minor ticks; zero for none.
    pub minor_step: f64,
    /// Angle of `min`, in degrees.
    pub start_angle: f64,
    /// Angle of `max`, in degrees.
    pub end_angle: f64,
    /// Radius as a fraction of the available radius.
    pub radius: f64,
    /// Margin subtracted (twice) from the available radius.
    pub margin: f64,
    /// Horizontal centre as a fraction of the gauge width.
    pub x: f64,
    /// Vertical centre as a fraction of the gauge height.
    pub y: f64,
    /// Tick placement.
    pub tick_position: GaugeTickPosition,
    /// Major tick length.
    pub tick_length: f64,
    /// Minor tick length.
    pub minor_tick_length: f64,
    /// Distance of tick labels from the arc.
    pub tick_label_offset: f64,
    /// Whether the tick at `min` is drawn.
    pub show_first_tick: bool,
    /// Whether the tick at `max` is drawn.
    pub show_last_tick: bool,
    /// Whether tick labels are drawn.
    pub show_tick_labels: bool,
    /// Display pattern of tick labels.
    pub format_string: Option<DisplayFormat>,
    /// Label function; takes precedence over `format_string`.
    #[serde(skip)]
    pub formatter: Option<TickFormatter>,
}

impl Default for ScaleSpec {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 20.0,
            minor_step: 0.0,
            start_angle: -90.0,
            end_angle: 90.0,
            radius: 1.0,
            margin: 16.0,
            x: 0.5,
            y: 0.5,
            tick_position: GaugeTickPosition::Outside,
            tick_length: 10.0,
            minor_tick_length: 5.0,
            tick_label_offset: 25.0,
            show_first_tick: true,
            show_last_tick: true,
            show_tick_labels: true,
            format_string: None,
            formatter: None,
        }
    }
}

impl ScaleSpec {
    /// Set the value range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the major and minor tick intervals.
    pub fn with_steps(mut self, step: f64, minor_step: f64) -> Self {
        self.step = step;
        self.minor_step = minor_step;
        self
    }

    /// Set the sweep.
    pub fn with_angles(mut self, start: f64, end: f64) -> Self {
        self.start_angle = start;
        self.end_angle = end;
        self
    }

    /// Set the tick placement.
    pub fn with_tick_position(mut self, position: GaugeTickPosition) -> Self {
        self.tick_position = position;
        self
    }

    /// Format tick labels with `format`.
    pub fn with_format(mut self, format: DisplayFormat) -> Self {
        self.format_string = Some(format);
        self
    }

    /// Label ticks with `f`.
    pub fn with_formatter(mut self, f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(TickFormatter::new(f));
        self
    }

    /// Text of the label at `value`.
    pub fn tick_label(&self, value: f64) -> String {
        if let Some(formatter) = &self.formatter {
            return formatter.label(value);
        }
        match &self.format_string {
            Some(format) => format.format_f64(value, &NumberFormat::INVARIANT),
            None => value.to_string(),
        }
    }

    /// Map `value`, clamped to the range, onto the sweep.
    pub fn value_to_angle(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return self.start_angle;
        }
        let ratio = (value.clamp(self.min, self.max) - self.min) / span;
        self.start_angle + ratio * (self.end_angle - self.start_angle)
    }

    /// Major and minor ticks, in value order.
    pub fn ticks(&self) -> Vec<Tick> {
        if self.tick_position == GaugeTickPosition::None {
            return Vec::new();
        }

        let major = self.values(self.step);
        let epsilon = self.step.abs() * 1e-9;
        let mut ticks: Vec<Tick> = major
            .iter()
            .filter(|&&v| {
                let first = (v - self.min).abs() <= epsilon;
                let last = (v - self.max).abs() <= epsilon;
                !(first && !self.show_first_tick) && !(last && !self.show_last_tick)
            })
            .map(|&value| Tick {
                value,
                angle: self.value_to_angle(value),
                major: true,
                label: self.show_tick_labels.then(|| self.tick_label(value)),
            })
            .collect();

        for value in self.values(self.minor_step) {
            if !major.iter().any(|m| (m - value).abs() <= epsilon.max(1e-12)) {
                ticks.push(Tick {
                    value,
                    angle: self.value_to_angle(value),
                    major: false,
                    label: None,
                });
            }
        }

        ticks.sort_by(|a, b| a.value.total_cmp(&b.value));
        ticks
    }

    fn values(&self, step: f64) -> Vec<f64> {
        if step <= 0.0 || !step.is_finite() || self.max < self.min {
            return Vec::new();
        }
        let tolerance = step * 1e-9;
        (0..MAX_TICKS)
            .map(|i| self.min + step * i as f64)
            .take_while(|v| *v <= self.max + tolerance)
            .collect()
    }
}

/// Configuration of a [`GaugeScalePointer`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PointerSpec {
    /// Pointed value.
    pub value: f64,
    /// Whether the value is rendered as text.
    pub show_value: bool,
    /// Radius of the pointer cap.
    pub radius: f64,
    /// Pointer width; defaults to half the cap radius.
    pub width: Option<f64>,
    /// Length as a fraction of the scale radius.
    pub length: f64,
}

impl Default for PointerSpec {
    fn default() -> Self {
        Self {
            value: 0.0,
            show_value: true,
            radius: 10.0,
            width: None,
            length: 1.0,
        }
    }
}

impl PointerSpec {
    /// Pointer at `value`.
    pub fn at(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}

/// Pointer state tracked by the gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEntry {
    /// The scale the pointer is drawn on.
    pub scale: ObjectId,
    /// Last committed configuration.
    pub spec: PointerSpec,
}

// ============================================================================
// Geometry
// ============================================================================

/// A point in gauge coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// One tick mark.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Value at the tick.
    pub value: f64,
    /// Angle of the tick, in degrees.
    pub angle: f64,
    /// Major or minor.
    pub major: bool,
    /// Label text; major ticks only, when labels are shown.
    pub label: Option<String>,
}

/// Derived layout of a scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleGeometry {
    /// Arc centre.
    pub center: Point,
    /// Arc radius.
    pub radius: f64,
    /// Tick marks.
    pub ticks: Vec<Tick>,
}

/// Derived layout of a pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerGeometry {
    /// Rotation origin.
    pub center: Point,
    /// Rotation in degrees.
    pub angle: f64,
    /// Needle length.
    pub length: f64,
    /// Needle width.
    pub width: f64,
}

// ============================================================================
// Gauge
// ============================================================================

/// A circular gauge.
pub struct RadialGauge {
    id: ObjectId,
    width: f64,
    height: f64,
    scales: Arc<Registry<ScaleSpec>>,
    pointers: Arc<Registry<PointerEntry>>,
    refresh: Arc<RefreshSignal>,
    measurer: Arc<dyn TextMeasurer>,
}

impl RadialGauge {
    /// Create a gauge of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_measurer(width, height, Arc::new(ApproximateTextMeasurer))
    }

    /// Create a gauge that measures labels with `measurer`.
    pub fn with_measurer(width: f64, height: f64, measurer: Arc<dyn TextMeasurer>) -> Self {
        let refresh = Arc::new(RefreshSignal::new());
        let scales = Arc::new(Registry::new(SelectionMode::Independent));
        let pointers = Arc::new(Registry::new(SelectionMode::Independent));

        let targets = ReloadTargets {
            refresh: Arc::downgrade(&refresh),
            scales: Arc::downgrade(&scales),
            pointers: Arc::downgrade(&pointers),
        };
        let on_scale = targets.clone();
        scales.events.connect(move |_| on_scale.reload());
        pointers.events.connect(move |_| targets.reload());

        Self {
            id: ObjectId::next(),
            width,
            height,
            scales,
            pointers,
            refresh,
            measurer,
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Width and height.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Resize and reload.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if (self.width, self.height) != (width, height) {
            self.width = width;
            self.height = height;
            self.reload();
        }
    }

    /// The gauge's refresh signal.
    pub fn refresh(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// Request a re-render of the gauge and of every scale and pointer.
    pub fn reload(&self) {
        self.refresh.request();
        self.scales.broadcast_refresh();
        self.pointers.broadcast_refresh();
    }

    /// Registered scales in order.
    pub fn scales(&self) -> Vec<ObjectId> {
        self.scales.ids()
    }

    /// Registered pointers in order.
    pub fn pointers(&self) -> Vec<ObjectId> {
        self.pointers.ids()
    }

    /// Layout of scale `id`.
    pub fn scale_geometry(&self, id: ObjectId) -> Option<ScaleGeometry> {
        let spec = self.scale_spec(id)?;
        Some(ScaleGeometry {
            center: self.center_of(&spec),
            radius: self.radius_of(&spec),
            ticks: spec.ticks(),
        })
    }

    /// Layout of pointer `id`.
    pub fn pointer_geometry(&self, id: ObjectId) -> Option<PointerGeometry> {
        let entry = self
            .pointers
            .entries()
            .into_iter()
            .find(|e| e.id == id)?
            .data;
        let scale = self.scale_spec(entry.scale)?;
        let pointer = entry.spec;
        Some(PointerGeometry {
            center: self.center_of(&scale),
            angle: scale.value_to_angle(pointer.value),
            length: self.radius_of(&scale) * pointer.length,
            width: pointer.width.unwrap_or(pointer.radius / 2.0),
        })
    }

    fn scale_spec(&self, id: ObjectId) -> Option<ScaleSpec> {
        self.scales
            .entries()
            .into_iter()
            .find(|e| e.id == id)
            .map(|e| e.data)
    }

    fn center_of(&self, spec: &ScaleSpec) -> Point {
        Point {
            x: spec.x * self.width,
            y: spec.y * self.height,
        }
    }

    fn radius_of(&self, spec: &ScaleSpec) -> f64 {
        let mut radius = (self.width.min(self.height) / 2.0 - spec.margin * 2.0) * spec.radius;
        if spec.tick_position == GaugeTickPosition::Outside {
            radius -= self
                .measurer
                .text_width(&spec.tick_label(spec.max), TICK_LABEL_FONT_SIZE);
        }
        radius
    }
}

/// Everything a child change reloads.
#[derive(Clone)]
struct ReloadTargets {
    refresh: Weak<RefreshSignal>,
    scales: Weak<Registry<ScaleSpec>>,
    pointers: Weak<Registry<PointerEntry>>,
}

impl ReloadTargets {
    fn reload(&self) {
        if let Some(refresh) = self.refresh.upgrade() {
            refresh.request();
        }
        if let Some(scales) = self.scales.upgrade() {
            scales.broadcast_refresh();
        }
        if let Some(pointers) = self.pointers.upgrade() {
            pointers.broadcast_refresh();
        }
    }
}

impl fmt::Debug for RadialGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadialGauge")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scales", &self.scales.len())
            .field("pointers", &self.pointers.len())
            .finish()
    }
}

// ============================================================================
// Children
// ============================================================================

/// A scale drawn on a [`RadialGauge`].
pub struct GaugeScale {
    id: ObjectId,
    spec: ScaleSpec,
    refresh: Arc<RefreshSignal>,
    link: ParentLink<ScaleSpec>,
}

impl GaugeScale {
    /// Create a scale.
    pub fn new(spec: ScaleSpec) -> Self {
        Self {
            id: ObjectId::next(),
            spec,
            refresh: Arc::new(RefreshSignal::new()),
            link: ParentLink::default(),
        }
    }

    /// The scale's refresh signal; raised whenever its gauge reloads.
    pub fn refresh(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// The scale's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The configuration.
    pub fn spec(&self) -> &ScaleSpec {
        &self.spec
    }

    /// Register with `gauge`.
    pub fn attach(&mut self, gauge: &RadialGauge) {
        let link = gauge.scales.link();
        if self.link.same_parent(&link) {
            return;
        }
        self.link.unregister(self.id);
        self.link = link;
        self.link.register_child(
            self.id,
            ChildProps::default(),
            self.spec.clone(),
            &self.refresh,
        );
    }

    /// Move the centre.
    pub fn set_center(&mut self, x: f64, y: f64) {
        self.update(|spec| {
            spec.x = x;
            spec.y = y;
        });
    }

    /// Edit the configuration; the gauge reloads if anything changed.
    pub fn update(&mut self, f: impl FnOnce(&mut ScaleSpec)) {
        let before = self.spec.clone();
        f(&mut self.spec);
        if self.spec != before {
            self.link.notify(
                self.id,
                ChildProps::default(),
                self.spec.clone(),
                ChildChange::DATA,
            );
        }
    }

    /// Leave the gauge.
    pub fn dispose(&mut self) {
        self.link.unregister(self.id);
    }
}

impl Drop for GaugeScale {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for GaugeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaugeScale")
            .field("id", &self.id)
            .field("spec", &self.spec)
            .field("link", &self.link)
            .finish()
    }
}

/// A needle pointing at a value on a [`GaugeScale`].
pub struct GaugeScalePointer {
    id: ObjectId,
    scale: ObjectId,
    spec: PointerSpec,
    refresh: Arc<RefreshSignal>,
    link: ParentLink<PointerEntry>,
}

impl GaugeScalePointer {
    /// Create a pointer drawn on `scale`.
    pub fn new(scale: &GaugeScale, spec: PointerSpec) -> Self {
        Self {
            id: ObjectId::next(),
            scale: scale.id(),
            spec,
            refresh: Arc::new(RefreshSignal::new()),
            link: ParentLink::default(),
        }
    }

    /// The pointer's refresh signal; raised whenever its gauge reloads.
    pub fn refresh(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// The pointer's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The configuration.
    pub fn spec(&self) -> &PointerSpec {
        &self.spec
    }

    /// Register with `gauge`.
    pub fn attach(&mut self, gauge: &RadialGauge) {
        let link = gauge.pointers.link();
        if self.link.same_parent(&link) {
            return;
        }
        self.link.unregister(self.id);
        self.link = link;
        self.link
            .register_child(self.id, self.props(), self.entry(), &self.refresh);
    }

    /// Point at `value`.
    pub fn set_value(&mut self, value: f64) {
        if self.spec.value != value {
            self.spec.value = value;
            self.notify(ChildChange::VALUE);
        }
    }

    /// Show or hide the value text.
    pub fn set_show_value(&mut self, show_value: bool) {
        if self.spec.show_value != show_value {
            self.spec.show_value = show_value;
            self.notify(ChildChange::DATA);
        }
    }

    /// Leave the gauge.
    pub fn dispose(&mut self) {
        self.link.unregister(self.id);
    }

    fn props(&self) -> ChildProps {
        ChildProps {
            value: Some(self.spec.value),
            ..ChildProps::default()
        }
    }

    fn entry(&self) -> PointerEntry {
        PointerEntry {
            scale: self.scale,
            spec: self.spec.clone(),
        }
    }

    fn notify(&self, changed: ChildChange) {
        self.link
            .notify(self.id, self.props(), self.entry(), changed);
    }
}

impl Drop for GaugeScalePointer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for GaugeScalePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaugeScalePointer")
            .field("id", &self.id)
            .field("scale", &self.scale)
            .field("spec", &self.spec)
            .finish()
    }
}

static_assertions::assert_impl_all!(RadialGauge: Send, Sync);
