//! Form widgets.
//!
//! - [`AutoComplete`]: Text input with debounced suggestions
//! - [`Numeric`]: Spinner over any [`NumericValue`](crate::coercion::NumericValue)
//! - [`CheckBoxList`]: Multi-select checklist with declared and data-bound items
//! - [`Steps`]: Single-select step wizard
//! - [`RadialGauge`]: Gauge with registered scales and pointers
//! - [`ReportViewer`]: Server-rendered report with named parameters
//! - [`Password`], [`SplitButton`], [`Menu`], [`Image`]: Simple controls

mod autocomplete;
mod checkbox_list;
mod gauge;
mod image;
mod menu;
mod numeric;
mod password;
mod report_viewer;
mod split_button;
mod steps;

pub use autocomplete::{AutoComplete, AutoCompleteOptions, Key};
pub use checkbox_list::{CheckBoxItem, CheckBoxList, CheckBoxListOptions, ListItem, Orientation};
pub use gauge::{
    ApproximateTextMeasurer, GaugeScale, GaugeScalePointer, GaugeTickPosition, Point,
    PointerEntry, PointerGeometry, PointerSpec, RadialGauge, ScaleGeometry, ScaleSpec,
    TextMeasurer, Tick, TickFormatter,
};
pub use image::{Image, MouseEventArgs};
pub use menu::{Menu, MenuItemEventArgs};
pub use numeric::{Numeric, NumericOptions};
pub use password::{Password, PasswordOptions};
pub use report_viewer::{ReportParameter, ReportViewer, ReportViewerOptions};
pub use split_button::{SplitButton, SplitButtonItem};
pub use steps::{Steps, StepsItem};
