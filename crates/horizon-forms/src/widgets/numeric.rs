//! Numeric spinner bound to any supported number type.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use horizon_forms_core::{CommitOutcome, ObjectId};

use crate::coercion::{
    DisplayFormat, NumberFormat, NumericBounds, NumericValue, StepDirection, StepOutcome, StepSize, coerce_input,
    step,
};
use crate::error::Result;
use crate::form::FormComponent;
use crate::host::{ElementRef, UiHost};

/// Configuration of a [`Numeric`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NumericOptions {
    /// Inclusive lower bound.
    pub min: Option<Decimal>,
    /// Inclusive upper bound.
    pub max: Option<Decimal>,
    /// Increment of the up/down buttons.
    pub step: StepSize,
    /// Input is shown but cannot be edited or stepped.
    pub read_only: bool,
    /// Input is disabled.
    pub disabled: bool,
    /// Whether the up/down buttons are rendered.
    pub show_up_down: bool,
    /// Whether the browser may autocomplete the input.
    pub auto_complete: bool,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Separators used to read and display the value.
    pub number_format: NumberFormat,
    /// Display pattern of the value, e.g. `N2` or `#,##0.00`.
    pub format: Option<DisplayFormat>,
}

impl Default for NumericOptions {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            step: StepSize::Any,
            read_only: false,
            disabled: false,
            show_up_down: true,
            auto_complete: true,
            placeholder: None,
            number_format: NumberFormat::default(),
            format: None,
        }
    }
}

impl NumericOptions {
    /// Set the lower bound.
    pub fn with_min(mut self, min: impl Into<Decimal>) -> Self {
        self.min = Some(min.into());
        self
    }

    /// Set the upper bound.
    pub fn with_max(mut self, max: impl Into<Decimal>) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Set the step.
    pub fn with_step(mut self, step: StepSize) -> Self {
        self.step = step;
        self
    }

    /// Set the read-only flag.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the number format.
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Set the display pattern.
    pub fn with_format(mut self, format: DisplayFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// A numeric input with up/down stepping.
///
/// Typed input is sanitised, parsed with the configured separators, clamped
/// to the bounds and committed. Stepping adds or subtracts the step and is
/// refused, rather than clamped, when the result would leave the bounds.
pub struct Numeric<T: NumericValue> {
    form: FormComponent<T>,
    options: NumericOptions,
    bounds: NumericBounds,
    host: Arc<dyn UiHost>,
    input: ElementRef,
}

impl<T: NumericValue> Numeric<T> {
    /// Create a numeric input holding `initial`.
    ///
    /// Fails when `min > max`.
    pub fn new(host: Arc<dyn UiHost>, initial: T, options: NumericOptions) -> Result<Self> {
        let bounds = NumericBounds::new(options.min, options.max)?;
        let mut form = FormComponent::new(initial);
        form.set_disabled(options.disabled);
        let input = ElementRef::for_object("numeric", form.id());
        Ok(Self {
            form,
            options,
            bounds,
            host,
            input,
        })
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.form.id()
    }

    /// The bindable value and its signals.
    pub fn form(&self) -> &FormComponent<T> {
        &self.form
    }

    /// Mutable access to the form state.
    pub fn form_mut(&mut self) -> &mut FormComponent<T> {
        &mut self.form
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.form.value()
    }

    /// Whether a number is present.
    pub fn has_value(&self) -> bool {
        self.form.with_value(T::to_decimal).is_some()
    }

    /// The configuration.
    pub fn options(&self) -> &NumericOptions {
        &self.options
    }

    /// The active bounds.
    pub fn bounds(&self) -> NumericBounds {
        self.bounds
    }

    /// The input element.
    pub fn input_element(&self) -> &ElementRef {
        &self.input
    }

    /// Set the read-only flag.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.options.read_only = read_only;
        self.form.refresh().request();
    }

    /// Text for the input box.
    ///
    /// Uses the display pattern when one is set; empty values stay empty.
    pub fn formatted_value(&self) -> String {
        let separators = &self.options.number_format;
        if let Some(format) = &self.options.format {
            if let Some(value) = self.form.with_value(T::to_decimal) {
                return format.format_decimal(value, separators);
            }
        }
        let text = self.form.with_value(T::format);
        separators.localize(&text)
    }

    /// Step up once.
    pub fn step_up(&self) -> Option<CommitOutcome> {
        self.step_by(StepDirection::Up)
    }

    /// Step down once.
    pub fn step_down(&self) -> Option<CommitOutcome> {
        self.step_by(StepDirection::Down)
    }

    /// Step once in `direction`.
    ///
    /// `None` when disabled, read-only, at a bound, or when the result is
    /// not representable.
    pub fn step_by(&self, direction: StepDirection) -> Option<CommitOutcome> {
        if self.form.is_disabled() || self.options.read_only {
            return None;
        }
        let current = self.form.value();
        match step(&current, direction, self.options.step, &self.bounds) {
            StepOutcome::Changed(value) => Some(self.form.commit(value)),
            StepOutcome::NoChange => None,
        }
    }

    /// The user edited the input text.
    ///
    /// Unparseable text is rejected: the value is kept and nothing fires.
    pub fn on_change(&self, raw: &str) -> Result<CommitOutcome> {
        let value = coerce_input::<T>(raw, &self.options.number_format, &self.bounds)
            .inspect_err(|err| {
                tracing::debug!(target: "horizon_forms::numeric", error = %err, "input rejected");
            })?;
        self.commit_input(value)
    }

    /// Change the bounds.
    ///
    /// A value left outside a changed bound is moved onto it through the
    /// input path, so change notifications fire.
    pub fn set_bounds(
        &mut self,
        min: Option<Decimal>,
        max: Option<Decimal>,
    ) -> Result<Option<CommitOutcome>> {
        let bounds = NumericBounds::new(min, max)?;
        let min_changed = bounds.min() != self.bounds.min();
        let max_changed = bounds.max() != self.bounds.max();
        self.bounds = bounds;
        self.options.min = min;
        self.options.max = max;

        let Some(current) = self.form.with_value(T::to_decimal) else {
            return Ok(None);
        };
        let target = match (bounds.min(), bounds.max()) {
            (Some(lo), _) if min_changed && current < lo => lo,
            (_, Some(hi)) if max_changed && current > hi => hi,
            _ => return Ok(None),
        };

        let value = T::from_decimal(target).ok_or_else(|| {
            horizon_forms_core::Error::conversion(target.to_string(), T::type_name())
        })?;
        self.commit_input(value).map(Some)
    }

    fn commit_input(&self, value: T) -> Result<CommitOutcome> {
        let outcome = self.form.commit(value);
        // Without a two-way binding nothing re-renders the input text.
        if !self.form.notifier().has_binding() {
            self.host
                .set_input_value(&self.input, &self.formatted_value())?;
        }
        Ok(outcome)
    }
}

impl<T: NumericValue> fmt::Debug for Numeric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Numeric")
            .field("form", &self.form)
            .field("options", &self.options)
            .finish()
    }
}

static_assertions::assert_impl_all!(Numeric<Option<f64>>: Send, Sync);
