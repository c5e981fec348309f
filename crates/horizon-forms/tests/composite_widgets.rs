//! Parent/child registration across the composite widgets.

use std::sync::Arc;

use horizon_forms::coercion::StepSize;
use horizon_forms::host::HeadlessHost;
use horizon_forms::widgets::{
    CheckBoxItem, CheckBoxList, CheckBoxListOptions, GaugeScale, GaugeScalePointer, Numeric,
    NumericOptions, PointerSpec, RadialGauge, ReportParameter, ReportViewer, ReportViewerOptions,
    ScaleSpec, Steps, StepsItem,
};
use horizon_forms_core::{EditContext, FieldIdentifier};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_forms=debug,horizon_forms_core::registry=trace")
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct DirtyFields(Mutex<Vec<String>>);

impl EditContext for DirtyFields {
    fn notify_field_changed(&self, field: &FieldIdentifier) {
        self.0.lock().push(field.field_name.clone());
    }
}

#[test]
fn checklist_toggle_is_symmetric() {
    init_tracing();
    let mut list: CheckBoxList<String> = CheckBoxList::new(
        CheckBoxListOptions::default()
            .with_text_property("Name")
            .with_value_property("Code"),
    );
    let mut declared = CheckBoxItem::new("Other", "x".to_string());
    declared.attach(&list);
    list.set_data(Some(Arc::from(vec![
        json!({"Name": "Alpha", "Code": "a"}),
        json!({"Name": "Beta", "Code": "b"}),
    ])));

    let items = list.all_items();
    let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, vec!["Other", "Alpha", "Beta"]);

    list.toggle(&items[1]);
    list.toggle(&items[0]);
    assert_eq!(list.value(), vec!["a".to_string(), "x".to_string()]);

    list.toggle(&items[0]);
    assert_eq!(list.value(), vec!["a".to_string()]);
    list.toggle(&items[1]);
    assert!(!list.has_value());
}

#[test]
fn checklist_marks_bound_field_dirty() {
    init_tracing();
    let list: CheckBoxList<i64> = CheckBoxList::new(CheckBoxListOptions::default());
    let context = Arc::new(DirtyFields::default());
    list.form().bind_edit_context(
        Some(context.clone() as Arc<dyn EditContext>),
        Some(FieldIdentifier::new("Survey", "Answers")),
    );

    let mut item = CheckBoxItem::new("Yes", 1);
    item.attach(&list);
    let items = list.all_items();
    list.toggle(&items[0]);

    assert_eq!(*context.0.lock(), vec!["Answers".to_string()]);
}

#[test]
fn wizard_keeps_one_active_step() {
    init_tracing();
    let steps = Steps::new();
    let mut items: Vec<StepsItem> = ["Cart", "Shipping", "Payment"]
        .into_iter()
        .map(|text| {
            let mut item = StepsItem::new(text);
            item.attach(&steps);
            item
        })
        .collect();

    items[1].set_selected(true);
    items[2].set_selected(true);
    let active: Vec<_> = steps
        .steps()
        .into_iter()
        .filter(|s| s.props.selected)
        .map(|s| s.props.text.unwrap_or_default())
        .collect();
    assert_eq!(active, vec!["Payment"]);

    // Re-attaching to the same wizard is a no-op.
    items[0].attach(&steps);
    assert_eq!(steps.len(), 3);
}

#[test]
fn gauge_tracks_pointer_value() {
    init_tracing();
    let gauge = RadialGauge::new(400.0, 400.0);
    let mut scale = GaugeScale::new(ScaleSpec::default().with_range(0.0, 200.0));
    scale.attach(&gauge);
    let mut pointer = GaugeScalePointer::new(&scale, PointerSpec::at(0.0));
    pointer.attach(&gauge);
    gauge.refresh().take();

    pointer.set_value(150.0);
    assert!(gauge.refresh().take());
    let geometry = gauge.pointer_geometry(pointer.id()).unwrap();
    assert_eq!(geometry.angle, 45.0);
    assert_eq!(geometry.center.x, 200.0);

    drop(scale);
    assert!(gauge.pointer_geometry(pointer.id()).is_none());
}

#[test]
fn report_parameters_flow_into_url() {
    init_tracing();
    let viewer = ReportViewer::new(
        ReportViewerOptions::new("https://reports.local", "Invoices"),
        "https://app.local/",
    );
    let mut customer = ReportParameter::new("Customer", "42");
    customer.attach(&viewer);
    customer.set_value("43");

    assert!(viewer.report_url().ends_with("&Customer=43"));
}

#[test]
fn numeric_steps_and_clamps() {
    init_tracing();
    let host = Arc::new(HeadlessHost::new());
    let mut numeric = Numeric::new(
        host.clone(),
        Some(Decimal::new(95, 2)),
        NumericOptions::default()
            .with_min(0)
            .with_max(1)
            .with_step(StepSize::Value(Decimal::new(5, 2))),
    )
    .unwrap();

    assert!(numeric.step_up().is_some());
    assert_eq!(numeric.value(), Some(Decimal::ONE));
    assert!(numeric.step_up().is_none());
    assert!(numeric.step_down().is_some());
    assert_eq!(numeric.value(), Some(Decimal::new(95, 2)));

    numeric.on_change("7").unwrap();
    assert_eq!(numeric.value(), Some(Decimal::ONE));
    assert_eq!(host.input_value(numeric.input_element()).as_deref(), Some("1"));

    assert!(numeric.on_change("1..2").is_err());
    assert_eq!(numeric.value(), Some(Decimal::ONE));

    numeric.set_bounds(None, Some(Decimal::new(5, 1))).unwrap();
    assert_eq!(numeric.value(), Some(Decimal::new(5, 1)));
}
