//! Embedded report viewer.
//!
//! [`ReportParameter`]s register with a [`ReportViewer`]; the viewer keeps
//! their last committed name (as the entry text) and value (as the entry
//! payload) and composes the render URL from them.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use url::form_urlencoded;

use horizon_forms_core::{
    ChildChange, ChildProps, ObjectId, ParentLink, RefreshSignal, Registry, SelectionMode,
};

/// Path the proxy endpoint is served under.
const PROXY_PATH: &str = "__ssrsreport";

/// Where and how the report is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReportViewerOptions {
    /// Base URL of the report server.
    pub report_server: String,
    /// Report path below the server root.
    pub report_name: String,
    /// Route the request through the application's proxy endpoint.
    pub use_proxy: bool,
    /// Server hosting the proxy; the application base URI when unset.
    pub local_server: Option<String>,
}

impl ReportViewerOptions {
    /// Options for `report_name` on `report_server`.
    pub fn new(report_server: impl Into<String>, report_name: impl Into<String>) -> Self {
        Self {
            report_server: report_server.into(),
            report_name: report_name.into(),
            ..Self::default()
        }
    }

    /// Route through the proxy, optionally on a dedicated server.
    pub fn with_proxy(mut self, local_server: Option<String>) -> Self {
        self.use_proxy = true;
        self.local_server = local_server;
        self
    }
}

/// Displays a server-rendered report.
pub struct ReportViewer {
    id: ObjectId,
    options: ReportViewerOptions,
    base_uri: String,
    parameters: Arc<Registry<String>>,
}

impl ReportViewer {
    /// Create a viewer for an application served from `base_uri`.
    pub fn new(options: ReportViewerOptions, base_uri: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            options,
            base_uri: base_uri.into(),
            parameters: Arc::new(Registry::new(SelectionMode::Independent)),
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The options.
    pub fn options(&self) -> &ReportViewerOptions {
        &self.options
    }

    /// Replace the options and reload.
    pub fn set_options(&mut self, options: ReportViewerOptions) {
        if self.options != options {
            self.options = options;
            self.reload();
        }
    }

    /// The viewer's refresh signal.
    pub fn refresh(&self) -> &RefreshSignal {
        self.parameters.refresh()
    }

    /// Request a re-render.
    pub fn reload(&self) {
        self.parameters.refresh().request();
    }

    /// Registered `(name, value)` pairs in registration order.
    pub fn parameters(&self) -> Vec<(String, String)> {
        self.parameters
            .entries()
            .into_iter()
            .map(|e| (e.props.text.unwrap_or_default(), e.data))
            .collect()
    }

    /// The URL the report frame loads.
    pub fn report_url(&self) -> String {
        let params: Vec<String> = self
            .parameters()
            .into_iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| format!("{}={}", encode(&name), encode(&value)))
            .collect();
        let query = if params.is_empty() {
            String::new()
        } else {
            format!("&{}", params.join("&"))
        };

        let url = format!(
            "{}/Pages/ReportViewer.aspx?%2f{}&rs:Command=Render&rs:Embed=true{}",
            self.options.report_server.trim_end_matches('/'),
            self.options.report_name,
            query
        );
        if !self.options.use_proxy {
            return url;
        }

        let encoded = encode(&url);
        match &self.options.local_server {
            Some(server) => format!(
                "{}/{PROXY_PATH}?url={encoded}",
                server.trim_end_matches('/')
            ),
            None => format!("{}{PROXY_PATH}?url={encoded}", self.base_uri),
        }
    }

    fn link(&self) -> ParentLink<String> {
        self.parameters.link()
    }
}

fn encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

impl fmt::Debug for ReportViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportViewer")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// A named value passed to the report.
pub struct ReportParameter {
    id: ObjectId,
    name: String,
    value: String,
    link: ParentLink<String>,
}

impl ReportParameter {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            value: value.into(),
            link: ParentLink::default(),
        }
    }

    /// The parameter's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Register with `viewer`.
    pub fn attach(&mut self, viewer: &ReportViewer) {
        let link = viewer.link();
        if self.link.same_parent(&link) {
            return;
        }
        self.link.unregister(self.id);
        self.link = link;
        self.link
            .register(self.id, ChildProps::with_text(&self.name), self.value.clone());
    }

    /// Rename the parameter.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.notify(ChildChange::TEXT);
        }
    }

    /// Change the value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if self.value != value {
            self.value = value;
            self.notify(ChildChange::DATA);
        }
    }

    /// Leave the viewer.
    pub fn dispose(&mut self) {
        self.link.unregister(self.id);
    }

    fn notify(&self, changed: ChildChange) {
        self.link.notify(
            self.id,
            ChildProps::with_text(&self.name),
            self.value.clone(),
            changed,
        );
    }
}

impl Drop for ReportParameter {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ReportParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportParameter")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

static_assertions::assert_impl_all!(ReportViewer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(options: ReportViewerOptions) -> ReportViewer {
        ReportViewer::new(options, "https://app.example.com/")
    }

    #[test]
    fn test_url_without_parameters() {
        let viewer = viewer(ReportViewerOptions::new("https://reports.local/ReportServer", "Sales"));
        assert_eq!(
            viewer.report_url(),
            "https://reports.local/ReportServer/Pages/ReportViewer.aspx?%2fSales&rs:Command=Render&rs:Embed=true"
        );
    }

    #[test]
    fn test_url_with_named_parameters() {
        let viewer = viewer(ReportViewerOptions::new("https://reports.local", "Sales"));
        let mut year = ReportParameter::new("Year", "2024");
        let mut unnamed = ReportParameter::new("", "ignored");
        let mut region = ReportParameter::new("Region", "North East");
        year.attach(&viewer);
        unnamed.attach(&viewer);
        region.attach(&viewer);

        assert_eq!(
            viewer.report_url(),
            "https://reports.local/Pages/ReportViewer.aspx?%2fSales&rs:Command=Render&rs:Embed=true&Year=2024&Region=North+East"
        );
    }

    #[test]
    fn test_proxy_url_is_encoded() {
        let viewer = viewer(ReportViewerOptions::new("http://r", "A").with_proxy(None));
        assert_eq!(
            viewer.report_url(),
            "https://app.example.com/__ssrsreport?url=http%3A%2F%2Fr%2FPages%2FReportViewer.aspx%3F%252fA%26rs%3ACommand%3DRender%26rs%3AEmbed%3Dtrue"
        );

        let viewer = ReportViewer::new(
            ReportViewerOptions::new("http://r", "A").with_proxy(Some("http://proxy/".into())),
            "/",
        );
        assert!(viewer.report_url().starts_with("http://proxy/__ssrsreport?url=http%3A%2F%2Fr"));
    }

    #[test]
    fn test_parameter_change_refreshes_viewer() {
        let viewer = viewer(ReportViewerOptions::new("http://r", "A"));
        let mut param = ReportParameter::new("Year", "2023");
        param.attach(&viewer);
        viewer.refresh().take();

        param.set_value("2024");
        assert!(viewer.refresh().take());
        assert_eq!(viewer.parameters(), vec![("Year".to_string(), "2024".to_string())]);

        param.set_name("FiscalYear");
        assert_eq!(viewer.parameters()[0].0, "FiscalYear");

        drop(param);
        assert!(viewer.parameters().is_empty());
    }

    #[test]
    fn test_options_from_parameter_bag() {
        let options: ReportViewerOptions = serde_json::from_value(serde_json::json!({
            "ReportServer": "http://r",
            "ReportName": "A",
            "UseProxy": true
        }))
        .unwrap();
        assert!(options.use_proxy);
        assert_eq!(options.local_server, None);
    }
}
