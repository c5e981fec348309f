//! Masked text input.

use std::fmt;

use serde::Deserialize;

use horizon_forms_core::{CommitOutcome, ObjectId};

use crate::form::FormComponent;
use crate::host::ElementRef;

/// Configuration of a [`Password`] input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PasswordOptions {
    /// Reject edits.
    pub read_only: bool,
    /// Let the browser offer stored credentials.
    pub auto_complete: bool,
    /// Hint shown while empty.
    pub placeholder: Option<String>,
    /// Initial disabled state.
    pub disabled: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            auto_complete: true,
            placeholder: None,
            disabled: false,
        }
    }
}

impl PasswordOptions {
    /// Set the read-only flag.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the autocomplete flag.
    pub fn with_auto_complete(mut self, auto_complete: bool) -> Self {
        self.auto_complete = auto_complete;
        self
    }
}

/// A password field bound to a `String`.
pub struct Password {
    form: FormComponent<String>,
    options: PasswordOptions,
    input: ElementRef,
}

impl Password {
    /// Create an empty field.
    pub fn new(options: PasswordOptions) -> Self {
        let mut form = FormComponent::new(String::new());
        form.set_disabled(options.disabled);
        let input = ElementRef::for_object("password", form.id());
        Self {
            form,
            options,
            input,
        }
    }

    /// The widget's unique id.
    pub fn id(&self) -> ObjectId {
        self.form.id()
    }

    /// The bindable state.
    pub fn form(&self) -> &FormComponent<String> {
        &self.form
    }

    /// Mutable access to the bindable state.
    pub fn form_mut(&mut self) -> &mut FormComponent<String> {
        &mut self.form
    }

    /// The current text.
    pub fn value(&self) -> String {
        self.form.value()
    }

    /// The options.
    pub fn options(&self) -> &PasswordOptions {
        &self.options
    }

    /// The input element.
    pub fn input_element(&self) -> &ElementRef {
        &self.input
    }

    /// Value of the input's `autocomplete` attribute.
    pub fn autocomplete_attribute(&self) -> &'static str {
        if self.options.auto_complete {
            "on"
        } else {
            "new-password"
        }
    }

    /// Commit text typed by the user. Ignored while disabled or read-only.
    pub fn on_change(&self, text: &str) -> Option<CommitOutcome> {
        if self.form.is_disabled() || self.options.read_only {
            return None;
        }
        Some(self.form.commit(text.to_owned()))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The value is a secret.
        f.debug_struct("Password")
            .field("id", &self.form.id())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_change_commits_and_notifies() {
        let password = Password::new(PasswordOptions::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        password
            .form()
            .notifier()
            .change
            .connect(move |v: &String| s.lock().push(v.clone()));

        assert_eq!(password.on_change("hunter2"), Some(CommitOutcome::Committed));
        assert_eq!(password.value(), "hunter2");
        assert_eq!(*seen.lock(), vec!["hunter2".to_string()]);
    }

    #[test]
    fn test_read_only_ignores_edits() {
        let password = Password::new(PasswordOptions::default().with_read_only(true));
        assert_eq!(password.on_change("x"), None);
        assert!(password.value().is_empty());
    }

    #[test]
    fn test_autocomplete_attribute() {
        let on = Password::new(PasswordOptions::default());
        let off = Password::new(PasswordOptions::default().with_auto_complete(false));
        assert_eq!(on.autocomplete_attribute(), "on");
        assert_eq!(off.autocomplete_attribute(), "new-password");
    }

    #[test]
    fn test_debug_hides_value() {
        let password = Password::new(PasswordOptions::default());
        password.on_change("secret");
        assert!(!format!("{password:?}").contains("secret"));
    }
}
