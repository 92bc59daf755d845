use crate::extend::{extend_data, ExtendedData, ImageStore};
use crate::{defaults, Error, TemplateData};
use handlebars::Handlebars;

/// Renderer holds registered notification templates, and renders template
/// text against ExtendedData.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    /// Build a Renderer having helpers and default templates registered.
    pub fn try_new() -> Result<Self, Error> {
        let mut registry = Handlebars::new();
        // Notifications are plain text, and values must not be HTML-escaped.
        registry.register_escape_fn(handlebars::no_escape);
        helpers::register(&mut registry);

        let mut renderer = Self { registry };
        for (name, source) in defaults::TEMPLATES.iter() {
            renderer.register_template(name, source)?;
        }
        Ok(renderer)
    }

    /// Register a named template, which may then be used as a partial
    /// (ex `{{> name}}`) from template text. Registering an existing name
    /// replaces its template.
    pub fn register_template(&mut self, name: &str, source: &str) -> Result<(), Error> {
        self.registry
            .register_template_string(name, source)
            .map_err(|source| Error::Template {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Extend `data` and return a TextResolver of template text over it.
    pub fn tmpl_text<'r>(
        &'r self,
        data: TemplateData,
        images: &dyn ImageStore,
    ) -> TextResolver<'r> {
        TextResolver {
            registry: &self.registry,
            data: extend_data(data, images),
            error: None,
        }
    }
}

/// TextResolver renders template texts against ExtendedData.
///
/// The first error encountered while rendering is retained, and once an
/// error has occurred all further texts resolve to an empty string.
/// Callers resolve all of the texts of a notification and then check
/// `error()` (or call `finish()`) once.
pub struct TextResolver<'r> {
    registry: &'r Handlebars<'static>,
    data: ExtendedData,
    error: Option<Error>,
}

impl TextResolver<'_> {
    pub fn text(&mut self, template: &str) -> String {
        if self.error.is_some() || template.is_empty() {
            return String::new();
        }
        match self.registry.render_template(template, &self.data) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(error = %err, %template, "failed to render template text");
                self.error = Some(Error::Render(err));
                String::new()
            }
        }
    }

    pub fn data(&self) -> &ExtendedData {
        &self.data
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn finish(self) -> Result<ExtendedData, Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}

mod helpers {
    use handlebars::{handlebars_helper, Handlebars};
    use itertools::Itertools;
    use serde_json::Value;

    handlebars_helper!(upper: |s: str| s.to_uppercase());
    handlebars_helper!(firing: |alerts: array| with_status(alerts, "firing"));
    handlebars_helper!(resolved: |alerts: array| with_status(alerts, "resolved"));
    handlebars_helper!(join: |items: array, sep: str| items.iter().map(display).join(sep));
    handlebars_helper!(values: |obj: object| obj.values().cloned().collect::<Vec<_>>());
    handlebars_helper!(remove: |obj: object, other: object| obj
        .iter()
        .filter(|(k, _)| !other.contains_key(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<serde_json::Map<_, _>>());
    handlebars_helper!(has_values: |alert: object| alert
        .get("values")
        .and_then(Value::as_object)
        .is_some_and(|v| !v.is_empty()));

    pub fn register(registry: &mut Handlebars<'_>) {
        registry.register_helper("upper", Box::new(upper));
        registry.register_helper("firing", Box::new(firing));
        registry.register_helper("resolved", Box::new(resolved));
        registry.register_helper("join", Box::new(join));
        registry.register_helper("values", Box::new(values));
        registry.register_helper("remove", Box::new(remove));
        registry.register_helper("has_values", Box::new(has_values));
    }

    fn with_status(alerts: &[Value], status: &str) -> Vec<Value> {
        alerts
            .iter()
            .filter(|a| a.get("status").and_then(Value::as_str) == Some(status))
            .cloned()
            .collect()
    }

    fn display(v: &Value) -> String {
        match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
