#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to register template {name:?}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
    #[error("failed to render template text")]
    Render(#[from] handlebars::RenderError),
}
