use alert_templates::{NoImages, Notification, Renderer};
use anyhow::Context;
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;

/// alert-templates shapes a group of alerts into notification template data,
/// and renders notification texts from it.
#[derive(Debug, clap::Parser)]
#[clap(author, name = "alert-templates", version)]
pub struct Args {
    /// Filter of logs which are written to stderr.
    #[clap(long, global = true, default_value = "warn", env = "ALERT_TEMPLATES_LOG")]
    pub log: String,

    /// External URL of the alerting UI. Overrides the `externalURL` of the notification.
    #[clap(long = "external-url", global = true, env = "ALERT_TEMPLATES_EXTERNAL_URL")]
    pub external_url: Option<String>,

    /// Name of the notification receiver. Overrides the `receiver` of the notification.
    #[clap(long, global = true, env = "ALERT_TEMPLATES_RECEIVER")]
    pub receiver: Option<String>,

    /// Path of a JSON notification to read. Defaults to '-', which represents stdin.
    #[clap(long, global = true, default_value = "-")]
    pub file: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Print the extended template data of the notification, as JSON.
    Extend,
    /// Render template text against the notification, and print the result.
    Render(RenderArgs),
}

#[derive(Debug, clap::Args)]
pub struct RenderArgs {
    /// Template text to render.
    #[clap(long, default_value = "{{> default_message}}")]
    pub template: String,

    /// Files of template definitions. Each is registered under its file stem
    /// and may be used as a partial (ex `{{> my_template}}`).
    #[clap(long = "template-file")]
    pub template_files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs are written to stderr in jsonl format, so that stdout holds only
    // the extended data or rendered text.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(args.log.as_str())
        .json()
        .flatten_event(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    tracing::debug!(?args, "started");

    let mut notification = read_notification(&args.file)?;
    if let Some(external_url) = args.external_url {
        notification.external_url = external_url;
    }
    if let Some(receiver) = args.receiver {
        notification.receiver = receiver;
    }
    let data = notification.into_template_data(chrono::Utc::now());

    match args.command {
        Command::Extend => {
            let extended = alert_templates::extend_data(data, &NoImages);
            let out = serde_json::to_string_pretty(&extended)?;
            println!("{out}");
        }
        Command::Render(RenderArgs {
            template,
            template_files,
        }) => {
            let mut renderer = Renderer::try_new()?;

            for path in template_files {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .with_context(|| format!("invalid template file name {path:?}"))?
                    .to_string();
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading template file {path:?}"))?;

                renderer.register_template(&name, &source)?;
                tracing::debug!(%name, ?path, "registered template file");
            }

            let mut resolver = renderer.tmpl_text(data, &NoImages);
            let text = resolver.text(&template);
            resolver.finish().context("rendering template")?;
            println!("{text}");
        }
    }

    Ok(())
}

fn read_notification(file: &str) -> anyhow::Result<Notification> {
    let mut buf = String::new();
    if file == "-" {
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading notification from stdin")?;
    } else {
        buf = std::fs::read_to_string(file)
            .with_context(|| format!("reading notification file {file:?}"))?;
    }
    serde_json::from_str(&buf).context("parsing notification JSON")
}
