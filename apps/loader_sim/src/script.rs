//! Timeline scripts: `;`-separated steps of the form `<ms> <action> [argument]`.
//!
//! ```text
//! 0 submit Calculando cuota...; 200 load; 900 click /libranza/; 950 unload
//! ```

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use loader_core::PageEvent;
use shared::{
    domain::{IndicatorKind, ShowRequest},
    markers::{ElementData, FormSubmission, LinkActivation, ATTR_LOADER_TEXT},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Show(ShowRequest),
    Hide,
    Page(PageEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub at: Duration,
    pub action: Action,
}

pub fn parse_script(script: &str) -> Result<Vec<Step>> {
    let mut steps = script
        .split(';')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_step(raw).with_context(|| format!("invalid step '{raw}'")))
        .collect::<Result<Vec<_>>>()?;
    steps.sort_by_key(|step| step.at);
    Ok(steps)
}

fn parse_step(raw: &str) -> Result<Step> {
    let mut parts = raw.splitn(3, char::is_whitespace);
    let at = parts
        .next()
        .ok_or_else(|| anyhow!("missing time"))?
        .trim_end_matches("ms")
        .parse::<u64>()
        .context("time must be whole milliseconds")?;
    let verb = parts.next().ok_or_else(|| anyhow!("missing action"))?;
    let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

    let action = match verb {
        "show" => Action::Show(show_request(arg, IndicatorKind::Loading)),
        "show!" => Action::Show(show_request(arg, IndicatorKind::Loading).immediate()),
        "check" => Action::Show(show_request(arg, IndicatorKind::Check)),
        "hide" => Action::Hide,
        "unload" => Action::Page(PageEvent::BeforeUnload),
        "load" => Action::Page(PageEvent::Load),
        "restore" => Action::Page(PageEvent::PageShow { persisted: true }),
        "click" => Action::Page(PageEvent::LinkActivated(LinkActivation::new(
            arg.ok_or_else(|| anyhow!("click needs an href"))?,
        ))),
        "download-link" => Action::Page(PageEvent::LinkActivated(
            LinkActivation::new(arg.ok_or_else(|| anyhow!("download-link needs an href"))?)
                .download(),
        )),
        "submit" => {
            let mut form = ElementData::new();
            if let Some(text) = arg {
                form.set(ATTR_LOADER_TEXT, text);
            }
            Action::Page(PageEvent::FormSubmitted(FormSubmission::new(form)))
        }
        other => bail!("unknown action '{other}'"),
    };

    Ok(Step {
        at: Duration::from_millis(at),
        action,
    })
}

fn show_request(text: Option<&str>, kind: IndicatorKind) -> ShowRequest {
    ShowRequest {
        text: text.map(str::to_owned),
        kind,
        immediate: false,
    }
}
