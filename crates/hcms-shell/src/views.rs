//! Server-rendered HTML for the shell's views.

use std::fmt::Write as _;

use hcms_core::{LoadedUnit, RemoteDescriptor};
use hcms_federation::PortalRoute;

use crate::dashboard::SlotMount;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n{head}</head>\n<body>\n\
         <nav><a href=\"/\">Home</a> | <a href=\"/dashboard\">Dashboard</a></nav>\n\
         {body}</body>\n</html>\n",
        title = escape(title),
    )
}

/// Home view: one link per registered remote module.
pub fn home(remotes: &[RemoteDescriptor]) -> String {
    let mut body = String::from("<h1>Healthcare Portal</h1>\n");
    if remotes.is_empty() {
        body.push_str("<p>No remote modules are registered.</p>\n");
    } else {
        body.push_str("<ul class=\"remote-modules\">\n");
        for d in remotes {
            let _ = writeln!(
                body,
                "<li><a href=\"/{path}\">{name}</a></li>",
                path = escape(d.normalized_route_path()),
                name = escape(&d.display_name),
            );
        }
        body.push_str("</ul>\n");
    }
    page("Healthcare Portal", "", &body)
}

/// Host page for a navigated remote route.
///
/// The browser evaluates the remote entry and mounts the exposed module into
/// `#remote-root`.
pub fn remote_host(route: &PortalRoute, unit: &LoadedUnit) -> String {
    let key = route.remote_key().unwrap_or_default();
    let head = format!(
        "<script src=\"{entry}\" defer></script>\n",
        entry = escape(&unit.entry_url)
    );
    let body = format!(
        "<h1>{title}</h1>\n<div id=\"remote-root\" data-remote=\"{key}\" \
         data-exposed-module=\"{module}\" data-export=\"{export}\"></div>\n",
        title = escape(&route.title),
        key = escape(key),
        module = escape(&unit.exposed_module),
        export = escape(unit.export.name()),
    );
    page(&route.title, &head, &body)
}

pub fn dashboard(mounts: &[SlotMount]) -> String {
    let mut head = String::new();
    let mut body = String::from("<h1>Shared Dashboard</h1>\n");
    for mount in mounts {
        match (&mount.entry_url, &mount.error) {
            (Some(entry), None) => {
                let _ = writeln!(head, "<script src=\"{}\" defer></script>", escape(entry));
                let _ = writeln!(
                    body,
                    "<section id=\"{slot}\" data-remote=\"{remote}\" \
                     data-exposed-module=\"{module}\" data-component=\"{component}\"></section>",
                    slot = escape(&mount.slot),
                    remote = escape(&mount.remote),
                    module = escape(&mount.exposed_module),
                    component = escape(mount.component.as_deref().unwrap_or_default()),
                );
            }
            (_, error) => {
                let _ = writeln!(
                    body,
                    "<section id=\"{slot}\" class=\"mount-failed\">\
                     <p>{remote} is unavailable: {error}</p></section>",
                    slot = escape(&mount.slot),
                    remote = escape(&mount.remote),
                    error = escape(error.as_deref().unwrap_or("not mounted")),
                );
            }
        }
    }
    page("Shared Dashboard", &head, &body)
}
