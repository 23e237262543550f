//! Server-rendered checklist page
//!
//! The page is complete without script: every node is a checkbox, and the
//! progress bar reflects the document it was rendered from. The inline
//! script adds toggling through the API and follows the party's event feed.

use checklist_core::{ChecklistDocument, Section, Task};
use party_sync::PartyKey;
use url::Url;

pub struct PageView<'a> {
    pub title: &'a str,
    pub footer: Option<&'a str>,
    pub key: &'a PartyKey,
    pub document: &'a ChecklistDocument,
    pub share_url: &'a Url,
    /// False when the store could not be reached and the page shows a local copy
    pub synced: bool,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn checkbox(section_id: &str, task_id: &str, subtask_id: Option<&str>, node: &Task) -> String {
    let subtask_attr = subtask_id
        .map(|id| format!(" data-subtask=\"{}\"", escape_html(id)))
        .unwrap_or_default();
    let checked = if node.is_completed { " checked" } else { "" };
    let time = node
        .time
        .as_deref()
        .map(|t| format!("<span class=\"time\">{}</span> ", escape_html(t)))
        .unwrap_or_default();

    format!(
        "<label class=\"node{done}\"><input type=\"checkbox\" data-section=\"{section}\" data-task=\"{task}\"{subtask_attr}{checked}> {time}<span class=\"text\">{text}</span></label>",
        done = if node.is_completed { " done" } else { "" },
        section = escape_html(section_id),
        task = escape_html(task_id),
        text = escape_html(&node.text),
    )
}

fn render_section(section: &Section) -> String {
    let mut html = format!(
        "<section class=\"section\" id=\"section-{id}\"><h2>{title} <small>{timeframe}</small></h2><ul>",
        id = escape_html(&section.id),
        title = escape_html(&section.title),
        timeframe = escape_html(&section.timeframe),
    );

    for task in &section.tasks {
        html.push_str("<li>");
        html.push_str(&checkbox(&section.id, &task.id, None, task));
        if !task.sub_tasks().is_empty() {
            html.push_str("<ul class=\"subtasks\">");
            for sub in task.sub_tasks() {
                html.push_str("<li>");
                html.push_str(&checkbox(&section.id, &task.id, Some(&sub.id), sub));
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }
        html.push_str("</li>");
    }

    html.push_str("</ul></section>");
    html
}

pub fn render_page(view: &PageView<'_>) -> String {
    let progress = view.document.progress();
    let percent = progress.percent();

    let sections: String = view.document.sections.iter().map(render_section).collect();
    let offline = if view.synced {
        String::new()
    } else {
        "<p class=\"offline\">Live sync is unavailable. Changes stay on this page.</p>".to_string()
    };
    let footer = view
        .footer
        .map(|f| format!("<footer>{}</footer>", escape_html(f)))
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body data-party="{party}" data-synced="{synced}">
<header>
<h1>{title}</h1>
<div class="progress"><div class="bar" id="progress-bar" style="width: {percent}%"></div></div>
<p id="progress-text">{progress}</p>
<p class="share">Share this party: <a id="share-link" href="{share}">{share}</a></p>
<button type="button" id="new-party">Start a new party</button>
{offline}
</header>
<main>{sections}</main>
{footer}
<script>{SCRIPT}</script>
</body>
</html>
"##,
        title = escape_html(view.title),
        party = escape_html(view.key.as_str()),
        synced = view.synced,
        share = escape_html(view.share_url.as_str()),
    )
}

const STYLE: &str = r##"
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 0 auto; padding: 1rem; color: #222; }
.progress { background: #eee; border-radius: 0.5rem; height: 0.75rem; overflow: hidden; }
.bar { background: #e4007c; height: 100%; transition: width 0.3s; }
.section h2 small { color: #777; font-weight: normal; }
ul { list-style: none; padding-left: 0; }
.subtasks { padding-left: 1.75rem; }
.node.done .text { text-decoration: line-through; color: #888; }
.time { color: #e4007c; font-variant-numeric: tabular-nums; }
.offline { color: #a60; }
footer { margin-top: 2rem; text-align: center; }
"##;

const SCRIPT: &str = r##"
(function () {
  const party = document.body.dataset.party;
  const sessionKey = "party-session";

  async function session() {
    let id = sessionStorage.getItem(sessionKey);
    if (!id) {
      const res = await fetch("/v1/session", { method: "POST" });
      id = (await res.json()).session_id;
      sessionStorage.setItem(sessionKey, id);
    }
    return id;
  }

  function boxes() {
    return Array.from(document.querySelectorAll("input[data-section]"));
  }

  function showProgress(percent) {
    document.getElementById("progress-bar").style.width = percent + "%";
    document.getElementById("progress-text").textContent = percent + "% Complete";
  }

  function localProgress() {
    const all = boxes();
    if (all.length === 0) return 0;
    const done = all.filter((b) => b.checked).length;
    return Math.floor((200 * done + all.length) / (2 * all.length));
  }

  function mark(box, done) {
    box.checked = done;
    box.closest("label").classList.toggle("done", done);
  }

  function apply(snapshot) {
    const nodes = new Map();
    for (const section of snapshot.document.sections) {
      for (const task of section.tasks || []) {
        nodes.set(section.id + "/" + task.id + "/", task.isCompleted);
        for (const sub of task.subTasks || []) {
          nodes.set(section.id + "/" + task.id + "/" + sub.id, sub.isCompleted);
        }
      }
    }
    for (const box of boxes()) {
      const id = box.dataset.section + "/" + box.dataset.task + "/" + (box.dataset.subtask || "");
      if (nodes.has(id)) mark(box, nodes.get(id));
    }
    showProgress(snapshot.progress.percent);
  }

  document.addEventListener("change", async (event) => {
    const box = event.target;
    if (!box.dataset || !box.dataset.section) return;
    mark(box, box.checked);
    showProgress(localProgress());
    const target = { sectionId: box.dataset.section, taskId: box.dataset.task };
    if (box.dataset.subtask) target.subtaskId = box.dataset.subtask;
    try {
      const res = await fetch("/v1/parties/" + encodeURIComponent(party) + "/toggle", {
        method: "POST",
        headers: { "Content-Type": "application/json", "X-Party-Session": await session() },
        body: JSON.stringify(target),
      });
      if (res.ok) apply(await res.json());
    } catch (err) {
      console.warn("toggle not synced", err);
    }
  });

  document.getElementById("new-party").addEventListener("click", async () => {
    const res = await fetch("/v1/parties", {
      method: "POST",
      headers: { "X-Party-Session": await session() },
    });
    if (res.ok) window.location.href = (await res.json()).share_url;
  });

  if (window.EventSource) {
    const events = new EventSource("/v1/parties/" + encodeURIComponent(party) + "/events");
    events.addEventListener("document", (event) => apply(JSON.parse(event.data)));
  }
})();
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::{ChecklistTemplate, ToggleTarget};

    fn render(document: &ChecklistDocument, synced: bool) -> String {
        let key = PartyKey::default_party();
        let url = Url::parse("http://localhost:8080/?party=main-party").unwrap();
        render_page(&PageView {
            title: "Party Prep Checklist",
            footer: Some("Have fun <3"),
            key: &key,
            document,
            share_url: &url,
            synced,
        })
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_page_contains_every_node() {
        let document = ChecklistTemplate::builtin().unwrap().document();
        let html = render(&document, true);

        assert!(html.contains("<title>Party Prep Checklist</title>"));
        assert!(html.contains("0% Complete"));
        assert_eq!(html.matches("type=\"checkbox\"").count(), 24);
        assert!(html.contains("data-subtask=\"sub1\""));
        assert!(html.contains("Have fun &lt;3"));
        assert!(!html.contains("class=\"offline\""));
    }

    #[test]
    fn test_completed_nodes_render_checked() {
        let document = ChecklistTemplate::builtin()
            .unwrap()
            .document()
            .toggled(&ToggleTarget::task("morning", "task1"));
        let html = render(&document, false);

        assert!(html.contains("4% Complete"));
        assert_eq!(html.matches(" checked>").count(), 1);
        assert!(html.contains("class=\"offline\""));
    }
}
