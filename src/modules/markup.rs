// HTML for the page. Attribute and class names are what the stylesheet targets.

use std::fmt::Write;

use crate::modules::bookmarks::{favicon_style, BookmarkMenu, MenuEntry, MenuEntryKind};
use crate::modules::render_tree::{RenderTree, TabRow, WindowGroup};
use crate::state::AppState;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

pub fn render_page(state: &AppState, bookmarks: Option<&BookmarkMenu>, version: &str) -> String {
    let mut html = String::new();

    let header_class = if state.settings.show_page_header { "" } else { " class=\"hidden\"" };
    let _ = writeln!(
        html,
        "<div id=\"header\"{}><span id=\"number-of-tabs\">{}</span></div>",
        header_class,
        escape(&state.counter_label)
    );

    html.push_str("<div id=\"box\">\n");
    if let Some(menu) = bookmarks {
        html.push_str(&render_bookmarks(menu));
    }
    html.push_str(&render_tab_list(&state.tree));
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<div id=\"footer\"><span id=\"footer-version\">TabList v. {}</span></div>",
        escape(version)
    );
    html
}

pub fn render_tab_list(tree: &RenderTree) -> String {
    let mut html = String::new();
    for group in tree.groups() {
        render_group(&mut html, tree, group);
    }
    html
}

fn render_group(html: &mut String, tree: &RenderTree, group: &WindowGroup) {
    let frame_class = if group.framed { " class=\"window-frame\"" } else { "" };
    let _ = writeln!(html, "<div data-main-window-id=\"{}\"{}>", group.window_id, frame_class);
    if let Some(header) = group.header() {
        let _ = writeln!(html, "<h2 class=\"window-header\">{}</h2>", escape(&header));
    }
    for row in group.children().iter().filter_map(|h| tree.row(*h)) {
        render_row(html, row);
    }
    html.push_str("</div>\n");
}

fn icon(html: &mut String, class: &str, name: &str, title: &str) {
    let _ = write!(
        html,
        "<span class=\"{} material-icons\" title=\"{}\">{}</span>",
        class,
        escape(title),
        name
    );
}

fn render_row(html: &mut String, row: &TabRow) {
    let mut classes = String::from("data-container");
    if row.hidden {
        classes.push_str(" hidden-tab");
    }
    if row.discarded {
        classes.push_str(" discarded-tab");
    }
    let _ = write!(
        html,
        "<div class=\"{}\" data-tab-id=\"{}\" data-tab-index=\"{}\" data-window-id=\"{}\">",
        classes, row.tab_id, row.index, row.window_id
    );

    let _ = write!(
        html,
        "<div class=\"favicon-container\"><img class=\"favicon-container-image\" src=\"{}\" title=\"Switch to this tab\"></div>",
        escape(&row.favicon_src)
    );

    let _ = write!(html, "<div class=\"text-container\" title=\"{}\">", escape(&row.title));
    if row.secure {
        icon(html, "text-container-lock", "lock", "This site uses HTTPS protocol for secure communication.");
    }
    if row.audible {
        icon(
            html,
            "text-container-audible",
            "volume_up",
            "Indicates that tab produced sound over the past couple of seconds.",
        );
    }
    let _ = write!(
        html,
        "<span class=\"text-container-title\">{}</span><br><span class=\"text-container-url\">{}</span></div>",
        escape(&row.title),
        escape(&row.url)
    );

    html.push_str("<div class=\"options-container\">");
    icon(html, "options-container-drag", "drag_handle", "Drag tab");
    icon(html, "options-container-reload", "refresh", "Reload tab");
    icon(html, "options-container-discard", "memory", "Discard tab");
    icon(html, "options-container-cross", "close", "Close tab");
    html.push_str("</div></div>\n");
}

pub fn render_bookmarks(menu: &BookmarkMenu) -> String {
    let mut html = String::from("<div id=\"bookmarks-container\"><nav id=\"bookmarks-menu\">");
    render_entries(&mut html, &menu.entries);
    html.push_str("</nav></div>\n");
    html
}

fn render_entries(html: &mut String, entries: &[MenuEntry]) {
    if entries.is_empty() {
        return;
    }
    html.push_str("<ul>");
    for entry in entries {
        let mut classes = Vec::new();
        if entry.top_level {
            classes.push("bookmark-container");
        }
        let link_class = if entry.has_title() { "" } else { " class=\"no-title\"" };

        match &entry.kind {
            MenuEntryKind::Folder { children } => {
                classes.push("folder");
                let _ = write!(
                    html,
                    "<li class=\"{}\"><a data-bookmark-id=\"{}\"{}>{}</a>",
                    classes.join(" "),
                    escape(&entry.id),
                    link_class,
                    escape(entry.display_title())
                );
                render_entries(html, children);
            }
            MenuEntryKind::Link { url } => {
                classes.push("link");
                let _ = write!(
                    html,
                    "<li class=\"{}\" style=\"{}\"><a href=\"{}\" title=\"{}\" data-bookmark-id=\"{}\"{}>{}</a>",
                    classes.join(" "),
                    escape(&favicon_style(url)),
                    escape(url),
                    escape(entry.title.as_deref().unwrap_or_default()),
                    escape(&entry.id),
                    link_class,
                    escape(entry.display_title())
                );
            }
        }
        html.push_str("</li>");
    }
    html.push_str("</ul>");
}
