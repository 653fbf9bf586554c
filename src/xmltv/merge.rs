use crate::allowlist::AllowList;
use crate::xmltv::dom::{Element, Node};
use crate::xmltv::fetch::fetch_feed;
use std::time::Duration;

/// Programme titles that get their sub-title folded into the title, so
/// distinct airings stay distinguishable in guide clients that only show
/// the title line.
const FOLDED_TITLES: [&str; 2] = ["NHL Hockey", "Live: NFL Football"];

/// Sub-title fallback used when a folded programme has no `sub-title`
/// element at all. A present-but-empty `sub-title` contributes its empty
/// text instead; element existence decides, not text content.
const NO_SUBTITLE: &str = "No subtitle";

/// Counters for one merge run, reported in the end-of-run summary.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MergeStats {
    /// Feeds fetched and parsed successfully
    pub feeds_merged: usize,
    /// Feeds skipped due to fetch, decompression, or parse failure
    pub feeds_skipped: usize,
    /// Channel elements kept across all feeds
    pub channels: usize,
    /// Programme elements kept across all feeds
    pub programmes: usize,
}

/// Fetches every configured feed in order and merges the allow-listed
/// entries into a single `tv` document.
///
/// Feeds are processed strictly sequentially in the order given, so the
/// output is deterministic: feed N's survivors all precede feed N+1's.
/// A failing feed is logged and skipped; the merge always produces a
/// document, even if every feed fails (an empty `tv` root).
pub async fn build_epg(
    client: &reqwest::Client,
    urls: &[String],
    allow: &AllowList,
    timeout: Duration,
    max_feed_size: usize,
) -> (Element, MergeStats) {
    let mut out = Element::new("tv");
    let mut stats = MergeStats::default();

    for url in urls {
        tracing::info!(url = %url, "Fetching feed");
        let feed = match fetch_feed(client, url, timeout, max_feed_size).await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Skipping feed");
                stats.feeds_skipped += 1;
                continue;
            }
        };

        let (channels, programmes) = filter_into(&mut out, feed, allow);
        tracing::info!(
            url = %url,
            channels = channels,
            programmes = programmes,
            "Merged feed"
        );
        stats.feeds_merged += 1;
        stats.channels += channels;
        stats.programmes += programmes;
    }

    (out, stats)
}

/// Moves the allow-listed entries of one feed document into the output.
///
/// Matching `channel` elements (by `id` attribute) are appended first, then
/// matching `programme` elements (by `channel` attribute), each group in
/// feed encounter order — the same shape every feed contributes, so
/// per-feed blocks in the output stay uniform. Programme titles are
/// normalized before the move. Returns `(channels, programmes)` kept.
pub fn filter_into(out: &mut Element, feed: Element, allow: &AllowList) -> (usize, usize) {
    let mut channels = Vec::new();
    let mut programmes = Vec::new();

    for node in feed.children {
        let Node::Element(el) = node else { continue };
        match el.name.as_str() {
            "channel" => {
                if let Some(id) = el.attr("id") {
                    if allow.contains(id) {
                        tracing::debug!(tvg_id = %id, "Keeping channel");
                        channels.push(el);
                    }
                }
            }
            "programme" => {
                if el.attr("channel").is_some_and(|id| allow.contains(id)) {
                    let mut el = el;
                    fold_subtitle(&mut el);
                    programmes.push(el);
                }
            }
            _ => {}
        }
    }

    let counts = (channels.len(), programmes.len());
    out.children.extend(channels.into_iter().map(Node::Element));
    out.children.extend(programmes.into_iter().map(Node::Element));
    counts
}

/// Applies the title-normalization rule to one programme, in place.
///
/// Only titles matching [`FOLDED_TITLES`] exactly are rewritten; the
/// sub-title text (or [`NO_SUBTITLE`] when the element is absent) is
/// appended with a single space. Programmes without a title element, or
/// with an empty title element, are left untouched.
fn fold_subtitle(programme: &mut Element) {
    let Some(title) = programme.child("title").and_then(Element::text) else {
        return;
    };
    if !FOLDED_TITLES.contains(&title) {
        return;
    }

    let subtitle = programme
        .child_text("sub-title")
        .unwrap_or(NO_SUBTITLE)
        .to_owned();
    let folded = format!("{} {}", title, subtitle);

    // The title element is known to exist here
    if let Some(title_el) = programme.child_mut("title") {
        title_el.set_text(folded);
    }
}
