use chrono::Locale;

/// Locale used when the requested one has no templates.
pub const FALLBACK_LOCALE: &str = "en_GB.UTF-8";

/// Verbosity level of a rendering, from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Normal,
    Short,
    Shorter,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Normal, Tier::Short, Tier::Shorter];
}

/// Placeholders a heading template expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingArity {
    /// Only `{period}`.
    Period,
    /// `{count}` and `{period}`.
    CountAndPeriod,
}

/// Heading and line template of one tier in one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Templates {
    pub heading: &'static str,
    pub arity: HeadingArity,
    pub line: &'static str,
}

impl Templates {
    pub fn render_heading(&self, count: usize, period_label: &str) -> String {
        match self.arity {
            HeadingArity::Period => fill(self.heading, &[("period", period_label)]),
            HeadingArity::CountAndPeriod => fill(
                self.heading,
                &[("count", &count.to_string()), ("period", period_label)],
            ),
        }
    }

    pub fn render_line(&self, rank: usize, release: &str, artist: &str) -> String {
        fill(
            self.line,
            &[
                ("rank", &rank.to_string()),
                ("release", release),
                ("artist", artist),
            ],
        )
    }
}

/// Replaces `{name}` placeholders in a single pass; substituted values are
/// never scanned again.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let value = tail.find('}').and_then(|end| {
            values
                .iter()
                .find(|(name, _)| *name == &tail[..end])
                .map(|(_, value)| (end, *value))
        });
        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

const fn templates(heading: &'static str, line: &'static str) -> Templates {
    Templates {
        heading,
        arity: HeadingArity::Period,
        line,
    }
}

static TEMPLATES: &[(Tier, &str, Templates)] = &[
    (
        Tier::Normal,
        "en_GB.UTF-8",
        templates("#TopAlbums in {period}\n", "{rank}. {release} (by {artist})\n"),
    ),
    (
        Tier::Normal,
        "es_ES.UTF-8",
        templates("#TopDiscos de {period}\n", "{rank}. {release} (por {artist})\n"),
    ),
    (
        Tier::Short,
        "en_GB.UTF-8",
        templates("#TopAlbums in {period}\n", "{rank} {release} (by {artist})\n"),
    ),
    (
        Tier::Short,
        "es_ES.UTF-8",
        templates("#TopDiscos de {period}\n", "{rank} {release} (por {artist})\n"),
    ),
    (
        Tier::Shorter,
        "en_GB.UTF-8",
        templates("#TopAlbums in {period}\n", "{rank} {release} ({artist})\n"),
    ),
    (
        Tier::Shorter,
        "es_ES.UTF-8",
        templates("#TopDiscos de {period}\n", "{rank} {release} ({artist})\n"),
    ),
];

/// Templates of `tier` for `locale`, if that pair exists.
pub fn lookup(tier: Tier, locale: &str) -> Option<&'static Templates> {
    TEMPLATES
        .iter()
        .find(|(t, l, _)| *t == tier && *l == locale)
        .map(|(_, _, templates)| templates)
}

/// Locale used for month names.
pub fn time_locale(locale: &str) -> Locale {
    match locale.split('.').next().unwrap_or_default() {
        "es_ES" => Locale::es_ES,
        _ => Locale::en_GB,
    }
}
