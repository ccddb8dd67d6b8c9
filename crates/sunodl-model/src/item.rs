use std::fmt;

/// One asset kind that can be saved for a track page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Html,
    Video,
    Audio,
    Lyrics,
    Prompt,
    Image,
}

impl OutputKind {
    /// All kinds, in canonical order.
    pub const ALL: [OutputKind; 6] = [
        OutputKind::Html,
        OutputKind::Video,
        OutputKind::Audio,
        OutputKind::Lyrics,
        OutputKind::Prompt,
        OutputKind::Image,
    ];

    /// Directory this kind's files land in, relative to the output root.
    pub fn dir_name(self) -> &'static str {
        match self {
            OutputKind::Html => "HTML",
            OutputKind::Video => "Videos",
            OutputKind::Audio => "Audio",
            OutputKind::Lyrics => "Lyrics",
            OutputKind::Prompt => "Prompts",
            OutputKind::Image => "Images",
        }
    }

    /// Short label used in prompts and failure reasons.
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::Html => "html",
            OutputKind::Video => "video",
            OutputKind::Audio => "audio",
            OutputKind::Lyrics => "lyrics",
            OutputKind::Prompt => "prompt",
            OutputKind::Image => "image",
        }
    }

    /// File name for this kind, from an already-sanitized track title.
    pub fn file_name(self, title: &str) -> String {
        match self {
            OutputKind::Html => format!("{title} - Parsed.html"),
            OutputKind::Video => format!("{title}.mp4"),
            OutputKind::Audio => format!("{title}.mp3"),
            OutputKind::Lyrics => format!("{title} - Lyrics.txt"),
            OutputKind::Prompt => format!("{title} - Prompt.txt"),
            OutputKind::Image => format!("{title} - Art.jpeg"),
        }
    }

    /// Kinds derived from the rendered page (browser pipeline).
    pub fn is_text(self) -> bool {
        matches!(self, OutputKind::Html | OutputKind::Lyrics | OutputKind::Prompt)
    }

    /// Kinds derived from metadata-tag URLs (plain-fetch pipeline).
    pub fn is_media(self) -> bool {
        !self.is_text()
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One input URL plus the output kinds requested for it.
///
/// Created at run start, immutable during processing, discarded once its
/// outputs are written or its failures recorded.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub url: String,
    pub kinds: Vec<OutputKind>,
}

impl WorkItem {
    /// Build a work item, deduplicating kinds into canonical order.
    pub fn new(url: impl Into<String>, kinds: &[OutputKind]) -> Self {
        let kinds = OutputKind::ALL
            .iter()
            .copied()
            .filter(|k| kinds.contains(k))
            .collect();
        Self {
            url: url.into(),
            kinds,
        }
    }

    pub fn text_kinds(&self) -> Vec<OutputKind> {
        self.kinds.iter().copied().filter(|k| k.is_text()).collect()
    }

    pub fn media_kinds(&self) -> Vec<OutputKind> {
        self.kinds.iter().copied().filter(|k| k.is_media()).collect()
    }
}

/// Processing state of a single work item.
///
/// Normal progression is Pending, Loading, Extracting, Writing, Done.
/// Failed is the alternate terminal state, reached only when a gating
/// fetch (page render or media metadata fetch) fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Pending,
    Loading,
    Extracting,
    Writing,
    Done,
    Failed,
}

impl ItemState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemState::Done | ItemState::Failed)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemState::Pending => "pending",
            ItemState::Loading => "loading",
            ItemState::Extracting => "extracting",
            ItemState::Writing => "writing",
            ItemState::Done => "done",
            ItemState::Failed => "failed",
        };
        f.write_str(s)
    }
}
