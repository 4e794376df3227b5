//! The fixed tutorial video catalog.
//!
//! One immutable, process-wide list shared by reference by every front end.

use std::borrow::Cow;

use serde::Serialize;

/// A single tutorial video.
///
/// Fields are `Cow` so catalog entries stay `'static` while records built
/// from caller overrides can own their strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    /// YouTube video id, unique within the catalog.
    pub id: Cow<'static, str>,
    pub title: Cow<'static, str>,
    pub description: Cow<'static, str>,
}

impl VideoRecord {
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        title: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Short watch link, e.g. `https://youtu.be/Xpg2bnO_-eU`.
    pub fn watch_url(&self) -> String {
        format!("https://youtu.be/{}", self.id)
    }
}

/// Ordered, immutable set of known videos.
#[derive(Debug)]
pub struct Catalog {
    videos: &'static [VideoRecord],
}

impl Catalog {
    /// Exact, case-sensitive lookup by id.
    pub fn find(&self, id: &str) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| v.id == id)
    }

    /// Ids in catalog order.
    pub fn ids(&self) -> Vec<&str> {
        self.videos.iter().map(|v| v.id.as_ref()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoRecord> {
        self.videos.iter()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

const fn record(id: &'static str, title: &'static str, description: &'static str) -> VideoRecord {
    VideoRecord {
        id: Cow::Borrowed(id),
        title: Cow::Borrowed(title),
        description: Cow::Borrowed(description),
    }
}

static VIDEOS: [VideoRecord; 4] = [
    record(
        "Xpg2bnO_-eU",
        "Introduction to Artificial Intelligence | Part 1",
        "Welcome to the first part of our Artificial Intelligence (AI) series! Learn the basics of AI, its history, real-world applications, and how it's transforming industries. Topics: What is AI, History and evolution, Types of AI (Narrow, General & Super), Applications in everyday life, Future scope and career opportunities.",
    ),
    record(
        "p6Yr-DVao3Y",
        "Prompt Engineering - Introduction",
        "Welcome to the first episode of our Prompt Engineering series! Learn what prompt engineering is, why it matters, and how it powers AI tools like ChatGPT, Gemini, and Claude. Topics: What is Prompt Engineering, Importance in AI and LLMs, How AI interprets input, Examples of effective prompts, Careers in Prompt Engineering.",
    ),
    record(
        "PAKfEvJSLWA",
        "Prompt Engineering Part 1 - Key Components",
        "Learn the key components that make a prompt effective when working with AI tools. Topics: What makes a prompt effective, Key components (context, clarity, role, tone, constraints), Examples of good vs. bad prompts, Tips for improving AI responses, Common mistakes to avoid.",
    ),
    record(
        "ng5lAQay4qI",
        "Testing Prompts on Google Gemini",
        "Watch how we test and experiment with different prompts on Google Gemini. See how changing just a few words can completely transform AI responses. Topics: How Gemini interprets prompts, Tips for writing clear prompts, Creative vs. structured prompt styles, Real examples and live testing.",
    ),
];

static CATALOG: Catalog = Catalog { videos: &VIDEOS };

/// The process-wide catalog.
pub fn catalog() -> &'static Catalog {
    &CATALOG
}
