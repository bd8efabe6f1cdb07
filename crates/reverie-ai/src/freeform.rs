//! Best-effort recovery of [`DailyContent`] from pseudo-markdown prose.
//!
//! The parser never fails.  Whatever the model wrote, the result has a title,
//! at least one section and a non-empty conclusion; missing pieces are filled
//! from canned text for the requested content type.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;

use reverie_shared::constants::DEFAULT_CONTENT_TITLE;
use reverie_shared::normalize::normalize_text;
use reverie_shared::{ContentSection, ContentType, DailyContent};

static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*(.+?)\*\*"));
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| compile(r"__(.+?)__"));
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| compile(r"\*([^*\s][^*]*?)\*"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(^|[\s(])_([^_\s][^_]*?)_($|[\s.,;:!?)])"));
static HEADING_MARKS: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\s*#+\s*"));
static LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"\[([^\]]+)\]\([^)]*\)"));
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d+\."));
static NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d+\.\s*"));

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid built-in pattern {pattern:?}: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Line predicates
// ---------------------------------------------------------------------------

/// Strip a case-insensitive `label:` prefix, returning the remainder.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        line.get(label.len()..).map(str::trim)
    } else {
        None
    }
}

pub fn title_line(line: &str) -> Option<&str> {
    strip_label(line, "title:")
}

pub fn introduction_line(line: &str) -> Option<&str> {
    strip_label(line, "introduction:")
}

pub fn conclusion_line(line: &str) -> Option<&str> {
    strip_label(line, "conclusion:")
}

/// Whether a trimmed line opens a new section.
pub fn is_section_heading(line: &str) -> bool {
    let lower = line.to_lowercase();
    let bare = lower.trim_start_matches(['*', '_']).trim_start();

    bare.starts_with("section")
        || bare.starts_with("technique")
        || bare.starts_with("key point")
        || line.starts_with('#')
        || (line.chars().count() < 60 && line.trim_end_matches(['*', '_']).ends_with(':'))
        || NUMBERED.is_match(bare)
}

/// Heading text without numbering, `#` marks, markdown or a trailing colon.
pub fn clean_heading(line: &str) -> String {
    let cleaned = clean_markdown(line);
    let cleaned = cleaned.trim_start_matches('#').trim();
    let cleaned = NUMBER_PREFIX.replace(cleaned, "");
    cleaned.trim().trim_end_matches(':').trim().to_string()
}

/// Remove emphasis markers, heading marks, link targets and backslashes.
pub fn clean_markdown(text: &str) -> String {
    let text = LINK.replace_all(text, "${1}");
    let text = BOLD_STARS.replace_all(&text, "${1}");
    let text = BOLD_UNDERSCORES.replace_all(&text, "${1}");
    let text = ITALIC_STAR.replace_all(&text, "${1}");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "${1}${2}${3}");
    let text = HEADING_MARKS.replace_all(&text, "");
    text.replace('\\', "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Parser {
    title: Option<String>,
    introduction: String,
    explicit_introduction: bool,
    conclusion: String,
    in_conclusion: bool,
    sections: Vec<ContentSection>,
    heading: Option<String>,
    body: Vec<String>,
    paragraph_break: bool,
}

impl Parser {
    fn flush_section(&mut self) {
        let body = self.body.join("\n").trim().to_string();
        self.body.clear();
        if let Some(heading) = self.heading.take() {
            if !body.is_empty() {
                self.sections.push(ContentSection { heading, content: body });
            }
        }
    }

    fn append_introduction(&mut self, text: String) {
        if !self.introduction.is_empty() {
            self.introduction
                .push_str(if self.paragraph_break { "\n\n" } else { "\n" });
        }
        self.introduction.push_str(&text);
    }

    fn append_conclusion(&mut self, text: String) {
        if !self.conclusion.is_empty() {
            self.conclusion.push('\n');
        }
        self.conclusion.push_str(&text);
    }

    fn feed(&mut self, line: &str) {
        if line.is_empty() {
            self.paragraph_break = true;
            return;
        }

        if let Some(rest) = title_line(line) {
            self.title = Some(clean_markdown(rest));
        } else if let Some(rest) = introduction_line(line) {
            self.introduction = clean_markdown(rest);
            self.explicit_introduction = true;
        } else if let Some(rest) = conclusion_line(line) {
            self.flush_section();
            self.conclusion = clean_markdown(rest);
            self.in_conclusion = true;
        } else if is_section_heading(line) {
            self.flush_section();
            self.in_conclusion = false;
            self.heading = Some(clean_heading(line));
        } else if self.in_conclusion {
            self.append_conclusion(clean_markdown(line));
        } else if self.heading.is_some() {
            self.body.push(clean_markdown(line));
        } else if !self.sections.is_empty() {
            self.append_conclusion(clean_markdown(line));
        } else if self.explicit_introduction || !line.contains(':') {
            self.append_introduction(clean_markdown(line));
        }

        self.paragraph_break = false;
    }

    fn finish(mut self, content_type: ContentType, now: DateTime<Utc>) -> DailyContent {
        self.flush_section();

        let mut introduction = self.introduction.trim().to_string();
        let mut sections = self.sections;

        if sections.is_empty() && !introduction.is_empty() {
            let paragraphs: Vec<String> = introduction
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if paragraphs.len() >= 2 {
                introduction = paragraphs[0].clone();
                sections = paragraphs[1..]
                    .iter()
                    .enumerate()
                    .map(|(i, p)| ContentSection::new(generic_heading(content_type, i), p.clone()))
                    .collect();
            }
        }

        if sections.is_empty() {
            sections = default_sections(content_type);
        }

        let mut conclusion = self.conclusion.trim().to_string();
        if conclusion.is_empty() {
            conclusion = default_conclusion(content_type).to_string();
        }

        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TITLE.to_string());

        DailyContent::new(content_type, title, introduction, sections, conclusion, now)
    }
}

/// Parse model prose into content of `content_type`.  Never fails.
pub fn parse_content(raw: &str, content_type: ContentType) -> DailyContent {
    parse_content_at(raw, content_type, Utc::now())
}

/// [`parse_content`] with an explicit timestamp.
pub fn parse_content_at(raw: &str, content_type: ContentType, now: DateTime<Utc>) -> DailyContent {
    let text = normalize_text(raw);
    let mut parser = Parser::default();
    for line in text.lines() {
        parser.feed(line.trim());
    }
    let content = parser.finish(content_type, now);

    tracing::debug!(
        %content_type,
        sections = content.sections.len(),
        "recovered freeform content"
    );
    content
}

// ---------------------------------------------------------------------------
// Canned fallbacks
// ---------------------------------------------------------------------------

/// Heading for the `index`-th paragraph promoted to a section.
pub fn generic_heading(content_type: ContentType, index: usize) -> &'static str {
    let (even, odd) = match content_type {
        ContentType::DreamingFact => ("The Science", "Research Context"),
        ContentType::LucidDreaming => ("Lucid Dreaming Technique", "Practice Method"),
        ContentType::DailyRitual => ("Ritual Practice", "Reflection"),
    };
    if index % 2 == 0 {
        even
    } else {
        odd
    }
}

const REM_PARAGRAPH: &str = "Most vivid dreams happen during REM (rapid eye movement) sleep, \
a stage that returns roughly every 90 minutes through the night and grows longer toward morning. \
During REM the brain is nearly as active as when awake, while the body's muscles stay relaxed, \
which is why dreams can feel so real yet leave us still in bed.";

const REALITY_CHECKS: &str = "Several times a day, pause and ask yourself whether you are dreaming. \
Look at a clock or a line of text, look away, then look back: in dreams they usually change. \
The habit carries over into sleep, where a failed check can tell you that you are dreaming.";

const DREAM_JOURNALING: &str = "Keep a journal by your bed and write down every dream as soon as you wake, \
even if you only remember a fragment. Over time you will notice recurring places, people and themes, \
and recognising these dream signs makes it easier to become lucid.";

/// Sections used when nothing usable could be recovered.
pub fn default_sections(content_type: ContentType) -> Vec<ContentSection> {
    match content_type {
        ContentType::LucidDreaming => vec![
            ContentSection::new("Reality Checks", REALITY_CHECKS),
            ContentSection::new("Dream Journaling", DREAM_JOURNALING),
        ],
        ContentType::DreamingFact => vec![ContentSection::new("Understanding REM Sleep", REM_PARAGRAPH)],
        ContentType::DailyRitual => vec![ContentSection::new("Your Sleep Cycle", REM_PARAGRAPH)],
    }
}

/// Closing paragraph used when the model gave none.
pub fn default_conclusion(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::LucidDreaming => {
            "Lucid dreaming is a skill that grows with patience. Practice a little every day \
             and be kind to yourself on the nights when nothing happens."
        }
        ContentType::DailyRitual | ContentType::DreamingFact => {
            "Dreams are a window into the mind. Keep exploring, keep journaling, \
             and let your curiosity guide you tonight."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str, ty: ContentType) -> DailyContent {
        parse_content(text, ty)
    }

    #[test]
    fn parses_structured_reality_check_guide() {
        let text = "Title: Reality Checks 101\n\
                    Introduction: A short guide.\n\
                    1. Pinch Test\n\
                    Try pinching your arm.\n\
                    2. Clock Check\n\
                    Look at a clock twice.\n\
                    Conclusion: Practice daily.";
        let content = parse(text, ContentType::LucidDreaming);

        assert_eq!(content.title, "Reality Checks 101");
        assert_eq!(content.introduction, "A short guide.");
        assert_eq!(
            content.sections,
            vec![
                ContentSection::new("Pinch Test", "Try pinching your arm."),
                ContentSection::new("Clock Check", "Look at a clock twice."),
            ]
        );
        assert_eq!(content.conclusion, "Practice daily.");
        assert_eq!(content.content_type, ContentType::LucidDreaming);
    }

    #[test]
    fn empty_input_still_produces_content() {
        for ty in ContentType::ALL {
            let content = parse("", ty);
            assert!(!content.sections.is_empty(), "{ty}");
            assert!(!content.conclusion.is_empty(), "{ty}");
            assert_eq!(content.title, "Dream Insight");
        }
        let lesson = parse("", ContentType::LucidDreaming);
        let headings: Vec<_> = lesson.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Reality Checks", "Dream Journaling"]);
        assert_eq!(parse("", ContentType::DreamingFact).sections.len(), 1);
    }

    #[test]
    fn heading_predicates() {
        assert!(is_section_heading("Section 2: Breathing"));
        assert!(is_section_heading("Technique: MILD"));
        assert!(is_section_heading("Key Point 1"));
        assert!(is_section_heading("## Why we forget"));
        assert!(is_section_heading("Why it works:"));
        assert!(is_section_heading("3. Wake back to bed"));
        assert!(is_section_heading("**1. Bold numbered**"));
        assert!(!is_section_heading("Just a sentence about sleep."));
        let long = format!("{}:", "a".repeat(70));
        assert!(!is_section_heading(&long));
    }

    #[test]
    fn heading_cleanup() {
        assert_eq!(clean_heading("## 2. **Reality** Checks:"), "Reality Checks");
        assert_eq!(clean_heading("Why it works:"), "Why it works");
        assert_eq!(clean_heading("Technique 1: MILD"), "Technique 1: MILD");
    }

    #[test]
    fn markdown_cleaning() {
        assert_eq!(clean_markdown("**bold** and *italic*"), "bold and italic");
        assert_eq!(clean_markdown("__strong__ and _soft_ text"), "strong and soft text");
        assert_eq!(clean_markdown("see [the study](https://example.com)"), "see the study");
        assert_eq!(clean_markdown("### Heading"), "Heading");
        assert_eq!(clean_markdown(r"REM \- sleep"), "REM - sleep");
        assert_eq!(clean_markdown("snake_case_name stays"), "snake_case_name stays");
    }

    #[test]
    fn labels_are_case_insensitive_and_cleaned() {
        let content = parse(
            "TITLE: **Night Owls**\nintroduction: _Why_ we wake.\nconclusion: Sleep well.",
            ContentType::DreamingFact,
        );
        assert_eq!(content.title, "Night Owls");
        assert_eq!(content.introduction, "Why we wake.");
        assert_eq!(content.conclusion, "Sleep well.");
    }

    #[test]
    fn first_plain_line_becomes_introduction() {
        let content = parse(
            "Dreams help consolidate memory.\n# The Study\nResearchers woke sleepers.",
            ContentType::DreamingFact,
        );
        assert_eq!(content.introduction, "Dreams help consolidate memory.");
        assert_eq!(content.sections, vec![ContentSection::new("The Study", "Researchers woke sleepers.")]);
    }

    #[test]
    fn empty_headings_are_dropped() {
        let content = parse(
            "Title: T\n1. Empty\n2. Full\nSome text.\nMore text.",
            ContentType::DailyRitual,
        );
        assert_eq!(
            content.sections,
            vec![ContentSection::new("Full", "Some text.\nMore text.")]
        );
    }

    #[test]
    fn conclusion_continues_over_following_lines() {
        let content = parse(
            "1. Step\nDo it.\nConclusion: Rest.\nSweet dreams.",
            ContentType::DailyRitual,
        );
        assert_eq!(content.conclusion, "Rest.\nSweet dreams.");
        assert_eq!(content.sections.len(), 1);
    }

    #[test]
    fn paragraphs_become_sections_when_no_headings() {
        let text = "Dreams are strange.\n\nThe brain replays memories.\n\nStudies confirm this.";
        let content = parse(text, ContentType::DreamingFact);
        assert_eq!(content.introduction, "Dreams are strange.");
        assert_eq!(
            content.sections,
            vec![
                ContentSection::new("The Science", "The brain replays memories."),
                ContentSection::new("Research Context", "Studies confirm this."),
            ]
        );

        let lesson = parse(text, ContentType::LucidDreaming);
        assert_eq!(lesson.sections[0].heading, "Lucid Dreaming Technique");
        assert_eq!(lesson.sections[1].heading, "Practice Method");
    }

    #[test]
    fn single_paragraph_introduction_falls_back_to_canned_sections() {
        let content = parse("Just one paragraph here.", ContentType::DreamingFact);
        assert_eq!(content.introduction, "Just one paragraph here.");
        assert_eq!(content.sections[0].heading, "Understanding REM Sleep");
        assert_eq!(content.conclusion, default_conclusion(ContentType::DreamingFact));
    }

    #[test]
    fn fenced_output_is_unwrapped() {
        let content = parse(
            "```markdown\nTitle: Fenced\n## Part\nBody\n```",
            ContentType::DailyRitual,
        );
        assert_eq!(content.title, "Fenced");
        assert_eq!(content.sections, vec![ContentSection::new("Part", "Body")]);
    }
}
