//! 题目正文解析 - 业务能力层
//!
//! 把 issue 正文解析成一道 [`Question`]。正文按行扫描：
//!
//! ```text
//! ### question
//! 中国的首都是哪里？
//! ### option-1
//! 上海
//! ### option-2
//! 北京
//! ### answer
//! 1
//! ### explain
//! 北京是首都。
//! ### page
//! exams/geography
//! ```
//!
//! 每一行先去掉首尾空白；空行直接跳过；以 `### ` 开头的是段落标记，
//! 其余行拼接（不加分隔符）到当前段落的值里。

use phf::phf_map;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::models::Question;

/// 段落标记前缀
pub const MARKER_PREFIX: &str = "### ";

/// 解析器当前所在的段落
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// 尚未遇到任何标记，内容会被丢弃
    None,
    Question,
    Option,
    Answer,
    Explain,
    Page,
}

static KEYWORDS: phf::Map<&'static str, Section> = phf_map! {
    "question" => Section::Question,
    "answer" => Section::Answer,
    "explain" => Section::Explain,
    "page" => Section::Page,
};

impl Section {
    /// 从标记关键字解析段落
    ///
    /// 所有以 `option` 开头的关键字（`option-1`、`option-2`……）都归入选项列表。
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.starts_with("option") {
            return Some(Section::Option);
        }
        KEYWORDS.get(keyword).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::None => "none",
            Section::Question => "question",
            Section::Option => "option",
            Section::Answer => "answer",
            Section::Explain => "explain",
            Section::Page => "page",
        }
    }
}

/// 一行的分类
enum Line<'a> {
    Blank,
    Marker(&'a str),
    Content(&'a str),
}

impl<'a> Line<'a> {
    fn classify(raw: &'a str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            Line::Blank
        } else if let Some(keyword) = line.strip_prefix(MARKER_PREFIX) {
            Line::Marker(keyword)
        } else {
            Line::Content(line)
        }
    }
}

/// 段落状态机
///
/// 单遍扫描，没有回溯。通过 [`SectionParser::feed_line`] 逐行输入，
/// 最后调用 [`SectionParser::finish`] 得到结果。
#[derive(Debug)]
pub struct SectionParser {
    question: Question,
    section: Section,
    value: String,
}

impl SectionParser {
    pub fn new() -> Self {
        Self {
            question: Question::default(),
            section: Section::None,
            value: String::new(),
        }
    }

    /// 当前段落
    pub fn section(&self) -> Section {
        self.section
    }

    /// 输入一行
    pub fn feed_line(&mut self, raw: &str) -> Result<(), ParseError> {
        match Line::classify(raw) {
            Line::Blank => {}
            Line::Marker(keyword) => {
                self.commit()?;
                self.section =
                    Section::from_keyword(keyword).ok_or_else(|| ParseError::UnknownSection {
                        keyword: keyword.to_string(),
                    })?;
                debug!("进入段落: {}", self.section.name());
            }
            Line::Content(text) => self.value.push_str(text),
        }
        Ok(())
    }

    /// 结束输入，提交最后一个段落并返回题目
    pub fn finish(mut self) -> Result<Question, ParseError> {
        self.commit()?;

        if self.question.question.is_empty() {
            return Err(ParseError::MissingQuestion);
        }
        Ok(self.question)
    }

    /// 把累积的值写入当前段落对应的字段
    fn commit(&mut self) -> Result<(), ParseError> {
        let value = std::mem::take(&mut self.value);
        match self.section {
            Section::None => {
                if !value.is_empty() {
                    debug!("丢弃第一个标记之前的内容: {} 字符", value.chars().count());
                }
            }
            Section::Question => self.question.question = value,
            Section::Option => self.question.options.push(value),
            Section::Answer => {
                let answer = value
                    .parse::<i64>()
                    .map_err(|source| ParseError::InvalidAnswer {
                        value: value.clone(),
                        source,
                    })?;
                if self.question.answer.is_some() {
                    warn!("answer 段落重复出现，使用最后一次的值: {}", answer);
                }
                self.question.answer = Some(answer);
            }
            Section::Explain => self.question.explain = value,
            Section::Page => self.question.page = value,
        }
        Ok(())
    }
}

impl Default for SectionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析整段正文
///
/// 出错时不返回任何部分结果。
pub fn parse_body(body: &str) -> Result<Question, ParseError> {
    let mut parser = SectionParser::new();
    for line in body.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_mapping() {
        assert_eq!(Section::from_keyword("question"), Some(Section::Question));
        assert_eq!(Section::from_keyword("option"), Some(Section::Option));
        assert_eq!(Section::from_keyword("option-2"), Some(Section::Option));
        assert_eq!(Section::from_keyword("options"), Some(Section::Option));
        assert_eq!(Section::from_keyword("answer"), Some(Section::Answer));
        assert_eq!(Section::from_keyword("explain"), Some(Section::Explain));
        assert_eq!(Section::from_keyword("page"), Some(Section::Page));
        assert_eq!(Section::from_keyword("Question"), None);
        assert_eq!(Section::from_keyword("bogus"), None);
        assert_eq!(Section::from_keyword(""), None);
    }

    #[test]
    fn test_text_before_first_marker_is_dropped() {
        let q = parse_body("hello there\nstill preamble\n### question\nQ").unwrap();
        assert_eq!(q.question, "Q");
        assert!(q.options.is_empty());
    }

    #[test]
    fn test_marker_needs_space() {
        // "###question" 不是标记，只是普通内容
        let q = parse_body("### question\nA\n###question").unwrap();
        assert_eq!(q.question, "A###question");
    }

    #[test]
    fn test_lines_are_trimmed() {
        let q = parse_body("   ### question   \r\n   first \r\n\tsecond\t").unwrap();
        assert_eq!(q.question, "firstsecond");
    }

    #[test]
    fn test_singular_fields_overwrite() {
        let q = parse_body("### question\nold\n### answer\n1\n### question\nnew\n### answer\n0")
            .unwrap();
        assert_eq!(q.question, "new");
        assert_eq!(q.answer, Some(0));
    }

    #[test]
    fn test_empty_option_section_still_appends() {
        let q = parse_body("### question\nQ\n### option-1\n### option-2\nB").unwrap();
        assert_eq!(q.options, vec!["".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_defaults_when_sections_absent() {
        let q = parse_body("### question\nQ").unwrap();
        assert_eq!(q.answer, None);
        assert_eq!(q.explain, "");
        assert_eq!(q.page, "");
    }

    #[test]
    fn test_explicit_zero_answer_is_distinguishable() {
        let q = parse_body("### question\nQ\n### answer\n0").unwrap();
        assert_eq!(q.answer, Some(0));
    }

    #[test]
    fn test_empty_answer_is_error() {
        let err = parse_body("### question\nQ\n### answer\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidAnswer { ref value, .. } if value.is_empty()));
    }

    #[test]
    fn test_missing_question() {
        let err = parse_body("### page\nexams/x").unwrap_err();
        assert!(matches!(err, ParseError::MissingQuestion));
    }

    #[test]
    fn test_unknown_marker_fails_even_after_valid_sections() {
        let err = parse_body("### question\nQ\n### page\np\n### hint\nnope").unwrap_err();
        match err {
            ParseError::UnknownSection { keyword } => assert_eq!(keyword, "hint"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_incremental_feed_tracks_section() {
        let mut parser = SectionParser::new();
        assert_eq!(parser.section(), Section::None);
        parser.feed_line("### option-a").unwrap();
        assert_eq!(parser.section(), Section::Option);
        parser.feed_line("").unwrap();
        assert_eq!(parser.section(), Section::Option);
        parser.feed_line("x").unwrap();
        parser.feed_line("### question").unwrap();
        parser.feed_line("Q").unwrap();
        let q = parser.finish().unwrap();
        assert_eq!(q.options, vec!["x".to_string()]);
    }
}
