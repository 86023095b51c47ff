//! List query parsing: range/page windows, sort keys, and filters.
//!
//! List endpoints accept react-admin style query parameters whose values are
//! JSON fragments (`range=[0,9]`, `sort=["word","desc"]`, `filter={"word":"a"}`).
//! Everything here turns those raw strings into typed requests and rejects
//! malformed input with [`Error::InvalidInput`] before storage is touched.

use serde::Deserialize;
use serde_json::Value;

use crate::defaults::{DEFAULT_PAGE_SIZE, MAX_RANGE_SPAN};
use crate::error::{Error, Result};
use crate::models::WordClass;

// =============================================================================
// RAW PARAMETERS
// =============================================================================

/// Query string of a list endpoint, exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQueryParams {
    pub keyword: Option<String>,
    pub filter: Option<String>,
    pub dialects: Option<String>,
    pub examples: Option<String>,
    pub range: Option<String>,
    pub page: Option<String>,
    pub sort: Option<String>,
}

// =============================================================================
// WINDOW (range / page)
// =============================================================================

/// Offset/limit pair derived from `range` or `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Window {
    /// Inclusive index of the last entry this window can return.
    pub fn end(&self) -> i64 {
        self.skip + self.limit - 1
    }
}

/// Resolve the result window. `range` takes precedence over `page`.
pub fn resolve_window(range: Option<&str>, page: Option<&str>) -> Result<Window> {
    if let Some(raw) = range.map(str::trim).filter(|r| !r.is_empty()) {
        if let Some(window) = parse_range(raw)? {
            return Ok(window);
        }
    }
    match page.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => parse_page(raw),
        None => Ok(Window::default()),
    }
}

/// Parse `range=[start,end]`.
///
/// Returns `Ok(None)` for the literal `false`, which defers to `page`.
/// The span is clamped to [`MAX_RANGE_SPAN`]; an inverted range falls back
/// to [`DEFAULT_PAGE_SIZE`] entries from `start`.
pub fn parse_range(raw: &str) -> Result<Option<Window>> {
    let invalid = || {
        Error::InvalidInput(format!(
            "Invalid range query '{}'. Expected [start,end] with non-negative integers",
            raw
        ))
    };

    let value: Value = serde_json::from_str(raw).map_err(|_| invalid())?;
    let bounds = match value {
        Value::Bool(true) => return Ok(Some(Window::default())),
        Value::Bool(false) => return Ok(None),
        Value::Array(bounds) => bounds,
        _ => return Err(invalid()),
    };

    let [start, end] = bounds.as_slice() else {
        return Err(invalid());
    };
    let start = start.as_i64().ok_or_else(invalid)?;
    let end = end.as_i64().ok_or_else(invalid)?;
    if start < 0 {
        return Err(invalid());
    }

    let span = end.saturating_sub(start).saturating_add(1);
    let limit = if span <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        span.min(MAX_RANGE_SPAN)
    };
    Ok(Some(Window { skip: start, limit }))
}

/// Parse `page=N` into a window of [`DEFAULT_PAGE_SIZE`] entries.
pub fn parse_page(raw: &str) -> Result<Window> {
    let page: i64 = raw
        .parse()
        .map_err(|_| Error::InvalidInput(format!("Page '{}' is not a number", raw)))?;
    if page < 0 {
        return Err(Error::InvalidInput(
            "Page must be a positive number".to_string(),
        ));
    }
    let skip = page
        .checked_mul(DEFAULT_PAGE_SIZE)
        .ok_or_else(|| Error::InvalidInput(format!("Page '{}' is too large", raw)))?;
    Ok(Window {
        skip,
        limit: DEFAULT_PAGE_SIZE,
    })
}

// =============================================================================
// SORT
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A field a list endpoint can sort on.
pub trait SortableField: Sized + Copy {
    /// Parse a client field name (camelCase).
    fn parse_field(name: &str) -> Option<Self>;

    /// Client names of every sortable field, for error messages.
    fn field_names() -> &'static [&'static str];
}

/// Parsed `sort=["field","asc|desc"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

/// Parse a sort parameter for the field set `F`.
pub fn parse_sort<F: SortableField>(raw: &str) -> Result<SortSpec<F>> {
    let malformed = || {
        Error::InvalidInput(format!(
            "Invalid sort query '{}'. Expected [\"field\", \"asc\" | \"desc\"]",
            raw
        ))
    };

    let parts: Vec<String> = serde_json::from_str(raw).map_err(|_| malformed())?;
    let [field, direction] = parts.as_slice() else {
        return Err(malformed());
    };

    let field = F::parse_field(field.trim()).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Cannot sort by '{}'. Sortable fields: {}",
            field,
            F::field_names().join(", ")
        ))
    })?;
    let direction = match direction.trim().to_lowercase().as_str() {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => {
            return Err(Error::InvalidInput(format!(
                "Invalid sort direction '{}'. Expected asc or desc",
                other
            )))
        }
    };
    Ok(SortSpec { field, direction })
}

/// Sortable word suggestion fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSuggestionSortField {
    Word,
    WordClass,
    Definitions,
    Approvals,
    Denials,
    CreatedAt,
    UpdatedAt,
}

impl SortableField for WordSuggestionSortField {
    fn parse_field(name: &str) -> Option<Self> {
        match name {
            "word" => Some(Self::Word),
            "wordClass" => Some(Self::WordClass),
            "definitions" => Some(Self::Definitions),
            "approvals" => Some(Self::Approvals),
            "denials" => Some(Self::Denials),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "word",
            "wordClass",
            "definitions",
            "approvals",
            "denials",
            "createdAt",
            "updatedAt",
        ]
    }
}

/// Sortable example suggestion fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleSuggestionSortField {
    Igbo,
    English,
    Approvals,
    Denials,
    CreatedAt,
    UpdatedAt,
}

impl SortableField for ExampleSuggestionSortField {
    fn parse_field(name: &str) -> Option<Self> {
        match name {
            "igbo" => Some(Self::Igbo),
            "english" => Some(Self::English),
            "approvals" => Some(Self::Approvals),
            "denials" => Some(Self::Denials),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "igbo",
            "english",
            "approvals",
            "denials",
            "createdAt",
            "updatedAt",
        ]
    }
}

// =============================================================================
// FILTERS
// =============================================================================

fn parse_filter_object(raw: &str) -> Result<serde_json::Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(Error::InvalidInput(format!(
            "Invalid filter query '{}'. Expected a JSON object",
            raw
        ))),
    }
}

fn filter_string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| Error::InvalidInput(format!("Filter '{}' must be a string", key)))
}

/// Structured filter for word suggestion lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSuggestionFilter {
    /// Case-insensitive substring of `word`.
    pub word: Option<String>,
    pub word_class: Option<WordClass>,
    pub author_id: Option<String>,
    pub is_standard_igbo: Option<bool>,
}

impl WordSuggestionFilter {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut filter = Self::default();
        for (key, value) in parse_filter_object(raw)? {
            match key.as_str() {
                "word" => filter.word = Some(filter_string(&key, &value)?),
                "wordClass" => {
                    let code = filter_string(&key, &value)?;
                    filter.word_class =
                        Some(code.parse::<WordClass>().map_err(Error::InvalidInput)?);
                }
                "authorId" => filter.author_id = Some(filter_string(&key, &value)?),
                "isStandardIgbo" => {
                    filter.is_standard_igbo = Some(value.as_bool().ok_or_else(|| {
                        Error::InvalidInput("Filter 'isStandardIgbo' must be a boolean".into())
                    })?)
                }
                other => {
                    return Err(Error::InvalidInput(format!(
                        "Unsupported filter '{}'. Supported: word, wordClass, authorId, isStandardIgbo",
                        other
                    )))
                }
            }
        }
        Ok(filter)
    }
}

/// Structured filter for example suggestion lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleSuggestionFilter {
    pub igbo: Option<String>,
    pub english: Option<String>,
    pub author_id: Option<String>,
}

impl ExampleSuggestionFilter {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut filter = Self::default();
        for (key, value) in parse_filter_object(raw)? {
            match key.as_str() {
                "igbo" => filter.igbo = Some(filter_string(&key, &value)?),
                "english" => filter.english = Some(filter_string(&key, &value)?),
                "authorId" => filter.author_id = Some(filter_string(&key, &value)?),
                other => {
                    return Err(Error::InvalidInput(format!(
                        "Unsupported filter '{}'. Supported: igbo, english, authorId",
                        other
                    )))
                }
            }
        }
        Ok(filter)
    }
}

/// Parse a boolean flag such as `dialects=true`.
pub fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(|v| v.trim().to_lowercase()) {
        None => Ok(false),
        Some(v) if v.is_empty() || v == "false" || v == "0" => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) => Err(Error::InvalidInput(format!(
            "Invalid value '{}' for '{}'. Expected true or false",
            v, name
        ))),
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// =============================================================================
// LIST REQUESTS
// =============================================================================

/// Request for listing word suggestions.
#[derive(Debug, Clone, Default)]
pub struct ListWordSuggestionsRequest {
    /// Case-insensitive substring of `word` or any variation.
    pub keyword: Option<String>,
    pub filter: WordSuggestionFilter,
    pub include_dialects: bool,
    pub include_examples: bool,
    pub window: Window,
    /// `None` means approvals descending, newest first.
    pub sort: Option<SortSpec<WordSuggestionSortField>>,
}

impl TryFrom<ListQueryParams> for ListWordSuggestionsRequest {
    type Error = Error;

    fn try_from(params: ListQueryParams) -> Result<Self> {
        let window = resolve_window(params.range.as_deref(), params.page.as_deref())?;
        let sort = non_blank(params.sort)
            .map(|raw| parse_sort(&raw))
            .transpose()?;
        let filter = match non_blank(params.filter) {
            Some(raw) => WordSuggestionFilter::parse(&raw)?,
            None => WordSuggestionFilter::default(),
        };
        Ok(Self {
            keyword: non_blank(params.keyword),
            filter,
            include_dialects: parse_flag("dialects", params.dialects.as_deref())?,
            include_examples: parse_flag("examples", params.examples.as_deref())?,
            window,
            sort,
        })
    }
}

/// Request for listing example suggestions.
#[derive(Debug, Clone, Default)]
pub struct ListExampleSuggestionsRequest {
    /// Case-insensitive substring of `igbo` or `english`.
    pub keyword: Option<String>,
    pub filter: ExampleSuggestionFilter,
    pub window: Window,
    /// `None` means approvals descending, newest first.
    pub sort: Option<SortSpec<ExampleSuggestionSortField>>,
}

impl TryFrom<ListQueryParams> for ListExampleSuggestionsRequest {
    type Error = Error;

    fn try_from(params: ListQueryParams) -> Result<Self> {
        let window = resolve_window(params.range.as_deref(), params.page.as_deref())?;
        let sort = non_blank(params.sort)
            .map(|raw| parse_sort(&raw))
            .transpose()?;
        let filter = match non_blank(params.filter) {
            Some(raw) => ExampleSuggestionFilter::parse(&raw)?,
            None => ExampleSuggestionFilter::default(),
        };
        Ok(Self {
            keyword: non_blank(params.keyword),
            filter,
            window,
            sort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_within_span() {
        let window = parse_range("[10,34]").unwrap().unwrap();
        assert_eq!(window, Window { skip: 10, limit: 25 });
        assert_eq!(window.end(), 34);
    }

    #[test]
    fn test_range_small_span() {
        let window = parse_range("[5,8]").unwrap().unwrap();
        assert_eq!(window.limit, 4);
    }

    #[test]
    fn test_range_clamped_to_max_span() {
        let window = parse_range("[10,39]").unwrap().unwrap();
        assert_eq!(window.skip, 10);
        assert_eq!(window.limit, MAX_RANGE_SPAN);
    }

    #[test]
    fn test_range_inverted_falls_back_to_page_size() {
        let window = parse_range("[10,9]").unwrap().unwrap();
        assert_eq!(window.skip, 10);
        assert_eq!(window.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_range_true_is_default_window() {
        assert_eq!(parse_range("true").unwrap(), Some(Window::default()));
        assert_eq!(parse_range("false").unwrap(), None);
    }

    #[test]
    fn test_range_allows_spaces() {
        let window = parse_range("[ 0 , 9 ]").unwrap().unwrap();
        assert_eq!(window, Window { skip: 0, limit: 10 });
    }

    #[test]
    fn test_range_rejects_malformed_values() {
        for raw in ["incorrect", "[1]", "[1,2,3]", "[\"a\",2]", "[-1,5]", "{}", "[1.5,4]"] {
            assert!(parse_range(raw).is_err(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn test_page_to_window() {
        assert_eq!(parse_page("0").unwrap(), Window { skip: 0, limit: 10 });
        assert_eq!(parse_page("2").unwrap(), Window { skip: 20, limit: 10 });
        assert!(parse_page("-1").is_err());
        assert!(parse_page("one").is_err());
    }

    #[test]
    fn test_range_takes_precedence_over_page() {
        let window = resolve_window(Some("[100,109]"), Some("1")).unwrap();
        assert_eq!(window.skip, 100);
        let window = resolve_window(None, Some("1")).unwrap();
        assert_eq!(window.skip, 10);
        let window = resolve_window(Some("false"), Some("1")).unwrap();
        assert_eq!(window.skip, 10);
    }

    #[test]
    fn test_missing_range_and_page_is_default() {
        assert_eq!(resolve_window(None, None).unwrap(), Window::default());
        assert_eq!(resolve_window(Some(""), Some("  ")).unwrap(), Window::default());
    }

    #[test]
    fn test_sort_parses_field_and_direction() {
        let spec: SortSpec<WordSuggestionSortField> =
            parse_sort(r#"["word", "DESC"]"#).unwrap();
        assert_eq!(spec.field, WordSuggestionSortField::Word);
        assert_eq!(spec.direction, SortDirection::Desc);

        let spec: SortSpec<WordSuggestionSortField> =
            parse_sort(r#"["definitions","asc"]"#).unwrap();
        assert_eq!(spec.field, WordSuggestionSortField::Definitions);
        assert_eq!(spec.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_rejects_malformed() {
        let cases = [r#"["wordClass]"#, r#"["word"]"#, r#"["word","up"]"#, r#"["nope","asc"]"#];
        for raw in cases {
            assert!(
                parse_sort::<WordSuggestionSortField>(raw).is_err(),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_example_sort_fields() {
        let spec: SortSpec<ExampleSuggestionSortField> =
            parse_sort(r#"["igbo","asc"]"#).unwrap();
        assert_eq!(spec.field, ExampleSuggestionSortField::Igbo);
        assert!(parse_sort::<ExampleSuggestionSortField>(r#"["word","asc"]"#).is_err());
    }

    #[test]
    fn test_word_filter_parses_supported_keys() {
        let filter = WordSuggestionFilter::parse(
            r#"{"word":" bia ","wordClass":"av","authorId":"u1","isStandardIgbo":true}"#,
        )
        .unwrap();
        assert_eq!(filter.word.as_deref(), Some("bia"));
        assert_eq!(filter.word_class, Some(WordClass::Av));
        assert_eq!(filter.author_id.as_deref(), Some("u1"));
        assert_eq!(filter.is_standard_igbo, Some(true));
    }

    #[test]
    fn test_word_filter_rejects_unknown_key_and_bad_json() {
        assert!(WordSuggestionFilter::parse(r#"{"color":"red"}"#).is_err());
        assert!(WordSuggestionFilter::parse("word=bia").is_err());
        assert!(WordSuggestionFilter::parse(r#"["word"]"#).is_err());
        assert!(WordSuggestionFilter::parse(r#"{"wordClass":"invalid"}"#).is_err());
    }

    #[test]
    fn test_flags() {
        assert!(parse_flag("dialects", Some("true")).unwrap());
        assert!(parse_flag("dialects", Some("1")).unwrap());
        assert!(!parse_flag("dialects", Some("false")).unwrap());
        assert!(!parse_flag("dialects", None).unwrap());
        assert!(parse_flag("dialects", Some("yes")).is_err());
    }

    #[test]
    fn test_list_request_from_params() {
        let params = ListQueryParams {
            keyword: Some("  ".into()),
            filter: Some(r#"{"word":"bia"}"#.into()),
            dialects: Some("true".into()),
            examples: None,
            range: Some("[0,4]".into()),
            page: Some("3".into()),
            sort: Some(r#"["approvals","desc"]"#.into()),
        };
        let req = ListWordSuggestionsRequest::try_from(params).unwrap();
        assert_eq!(req.keyword, None);
        assert_eq!(req.filter.word.as_deref(), Some("bia"));
        assert!(req.include_dialects);
        assert!(!req.include_examples);
        assert_eq!(req.window, Window { skip: 0, limit: 5 });
        assert_eq!(
            req.sort.map(|s| s.field),
            Some(WordSuggestionSortField::Approvals)
        );
    }
}
