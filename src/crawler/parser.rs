//! HTML record extractor
//!
//! Pure functions turning a registry page into value types:
//! - list pages yield entity summaries and, optionally, the pagination terminus
//! - detail pages yield the entity's supplementary attributes
//!
//! Missing optional nodes become empty strings. Only a page that is not the
//! expected kind at all is reported as an [`ExtractError`].

use crate::endpoint::{query_param, ENTITY_ID_PARAM, OFFSET_PARAM};
use crate::entity::{EntityDetail, EntitySummary};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Kind of registry page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    List,
    Detail,
}

/// Structural extraction failures
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Empty document")]
    EmptyDocument,

    #[error("Not a {kind:?} page: missing {selector}")]
    UnexpectedStructure {
        kind: PageKind,
        selector: &'static str,
    },

    #[error("Invalid selector {selector}: {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

/// Result of extracting a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    List(ParsedListPage),
    Detail(EntityDetail),
}

/// Entities of one list page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedListPage {
    pub entities: Vec<EntitySummary>,

    /// Item offset of the last page, when the pagination link was found
    pub terminus_offset: Option<u32>,
}

const LIST_CONTAINER: &str = ".lista";
const LIST_ROW: &str = ".lista .societa";
const ROW_LINK: &str = "a[href]";
const BASE_INFO: &str = ".info-base";
const NAME: &str = "h4[data-com=\"equalizer\"]";
const DESCRIPTION: &str = "p";
const REGISTRY_INFO: &str = "div[data-equalizer-id=\"dati_registro_reg\"]";
const REGION: &str = ".luogo .regione";
const MUNICIPALITY: &str = ".luogo .comune";
const PROVINCE: &str = ".luogo .provincia";
const AFFILIATION: &str = ".affiliazione-container .affiliazione";
const PAGINATION_END: &str = ".pagination-end";

const DETAIL_REGISTRY: &str = ".numeri-anagrafici";
const DETAIL_ACTIVITIES: &str = ".totalizatori";
const REPRESENTATIVE: &str = ".legale";
const REGISTRY_DATUM: &str = ".dato";
const ACTIVITY_VALUE: &str = "span";

const REPRESENTATIVE_LABEL: &str = "Legale Rappresentante";
const FISCAL_CODE_LABEL: &str = "Codice Fiscale";
const SUBSCRIPTION_DATE_LABEL: &str = "Data Iscrizione";

/// Characters left over between a stripped label and its value
const SEPARATORS: &[char] = &[':', ',', ';', '-', '|', '.'];

/// Extracts a page of the given kind
///
/// # Arguments
///
/// * `html` - The page body
/// * `kind` - Which page kind the body is expected to be
///
/// # Example
///
/// ```
/// use registry_crawler::crawler::{extract_page, Extracted, PageKind};
///
/// let html = r#"<div class="lista"><a class="societa" href="d.html?id_societa=7"></a></div>"#;
/// match extract_page(html, PageKind::List).unwrap() {
///     Extracted::List(page) => assert_eq!(page.entities[0].id, "7"),
///     Extracted::Detail(_) => unreachable!(),
/// }
/// ```
pub fn extract_page(html: &str, kind: PageKind) -> Result<Extracted, ExtractError> {
    match kind {
        PageKind::List => parse_list_page(html).map(Extracted::List),
        PageKind::Detail => parse_detail_page(html).map(Extracted::Detail),
    }
}

/// Extracts the entity summaries and pagination terminus of a list page
pub fn parse_list_page(html: &str) -> Result<ParsedListPage, ExtractError> {
    let document = parse_document(html)?;

    let container = selector(LIST_CONTAINER)?;
    if document.select(&container).next().is_none() {
        return Err(ExtractError::UnexpectedStructure {
            kind: PageKind::List,
            selector: LIST_CONTAINER,
        });
    }

    let row_selector = selector(LIST_ROW)?;
    let fields = RowSelectors::new()?;
    let mut entities = Vec::new();
    for row in document.select(&row_selector) {
        match extract_summary(row, &fields) {
            Some(summary) => entities.push(summary),
            None => tracing::debug!("Skipping list row without {} link", ENTITY_ID_PARAM),
        }
    }

    Ok(ParsedListPage {
        entities,
        terminus_offset: extract_terminus(&document)?,
    })
}

/// Extracts the attributes of a detail page
pub fn parse_detail_page(html: &str) -> Result<EntityDetail, ExtractError> {
    let document = parse_document(html)?;
    let root = document.root_element();

    let registry = root.select(&selector(DETAIL_REGISTRY)?).next();
    let activities = root.select(&selector(DETAIL_ACTIVITIES)?).next();

    if registry.is_none() && activities.is_none() {
        return Err(ExtractError::UnexpectedStructure {
            kind: PageKind::Detail,
            selector: DETAIL_REGISTRY,
        });
    }

    let mut detail = EntityDetail::default();

    if let Some(registry) = registry {
        let representative = strip_label(
            &select_text(registry, &selector(REPRESENTATIVE)?),
            REPRESENTATIVE_LABEL,
        );
        // "SURNAME, NAME" must not add a column to unescaped rows
        detail.representative = collapse_whitespace(&representative.replacen(',', " ", 1));

        let datum = selector(REGISTRY_DATUM)?;
        detail.fiscal_code = strip_label(&nth_text(registry, &datum, 0), FISCAL_CODE_LABEL);
        detail.subscription_date =
            strip_label(&nth_text(registry, &datum, 1), SUBSCRIPTION_DATE_LABEL);
    }

    if let Some(activities) = activities {
        let value = selector(ACTIVITY_VALUE)?;
        let mut counters = activities
            .children()
            .filter_map(ElementRef::wrap)
            .map(|counter| select_text(counter, &value));

        detail.competitive_members = counters.next().unwrap_or_default();
        detail.registered_practitioners = counters.next().unwrap_or_default();
        detail.sport_events = counters.next().unwrap_or_default();
        detail.educational_events = counters.next().unwrap_or_default();
    }

    Ok(detail)
}

fn parse_document(html: &str) -> Result<Html, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    Ok(Html::parse_document(html))
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css,
        message: e.to_string(),
    })
}

/// Selectors of the fields inside one list row, parsed once per page
struct RowSelectors {
    link: Selector,
    base_info: Selector,
    name: Selector,
    description: Selector,
    registry_info: Selector,
    region: Selector,
    municipality: Selector,
    province: Selector,
    affiliation: Selector,
}

impl RowSelectors {
    fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            link: selector(ROW_LINK)?,
            base_info: selector(BASE_INFO)?,
            name: selector(NAME)?,
            description: selector(DESCRIPTION)?,
            registry_info: selector(REGISTRY_INFO)?,
            region: selector(REGION)?,
            municipality: selector(MUNICIPALITY)?,
            province: selector(PROVINCE)?,
            affiliation: selector(AFFILIATION)?,
        })
    }
}

/// Builds a summary from one list row; `None` when the row has no identifier
///
/// The row's own `href` wins; nested links are tried when it carries no
/// identifier.
fn extract_summary(row: ElementRef<'_>, fields: &RowSelectors) -> Option<EntitySummary> {
    let id = row
        .value()
        .attr("href")
        .and_then(|href| query_param(href, ENTITY_ID_PARAM))
        .or_else(|| {
            row.select(&fields.link)
                .filter_map(|link| link.value().attr("href"))
                .find_map(|href| query_param(href, ENTITY_ID_PARAM))
        })?;

    let mut summary = EntitySummary {
        id,
        ..EntitySummary::default()
    };

    if let Some(base_info) = row.select(&fields.base_info).next() {
        summary.name = select_text(base_info, &fields.name);
        summary.description = select_text(base_info, &fields.description);
    }

    if let Some(info) = row.select(&fields.registry_info).next() {
        summary.region = select_text(info, &fields.region);
        summary.municipality = select_text(info, &fields.municipality);
        summary.province = select_text(info, &fields.province);
        summary.affiliation = select_text(info, &fields.affiliation);
    }

    Some(summary)
}

/// Offset carried by the link inside the "last page" pagination item
fn extract_terminus(document: &Html) -> Result<Option<u32>, ExtractError> {
    let end = match document.select(&selector(PAGINATION_END)?).next() {
        Some(end) => end,
        None => return Ok(None),
    };

    let terminus = end
        .children()
        .filter_map(ElementRef::wrap)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| query_param(href, OFFSET_PARAM))
        .and_then(|offset| offset.parse::<u32>().ok());

    Ok(terminus)
}

/// Concatenated text of every match under `scope`, whitespace collapsed
fn select_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    let raw: String = scope
        .select(selector)
        .flat_map(|element| element.text())
        .collect();
    collapse_whitespace(&raw)
}

/// Text of the n-th match under `scope`, empty when there are fewer matches
fn nth_text(scope: ElementRef<'_>, selector: &Selector, n: usize) -> String {
    scope
        .select(selector)
        .nth(n)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .unwrap_or_default()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes a field's label from its value, then any leading separators
fn strip_label(text: &str, label: &str) -> String {
    text.replacen(label, "", 1)
        .trim_start_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .trim_end()
        .to_string()
}
