use serde::{Deserialize, Serialize};
use url::Url;

/// How page URLs are built for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PagePlan {
    /// `{base_url}page/{n}/`, open-ended unless `max_pages` is set
    Numbered {
        base_url: String,
        #[serde(default)]
        max_pages: Option<u32>,
    },
    /// `base_url` plus `{param}={(n - 1) * step}`, for a fixed number of pages.
    /// The first page carries no offset parameter.
    Offsets {
        base_url: String,
        param: String,
        step: u32,
        pages: u32,
    },
    /// An explicit URL per page
    Fixed { urls: Vec<String> },
}

impl PagePlan {
    /// Every URL the plan can produce must start from a parseable base.
    pub fn validate(&self) -> Result<(), (String, url::ParseError)> {
        let bases: Vec<&String> = match self {
            PagePlan::Numbered { base_url, .. } | PagePlan::Offsets { base_url, .. } => {
                vec![base_url]
            }
            PagePlan::Fixed { urls } => urls.iter().collect(),
        };
        for base in bases {
            Url::parse(base).map_err(|e| (base.clone(), e))?;
        }
        Ok(())
    }

    /// URL of the 1-based `page`, or `None` once the plan is exhausted.
    pub fn url_for(&self, page: u32) -> Option<Url> {
        if page == 0 {
            return None;
        }
        match self {
            PagePlan::Numbered { base_url, max_pages } => {
                if max_pages.is_some_and(|max| page > max) {
                    return None;
                }
                let mut base = Url::parse(base_url).ok()?;
                if !base.path().ends_with('/') {
                    let path = format!("{}/", base.path());
                    base.set_path(&path);
                }
                base.join(&format!("page/{}/", page)).ok()
            }
            PagePlan::Offsets { base_url, param, step, pages } => {
                if page > *pages {
                    return None;
                }
                let mut url = Url::parse(base_url).ok()?;
                let offset = (page - 1).checked_mul(*step)?;
                if offset > 0 {
                    let extra = serde_urlencoded::to_string(&[(param.as_str(), offset)]).ok()?;
                    let query = match url.query() {
                        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, extra),
                        _ => extra,
                    };
                    url.set_query(Some(&query));
                }
                Some(url)
            }
            PagePlan::Fixed { urls } => urls
                .get(page as usize - 1)
                .and_then(|u| Url::parse(u).ok()),
        }
    }

    /// True when the plan knows every page URL up front, so a failed page
    /// does not hide whether a later one exists.
    pub fn is_bounded(&self) -> bool {
        match self {
            PagePlan::Numbered { max_pages, .. } => max_pages.is_some(),
            PagePlan::Offsets { .. } | PagePlan::Fixed { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbered_pages_append_segment() {
        let plan = PagePlan::Numbered {
            base_url: "https://letterboxd.com/films/popular".to_string(),
            max_pages: None,
        };
        assert_eq!(
            plan.url_for(1).unwrap().as_str(),
            "https://letterboxd.com/films/popular/page/1/"
        );
        assert_eq!(
            plan.url_for(12).unwrap().as_str(),
            "https://letterboxd.com/films/popular/page/12/"
        );
        assert!(!plan.is_bounded());
    }

    #[test]
    fn numbered_pages_respect_max() {
        let plan = PagePlan::Numbered {
            base_url: "https://letterboxd.com/films/popular/".to_string(),
            max_pages: Some(2),
        };
        assert!(plan.url_for(2).is_some());
        assert!(plan.url_for(3).is_none());
        assert!(plan.is_bounded());
    }

    #[test]
    fn offsets_extend_existing_query() {
        let plan = PagePlan::Offsets {
            base_url: "https://www.boxofficemojo.com/chart/ww_top_lifetime_gross/?area=XWW"
                .to_string(),
            param: "offset".to_string(),
            step: 200,
            pages: 2,
        };
        assert_eq!(
            plan.url_for(1).unwrap().as_str(),
            "https://www.boxofficemojo.com/chart/ww_top_lifetime_gross/?area=XWW"
        );
        assert_eq!(
            plan.url_for(2).unwrap().as_str(),
            "https://www.boxofficemojo.com/chart/ww_top_lifetime_gross/?area=XWW&offset=200"
        );
        assert!(plan.url_for(3).is_none());
    }

    #[test]
    fn fixed_plan_and_validation() {
        let plan = PagePlan::Fixed {
            urls: vec!["https://example.com/a".to_string(), "not a url".to_string()],
        };
        assert!(plan.validate().is_err());
        assert!(plan.url_for(0).is_none());
        assert_eq!(plan.url_for(1).unwrap().as_str(), "https://example.com/a");
    }

    #[test]
    fn oversized_offsets_end_the_plan() {
        let plan = PagePlan::Offsets {
            base_url: "https://www.boxofficemojo.com/chart/ww_top_lifetime_gross/".to_string(),
            param: "offset".to_string(),
            step: u32::MAX / 2,
            pages: 10,
        };
        assert!(plan.url_for(2).is_some());
        assert_eq!(plan.url_for(4), None);
    }
}
