use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    BoxOfficeMojo,
    Letterboxd,
}

impl Site {
    pub fn key(&self) -> &'static str {
        match self {
            Site::BoxOfficeMojo => "box_office_mojo",
            Site::Letterboxd => "letterboxd",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Site::BoxOfficeMojo => "Box Office Mojo",
            Site::Letterboxd => "Letterboxd",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Job {
        site: Site,
    }

    #[test]
    fn keys_match_config_names() {
        for site in [Site::BoxOfficeMojo, Site::Letterboxd] {
            let job: Job = serde_json::from_str(&format!(r#"{{"site":"{}"}}"#, site.key())).unwrap();
            assert_eq!(job.site, site);
        }
        assert_eq!(Site::Letterboxd.to_string(), "Letterboxd");
    }
}
