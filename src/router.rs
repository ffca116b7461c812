//! Fragment grammar for client-side navigation.
//!
//! `` or `/`                      -> home grid
//! `subject/<name>`               -> chapter list
//! `quiz/<name>/<ALL|chapterNum>` -> quiz session
//!
//! `<name>` is percent-decoded. Unrecognized fragments parse to `None`
//! and navigation ignores them.

use std::fmt;

/// Which questions a quiz session covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterSelector {
    All,
    Chapter(u32),
}

impl fmt::Display for ChapterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterSelector::All => write!(f, "ALL"),
            ChapterSelector::Chapter(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Subject(String),
    Quiz(String, ChapterSelector),
}

impl Route {
    pub fn parse(fragment: &str) -> Option<Route> {
        let fragment = fragment.trim_start_matches('#');
        if fragment.is_empty() || fragment == "/" {
            return Some(Route::Home);
        }

        let segments: Vec<&str> = fragment.split('/').collect();
        match segments.as_slice() {
            ["subject", name] => Some(Route::Subject(decode(name)?)),
            ["quiz", name, selector] => {
                let selector = if *selector == "ALL" {
                    ChapterSelector::All
                } else {
                    ChapterSelector::Chapter(selector.parse().ok()?)
                };
                Some(Route::Quiz(decode(name)?, selector))
            }
            _ => None,
        }
    }

    /// Fragment that navigates to this route.
    pub fn fragment(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Subject(name) => format!("subject/{}", urlencoding::encode(name)),
            Route::Quiz(name, selector) => {
                format!("quiz/{}/{}", urlencoding::encode(name), selector)
            }
        }
    }
}

fn decode(segment: &str) -> Option<String> {
    if segment.is_empty() {
        return None;
    }
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_variants() {
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("#/"), Some(Route::Home));
    }

    #[test]
    fn test_subject_route_decodes_name() {
        assert_eq!(
            Route::parse("subject/Forensic%20Medicine"),
            Some(Route::Subject("Forensic Medicine".to_string()))
        );
    }

    #[test]
    fn test_quiz_routes() {
        assert_eq!(
            Route::parse("quiz/Anatomy/ALL"),
            Some(Route::Quiz("Anatomy".to_string(), ChapterSelector::All))
        );
        assert_eq!(
            Route::parse("quiz/Anatomy/3"),
            Some(Route::Quiz("Anatomy".to_string(), ChapterSelector::Chapter(3)))
        );
    }

    #[test]
    fn test_unrecognized_fragments() {
        assert_eq!(Route::parse("nope"), None);
        assert_eq!(Route::parse("subject/"), None);
        assert_eq!(Route::parse("quiz/Anatomy"), None);
        assert_eq!(Route::parse("quiz/Anatomy/xyz"), None);
    }

    #[test]
    fn test_fragment_roundtrip() {
        for fragment in ["/", "subject/Forensic%20Medicine", "quiz/Anatomy/ALL", "quiz/Anatomy/7"] {
            let route = Route::parse(fragment).expect("parse");
            assert_eq!(Route::parse(&route.fragment()), Some(route));
        }
    }
}
