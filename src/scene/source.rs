//! Cover source text: one title line, then one line per item
//!
//! ```text
//! CÁC KỲ THI,08/2023
//! 05/08,IOI PRACTICE CONTEST,2023
//! ```
//!
//! Parsing never fails. Missing fields are empty strings and extra fields
//! are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub top: String,
    pub main: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub top: String,
    pub main: String,
    pub right: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverSource {
    pub title: Title,
    pub items: Vec<Item>,
}

const DELIMITER: char = ',';

fn fields<const N: usize>(line: &str) -> [String; N] {
    let mut parts = line.split(DELIMITER);
    std::array::from_fn(|_| parts.next().unwrap_or_default().to_string())
}

/// Split `source` into a title record and item records.
pub fn parse_source(source: &str) -> CoverSource {
    let mut lines = source.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let [top, main] = fields::<2>(lines.next().unwrap_or_default());
    let items = lines
        .map(|line| {
            let [top, main, right] = fields::<3>(line);
            Item { top, main, right }
        })
        .collect();
    CoverSource { title: Title { top, main }, items }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_one_item() {
        let s = parse_source("A,B\n1,2,3");
        assert_eq!(s.title, Title { top: "A".into(), main: "B".into() });
        assert_eq!(s.items, vec![Item { top: "1".into(), main: "2".into(), right: "3".into() }]);
    }

    #[test]
    fn empty_source() {
        let s = parse_source("");
        assert_eq!(s.title, Title::default());
        assert!(s.items.is_empty());
    }

    #[test]
    fn missing_and_extra_fields() {
        let s = parse_source("only\nx\na,b,c,d\r");
        assert_eq!(s.title.top, "only");
        assert_eq!(s.title.main, "");
        assert_eq!(s.items[0], Item { top: "x".into(), ..Default::default() });
        assert_eq!(s.items[1].right, "c");
    }

    #[test]
    fn trailing_newline_yields_blank_item() {
        let s = parse_source("A,B\n");
        assert_eq!(s.items, vec![Item::default()]);
    }
}
